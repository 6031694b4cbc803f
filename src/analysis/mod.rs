//! Scan pipeline
//!
//! Two stages with a barrier between them:
//! 1. load and parse every directory under the root, then build the
//!    type catalog from all of it;
//! 2. scan each unit against the finished catalog.
//!
//! Stage 2 never touches the filesystem, so it can be driven with
//! synthetic units and catalogs.

pub mod scanner;

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use walkdir::{DirEntry, WalkDir};

use crate::frontend::package::{Package, PackageLoader};
use crate::types::TypeCatalog;
use crate::utils::{Error, Result};

pub use scanner::{DeclarationScanner, Finding};

/// Options for one scan
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Leave out `_test.go` files
    pub skip_tests: bool,
    /// Directory base names not descended into
    pub skip_dirs: Vec<String>,
}

/// Everything a scan produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub findings: Vec<Finding>,
    pub packages: usize,
    pub files: usize,
    pub types: usize,
}

/// The two-stage scan driver
pub struct Pipeline {
    config: ScanConfig,
}

impl Pipeline {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Parse every package under `root`, depth-first in name order.
    ///
    /// Any unreadable directory or unparsable file aborts the load.
    pub fn load(&self, root: &Path) -> Result<Vec<Package>> {
        let mut loader = PackageLoader::new().with_skip_tests(self.config.skip_tests);
        let mut packages = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped(entry));
        for entry in walker {
            let entry = entry.map_err(|err| Error::Walk(err.to_string()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            for package in loader.load_dir(entry.path())? {
                debug!("package {}: {} files", package.id, package.units.len());
                packages.push(package);
            }
        }

        info!(
            "loaded {} packages from {} files under {}",
            packages.len(),
            loader.files_loaded(),
            root.display()
        );
        Ok(packages)
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && self
                .config
                .skip_dirs
                .iter()
                .any(|name| entry.file_name() == name.as_str())
    }

    /// Stage 1: the catalog over every unit of every package
    pub fn build_catalog(packages: &[Package]) -> TypeCatalog {
        TypeCatalog::from_units(packages.iter().flat_map(|package| &package.units))
    }

    /// Stage 2: findings for every unit, in package and file order
    pub fn scan(catalog: &TypeCatalog, packages: &[Package]) -> Vec<Finding> {
        let scanner = DeclarationScanner::new(catalog);
        packages
            .iter()
            .flat_map(|package| &package.units)
            .flat_map(|unit| scanner.scan(unit))
            .collect()
    }

    /// Load, catalog and scan the tree under `root`
    pub fn run(&self, root: &Path) -> Result<ScanReport> {
        let packages = self.load(root)?;
        let catalog = Self::build_catalog(&packages);
        if catalog.is_empty() {
            info!("no type declarations under {}", root.display());
        } else {
            info!("catalog holds {} type definitions", catalog.len());
        }

        let findings = Self::scan(&catalog, &packages);
        info!("{} declarations return struct types", findings.len());

        Ok(ScanReport {
            findings,
            packages: packages.len(),
            files: packages.iter().map(|package| package.units.len()).sum(),
            types: catalog.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    fn tempdir_or_panic() -> tempfile::TempDir {
        tempfile::tempdir().unwrap_or_else(|err| panic!("temp dir: {err}"))
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|err| panic!("mkdir {rel}: {err}"));
        }
        fs::write(&path, contents).unwrap_or_else(|err| panic!("write {rel}: {err}"));
    }

    /// Findings as printed, with the temp root stripped
    fn lines(root: &Path, report: &ScanReport) -> Vec<String> {
        let prefix = format!("{}/", root.display());
        report
            .findings
            .iter()
            .map(|finding| finding.to_string().replacen(&prefix, "", 1))
            .collect()
    }

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempdir_or_panic();
        // `api` walks before `model`, so every reference into model is forward
        write(dir.path(), "api/handlers.go", "package api\n\nimport \"example.com/model\"\n\nfunc Current() model.User {\n\treturn model.User{}\n}\n\nfunc Lookup(id int) (*model.User, error) {\n\treturn nil, nil\n}\n\nfunc Page() Page { return Page{} }\n");
        write(dir.path(), "api/types.go", "package api\n\ntype Page = page\n\ntype page struct{ Items []string }\n");
        write(dir.path(), "model/user.go", "package model\n\ntype User = Account\n");
        write(dir.path(), "model/account.go", "package model\n\ntype Account struct {\n\tID int\n}\n\nfunc New() Account { return Account{} }\n");
        write(dir.path(), "vendor/dep/dep.go", "package dep\n\ntype D struct{}\n\nfunc Make() D { return D{} }\n");
        write(dir.path(), "README.md", "# not go\n");
        dir
    }

    #[test]
    fn test_run_reports_in_walk_order() {
        let dir = sample_tree();
        let report = Pipeline::new(ScanConfig::default()).run(dir.path()).unwrap();

        assert_eq!(
            lines(dir.path(), &report),
            vec![
                "api/handlers.go:5 func Current() model.User",
                "api/handlers.go:13 func Page() Page",
                "model/account.go:7 func New() Account",
                "vendor/dep/dep.go:5 func Make() D",
            ]
        );
        assert_eq!(report.packages, 3);
        assert_eq!(report.files, 5);
        assert_eq!(report.types, 5);
    }

    #[test]
    fn test_skip_dirs() {
        let dir = sample_tree();
        let config = ScanConfig {
            skip_dirs: vec!["vendor".to_string()],
            ..ScanConfig::default()
        };
        let report = Pipeline::new(config).run(dir.path()).unwrap();

        assert_eq!(report.findings.len(), 3);
        assert!(report.findings.iter().all(|f| !f.file.contains("vendor")));
    }

    #[test]
    fn test_skip_dirs_never_applies_to_root() {
        let dir = sample_tree();
        let root: PathBuf = dir.path().join("model");
        let config = ScanConfig {
            skip_dirs: vec!["model".to_string()],
            ..ScanConfig::default()
        };
        let report = Pipeline::new(config).run(&root).unwrap();

        assert_eq!(report.findings.len(), 1);
    }

    #[test]
    fn test_run_is_idempotent() {
        let dir = sample_tree();
        let pipeline = Pipeline::new(ScanConfig::default());

        let first = lines(dir.path(), &pipeline.run(dir.path()).unwrap());
        let second = lines(dir.path(), &pipeline.run(dir.path()).unwrap());

        assert_eq!(first, second);
    }

    #[test]
    fn test_order_does_not_depend_on_catalog_order() {
        let dir = sample_tree();
        let pipeline = Pipeline::new(ScanConfig::default());
        let packages = pipeline.load(dir.path()).unwrap();

        let mut reversed = packages.clone();
        reversed.reverse();
        let forward = Pipeline::scan(&Pipeline::build_catalog(&packages), &packages);
        let backward = Pipeline::scan(&Pipeline::build_catalog(&reversed), &packages);

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_parse_failure_aborts() {
        let dir = sample_tree();
        write(dir.path(), "broken/bad.go", "package broken\n\nfunc (\n");

        let result = Pipeline::new(ScanConfig::default()).run(dir.path());

        assert!(matches!(result, Err(Error::Syntax { .. })));
    }

    #[test]
    fn test_missing_root_aborts() {
        let dir = tempdir_or_panic();
        let result = Pipeline::new(ScanConfig::default()).run(&dir.path().join("nope"));

        assert!(matches!(result, Err(Error::Walk(_))));
    }

    #[test]
    fn test_skip_tests_excludes_test_files() {
        let dir = tempdir_or_panic();
        write(dir.path(), "p/p.go", "package p\n\ntype S struct{}\n");
        write(dir.path(), "p/p_test.go", "package p\n\nfunc fixture() S { return S{} }\n");

        let all = Pipeline::new(ScanConfig::default()).run(dir.path()).unwrap();
        let config = ScanConfig { skip_tests: true, ..ScanConfig::default() };
        let without_tests = Pipeline::new(config).run(dir.path()).unwrap();

        assert_eq!(all.findings.len(), 1);
        assert!(without_tests.findings.is_empty());
    }

    #[test]
    fn test_main_packages_in_sibling_directories_stay_apart() {
        let dir = tempdir_or_panic();
        write(dir.path(), "cmd/a/main.go", "package main\n\ntype config struct{ addr string }\n\nfunc load() config {\n\treturn config{}\n}\n");
        write(dir.path(), "cmd/b/main.go", "package main\n\ntype config int\n");

        let report = Pipeline::new(ScanConfig::default()).run(dir.path()).unwrap();

        assert_eq!(lines(dir.path(), &report), vec!["cmd/a/main.go:5 func load() config"]);
        assert_eq!(report.packages, 2);
        assert_eq!(report.types, 2);
    }

    #[test]
    fn test_reported_paths_are_cleaned() {
        let dir = sample_tree();
        let pipeline = Pipeline::new(ScanConfig::default());

        let plain = lines(dir.path(), &pipeline.run(dir.path()).unwrap());
        let dotted = lines(dir.path(), &pipeline.run(&dir.path().join(".")).unwrap());

        assert_eq!(plain, dotted);
    }
}
