//! Package loading for Go directories
//!
//! Reads every `.go` file of one directory, parses it, and groups the
//! results by their `package` clause the way the Go toolchain does.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::frontend::ast::SourceFile;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::utils::{Error, LineIndex, Result, Span};

/// A package as one directory's files sharing a package clause.
///
/// Unqualified type names are scoped by the whole id, so two `package main`
/// directories never see each other's types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
    pub dir: PathBuf,
    /// Package clause name; also the qualifier other packages use
    pub name: String,
}

impl PackageId {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dir.as_os_str().is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.dir.display())
        }
    }
}

/// One parsed file together with its package and line mapping
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Path of the file, as reached from the scan root
    pub path: PathBuf,
    pub package: PackageId,
    pub file: SourceFile,
    pub lines: LineIndex,
}

impl SourceUnit {
    /// Parse `source` as the contents of `path`.
    ///
    /// Syntax errors are reported with the file's line and column.
    pub fn parse(path: impl Into<PathBuf>, source: &str, file_id: usize) -> Result<Self> {
        let path = path.into();
        let lines = LineIndex::new(source);
        let mut parser = Parser::new(Lexer::new(source, file_id));
        let file = parser.parse_file().map_err(|err| {
            let (line, column) = err.span().map_or((0, 0), |span| lines.line_col(span.start));
            Error::Syntax {
                file: path.clone(),
                line,
                column,
                message: err.to_string(),
            }
        })?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self {
            package: PackageId::new(dir, file.package.name.as_str()),
            path,
            file,
            lines,
        })
    }

    /// 1-based line of the start of `span`
    pub fn line_of(&self, span: Span) -> usize {
        self.lines.line(span.start)
    }
}

/// The files of one directory that share a package clause
#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    /// Units in file-name order
    pub units: Vec<SourceUnit>,
}

/// Loader turning directories into parsed packages
pub struct PackageLoader {
    /// Leave out `_test.go` files
    skip_tests: bool,
    /// File IDs handed out so far
    next_file_id: usize,
}

impl PackageLoader {
    pub fn new() -> Self {
        Self {
            skip_tests: false,
            next_file_id: 0,
        }
    }

    pub fn with_skip_tests(mut self, skip_tests: bool) -> Self {
        self.skip_tests = skip_tests;
        self
    }

    /// Number of files parsed by this loader
    pub fn files_loaded(&self) -> usize {
        self.next_file_id
    }

    /// Load every package declared in `dir`, ordered by package name.
    /// A directory without Go files yields no packages.
    pub fn load_dir(&mut self, dir: &Path) -> Result<Vec<Package>> {
        let mut packages: BTreeMap<String, Package> = BTreeMap::new();
        for path in self.go_files(dir)? {
            let unit = self.parse_file(&path)?;
            packages
                .entry(unit.package.name.clone())
                .or_insert_with(|| Package {
                    id: unit.package.clone(),
                    units: Vec::new(),
                })
                .units
                .push(unit);
        }
        Ok(packages.into_values().collect())
    }

    /// Go files directly inside `dir`, sorted by name
    fn go_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(dir, e))?;
            let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.ends_with(".go") || (self.skip_tests && name.ends_with("_test.go")) {
                continue;
            }
            files.push(clean_path(&entry.path()));
        }
        files.sort();
        Ok(files)
    }

    fn parse_file(&mut self, path: &Path) -> Result<SourceUnit> {
        let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let file_id = self.next_file_id;
        self.next_file_id += 1;

        let unit = SourceUnit::parse(path, &source, file_id)?;
        debug!(
            "parsed {}: package {}, {} imports, {} declarations",
            path.display(),
            unit.package.name,
            unit.file.imports.len(),
            unit.file.decls.len()
        );
        Ok(unit)
    }
}

impl Default for PackageLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Lexically normalize a path: drop `.` components and fold `name/..`
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::CurDir) | Some(Component::ParentDir) | None => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}
