//! Declaration Scanner
//!
//! Second pass: walks the function declarations of one unit and reports
//! those with a result that resolves to a struct.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::frontend::ast::FuncDecl;
use crate::frontend::package::SourceUnit;
use crate::frontend::printer::{render_func_header, render_type};
use crate::types::{Scope, TypeCatalog, TypeResolver};

/// One reported declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    pub line: usize,
    pub namespace: String,
    /// Header up to the result list, on one line
    pub signature: String,
    /// Rendered result types that resolved to a struct, one per position
    pub structural_results: Vec<String>,
    /// For each structural result, the named types followed to reach the
    /// struct (empty for a struct literal)
    pub resolved_via: Vec<Vec<String>>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.signature)
    }
}

/// Scanner over units, backed by a completed catalog
pub struct DeclarationScanner<'a> {
    resolver: TypeResolver<'a>,
}

impl<'a> DeclarationScanner<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self {
            resolver: TypeResolver::new(catalog),
        }
    }

    /// Findings of `unit` in declaration order, produced lazily
    pub fn scan<'s>(&'s self, unit: &'s SourceUnit) -> impl Iterator<Item = Finding> + 's {
        unit.file
            .functions()
            .filter_map(move |func| self.inspect(unit, func))
    }

    /// A declaration is reported once, however many of its results
    /// are structs.
    pub fn inspect(&self, unit: &SourceUnit, func: &FuncDecl) -> Option<Finding> {
        let results = func.signature.result_types();
        if results.is_empty() {
            return None;
        }

        let scope = Scope::new(&unit.package).with_type_params(func.type_param_names());
        let mut structural_results = Vec::new();
        let mut resolved_via: Vec<Vec<String>> = Vec::new();
        for ty in results {
            let resolution = self.resolver.resolve(ty, &scope);
            if resolution.classification.is_structural() {
                structural_results.push(render_type(ty));
                resolved_via.push(resolution.chain.iter().map(ToString::to_string).collect());
            }
        }
        if structural_results.is_empty() {
            return None;
        }

        let finding = Finding {
            file: unit.path.display().to_string(),
            line: unit.line_of(func.span),
            namespace: unit.package.name.clone(),
            signature: render_func_header(func),
            structural_results,
            resolved_via,
        };
        for (ty, chain) in finding.structural_results.iter().zip(&finding.resolved_via) {
            debug!("{} returns {} via [{}]", func.name.name, ty, chain.join(" -> "));
        }
        Some(finding)
    }
}
