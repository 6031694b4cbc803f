//! Type Resolver
//!
//! Answers one question for any type expression: does it denote a struct
//! once every alias is followed? Nothing here fails; unknown names, cycles
//! and foreign types all come out as non-structural.

use std::collections::HashSet;

use log::debug;

use crate::frontend::ast::TypeExpr;
use crate::frontend::package::PackageId;
use crate::types::catalog::{TypeCatalog, TypeName, TypeShape};

/// Result of resolving a type reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Structural,
    NonStructural,
}

impl Classification {
    pub fn is_structural(self) -> bool {
        self == Classification::Structural
    }
}

/// Names visible where a type expression is written
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    /// Package used for unqualified names
    pub package: &'a PackageId,
    /// Type parameters bound by the enclosing declaration
    pub type_params: Vec<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn new(package: &'a PackageId) -> Self {
        Self {
            package,
            type_params: Vec::new(),
        }
    }

    pub fn with_type_params(mut self, type_params: Vec<&'a str>) -> Self {
        self.type_params = type_params;
        self
    }

    fn binds(&self, ident: &str) -> bool {
        self.type_params.iter().any(|param| *param == ident)
    }
}

/// Classification plus the named types walked to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub classification: Classification,
    /// Catalog entries visited, in order
    pub chain: Vec<TypeName>,
}

/// Stateless resolver over a completed catalog
pub struct TypeResolver<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> TypeResolver<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self { catalog }
    }

    pub fn classify(&self, expr: &TypeExpr, scope: &Scope) -> Classification {
        self.resolve(expr, scope).classification
    }

    /// Follow `expr` through the catalog to a terminal shape.
    ///
    /// Unqualified names resolve in the scope's package for the first step
    /// and in the declaring package of each definition after that. A
    /// definition seen twice on one chain ends the walk as non-structural.
    pub fn resolve(&self, expr: &TypeExpr, scope: &Scope) -> Resolution {
        let mut chain = Vec::new();
        let mut visited: HashSet<(&PackageId, &str)> = HashSet::new();
        let mut shape = TypeShape::of(expr);
        let mut package = scope.package;

        if let TypeShape::Named(ident) = &shape {
            if scope.binds(ident) {
                return Resolution {
                    classification: Classification::NonStructural,
                    chain,
                };
            }
        }

        let classification = loop {
            let (def, wanted) = match &shape {
                TypeShape::Structural => break Classification::Structural,
                TypeShape::Other => break Classification::NonStructural,
                TypeShape::Named(ident) => (
                    self.catalog.lookup_local(package, ident),
                    TypeName::new(package.name.as_str(), ident.as_str()),
                ),
                TypeShape::Qualified { namespace, ident } => {
                    let name = TypeName::new(namespace.as_str(), ident.as_str());
                    (self.catalog.lookup(&name), name)
                }
            };

            let Some(def) = def else {
                debug!("{} is not declared in the scanned tree", wanted);
                break Classification::NonStructural;
            };

            if !visited.insert((&def.package, def.ident.as_str())) {
                debug!("alias cycle through {}, treating as non-structural", wanted);
                break Classification::NonStructural;
            }

            chain.push(wanted);
            package = &def.package;
            shape = def.shape.clone();
        };

        Resolution {
            classification,
            chain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::Ident;
    use crate::frontend::package::SourceUnit;
    use crate::types::catalog::{CatalogBuilder, TypeDefinition};
    use crate::utils::Span;

    fn pkg(dir: &str, name: &str) -> PackageId {
        PackageId::new(dir, name)
    }

    fn catalog(files: &[(&str, &str)]) -> TypeCatalog {
        let units: Vec<SourceUnit> = files
            .iter()
            .enumerate()
            .map(|(id, (path, source))| SourceUnit::parse(*path, source, id).unwrap())
            .collect();
        TypeCatalog::from_units(&units)
    }

    fn ident(name: &str) -> Ident {
        Ident { name: name.to_string(), span: Span::dummy() }
    }

    fn name(n: &str) -> TypeExpr {
        TypeExpr::Name(ident(n))
    }

    fn qualified(ns: &str, n: &str) -> TypeExpr {
        TypeExpr::Qualified { package: ident(ns), name: ident(n) }
    }

    #[test]
    fn test_unknown_name_is_non_structural() {
        let catalog = TypeCatalog::default();
        let resolver = TypeResolver::new(&catalog);

        let p = pkg("", "p");
        for builtin in ["int", "error", "string", "Missing"] {
            assert_eq!(resolver.classify(&name(builtin), &Scope::new(&p)), Classification::NonStructural);
        }
    }

    #[test]
    fn test_direct_struct() {
        let catalog = catalog(&[("a.go", "package p\ntype S struct{ X int }\n")]);
        let resolver = TypeResolver::new(&catalog);
        let p = pkg("", "p");

        assert_eq!(resolver.classify(&name("S"), &Scope::new(&p)), Classification::Structural);
        assert_eq!(
            resolver.classify(&TypeExpr::Struct(Vec::new()), &Scope::new(&p)),
            Classification::Structural
        );
    }

    #[test]
    fn test_alias_chain_is_transitive() {
        let catalog = catalog(&[(
            "a.go",
            "package p\ntype A = B\ntype B C\ntype C = D\ntype D struct{}\n",
        )]);
        let resolver = TypeResolver::new(&catalog);

        let p = pkg("", "p");
        let resolution = resolver.resolve(&name("A"), &Scope::new(&p));
        assert_eq!(resolution.classification, Classification::Structural);
        let chain: Vec<String> = resolution.chain.iter().map(|n| n.to_string()).collect();
        assert_eq!(chain, vec!["p.A", "p.B", "p.C", "p.D"]);
    }

    #[test]
    fn test_pointer_and_containers_are_terminal() {
        let catalog = catalog(&[("a.go", "package p\ntype S struct{}\ntype P *S\ntype L []S\n")]);
        let resolver = TypeResolver::new(&catalog);
        let p = pkg("", "p");
        let scope = Scope::new(&p);

        assert_eq!(resolver.classify(&TypeExpr::Pointer(Box::new(name("S"))), &scope), Classification::NonStructural);
        assert_eq!(resolver.classify(&name("P"), &scope), Classification::NonStructural);
        assert_eq!(resolver.classify(&name("L"), &scope), Classification::NonStructural);
    }

    #[test]
    fn test_qualified_reference_is_taken_literally() {
        let catalog = catalog(&[
            ("a/a.go", "package a\ntype T struct{}\n"),
            ("b/b.go", "package b\ntype U = a.T\n"),
        ]);
        let resolver = TypeResolver::new(&catalog);
        let b = pkg("b", "b");
        let scope = Scope::new(&b);

        assert_eq!(resolver.classify(&qualified("a", "T"), &scope), Classification::Structural);
        assert_eq!(resolver.classify(&name("U"), &scope), Classification::Structural);
        // An unqualified T exists in a, but c.T has no entry
        assert_eq!(resolver.classify(&qualified("c", "T"), &scope), Classification::NonStructural);
        assert_eq!(resolver.classify(&name("T"), &scope), Classification::NonStructural);
    }

    #[test]
    fn test_unqualified_names_resolve_in_defining_namespace() {
        let catalog = catalog(&[
            ("a/a.go", "package a\ntype Entry = inner\ntype inner struct{}\n"),
            ("b/b.go", "package b\ntype inner int\n"),
        ]);
        let resolver = TypeResolver::new(&catalog);

        let b = pkg("b", "b");
        assert_eq!(resolver.classify(&qualified("a", "Entry"), &Scope::new(&b)), Classification::Structural);
    }

    #[test]
    fn test_cycle_terminates() {
        let catalog = catalog(&[("a.go", "package p\ntype A B\ntype B = C\ntype C A\ntype Self = Self\n")]);
        let resolver = TypeResolver::new(&catalog);
        let p = pkg("", "p");
        let scope = Scope::new(&p);

        let resolution = resolver.resolve(&name("A"), &scope);
        assert_eq!(resolution.classification, Classification::NonStructural);
        assert_eq!(resolution.chain.len(), 3);
        assert_eq!(resolver.classify(&name("Self"), &scope), Classification::NonStructural);
    }

    #[test]
    fn test_cross_namespace_cycle_terminates() {
        let mut builder = CatalogBuilder::new();
        builder.register(TypeDefinition {
            package: pkg("a", "a"),
            ident: "X".into(),
            shape: TypeShape::Qualified { namespace: "b".into(), ident: "Y".into() },
        });
        builder.register(TypeDefinition {
            package: pkg("b", "b"),
            ident: "Y".into(),
            shape: TypeShape::Qualified { namespace: "a".into(), ident: "X".into() },
        });
        let catalog = builder.build();
        let resolver = TypeResolver::new(&catalog);
        let a = pkg("a", "a");

        let resolution = resolver.resolve(&qualified("a", "X"), &Scope::new(&a));
        assert_eq!(resolution.classification, Classification::NonStructural);
        assert_eq!(resolution.chain, vec![TypeName::new("a", "X"), TypeName::new("b", "Y")]);
    }

    #[test]
    fn test_same_package_name_in_different_directories() {
        let catalog = catalog(&[
            ("cmd/a/main.go", "package main\ntype config = settings\ntype settings struct{}\n"),
            ("cmd/b/main.go", "package main\ntype config int\n"),
        ]);
        let resolver = TypeResolver::new(&catalog);
        let a = pkg("cmd/a", "main");
        let b = pkg("cmd/b", "main");

        let resolution = resolver.resolve(&name("config"), &Scope::new(&a));
        assert_eq!(resolution.classification, Classification::Structural);
        assert_eq!(resolution.chain, vec![TypeName::new("main", "config"), TypeName::new("main", "settings")]);
        assert_eq!(resolver.classify(&name("config"), &Scope::new(&b)), Classification::NonStructural);
        assert_eq!(resolver.classify(&name("settings"), &Scope::new(&b)), Classification::NonStructural);
    }

    #[test]
    fn test_type_parameter_shadows_package_type() {
        let catalog = catalog(&[("a.go", "package p\ntype S struct{}\n")]);
        let resolver = TypeResolver::new(&catalog);
        let p = pkg("", "p");
        let scope = Scope::new(&p).with_type_params(vec!["S"]);

        assert_eq!(resolver.classify(&name("S"), &scope), Classification::NonStructural);
        assert!(resolver.classify(&name("S"), &Scope::new(&p)).is_structural());
    }

    #[test]
    fn test_generic_instantiation_follows_base() {
        let catalog = catalog(&[("a.go", "package p\ntype Pair[K comparable, V any] struct{ k K; v V }\n")]);
        let resolver = TypeResolver::new(&catalog);
        let expr = TypeExpr::Generic { base: Box::new(name("Pair")), args: vec![name("int"), name("string")] };

        let p = pkg("", "p");
        assert_eq!(resolver.classify(&expr, &Scope::new(&p)), Classification::Structural);
    }
}
