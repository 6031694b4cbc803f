//! Type Catalog
//!
//! Type declarations of every package in a scan, keyed by declaring
//! package for local lookups and by clause name for qualified ones.
//! Populated from every unit before any resolution happens.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::frontend::ast::{TypeExpr, TypeSpec};
use crate::frontend::package::{PackageId, SourceUnit};

/// A type name qualified by the namespace that declares it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    pub namespace: String,
    pub ident: String,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, ident: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ident: ident.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.ident)
    }
}

/// The closed set of shapes the resolver distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// An explicit `struct{...}`
    Structural,
    /// An unqualified name, resolved in the namespace of its use
    Named(String),
    /// `namespace.Ident`, taken literally as a catalog key
    Qualified { namespace: String, ident: String },
    /// Pointers, slices, maps, channels, functions, interfaces and the like
    Other,
}

impl TypeShape {
    /// Classify the outermost form of a type expression.
    ///
    /// Parentheses are transparent, and an instantiation such as
    /// `List[int]` takes the shape of its generic base name.
    pub fn of(expr: &TypeExpr) -> Self {
        match expr {
            TypeExpr::Struct(_) => TypeShape::Structural,
            TypeExpr::Name(ident) => TypeShape::Named(ident.name.clone()),
            TypeExpr::Qualified { package, name } => TypeShape::Qualified {
                namespace: package.name.clone(),
                ident: name.name.clone(),
            },
            TypeExpr::Generic { base, .. } | TypeExpr::Paren(base) => TypeShape::of(base),
            TypeExpr::Pointer(_)
            | TypeExpr::Slice(_)
            | TypeExpr::Array { .. }
            | TypeExpr::Map { .. }
            | TypeExpr::Chan { .. }
            | TypeExpr::Func(_)
            | TypeExpr::Interface(_)
            | TypeExpr::Tilde(_)
            | TypeExpr::Union(_)
            | TypeExpr::Ellipsis(_) => TypeShape::Other,
        }
    }
}

/// Right-hand side of a type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    /// Declaring package; unqualified names in `shape` resolve here, not
    /// where the type is used
    pub package: PackageId,
    pub ident: String,
    pub shape: TypeShape,
}

impl TypeDefinition {
    pub fn from_spec(package: &PackageId, spec: &TypeSpec) -> Self {
        Self {
            package: package.clone(),
            ident: spec.name.name.clone(),
            shape: TypeShape::of(&spec.ty),
        }
    }

    /// The name other packages qualify this type by
    pub fn name(&self) -> TypeName {
        TypeName::new(self.package.name.as_str(), self.ident.as_str())
    }
}

/// Mutable catalog used while the first pass runs
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    local: HashMap<PackageId, HashMap<String, TypeDefinition>>,
    qualified: HashMap<TypeName, PackageId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for the definition's package and name.
    ///
    /// A type redeclared in one package keeps only its last definition.
    /// Packages sharing a clause name stay apart for unqualified lookups;
    /// a qualified `pkg.T` goes to whichever of them registered `T` last.
    pub fn register(&mut self, def: TypeDefinition) {
        match self.qualified.insert(def.name(), def.package.clone()) {
            Some(previous) if previous != def.package => {
                debug!("qualified name {} now refers to {}, was {}", def.name(), def.package, previous);
            }
            _ => {}
        }
        let package = self.local.entry(def.package.clone()).or_default();
        if let Some(previous) = package.insert(def.ident.clone(), def) {
            debug!("type {} redeclared in {}, replacing {:?}", previous.ident, previous.package, previous.shape);
        }
    }

    /// Register every type spec declared in `unit`
    pub fn collect(&mut self, unit: &SourceUnit) {
        for spec in unit.file.type_specs() {
            self.register(TypeDefinition::from_spec(&unit.package, spec));
        }
    }

    /// Freeze the table
    pub fn build(self) -> TypeCatalog {
        TypeCatalog {
            local: self.local,
            qualified: self.qualified,
        }
    }
}

/// Read-only type table for the resolution pass
#[derive(Debug, Default)]
pub struct TypeCatalog {
    local: HashMap<PackageId, HashMap<String, TypeDefinition>>,
    qualified: HashMap<TypeName, PackageId>,
}

impl TypeCatalog {
    /// Build a catalog from a complete set of units
    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a SourceUnit>) -> Self {
        let mut builder = CatalogBuilder::new();
        for unit in units {
            builder.collect(unit);
        }
        builder.build()
    }

    /// An unqualified `ident` as seen from inside `package`
    pub fn lookup_local(&self, package: &PackageId, ident: &str) -> Option<&TypeDefinition> {
        self.local.get(package)?.get(ident)
    }

    /// A qualified `pkg.Ident`, keyed on the package clause name
    pub fn lookup(&self, name: &TypeName) -> Option<&TypeDefinition> {
        let package = self.qualified.get(name)?;
        self.lookup_local(package, &name.ident)
    }

    pub fn len(&self) -> usize {
        self.local.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.local.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(path: &str, source: &str) -> SourceUnit {
        SourceUnit::parse(path, source, 0).unwrap()
    }

    fn def(dir: &str, name: &str, ident: &str, shape: TypeShape) -> TypeDefinition {
        TypeDefinition {
            package: PackageId::new(dir, name),
            ident: ident.to_string(),
            shape,
        }
    }

    #[test]
    fn test_collects_grouped_and_single_specs() {
        let units = [unit(
            "a.go",
            "package geo\ntype Point struct{ X, Y int }\ntype (\n\tAlias = Point\n\tRef *Point\n\tRemote other.T\n)\n",
        )];
        let catalog = TypeCatalog::from_units(&units);
        let geo = PackageId::new("", "geo");

        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.lookup(&TypeName::new("geo", "Point")).map(|d| &d.shape),
            Some(&TypeShape::Structural)
        );
        let alias = catalog.lookup_local(&geo, "Alias").unwrap();
        assert_eq!(alias.shape, TypeShape::Named("Point".to_string()));
        assert_eq!(alias.name(), TypeName::new("geo", "Alias"));
        assert_eq!(
            catalog.lookup_local(&geo, "Ref").map(|d| &d.shape),
            Some(&TypeShape::Other)
        );
        assert_eq!(
            catalog.lookup_local(&geo, "Remote").map(|d| &d.shape),
            Some(&TypeShape::Qualified {
                namespace: "other".to_string(),
                ident: "T".to_string()
            })
        );
    }

    #[test]
    fn test_names_are_case_sensitive_and_namespaced() {
        let units = [unit("a.go", "package geo\ntype Point struct{}\n")];
        let catalog = TypeCatalog::from_units(&units);

        assert!(catalog.lookup(&TypeName::new("geo", "point")).is_none());
        assert!(catalog.lookup(&TypeName::new("Geo", "Point")).is_none());
        assert!(catalog.lookup(&TypeName::new("geo", "Point")).is_some());
        assert!(catalog.lookup_local(&PackageId::new("elsewhere", "geo"), "Point").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut builder = CatalogBuilder::new();
        builder.register(def("", "p", "T", TypeShape::Structural));
        builder.register(def("", "p", "T", TypeShape::Other));
        let catalog = builder.build();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup(&TypeName::new("p", "T")).unwrap().shape, TypeShape::Other);
    }

    #[test]
    fn test_same_package_name_in_two_directories() {
        let units = [
            unit("cmd/a/main.go", "package main\ntype config struct{}\n"),
            unit("cmd/b/main.go", "package main\ntype config int\n"),
        ];
        let catalog = TypeCatalog::from_units(&units);

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.lookup_local(&PackageId::new("cmd/a", "main"), "config").unwrap().shape,
            TypeShape::Structural
        );
        assert_eq!(
            catalog.lookup_local(&PackageId::new("cmd/b", "main"), "config").unwrap().shape,
            TypeShape::Named("int".into())
        );
        // Qualified names only know the clause name
        assert_eq!(
            catalog.lookup(&TypeName::new("main", "config")).unwrap().package.dir,
            std::path::PathBuf::from("cmd/b")
        );
    }

    #[test]
    fn test_generic_and_parenthesized_shapes() {
        let units = [unit("a.go", "package p\ntype A List[int]\ntype B (S)\ntype C = q.Box[S]\n")];
        let catalog = TypeCatalog::from_units(&units);
        let p = PackageId::new("", "p");

        assert_eq!(catalog.lookup_local(&p, "A").unwrap().shape, TypeShape::Named("List".into()));
        assert_eq!(catalog.lookup_local(&p, "B").unwrap().shape, TypeShape::Named("S".into()));
        assert_eq!(
            catalog.lookup_local(&p, "C").unwrap().shape,
            TypeShape::Qualified { namespace: "q".into(), ident: "Box".into() }
        );
    }

    #[test]
    fn test_display_and_empty() {
        assert_eq!(TypeName::new("pkg", "S").to_string(), "pkg.S");
        assert!(TypeCatalog::default().is_empty());

        let units = [unit("a.go", "package p\n")];
        assert!(TypeCatalog::from_units(&units).is_empty());
    }
}
