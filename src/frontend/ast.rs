//! Abstract Syntax Tree definitions for Go declarations
//!
//! Only the parts of a file the scanner looks at are modelled: the package
//! clause, imports, type declarations and function signatures. Function
//! bodies and `const`/`var` declarations are skipped by the parser.

use crate::utils::Span;

/// A complete source file (compilation unit)
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: Ident,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// Iterate over every type spec, including those in grouped declarations
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls.iter().flat_map(Decl::type_specs)
    }

    /// Iterate over function and method declarations in source order
    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            Decl::Type(_) => None,
        })
    }
}

/// Identifier with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Import spec
#[derive(Debug, Clone)]
pub struct Import {
    /// Explicit local name (`foo`, `_` or `.`)
    pub alias: Option<String>,
    /// Import path without quotes
    pub path: String,
    pub span: Span,
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    /// `type X ...` or a grouped `type ( ... )`
    Type(Vec<TypeSpec>),
    Func(FuncDecl),
}

impl Decl {
    fn type_specs(&self) -> &[TypeSpec] {
        match self {
            Decl::Type(specs) => specs,
            Decl::Func(_) => &[],
        }
    }
}

/// One binding in a type declaration
#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    pub type_params: Vec<ParamGroup>,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Function or method declaration
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub recv: Option<ParamGroup>,
    pub name: Ident,
    pub signature: Signature,
    pub span: Span,
}

impl FuncDecl {
    /// Names of type parameters in scope for the signature: the function's
    /// own and those bound by a generic receiver such as `(l *List[T])`.
    pub fn type_param_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .signature
            .type_params
            .iter()
            .flat_map(|group| group.names.iter().map(|n| n.name.as_str()))
            .collect();
        if let Some(recv) = &self.recv {
            let mut base = &recv.ty;
            while let TypeExpr::Pointer(inner) | TypeExpr::Paren(inner) = base {
                base = &**inner;
            }
            if let TypeExpr::Generic { args, .. } = base {
                for arg in args {
                    if let TypeExpr::Name(ident) = arg {
                        names.push(ident.name.as_str());
                    }
                }
            }
        }
        names
    }
}

/// Parameters, type parameters and results of a function
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub type_params: Vec<ParamGroup>,
    pub params: Vec<ParamGroup>,
    pub results: Vec<ParamGroup>,
}

impl Signature {
    /// Result types in declaration order, one entry per result position
    /// (`(a, b S)` yields `S` twice).
    pub fn result_types(&self) -> Vec<&TypeExpr> {
        self.results
            .iter()
            .flat_map(|group| std::iter::repeat(&group.ty).take(group.names.len().max(1)))
            .collect()
    }
}

/// A run of names sharing one type: `a, b int`, or a lone type `int`
#[derive(Debug, Clone)]
pub struct ParamGroup {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
}

/// Struct field declaration
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Empty for an embedded field
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    /// Tag literal as written
    pub tag: Option<String>,
}

/// Interface element
#[derive(Debug, Clone)]
pub enum InterfaceElem {
    Method { name: Ident, signature: Signature },
    /// Embedded interface or type-set union
    Embed(TypeExpr),
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// Type expression
#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// `T`
    Name(Ident),
    /// `pkg.T`
    Qualified { package: Ident, name: Ident },
    /// `T[A, B]` or `pkg.T[A]`
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `[N]T`; the length is kept as written (`...` included)
    Array { len: String, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    /// `func(...) ...`
    Func(Box<Signature>),
    /// `struct{ ... }`
    Struct(Vec<FieldDecl>),
    /// `interface{ ... }`
    Interface(Vec<InterfaceElem>),
    /// `~T` inside a constraint
    Tilde(Box<TypeExpr>),
    /// `A | B` inside a constraint
    Union(Vec<TypeExpr>),
    /// `...T` (last parameter only)
    Ellipsis(Box<TypeExpr>),
    /// `(T)`
    Paren(Box<TypeExpr>),
}
