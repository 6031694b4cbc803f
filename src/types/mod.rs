//! Type catalog and alias resolution

pub mod catalog;
pub mod resolver;

pub use catalog::TypeCatalog;
pub use resolver::{Scope, TypeResolver};
