//! The typed declaration tree the engine operates on.

pub mod decl;
pub mod expr;
pub mod index;
pub mod source;
pub mod types;

pub use decl::{
    Annotation, BaseRef, Binding, BindingElement, ClassDecl, Declaration, FunctionDecl,
    InterfaceDecl, Param, TypeAliasDecl,
};
pub use expr::{Expr, Stmt};
pub use index::{NamedType, TypeIndex};
pub use source::{Import, SourceUnit, UnitLoader};
pub use types::{PropertySig, TypeExpr};
