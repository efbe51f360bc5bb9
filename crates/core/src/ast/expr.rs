//! Statements and expressions of function bodies.
//!
//! The transformation pipeline rewrites these nodes directly; it never does
//! text substitution, so unrelated occurrences of a name survive untouched.

use serde::{Deserialize, Serialize};

use super::decl::BindingElement;

/// A statement in a function body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Stmt {
    /// `const <name> = <init>`
    Const { name: String, init: Expr },
    /// A destructuring binding: `const { a, b } = <source>`
    Binding {
        pattern: Vec<BindingElement>,
        source: Expr,
    },
    /// Bare expression statement
    Expr { expr: Expr },
    /// `return <expr?>`
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expr: Option<Expr>,
    },
    /// Lifecycle effect block: runs `body` on mount, `cleanup` on unmount
    Effect { body: Vec<Stmt>, cleanup: Vec<Stmt> },
}

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expr {
    Ident { name: String },
    /// `<object>.<property>` or `<object>?.<property>`
    Member {
        object: Box<Expr>,
        property: String,
        #[serde(default)]
        optional_chain: bool,
    },
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// `<lhs> ?? <rhs>`
    NullishCoalesce { lhs: Box<Expr>, rhs: Box<Expr> },
    StringLit { value: String },
    Undefined,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident { name: name.into() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLit {
            value: value.into(),
        }
    }

    pub fn member(object: Expr, property: impl Into<String>, optional_chain: bool) -> Self {
        Self::Member {
            object: Box::new(object),
            property: property.into(),
            optional_chain,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn nullish(lhs: Expr, rhs: Expr) -> Self {
        Self::NullishCoalesce {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// If this expression is a plain member chain rooted at an identifier,
    /// return the root name and the property path in source order.
    pub fn as_member_chain(&self) -> Option<(String, Vec<String>)> {
        match self {
            Self::Ident { name } => Some((name.clone(), Vec::new())),
            Self::Member {
                object, property, ..
            } => {
                let (root, mut path) = object.as_member_chain()?;
                path.push(property.clone());
                Some((root, path))
            }
            _ => None,
        }
    }
}
