//! Type expressions of the scanned source language.
//!
//! Source files are pre-parsed by an external frontend into `.unit.json`
//! declaration trees; this module is the serde model those trees deserialize
//! into. The engine never parses source text itself.

use serde::{Deserialize, Serialize};

/// A type expression as written in the scanned source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeExpr {
    /// Reference to a named type, possibly generic (`Repository<User>`)
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_args: Vec<TypeExpr>,
    },
    /// Inline structural shape (`{ logger: Inject<Logger>, title: string }`)
    Shape { properties: Vec<PropertySig> },
    /// Union of constituents
    Union { variants: Vec<TypeExpr> },
    /// Intersection of constituents
    Intersection { members: Vec<TypeExpr> },
    /// Array of an element type
    Array { element: Box<TypeExpr> },
    /// The injection marker wrapper; `optional` is the allow-absence variant
    Inject {
        inner: Box<TypeExpr>,
        #[serde(default)]
        optional: bool,
    },
    /// Anything the frontend could not classify
    Unknown,
}

/// One property of a structural shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySig {
    pub name: String,
    pub ty: TypeExpr,
    #[serde(default)]
    pub optional: bool,
}

impl TypeExpr {
    /// Construct a bare named reference
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    /// Construct the required marker wrapper
    pub fn inject(inner: TypeExpr) -> Self {
        Self::Inject {
            inner: Box::new(inner),
            optional: false,
        }
    }

    /// Construct the optional marker wrapper
    pub fn inject_optional(inner: TypeExpr) -> Self {
        Self::Inject {
            inner: Box::new(inner),
            optional: true,
        }
    }

    /// The written form of the type, used to derive request tokens
    pub fn display_name(&self) -> String {
        match self {
            Self::Named { name, type_args } => {
                if type_args.is_empty() {
                    name.clone()
                } else {
                    let args: Vec<String> = type_args.iter().map(|t| t.display_name()).collect();
                    format!("{}<{}>", name, args.join(", "))
                }
            }
            Self::Shape { properties } => {
                let props: Vec<String> = properties.iter().map(|p| p.name.clone()).collect();
                format!("{{{}}}", props.join(", "))
            }
            Self::Union { variants } => variants
                .iter()
                .map(|t| t.display_name())
                .collect::<Vec<_>>()
                .join(" | "),
            Self::Intersection { members } => members
                .iter()
                .map(|t| t.display_name())
                .collect::<Vec<_>>()
                .join(" & "),
            Self::Array { element } => format!("{}[]", element.display_name()),
            Self::Inject { inner, .. } => inner.display_name(),
            Self::Unknown => "unknown".to_string(),
        }
    }
}
