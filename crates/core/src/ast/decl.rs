//! Declarations of the scanned source language.

use serde::{Deserialize, Serialize};

use super::expr::Stmt;
use super::types::{PropertySig, TypeExpr};

/// A top-level declaration in a source unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Function(FunctionDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Self::Class(c) => &c.name,
            Self::Interface(i) => &i.name,
            Self::TypeAlias(t) => &t.name,
            Self::Function(f) => &f.name,
        }
    }
}

/// An annotation attached to a declaration, e.g. `@Service("singleton")`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(name: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: vec![arg.into()],
        }
    }
}

/// Reference to a base class, e.g. `extends EntityRepository<User>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<TypeExpr>,
}

/// A class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<BaseRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor_params: Vec<Param>,
    /// Typed state shape the service declares, addressable as a state token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_type: Option<TypeExpr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

impl ClassDecl {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Whether the class exposes mount/unmount lifecycle callbacks
    pub fn has_lifecycle(&self) -> bool {
        self.methods.iter().any(|m| m == "mount") && self.methods.iter().any(|m| m == "unmount")
    }
}

/// An interface declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertySig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
}

/// A type alias declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDecl {
    pub name: String,
    pub ty: TypeExpr,
}

/// A function-like declaration; transformation candidates are functions whose
/// first parameter carries injection markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<Stmt>,
}

/// A parameter: a binding plus its declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub binding: Binding,
    pub ty: TypeExpr,
}

/// How a parameter binds its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Binding {
    Name { name: String },
    Destructure { elements: Vec<BindingElement> },
}

/// One element of a destructuring pattern; `nested` holds sub-patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingElement {
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<BindingElement>>,
}

impl BindingElement {
    pub fn simple(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            alias: None,
            nested: None,
        }
    }

    pub fn aliased(property: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            alias: Some(alias.into()),
            nested: None,
        }
    }

    pub fn nested(property: impl Into<String>, elements: Vec<BindingElement>) -> Self {
        Self {
            property: property.into(),
            alias: None,
            nested: Some(elements),
        }
    }

    /// The name this element binds locally (alias wins over property name)
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.property)
    }
}
