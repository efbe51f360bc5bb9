//! Registration metadata: the unit of the token-keyed registry.

use serde::{Deserialize, Serialize};

use crate::ast::BaseRef;

/// Lifetime of a registered service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceScope {
    #[default]
    Singleton,
    Transient,
    Scoped,
}

impl ServiceScope {
    /// Parse a scope from an annotation argument; unknown strings fall back
    /// to singleton.
    pub fn parse(value: &str) -> Self {
        match value {
            "transient" => Self::Transient,
            "scoped" => Self::Scoped,
            _ => Self::Singleton,
        }
    }
}

/// How an implementation is addressed by a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationKind {
    /// Declared-interface token from an implements clause
    Interface,
    /// The implementation's own class name
    Class,
    /// Derived from a generic argument of a recognized base class
    Inheritance,
    /// Derived from a typed state shape
    State,
}

/// One implementation discovered by the scanner, addressable under `token`.
/// A single class yields one record per addressable token; all records of a
/// class share one factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationRecord {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    pub implementation_name: String,
    pub file_path: String,
    pub kind: RegistrationKind,
    #[serde(default)]
    pub is_generic: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_class_info: Option<BaseRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inheritance_chain: Vec<String>,
    #[serde(default)]
    pub has_lifecycle: bool,
}

/// One token's worth of registry metadata, pointing at a shared factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRegistration {
    pub token: String,
    pub scope: ServiceScope,
    /// Tokens of the resolved implementations this service depends on
    pub dependency_tokens: Vec<String>,
    pub factory_name: String,
    pub registration_kind: RegistrationKind,
}

/// Sanitize a written type name into a token: runs of non-alphanumeric
/// characters collapse to a single underscore, trimmed at both ends.
pub fn sanitize_token(raw: &str) -> String {
    let mut token = String::with_capacity(raw.len());
    let mut last_was_sep = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            token.push(c);
            last_was_sep = false;
        } else if !last_was_sep && !token.is_empty() {
            token.push('_');
            last_was_sep = true;
        }
    }
    if token.ends_with('_') {
        token.pop();
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_punctuation() {
        assert_eq!(sanitize_token("Repository<User>"), "Repository_User");
        assert_eq!(sanitize_token("a.b::c"), "a_b_c");
        assert_eq!(sanitize_token("Plain"), "Plain");
    }

    #[test]
    fn sanitize_trims_edges() {
        assert_eq!(sanitize_token("<User>"), "User");
        assert_eq!(sanitize_token("{cart, items}"), "cart_items");
    }

    #[test]
    fn scope_parse_defaults_to_singleton() {
        assert_eq!(ServiceScope::parse("transient"), ServiceScope::Transient);
        assert_eq!(ServiceScope::parse("scoped"), ServiceScope::Scoped);
        assert_eq!(ServiceScope::parse("whatever"), ServiceScope::Singleton);
    }
}
