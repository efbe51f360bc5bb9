//! Name index over every loaded unit, used to resolve named type references
//! during marker extraction.

use std::collections::HashMap;

use super::decl::{Declaration, InterfaceDecl, TypeAliasDecl};
use super::source::SourceUnit;

/// What a named type reference resolves to
#[derive(Debug, Clone, Copy)]
pub enum NamedType<'a> {
    Alias(&'a TypeAliasDecl),
    Interface(&'a InterfaceDecl),
}

/// Cross-unit index of interfaces and type aliases by name.
///
/// Imports are flat in the source model, so a single global namespace is
/// enough: the frontend has already resolved module paths.
pub struct TypeIndex<'a> {
    by_name: HashMap<&'a str, NamedType<'a>>,
}

impl<'a> TypeIndex<'a> {
    pub fn build(units: &'a [SourceUnit]) -> Self {
        let mut by_name = HashMap::new();
        for unit in units {
            for decl in &unit.declarations {
                match decl {
                    Declaration::Interface(i) => {
                        by_name.insert(i.name.as_str(), NamedType::Interface(i));
                    }
                    Declaration::TypeAlias(t) => {
                        by_name.insert(t.name.as_str(), NamedType::Alias(t));
                    }
                    _ => {}
                }
            }
        }
        Self { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<NamedType<'a>> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
