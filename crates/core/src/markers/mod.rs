//! Injection-marker extraction.
//!
//! Walks a type expression recursively and reports every marker occurrence
//! with the property path that reaches it. Two detection strategies exist:
//! the strict path only accepts the literal marker wrapper; the heuristic
//! path additionally accepts property types whose written name looks like a
//! service. The heuristic is deliberately kept a separate, selectable
//! strategy so its false positives and negatives can be isolated in tests.

use std::collections::HashSet;

use regex::Regex;

use crate::ast::{NamedType, TypeExpr, TypeIndex};
use crate::errors::EngineError;

/// One marker occurrence inside a type expression
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerHit {
    /// Nested-property route from the annotated parameter to the marker
    pub property_path: Vec<String>,
    /// Written name of the requested type
    pub requested_type: String,
    pub optional: bool,
}

/// Configuration for the "looks like a service" fallback
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    /// Name suffixes that indicate a service type
    pub suffixes: Vec<String>,
    /// Accept any capitalized bare identifier
    pub match_capitalized: bool,
    /// Extra project-specific pattern
    pub extra_pattern: Option<Regex>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            suffixes: ["Interface", "Service", "Repository", "Manager"]
                .into_iter()
                .map(String::from)
                .collect(),
            match_capitalized: false,
            extra_pattern: None,
        }
    }
}

impl HeuristicConfig {
    /// Compile and attach a project-specific pattern
    pub fn with_extra_pattern(mut self, pattern: &str) -> Result<Self, EngineError> {
        self.extra_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    fn matches(&self, name: &str) -> bool {
        if self.suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            return true;
        }
        if self.match_capitalized
            && name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        {
            return true;
        }
        if let Some(pattern) = &self.extra_pattern {
            return pattern.is_match(name);
        }
        false
    }
}

/// Marker detection strategy
#[derive(Debug, Clone, Default)]
pub enum MarkerStrategy {
    /// Only the literal marker wrapper counts
    #[default]
    Strict,
    /// Wrapper plus the name-based fallback for unwrapped structural types
    StrictPlusHeuristic(HeuristicConfig),
}

/// Recursive marker extractor over a loaded declaration tree
pub struct MarkerExtractor<'a> {
    index: &'a TypeIndex<'a>,
    strategy: MarkerStrategy,
}

impl<'a> MarkerExtractor<'a> {
    pub fn new(index: &'a TypeIndex<'a>, strategy: MarkerStrategy) -> Self {
        Self { index, strategy }
    }

    /// Extract every marker occurrence in `ty`, with its property path.
    pub fn extract(&self, ty: &TypeExpr) -> Vec<MarkerHit> {
        let mut hits = Vec::new();
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        self.walk(ty, false, &mut path, &mut visited, &mut hits);
        hits
    }

    fn walk(
        &self,
        ty: &TypeExpr,
        property_optional: bool,
        path: &mut Vec<String>,
        visited: &mut HashSet<String>,
        hits: &mut Vec<MarkerHit>,
    ) {
        match ty {
            TypeExpr::Inject { inner, optional } => {
                hits.push(MarkerHit {
                    property_path: path.clone(),
                    requested_type: inner.display_name(),
                    optional: *optional || property_optional,
                });
            }
            TypeExpr::Shape { properties } => {
                for prop in properties {
                    path.push(prop.name.clone());
                    match &prop.ty {
                        TypeExpr::Named { name, type_args } if type_args.is_empty() => {
                            if self.heuristic_matches(name) {
                                hits.push(MarkerHit {
                                    property_path: path.clone(),
                                    requested_type: name.clone(),
                                    optional: prop.optional,
                                });
                            } else {
                                self.walk(&prop.ty, prop.optional, path, visited, hits);
                            }
                        }
                        other => self.walk(other, prop.optional, path, visited, hits),
                    }
                    path.pop();
                }
            }
            TypeExpr::Named { name, .. } => {
                // Self-referential aliases terminate here
                if !visited.insert(name.clone()) {
                    return;
                }
                match self.index.lookup(name) {
                    Some(NamedType::Alias(alias)) => {
                        self.walk(&alias.ty, property_optional, path, visited, hits);
                    }
                    Some(NamedType::Interface(iface)) => {
                        let shape = TypeExpr::Shape {
                            properties: iface.properties.clone(),
                        };
                        self.walk(&shape, property_optional, path, visited, hits);
                    }
                    None => {}
                }
                visited.remove(name);
            }
            TypeExpr::Union { variants } => {
                for variant in variants {
                    self.walk(variant, property_optional, path, visited, hits);
                }
            }
            TypeExpr::Intersection { members } => {
                for member in members {
                    self.walk(member, property_optional, path, visited, hits);
                }
            }
            TypeExpr::Array { element } => {
                self.walk(element, property_optional, path, visited, hits);
            }
            TypeExpr::Unknown => {}
        }
    }

    fn heuristic_matches(&self, name: &str) -> bool {
        match &self.strategy {
            MarkerStrategy::Strict => false,
            MarkerStrategy::StrictPlusHeuristic(config) => config.matches(name),
        }
    }
}
