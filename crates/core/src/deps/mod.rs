//! Dependency extraction: for each discovered service or candidate, the
//! markers on its dependency-bearing surface become `DependencySpec`s.

use serde::{Deserialize, Serialize};

use crate::ast::{Binding, ClassDecl, FunctionDecl};
use crate::markers::MarkerExtractor;
use crate::registry::registration::sanitize_token;

/// One requested dependency of a service or candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySpec {
    pub owner_name: String,
    /// Parameter or property name the dependency binds to
    pub param_or_property: String,
    pub requested_type: String,
    /// Sanitized lookup key derived from the requested type
    pub token: String,
    pub optional: bool,
    /// Nested-property route from the parameter to the marker; empty for a
    /// directly-annotated parameter
    pub property_path: Vec<String>,
}

/// Extracts dependency specs from constructor and parameter surfaces
pub struct DependencyExtractor<'a> {
    markers: &'a MarkerExtractor<'a>,
}

impl<'a> DependencyExtractor<'a> {
    pub fn new(markers: &'a MarkerExtractor<'a>) -> Self {
        Self { markers }
    }

    /// Class-style services declare dependencies on constructor parameters.
    pub fn for_class(&self, class: &ClassDecl) -> Vec<DependencySpec> {
        let mut specs = Vec::new();
        for param in &class.constructor_params {
            let param_name = match &param.binding {
                Binding::Name { name } => name.clone(),
                // Destructured constructor params are addressed by path
                Binding::Destructure { .. } => String::new(),
            };
            for hit in self.markers.extract(&param.ty) {
                specs.push(self.spec(&class.name, &param_name, hit));
            }
        }
        specs
    }

    /// Function-style candidates carry markers on the first parameter.
    pub fn for_function(&self, func: &FunctionDecl) -> Vec<DependencySpec> {
        let Some(param) = func.params.first() else {
            return Vec::new();
        };
        let param_name = match &param.binding {
            Binding::Name { name } => name.clone(),
            Binding::Destructure { .. } => String::new(),
        };
        self.markers
            .extract(&param.ty)
            .into_iter()
            .map(|hit| self.spec(&func.name, &param_name, hit))
            .collect()
    }

    fn spec(
        &self,
        owner: &str,
        param_name: &str,
        hit: crate::markers::MarkerHit,
    ) -> DependencySpec {
        let bound = hit
            .property_path
            .last()
            .cloned()
            .unwrap_or_else(|| param_name.to_string());
        DependencySpec {
            owner_name: owner.to_string(),
            param_or_property: bound,
            token: sanitize_token(&hit.requested_type),
            requested_type: hit.requested_type,
            optional: hit.optional,
            property_path: hit.property_path,
        }
    }
}
