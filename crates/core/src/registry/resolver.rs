//! The service registry: token-keyed registrations, request resolution,
//! dependency linking, and validation.
//!
//! The registry moves through Empty -> Populated -> Validated -> Ordered; a
//! re-scan never patches an existing registry, callers build a fresh one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::deps::DependencySpec;
use crate::errors::EngineError;
use crate::scan::ScannedImplementation;

use super::graph::DependencyGraph;
use super::registration::{ImplementationRecord, RegistrationKind, ServiceRegistration};

/// Outcome of resolving one dependency spec. Every extracted spec is
/// classified as exactly one of these, never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Resolution {
    /// Resolved to the implementation registered under this class token
    Resolved { token: String },
    OptionalMissing,
    RequiredMissing,
}

/// A dependency spec together with its resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub spec: DependencySpec,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidationError {
    MissingImplementation { token: String, required_by: String },
    CircularDependency { cycle: Vec<String> },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingImplementation { token, required_by } => {
                write!(f, "missing implementation for '{}' (required by {})", token, required_by)
            }
            Self::CircularDependency { cycle } => {
                write!(f, "circular dependency: {}", cycle.join(" -> "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidationWarning {
    /// Interface token with more than one registered implementation;
    /// the last registered wins
    AmbiguousImplementation {
        interface: String,
        candidates: Vec<String>,
    },
    /// Non-interface token registered twice
    DuplicateToken {
        token: String,
        previous: String,
        replacement: String,
    },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmbiguousImplementation { interface, candidates } => write!(
                f,
                "ambiguous implementations for '{}': {} (last registered wins)",
                interface,
                candidates.join(", ")
            ),
            Self::DuplicateToken { token, previous, replacement } => write!(
                f,
                "token '{}' re-registered: {} replaced by {}",
                token, previous, replacement
            ),
        }
    }
}

/// Result of a registry validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Empty,
    Populated,
    Validated,
    Ordered,
}

/// Token-keyed registry of every discovered implementation
pub struct ServiceRegistry {
    registrations: HashMap<String, ServiceRegistration>,
    implementations: HashMap<String, ImplementationRecord>,
    /// class name -> class token
    class_index: HashMap<String, String>,
    /// interface name -> every candidate implementation name, in
    /// registration order; kept for diagnostics even after last-wins
    interface_index: HashMap<String, Vec<String>>,
    /// owner class token -> resolved dependencies
    links: HashMap<String, Vec<ResolvedDependency>>,
    pending: Vec<(String, Vec<DependencySpec>)>,
    graph: DependencyGraph,
    duplicate_warnings: Vec<ValidationWarning>,
    state: RegistryState,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            registrations: HashMap::new(),
            implementations: HashMap::new(),
            class_index: HashMap::new(),
            interface_index: HashMap::new(),
            links: HashMap::new(),
            pending: Vec::new(),
            graph: DependencyGraph::new(),
            duplicate_warnings: Vec::new(),
            state: RegistryState::Empty,
        }
    }

    /// Insert every record of one scanned implementation, plus its raw
    /// dependency specs for later linking. Duplicate tokens overwrite the
    /// previous entry and record a warning.
    pub fn register(&mut self, scanned: &ScannedImplementation, deps: Vec<DependencySpec>) {
        let class_token = scanned.class_token().to_string();

        for record in &scanned.records {
            if let Some(previous) = self.implementations.get(&record.token) {
                if previous.implementation_name != record.implementation_name
                    && record.kind != RegistrationKind::Interface
                {
                    self.duplicate_warnings.push(ValidationWarning::DuplicateToken {
                        token: record.token.clone(),
                        previous: previous.implementation_name.clone(),
                        replacement: record.implementation_name.clone(),
                    });
                }
                tracing::warn!(
                    token = %record.token,
                    previous = %previous.implementation_name,
                    replacement = %record.implementation_name,
                    "token re-registered, last registration wins"
                );
            }

            self.registrations.insert(
                record.token.clone(),
                ServiceRegistration {
                    token: record.token.clone(),
                    scope: scanned.scope,
                    dependency_tokens: Vec::new(),
                    factory_name: format!("create{}", record.implementation_name),
                    registration_kind: record.kind,
                },
            );
            self.implementations.insert(record.token.clone(), record.clone());

            if let Some(interface) = &record.interface_name {
                self.interface_index
                    .entry(interface.clone())
                    .or_default()
                    .push(record.implementation_name.clone());
            }
        }

        self.class_index
            .insert(scanned.class.name.clone(), class_token.clone());
        self.graph.add_node(class_token.clone());
        self.pending.push((class_token, deps));
        self.state = RegistryState::Populated;
    }

    /// Resolve a request token to an implementation record. Direct map
    /// lookup; last registration under the token wins.
    pub fn resolve(&self, token: &str) -> Option<&ImplementationRecord> {
        self.implementations.get(token)
    }

    pub fn registration(&self, token: &str) -> Option<&ServiceRegistration> {
        self.registrations.get(token)
    }

    /// Resolve a request to the winning implementation's class token
    pub fn resolve_to_class_token(&self, token: &str) -> Option<&str> {
        let record = self.implementations.get(token)?;
        self.class_index
            .get(&record.implementation_name)
            .map(String::as_str)
    }

    /// Classify every pending dependency spec and build the graph edges.
    /// Idempotent per registration batch: call once after all `register`s.
    pub fn link(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for (owner_token, specs) in pending {
            let mut resolved = Vec::with_capacity(specs.len());
            for spec in specs {
                let target = self.resolve_to_class_token(&spec.token).map(str::to_string);
                let resolution = match target {
                    Some(token) => {
                        self.graph.add_edge(owner_token.clone(), token.clone());
                        Resolution::Resolved { token }
                    }
                    None if spec.optional => Resolution::OptionalMissing,
                    None => Resolution::RequiredMissing,
                };
                resolved.push(ResolvedDependency { spec, resolution });
            }
            self.links.insert(owner_token, resolved);
        }

        // Every registration of an implementation shares the factory, so
        // they all carry the same dependency list
        for registration in self.registrations.values_mut() {
            let impl_name = registration
                .factory_name
                .strip_prefix("create")
                .unwrap_or(&registration.factory_name);
            if let Some(class_token) = self.class_index.get(impl_name) {
                if let Some(deps) = self.links.get(class_token) {
                    registration.dependency_tokens = deps
                        .iter()
                        .filter_map(|d| match &d.resolution {
                            Resolution::Resolved { token } => Some(token.clone()),
                            _ => None,
                        })
                        .collect();
                }
            }
        }
    }

    /// Validate the linked registry: dangling required dependencies are
    /// errors, cycles are errors, interface ambiguity is a warning.
    pub fn validate(&mut self) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = self.duplicate_warnings.clone();

        for deps in self.links.values() {
            for dep in deps {
                if dep.resolution == Resolution::RequiredMissing {
                    errors.push(ValidationError::MissingImplementation {
                        token: dep.spec.token.clone(),
                        required_by: dep.spec.owner_name.clone(),
                    });
                }
            }
        }
        errors.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));

        for cycle in self.graph.detect_cycles() {
            errors.push(ValidationError::CircularDependency { cycle });
        }

        let mut interfaces: Vec<_> = self.interface_index.iter().collect();
        interfaces.sort_by_key(|(name, _)| name.as_str());
        for (interface, candidates) in interfaces {
            if candidates.len() > 1 {
                warnings.push(ValidationWarning::AmbiguousImplementation {
                    interface: interface.clone(),
                    candidates: candidates.clone(),
                });
            }
        }

        let report = ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        };
        if report.is_valid {
            self.state = RegistryState::Validated;
        }
        report
    }

    /// Generation order: every dependency before its dependents. The same
    /// cycle detector as `validate` backs the failure path.
    pub fn topological_order(&mut self) -> Result<Vec<&ServiceRegistration>, EngineError> {
        let class_order = self
            .graph
            .topological_order()
            .map_err(|cycle| EngineError::CircularDependency { cycle })?;
        self.state = RegistryState::Ordered;

        let mut ordered = Vec::new();
        for class_token in &class_order {
            let Some(class_record) = self.implementations.get(class_token) else {
                continue;
            };
            let impl_name = class_record.implementation_name.clone();
            // Class token first, then the other registrations of the same
            // implementation in deterministic order
            let mut tokens: Vec<&String> = self
                .registrations
                .keys()
                .filter(|t| {
                    self.implementations
                        .get(*t)
                        .is_some_and(|r| r.implementation_name == impl_name)
                })
                .collect();
            tokens.sort();
            if let Some(pos) = tokens.iter().position(|t| *t == class_token) {
                tokens.rotate_left(pos);
            }
            for token in tokens {
                ordered.push(&self.registrations[token]);
            }
        }
        Ok(ordered)
    }

    pub fn links(&self) -> &HashMap<String, Vec<ResolvedDependency>> {
        &self.links
    }

    pub fn resolved_dependencies(&self, class_token: &str) -> &[ResolvedDependency] {
        self.links
            .get(class_token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn class_index(&self) -> &HashMap<String, String> {
        &self.class_index
    }

    pub fn interface_index(&self) -> &HashMap<String, Vec<String>> {
        &self.interface_index
    }

    pub fn registrations(&self) -> &HashMap<String, ServiceRegistration> {
        &self.registrations
    }

    pub fn implementations(&self) -> &HashMap<String, ImplementationRecord> {
        &self.implementations
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Number of distinct implementations (not registrations)
    pub fn implementation_count(&self) -> usize {
        self.class_index.len()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
