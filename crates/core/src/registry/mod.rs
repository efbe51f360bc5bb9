//! Resolver and service registry: token-keyed registrations, the dependency
//! graph, and validation.

pub mod graph;
pub mod registration;
pub mod resolver;

pub use graph::DependencyGraph;
pub use registration::{
    sanitize_token, ImplementationRecord, RegistrationKind, ServiceRegistration, ServiceScope,
};
pub use resolver::{
    RegistryState, ResolvedDependency, Resolution, ServiceRegistry, ValidationError,
    ValidationReport, ValidationWarning,
};
