//! wirec-core: the resolution engine of the wirec dependency-injection
//! compiler.
//!
//! The engine consumes pre-parsed declaration trees (`*.unit.json`), discovers
//! annotated service implementations, extracts each one's requested
//! dependencies, and resolves every request token against a token-keyed
//! registry with cycle detection and deterministic generation ordering.
//! Code generation and artifact management live in `wirec-codegen`.

pub mod ast;
pub mod deps;
pub mod errors;
pub mod markers;
pub mod registry;
pub mod report;
pub mod scan;

pub use deps::{DependencyExtractor, DependencySpec};
pub use errors::EngineError;
pub use markers::{HeuristicConfig, MarkerExtractor, MarkerHit, MarkerStrategy};
pub use registry::{
    DependencyGraph, ImplementationRecord, RegistrationKind, Resolution, ResolvedDependency,
    ServiceRegistration, ServiceRegistry, ServiceScope, ValidationError, ValidationReport,
    ValidationWarning,
};
pub use report::{CouplingStats, DiagnosticReport, MissingDependency};
pub use scan::{ImplementationScanner, ScannedImplementation, ScannerConfig};
