//! wirec-codegen: artifact generation for the wirec dependency-injection
//! compiler.
//!
//! Takes a validated registry from `wirec-core` through the transformation
//! pipeline and serializes the result into a fingerprint-addressed artifact
//! directory, with reuse, locking, and retention handled by the artifact
//! store.

pub mod artifacts;
pub mod emit;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod options;
pub mod pipeline;
pub mod templates;
pub mod writer;

pub use artifacts::{ArtifactStore, ConfigMeta};
pub use emit::{ConfigEntry, DiConfig, Emitter};
pub use engine::{Analysis, Engine, GenerationQueue, PassReport};
pub use error::CodegenError;
pub use fingerprint::{Fingerprint, HashInputs};
pub use options::EffectiveOptions;
pub use pipeline::{transform_candidate, transform_unit, TransformedCandidate, TransformedUnit};
