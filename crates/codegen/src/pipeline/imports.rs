//! Step 6: import hygiene for the runtime helpers.

use wirec_core::ast::{Import, SourceUnit};

pub const RUNTIME_MODULE: &str = "@wirec/runtime";
pub const RESOLVE_HELPER: &str = "resolve";
pub const CANCELLATION_HELPER: &str = "createCancellationToken";

/// Ensure `name` is imported from the runtime module exactly once. Existing
/// imports, including unrelated ones, are never removed.
pub fn ensure_runtime_import(unit: &mut SourceUnit, name: &str) {
    if let Some(import) = unit.imports.iter_mut().find(|i| i.module == RUNTIME_MODULE) {
        if !import.names.iter().any(|n| n == name) {
            import.names.push(name.to_string());
        }
        return;
    }
    unit.imports.push(Import {
        module: RUNTIME_MODULE.to_string(),
        names: vec![name.to_string()],
    });
}
