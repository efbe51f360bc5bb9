//! The six-step transformation pipeline.
//!
//! Each candidate function goes through a fixed sequence: parameter
//! normalization, injection with runtime fallback, member-chain rewriting,
//! surgical destructure pruning, lifecycle wiring, and import hygiene. The
//! pipeline clones its input and never mutates the loaded tree, so a watch
//! pass always transforms the pristine declaration again. Feeding the
//! pipeline its own output is not supported: the injections would redeclare
//! the flat names.

use wirec_core::ast::{Declaration, Expr, FunctionDecl, SourceUnit, Stmt};
use wirec_core::{DependencyExtractor, Resolution, ResolvedDependency, ServiceRegistry};

use crate::error::CodegenError;

pub mod imports;
pub mod inject;
pub mod lifecycle;
pub mod normalize;
pub mod prune;
pub mod rewrite;

use imports::{ensure_runtime_import, CANCELLATION_HELPER, RESOLVE_HELPER};

/// A fully transformed candidate function
#[derive(Debug, Clone)]
pub struct TransformedCandidate {
    pub function: FunctionDecl,
    /// Flat names of the injected dependencies, in emission order
    pub injected: Vec<String>,
    /// Whether any non-DI destructure elements survived pruning
    pub preserved_binding: bool,
    pub needs_resolve_helper: bool,
    pub needs_cancellation_helper: bool,
}

/// A source unit after candidate transformation
#[derive(Debug, Clone)]
pub struct TransformedUnit {
    pub unit: SourceUnit,
    pub candidate_names: Vec<String>,
    /// Per-candidate failures; one bad candidate never aborts the unit
    pub errors: Vec<(String, String)>,
}

/// Run the pipeline over one candidate. The input declaration is left
/// untouched; the transformed clone is returned.
pub fn transform_candidate(
    func: &FunctionDecl,
    deps: &[ResolvedDependency],
    registry: &ServiceRegistry,
) -> Result<TransformedCandidate, CodegenError> {
    let mut func = func.clone();

    // Step 1: one named parameter to hang the access chains off
    let normalized = normalize::normalize_parameter(&mut func)?;

    // Step 2: access-with-fallback statements
    let injections = inject::injection_statements(
        &normalized.param_name,
        normalized.original_elements.as_deref(),
        deps,
    );

    // Step 3: pre-existing chains now point at the flat names
    rewrite::rewrite_body(&mut func.body, &normalized.param_name, &injections);

    // Step 4: strip exactly the DI elements from the original pattern,
    // re-binding whatever the caller still destructured
    let di_paths: Vec<Vec<String>> = injections.iter().map(|i| i.path.clone()).collect();
    let preserved = normalized.original_elements.as_deref().and_then(|elements| {
        let kept = prune::prune_elements(elements, &di_paths);
        (!kept.is_empty()).then_some(Stmt::Binding {
            pattern: kept,
            source: Expr::ident(&normalized.param_name),
        })
    });
    let preserved_binding = preserved.is_some();

    // Step 5: one effect block for the lifecycle-bearing dependencies
    let lifecycle_names = lifecycle::lifecycle_dependencies(&injections, deps, registry);
    let needs_cancellation_helper = lifecycle_names.len() > 1;
    let effect = (!lifecycle_names.is_empty()).then(|| lifecycle::build_effect(&lifecycle_names));

    let injected: Vec<String> = injections.iter().map(|i| i.flat_name.clone()).collect();
    let needs_resolve_helper = deps.iter().any(|d| {
        !matches!(d.resolution, Resolution::OptionalMissing)
    });

    let mut body: Vec<Stmt> = injections.into_iter().map(|i| i.stmt).collect();
    body.extend(preserved);
    body.extend(effect);
    body.append(&mut func.body);
    func.body = body;

    Ok(TransformedCandidate {
        function: func,
        injected,
        preserved_binding,
        needs_resolve_helper,
        needs_cancellation_helper,
    })
}

/// Transform every candidate function in one unit. Functions whose first
/// parameter carries no markers pass through untouched. Step 6 runs last,
/// adding runtime imports only for helpers the transformed unit actually
/// references.
pub fn transform_unit(
    unit: &SourceUnit,
    registry: &ServiceRegistry,
    extractor: &DependencyExtractor<'_>,
) -> TransformedUnit {
    let mut out = unit.clone();
    let mut candidate_names = Vec::new();
    let mut errors = Vec::new();
    let mut needs_resolve = false;
    let mut needs_cancellation = false;

    for decl in &mut out.declarations {
        let Declaration::Function(func) = decl else {
            continue;
        };
        let specs = extractor.for_function(func);
        if specs.is_empty() {
            continue;
        }

        let deps: Vec<ResolvedDependency> = specs
            .into_iter()
            .map(|spec| {
                let resolution = match registry.resolve_to_class_token(&spec.token) {
                    Some(token) => Resolution::Resolved {
                        token: token.to_string(),
                    },
                    None if spec.optional => Resolution::OptionalMissing,
                    None => Resolution::RequiredMissing,
                };
                ResolvedDependency { spec, resolution }
            })
            .collect();

        match transform_candidate(func, &deps, registry) {
            Ok(transformed) => {
                tracing::debug!(
                    candidate = %transformed.function.name,
                    injected = transformed.injected.len(),
                    "transformed candidate"
                );
                candidate_names.push(transformed.function.name.clone());
                needs_resolve |= transformed.needs_resolve_helper;
                needs_cancellation |= transformed.needs_cancellation_helper;
                *func = transformed.function;
            }
            Err(err) => {
                tracing::warn!(candidate = %func.name, error = %err, "candidate skipped");
                errors.push((func.name.clone(), err.to_string()));
            }
        }
    }

    // Step 6: import hygiene
    if needs_resolve {
        ensure_runtime_import(&mut out, RESOLVE_HELPER);
    }
    if needs_cancellation {
        ensure_runtime_import(&mut out, CANCELLATION_HELPER);
    }

    TransformedUnit {
        unit: out,
        candidate_names,
        errors,
    }
}
