//! Step 2: generate access-with-fallback injection statements.

use wirec_core::ast::{BindingElement, Expr, Stmt};
use wirec_core::{Resolution, ResolvedDependency};

use super::imports::RESOLVE_HELPER;

/// One generated injection: the flat local name, the property path it
/// replaces, and the statement that binds it
#[derive(Debug, Clone)]
pub struct Injection {
    pub flat_name: String,
    pub path: Vec<String>,
    pub stmt: Stmt,
}

/// Emit one `const <name> = <chain> ?? <fallback>` per dependency.
///
/// A resolved dependency falls back to a container resolve call; an
/// unresolved optional one to `undefined`; an unresolved required one is a
/// bare resolve call that throws at the point of use, never a silent absence.
pub fn injection_statements(
    param_name: &str,
    original: Option<&[BindingElement]>,
    deps: &[ResolvedDependency],
) -> Vec<Injection> {
    deps.iter()
        .map(|dep| {
            let flat_name = original
                .and_then(|elements| bound_name_for_path(elements, &dep.spec.property_path))
                .unwrap_or_else(|| {
                    dep.spec
                        .property_path
                        .last()
                        .cloned()
                        .unwrap_or_else(|| dep.spec.param_or_property.clone())
                });

            let chain = access_chain(param_name, &dep.spec.property_path);
            let init = match &dep.resolution {
                Resolution::Resolved { token } => Expr::nullish(chain, resolve_call(token)),
                Resolution::OptionalMissing => Expr::nullish(chain, Expr::Undefined),
                Resolution::RequiredMissing => resolve_call(&dep.spec.token),
            };

            Injection {
                flat_name: flat_name.clone(),
                path: dep.spec.property_path.clone(),
                stmt: Stmt::Const {
                    name: flat_name,
                    init,
                },
            }
        })
        .collect()
}

/// `<param>?.<p1>?.<p2>` with optional chaining on every link
fn access_chain(param_name: &str, path: &[String]) -> Expr {
    let mut expr = Expr::ident(param_name);
    for segment in path {
        expr = Expr::member(expr, segment, true);
    }
    expr
}

fn resolve_call(token: &str) -> Expr {
    Expr::call(Expr::ident(RESOLVE_HELPER), vec![Expr::string(token)])
}

/// Follow `path` through the original destructuring pattern and return the
/// name it bound there, honoring aliases.
fn bound_name_for_path(elements: &[BindingElement], path: &[String]) -> Option<String> {
    let (head, rest) = path.split_first()?;
    let element = elements.iter().find(|e| &e.property == head)?;
    if rest.is_empty() {
        Some(element.bound_name().to_string())
    } else {
        bound_name_for_path(element.nested.as_deref()?, rest)
    }
}
