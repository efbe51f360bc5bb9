//! Step 5: optional lifecycle wiring.
//!
//! Dependencies whose implementation exposes mount/unmount callbacks get one
//! combined effect block. With more than one disposal, a single cancellation
//! token is shared so one signal tears everything down.

use wirec_core::ast::{Expr, Stmt};
use wirec_core::{Resolution, ResolvedDependency, ServiceRegistry};

use super::imports::CANCELLATION_HELPER;
use super::inject::Injection;

const CANCELLATION_NAME: &str = "lifecycleCancellation";

/// Flat names of injected dependencies that need lifecycle wiring
pub fn lifecycle_dependencies(
    injections: &[Injection],
    deps: &[ResolvedDependency],
    registry: &ServiceRegistry,
) -> Vec<String> {
    deps.iter()
        .filter_map(|dep| {
            let Resolution::Resolved { token } = &dep.resolution else {
                return None;
            };
            if !registry.resolve(token).is_some_and(|r| r.has_lifecycle) {
                return None;
            }
            injections
                .iter()
                .find(|i| i.path == dep.spec.property_path)
                .map(|i| i.flat_name.clone())
        })
        .collect()
}

/// One effect block mounting every dependency and returning a cleanup that
/// unmounts them all
pub fn build_effect(names: &[String]) -> Stmt {
    let shared_token = names.len() > 1;
    let mut body = Vec::new();
    let mut cleanup = Vec::new();

    if shared_token {
        body.push(Stmt::Const {
            name: CANCELLATION_NAME.into(),
            init: Expr::call(Expr::ident(CANCELLATION_HELPER), vec![]),
        });
        cleanup.push(Stmt::Expr {
            expr: Expr::call(
                Expr::member(Expr::ident(CANCELLATION_NAME), "cancel", false),
                vec![],
            ),
        });
    }

    for name in names {
        let args = if shared_token {
            vec![Expr::ident(CANCELLATION_NAME)]
        } else {
            vec![]
        };
        body.push(Stmt::Expr {
            expr: Expr::call(
                Expr::member(Expr::ident(name), "mount", false),
                args.clone(),
            ),
        });
        cleanup.push(Stmt::Expr {
            expr: Expr::call(Expr::member(Expr::ident(name), "unmount", false), args),
        });
    }

    Stmt::Effect { body, cleanup }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_dependency_gets_plain_mount_unmount() {
        let Stmt::Effect { body, cleanup } = build_effect(&names(&["logger"])) else {
            panic!("expected effect");
        };
        assert_eq!(body.len(), 1);
        assert_eq!(cleanup.len(), 1);
        let Stmt::Expr { expr } = &body[0] else { panic!() };
        let Expr::Call { callee, args } = expr else { panic!() };
        assert!(args.is_empty());
        let (root, path) = callee.as_member_chain().unwrap();
        assert_eq!(root, "logger");
        assert_eq!(path, vec!["mount".to_string()]);
    }

    #[test]
    fn multiple_disposals_share_one_cancellation_token() {
        let Stmt::Effect { body, cleanup } = build_effect(&names(&["logger", "metrics"])) else {
            panic!("expected effect");
        };
        // Token const + two mounts
        assert_eq!(body.len(), 3);
        let Stmt::Const { name, init } = &body[0] else { panic!() };
        assert_eq!(name, CANCELLATION_NAME);
        assert_eq!(
            *init,
            Expr::call(Expr::ident(CANCELLATION_HELPER), vec![])
        );

        // Cancel first, then both unmounts, all with the shared token
        assert_eq!(cleanup.len(), 3);
        let Stmt::Expr { expr } = &cleanup[0] else { panic!() };
        let Expr::Call { callee, .. } = expr else { panic!() };
        let (root, path) = callee.as_member_chain().unwrap();
        assert_eq!(root, CANCELLATION_NAME);
        assert_eq!(path, vec!["cancel".to_string()]);

        for stmt in &cleanup[1..] {
            let Stmt::Expr { expr } = stmt else { panic!() };
            let Expr::Call { args, .. } = expr else { panic!() };
            assert_eq!(args, &vec![Expr::ident(CANCELLATION_NAME)]);
        }
    }
}
