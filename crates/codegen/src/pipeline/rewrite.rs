//! Step 3: rewrite pre-existing property-chain accesses to the flat names
//! introduced by injection. Done by AST node replacement, never by text
//! substitution, so unrelated occurrences survive.

use wirec_core::ast::{Expr, Stmt};

use super::inject::Injection;

pub fn rewrite_body(body: &mut [Stmt], param_name: &str, injections: &[Injection]) {
    for stmt in body {
        rewrite_stmt(stmt, param_name, injections);
    }
}

fn rewrite_stmt(stmt: &mut Stmt, param_name: &str, injections: &[Injection]) {
    match stmt {
        Stmt::Const { init, .. } => rewrite_expr(init, param_name, injections),
        Stmt::Binding { source, .. } => rewrite_expr(source, param_name, injections),
        Stmt::Expr { expr } => rewrite_expr(expr, param_name, injections),
        Stmt::Return { expr: Some(expr) } => rewrite_expr(expr, param_name, injections),
        Stmt::Return { expr: None } => {}
        Stmt::Effect { body, cleanup } => {
            rewrite_body(body, param_name, injections);
            rewrite_body(cleanup, param_name, injections);
        }
    }
}

fn rewrite_expr(expr: &mut Expr, param_name: &str, injections: &[Injection]) {
    if let Some((root, path)) = expr.as_member_chain() {
        if root == param_name && !path.is_empty() {
            // Longest matching injected path wins; trailing segments are
            // re-attached as plain member accesses
            let target = injections
                .iter()
                .filter(|i| !i.path.is_empty() && path.starts_with(i.path.as_slice()))
                .max_by_key(|i| i.path.len());
            if let Some(injection) = target {
                let mut replacement = Expr::ident(&injection.flat_name);
                for segment in &path[injection.path.len()..] {
                    replacement = Expr::member(replacement, segment, false);
                }
                *expr = replacement;
                return;
            }
        }
    }

    match expr {
        Expr::Member { object, .. } => rewrite_expr(object, param_name, injections),
        Expr::Call { callee, args } => {
            rewrite_expr(callee, param_name, injections);
            for arg in args {
                rewrite_expr(arg, param_name, injections);
            }
        }
        Expr::NullishCoalesce { lhs, rhs } => {
            rewrite_expr(lhs, param_name, injections);
            rewrite_expr(rhs, param_name, injections);
        }
        Expr::Ident { .. } | Expr::StringLit { .. } | Expr::Undefined => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injection(flat: &str, path: &[&str]) -> Injection {
        Injection {
            flat_name: flat.into(),
            path: path.iter().map(|s| s.to_string()).collect(),
            stmt: Stmt::Const {
                name: flat.into(),
                init: Expr::Undefined,
            },
        }
    }

    #[test]
    fn old_chain_is_rewritten_to_flat_name() {
        let mut body = vec![Stmt::Expr {
            expr: Expr::call(
                Expr::member(
                    Expr::member(Expr::ident("props"), "logger", false),
                    "info",
                    false,
                ),
                vec![Expr::string("hello")],
            ),
        }];
        rewrite_body(&mut body, "props", &[injection("logger", &["logger"])]);

        let Stmt::Expr { expr } = &body[0] else { panic!() };
        let Expr::Call { callee, .. } = expr else { panic!() };
        let (root, path) = callee.as_member_chain().unwrap();
        assert_eq!(root, "logger");
        assert_eq!(path, vec!["info".to_string()]);
    }

    #[test]
    fn unrelated_chains_survive_untouched() {
        let original = Expr::member(Expr::ident("props"), "title", false);
        let mut body = vec![Stmt::Expr {
            expr: original.clone(),
        }];
        rewrite_body(&mut body, "props", &[injection("logger", &["logger"])]);
        let Stmt::Expr { expr } = &body[0] else { panic!() };
        assert_eq!(*expr, original);
    }

    #[test]
    fn other_roots_are_not_rewritten() {
        let original = Expr::member(Expr::ident("state"), "logger", false);
        let mut body = vec![Stmt::Expr {
            expr: original.clone(),
        }];
        rewrite_body(&mut body, "props", &[injection("logger", &["logger"])]);
        let Stmt::Expr { expr } = &body[0] else { panic!() };
        assert_eq!(*expr, original);
    }

    #[test]
    fn longest_path_match_wins() {
        let mut body = vec![Stmt::Expr {
            expr: Expr::member(
                Expr::member(Expr::ident("props"), "services", false),
                "logger",
                false,
            ),
        }];
        let injections = vec![
            injection("services", &["services"]),
            injection("logger", &["services", "logger"]),
        ];
        rewrite_body(&mut body, "props", &injections);
        let Stmt::Expr { expr } = &body[0] else { panic!() };
        assert_eq!(*expr, Expr::ident("logger"));
    }

    #[test]
    fn rewrites_inside_nested_call_arguments() {
        let mut body = vec![Stmt::Return {
            expr: Some(Expr::call(
                Expr::ident("render"),
                vec![Expr::member(Expr::ident("props"), "logger", false)],
            )),
        }];
        rewrite_body(&mut body, "props", &[injection("logger", &["logger"])]);
        let Stmt::Return { expr: Some(expr) } = &body[0] else { panic!() };
        let Expr::Call { args, .. } = expr else { panic!() };
        assert_eq!(args[0], Expr::ident("logger"));
    }
}
