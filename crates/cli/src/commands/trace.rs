use std::collections::HashSet;

use anyhow::{bail, Result};
use wirec_codegen::Engine;
use wirec_core::ServiceRegistry;

/// Print the dependency chain rooted at one token
pub fn run(engine: &Engine, token: &str) -> Result<()> {
    let analysis = engine.analyze()?;
    let registry = &analysis.registry;

    let Some(record) = registry.resolve(token) else {
        bail!("no registration for token '{}'", token);
    };

    println!("{} -> {}", token, record.implementation_name);
    let mut on_path = HashSet::new();
    on_path.insert(token.to_string());
    walk(registry, token, 1, &mut on_path);
    Ok(())
}

fn walk(registry: &ServiceRegistry, token: &str, depth: usize, on_path: &mut HashSet<String>) {
    let Some(registration) = registry.registration(token) else {
        return;
    };
    for dep in &registration.dependency_tokens {
        let indent = "  ".repeat(depth);
        if on_path.contains(dep) {
            println!("{}{} (cycle)", indent, dep);
            continue;
        }
        let implementation = registry
            .resolve(dep)
            .map(|r| r.implementation_name.as_str())
            .unwrap_or("<unresolved>");
        println!("{}{} -> {}", indent, dep, implementation);

        on_path.insert(dep.clone());
        walk(registry, dep, depth + 1, on_path);
        on_path.remove(dep);
    }
}
