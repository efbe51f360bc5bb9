use anyhow::Result;
use wirec_codegen::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphFormat {
    Dot,
    Json,
}

/// Dump the dependency graph as DOT or a JSON adjacency map
pub fn run(engine: &Engine, format: GraphFormat) -> Result<()> {
    let analysis = engine.analyze()?;
    let adjacency = analysis.registry.graph().adjacency();

    match format {
        GraphFormat::Json => {
            println!("{}", serde_json::to_string_pretty(adjacency)?);
        }
        GraphFormat::Dot => {
            println!("digraph {} {{", sanitize_dot_id(&engine.options().project));
            println!("  rankdir=LR;");
            for node in adjacency.keys() {
                println!("  \"{}\";", node);
            }
            for (from, deps) in adjacency {
                for to in deps {
                    println!("  \"{}\" -> \"{}\";", from, to);
                }
            }
            println!("}}");
        }
    }
    Ok(())
}

fn sanitize_dot_id(name: &str) -> String {
    let id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if id.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("_{}", id)
    } else {
        id
    }
}
