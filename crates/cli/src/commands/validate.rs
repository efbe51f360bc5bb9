use anyhow::Result;
use wirec_codegen::Engine;

/// Validate the registry. Returns false when validation errors exist so the
/// caller can set a non-zero exit code.
pub fn run(engine: &Engine, json: bool) -> Result<bool> {
    let analysis = engine.analyze()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis.validation)?);
        return Ok(analysis.validation.is_valid);
    }

    for error in &analysis.validation.errors {
        println!("error: {}", error);
    }
    for warning in &analysis.validation.warnings {
        println!("warning: {}", warning);
    }

    if analysis.validation.is_valid {
        println!(
            "✅ {} service(s) validated",
            analysis.diagnostics.total_services
        );
    } else {
        println!(
            "❌ validation failed with {} error(s)",
            analysis.validation.errors.len()
        );
    }
    Ok(analysis.validation.is_valid)
}
