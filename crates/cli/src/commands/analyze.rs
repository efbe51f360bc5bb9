use anyhow::Result;
use wirec_codegen::Engine;

/// Print the diagnostic report for the current configuration
pub fn run(engine: &Engine, json: bool) -> Result<()> {
    let analysis = engine.analyze()?;
    let report = &analysis.diagnostics;

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Project: {}", engine.options().project);
    println!("Services discovered: {}", report.total_services);
    println!(
        "Validation: {}",
        if report.is_valid { "ok" } else { "FAILED" }
    );
    if analysis.skipped_units > 0 {
        println!("Skipped units: {}", analysis.skipped_units);
    }

    if !report.missing_dependencies.is_empty() {
        println!("\nMissing dependencies:");
        for missing in &report.missing_dependencies {
            println!("  {} required by {}", missing.token, missing.owner);
        }
    }

    if !report.circular_dependencies.is_empty() {
        println!("\nCircular dependencies:");
        for cycle in &report.circular_dependencies {
            println!("  {}", cycle.join(" -> "));
        }
    }

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }

    println!("\nCoupling:");
    println!("  Longest dependency chain: {}", report.coupling_stats.max_depth);
    let mut hotspots: Vec<(&String, &usize)> = report.coupling_stats.fan_in.iter().collect();
    hotspots.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (token, fan_in) in hotspots.iter().take(5) {
        let fan_out = report.coupling_stats.fan_out.get(*token).unwrap_or(&0);
        println!("  {}  in={} out={}", token, fan_in, fan_out);
    }

    Ok(())
}
