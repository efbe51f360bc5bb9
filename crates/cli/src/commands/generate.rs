use anyhow::Result;
use wirec_codegen::Engine;

/// Run one full generation pass
pub fn run(engine: &Engine) -> Result<()> {
    let report = engine.run()?;

    if report.reused {
        println!(
            "✅ configuration {} unchanged, reusing {}",
            report.fingerprint,
            report.artifact_dir.display()
        );
        return Ok(());
    }

    println!(
        "✅ generated {} ({} service(s), {} candidate(s))",
        report.fingerprint,
        report.diagnostics.total_services,
        report.transformed_candidates.len()
    );
    println!("   Artifacts: {}", report.artifact_dir.display());

    for (candidate, message) in &report.candidate_errors {
        println!("⚠️  {} skipped: {}", candidate, message);
    }
    if report.skipped_units > 0 {
        println!("⚠️  {} malformed unit(s) skipped", report.skipped_units);
    }
    Ok(())
}
