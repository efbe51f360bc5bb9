use std::time::{Duration, Instant};

use anyhow::Result;
use crossbeam_channel::{select, tick, unbounded};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use wirec_codegen::{Engine, GenerationQueue};

const DEBOUNCE: Duration = Duration::from_millis(500);
const TICK: Duration = Duration::from_millis(100);

/// Watch mode: one initial pass, then a regeneration pass per burst of unit
/// changes. Triggers landing while a pass runs coalesce into one follow-up.
pub fn run(engine: Engine) -> Result<()> {
    let roots = engine.options().scan_roots.clone();

    run_pass(&engine);

    let queue = GenerationQueue::start(move || run_pass(&engine));

    let (tx, rx) = unbounded();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        Config::default(),
    )?;
    for root in &roots {
        watcher.watch(root, RecursiveMode::Recursive)?;
        println!("👀 watching {}", root.display());
    }

    let ticker = tick(TICK);
    let mut pending_since: Option<Instant> = None;
    loop {
        select! {
            recv(rx) -> event => {
                let Ok(event) = event else { break };
                if is_relevant(&event) {
                    tracing::debug!(paths = ?event.paths, "unit change detected");
                    pending_since = Some(Instant::now());
                }
            }
            recv(ticker) -> _ => {
                if pending_since.is_some_and(|at| at.elapsed() >= DEBOUNCE) {
                    pending_since = None;
                    queue.trigger();
                }
            }
        }
    }

    queue.shutdown();
    Ok(())
}

fn run_pass(engine: &Engine) {
    match engine.run() {
        Ok(report) if report.reused => {
            println!("✅ {} up to date", report.fingerprint);
        }
        Ok(report) => {
            println!(
                "✅ regenerated {} ({} candidate(s))",
                report.fingerprint,
                report.transformed_candidates.len()
            );
        }
        Err(e) => {
            println!("❌ pass failed: {}", e);
        }
    }
}

/// Only unit files count; the bridge directory the generator writes into each
/// scan root must not re-trigger the pass it came from.
fn is_relevant(event: &Event) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    event.paths.iter().any(|path| {
        let path = path.to_string_lossy();
        path.ends_with(".unit.json") && !path.contains("/.wirec/")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn modify_event(path: &str) -> Event {
        let mut event = Event::new(EventKind::Modify(notify::event::ModifyKind::Any));
        event.paths.push(PathBuf::from(path));
        event
    }

    #[test]
    fn unit_changes_are_relevant() {
        assert!(is_relevant(&modify_event("/app/src/logger.unit.json")));
    }

    #[test]
    fn bridge_writes_do_not_retrigger() {
        assert!(!is_relevant(&modify_event("/app/src/.wirec/bridge.js")));
        assert!(!is_relevant(&modify_event("/app/src/readme.md")));
    }
}
