//! Pass orchestration: load, scan, resolve, validate, fingerprint, transform,
//! emit, publish. One pass at a time; watch mode funnels triggers through a
//! single-worker queue that coalesces requests arriving mid-pass.

use std::path::PathBuf;
use std::thread::JoinHandle;

use chrono::Utc;
use crossbeam_channel::{bounded, select, Sender};
use serde::Serialize;
use wirec_core::ast::{SourceUnit, TypeIndex, UnitLoader};
use wirec_core::{
    DependencyExtractor, DiagnosticReport, ImplementationScanner, MarkerExtractor, ScannerConfig,
    ServiceRegistration, ServiceRegistry, ValidationReport,
};

use crate::artifacts::{ArtifactStore, ConfigMeta};
use crate::emit::Emitter;
use crate::error::CodegenError;
use crate::fingerprint::Fingerprint;
use crate::options::EffectiveOptions;
use crate::pipeline::{transform_unit, TransformedUnit};

/// Everything the resolution phase produces, before any artifact touches disk
pub struct Analysis {
    pub units: Vec<SourceUnit>,
    pub registry: ServiceRegistry,
    pub validation: ValidationReport,
    pub diagnostics: DiagnosticReport,
    /// Units that failed to parse and were skipped by the loader
    pub skipped_units: usize,
}

/// Outcome of one generation pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub fingerprint: String,
    pub artifact_dir: PathBuf,
    /// True when a complete artifact directory for this fingerprint already
    /// existed and generation was skipped
    pub reused: bool,
    pub diagnostics: DiagnosticReport,
    pub transformed_candidates: Vec<String>,
    /// Per-candidate transformation failures; never fatal for the pass
    pub candidate_errors: Vec<(String, String)>,
    pub skipped_units: usize,
}

pub struct Engine {
    options: EffectiveOptions,
}

impl Engine {
    pub fn new(options: EffectiveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EffectiveOptions {
        &self.options
    }

    /// Run the resolution phase only. Validation failures land in the
    /// returned report rather than aborting, so diagnostic consumers see the
    /// full picture.
    pub fn analyze(&self) -> Result<Analysis, CodegenError> {
        let mut loader = UnitLoader::new(&self.options.scan_roots)?;
        let units = loader.load_all()?;
        let skipped_units = loader.skipped().len();

        let index = TypeIndex::build(&units);
        let markers = MarkerExtractor::new(&index, self.options.marker_strategy()?);
        let extractor = DependencyExtractor::new(&markers);

        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let mut registry = ServiceRegistry::new();
        for scanned in scanner.scan(&units) {
            let deps = extractor.for_class(&scanned.class);
            registry.register(&scanned, deps);
        }
        registry.link();

        let validation = registry.validate();
        let diagnostics = DiagnosticReport::build(&registry, &validation);
        tracing::info!(
            services = diagnostics.total_services,
            valid = diagnostics.is_valid,
            skipped_units,
            "analysis complete"
        );

        Ok(Analysis {
            units,
            registry,
            validation,
            diagnostics,
            skipped_units,
        })
    }

    /// One full generation pass. Validation errors abort before any artifact
    /// is written; transformation errors are recorded per candidate.
    pub fn run(&self) -> Result<PassReport, CodegenError> {
        let mut analysis = self.analyze()?;
        if !analysis.validation.is_valid {
            return Err(CodegenError::Validation {
                errors: analysis
                    .validation
                    .errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
            });
        }

        let fingerprint = Fingerprint::compute(&self.options)?;
        let name = fingerprint.directory_name();
        let mut store = ArtifactStore::new(&self.options.output_root, self.options.retention);

        if self.options.force_regenerate {
            store.force_remove(&name)?;
        } else if self.options.reuse && store.is_reusable(&name) {
            tracing::info!(fingerprint = %fingerprint.hash, "reusing existing artifacts");
            // Bridges are rewritten on every pass, reusing or not, so a
            // deleted bridge file comes back without a fingerprint change
            let artifact_dir = store.dir_path(&name);
            Emitter::new().write_bridges(
                &self.options.scan_roots,
                store.configs_root(),
                &artifact_dir,
            )?;
            return Ok(PassReport {
                fingerprint: fingerprint.hash,
                artifact_dir,
                reused: true,
                diagnostics: analysis.diagnostics,
                transformed_candidates: Vec::new(),
                candidate_errors: Vec::new(),
                skipped_units: analysis.skipped_units,
            });
        }

        // Transform a snapshot of every unit; the loaded tree stays pristine
        let index = TypeIndex::build(&analysis.units);
        let markers = MarkerExtractor::new(&index, self.options.marker_strategy()?);
        let extractor = DependencyExtractor::new(&markers);
        let transformed: Vec<TransformedUnit> = analysis
            .units
            .iter()
            .map(|unit| transform_unit(unit, &analysis.registry, &extractor))
            .collect();

        let mut candidates = Vec::new();
        let mut candidate_errors = Vec::new();
        for unit in &transformed {
            candidates.extend(unit.candidate_names.iter().cloned());
            candidate_errors.extend(unit.errors.iter().cloned());
        }

        let staging = store.staging_path(&name);
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;

        let emitter = Emitter::new();
        let config = emitter.build_config(&self.options.project, &analysis.registry);
        emitter.write_config(&staging, &config)?;

        let ordered: Vec<ServiceRegistration> = analysis
            .registry
            .topological_order()?
            .into_iter()
            .cloned()
            .collect();
        emitter.write_registry_module(&staging, &self.options.project, &ordered)?;
        emitter.write_transformed(&staging, &transformed)?;

        store.write_meta(
            &staging,
            &ConfigMeta {
                hash: fingerprint.hash.clone(),
                hash_inputs: fingerprint.inputs.clone(),
                generated_at: Utc::now(),
                effective_options: self.options.clone(),
            },
        )?;

        let artifact_dir = store.publish(&name, &staging)?;
        store.apply_retention(&self.options.project)?;
        emitter.write_bridges(&self.options.scan_roots, store.configs_root(), &artifact_dir)?;

        tracing::info!(
            fingerprint = %fingerprint.hash,
            candidates = candidates.len(),
            dir = %artifact_dir.display(),
            "generation pass published"
        );

        Ok(PassReport {
            fingerprint: fingerprint.hash,
            artifact_dir,
            reused: false,
            diagnostics: analysis.diagnostics,
            transformed_candidates: candidates,
            candidate_errors,
            skipped_units: analysis.skipped_units,
        })
    }
}

/// Single-worker generation queue.
///
/// Triggers arriving while a pass runs coalesce into exactly one follow-up
/// pass: the trigger channel holds a single slot and `try_send` drops the
/// rest on the floor, which is correct because one pass picks up every change
/// made before it started.
pub struct GenerationQueue {
    trigger_tx: Sender<()>,
    shutdown_tx: Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl GenerationQueue {
    pub fn start<F>(mut job: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (trigger_tx, trigger_rx) = bounded::<()>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let worker = std::thread::spawn(move || loop {
            select! {
                recv(trigger_rx) -> msg => {
                    if msg.is_err() {
                        break;
                    }
                    job();
                }
                recv(shutdown_rx) -> _ => break,
            }
        });

        Self {
            trigger_tx,
            shutdown_tx,
            worker: Some(worker),
        }
    }

    /// Request a pass. A full slot means one is already queued behind the
    /// active pass, and this request folds into it.
    pub fn trigger(&self) {
        let _ = self.trigger_tx.try_send(());
    }

    pub fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wirec_core::ast::{
        Annotation, Binding, ClassDecl, Declaration, FunctionDecl, Param, PropertySig, TypeExpr,
    };
    use wirec_core::ast::{Expr, Stmt};

    fn write_unit(dir: &std::path::Path, name: &str, unit: &SourceUnit) {
        std::fs::write(
            dir.join(name),
            serde_json::to_string_pretty(unit).unwrap(),
        )
        .unwrap();
    }

    fn service_unit(name: &str, implements: &[&str]) -> SourceUnit {
        SourceUnit {
            path: String::new(),
            imports: vec![],
            declarations: vec![Declaration::Class(ClassDecl {
                name: name.into(),
                annotations: vec![Annotation::new("service")],
                implements: implements.iter().map(|s| s.to_string()).collect(),
                extends: None,
                type_params: vec![],
                constructor_params: vec![],
                state_type: None,
                methods: vec![],
            })],
        }
    }

    fn dashboard_unit() -> SourceUnit {
        SourceUnit {
            path: String::new(),
            imports: vec![],
            declarations: vec![Declaration::Function(FunctionDecl {
                name: "Dashboard".into(),
                params: vec![Param {
                    binding: Binding::Name {
                        name: "props".into(),
                    },
                    ty: TypeExpr::Shape {
                        properties: vec![PropertySig {
                            name: "logger".into(),
                            ty: TypeExpr::inject(TypeExpr::named("LoggerInterface")),
                            optional: false,
                        }],
                    },
                }],
                body: vec![Stmt::Return {
                    expr: Some(Expr::member(Expr::ident("props"), "logger", false)),
                }],
            })],
        }
    }

    fn engine_for(src: &std::path::Path, out: &std::path::Path) -> Engine {
        Engine::new(EffectiveOptions::new(
            "shop",
            vec![src.to_path_buf()],
            out.to_path_buf(),
        ))
    }

    #[test]
    fn full_pass_publishes_artifacts_and_bridges() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_unit(src.path(), "logger.unit.json", &service_unit("ConsoleLogger", &["LoggerInterface"]));
        write_unit(src.path(), "dashboard.unit.json", &dashboard_unit());

        let report = engine_for(src.path(), out.path()).run().unwrap();
        assert!(!report.reused);
        assert_eq!(report.transformed_candidates, vec!["Dashboard".to_string()]);
        assert!(report.candidate_errors.is_empty());

        assert!(report.artifact_dir.join("di-config.json").is_file());
        assert!(report.artifact_dir.join("AutoGeneratedRegistry.js").is_file());
        assert!(report.artifact_dir.join("transformed").is_dir());
        assert!(src.path().join(".wirec/bridge.js").is_file());
    }

    #[test]
    fn second_pass_reuses_matching_fingerprint() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_unit(src.path(), "logger.unit.json", &service_unit("ConsoleLogger", &["LoggerInterface"]));

        let engine = engine_for(src.path(), out.path());
        let first = engine.run().unwrap();
        let second = engine.run().unwrap();
        assert!(!first.reused);
        assert!(second.reused);
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(first.artifact_dir, second.artifact_dir);
    }

    #[test]
    fn reusing_pass_restores_deleted_bridges() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_unit(src.path(), "logger.unit.json", &service_unit("ConsoleLogger", &["LoggerInterface"]));

        let engine = engine_for(src.path(), out.path());
        engine.run().unwrap();
        std::fs::remove_dir_all(src.path().join(".wirec")).unwrap();

        let second = engine.run().unwrap();
        assert!(second.reused);
        assert!(src.path().join(".wirec/bridge.js").is_file());
    }

    #[test]
    fn force_regenerate_rebuilds_despite_match() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_unit(src.path(), "logger.unit.json", &service_unit("ConsoleLogger", &["LoggerInterface"]));

        let engine = engine_for(src.path(), out.path());
        engine.run().unwrap();

        let mut options = engine.options().clone();
        options.force_regenerate = true;
        let forced = Engine::new(options).run().unwrap();
        assert!(!forced.reused);
    }

    #[test]
    fn validation_errors_abort_before_any_artifact() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        // RestApiService requires a logger nobody implements
        let mut service = service_unit("RestApiService", &[]);
        let Declaration::Class(class) = &mut service.declarations[0] else {
            unreachable!()
        };
        class.constructor_params.push(Param {
            binding: Binding::Name {
                name: "logger".into(),
            },
            ty: TypeExpr::inject(TypeExpr::named("LoggerInterface")),
        });
        write_unit(src.path(), "service.unit.json", &service);

        let err = engine_for(src.path(), out.path()).run().unwrap_err();
        assert!(matches!(err, CodegenError::Validation { .. }));
        assert!(!out.path().join("configs").exists());
    }

    #[test]
    fn analyze_reports_instead_of_aborting() {
        let src = tempfile::tempdir().unwrap();
        let mut service = service_unit("RestApiService", &[]);
        let Declaration::Class(class) = &mut service.declarations[0] else {
            unreachable!()
        };
        class.constructor_params.push(Param {
            binding: Binding::Name {
                name: "logger".into(),
            },
            ty: TypeExpr::inject(TypeExpr::named("LoggerInterface")),
        });
        write_unit(src.path(), "service.unit.json", &service);

        let engine = Engine::new(EffectiveOptions::new(
            "shop",
            vec![src.path().to_path_buf()],
            std::env::temp_dir(),
        ));
        let analysis = engine.analyze().unwrap();
        assert!(!analysis.validation.is_valid);
        assert_eq!(analysis.diagnostics.missing_dependencies.len(), 1);
    }

    #[test]
    fn queue_coalesces_triggers_arriving_mid_pass() {
        let (started_tx, started_rx) = bounded::<()>(8);
        let (release_tx, release_rx) = bounded::<()>(8);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_in_job = Arc::clone(&runs);

        let queue = GenerationQueue::start(move || {
            started_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            runs_in_job.fetch_add(1, Ordering::SeqCst);
        });

        // First pass starts and blocks
        queue.trigger();
        started_rx.recv().unwrap();

        // Five triggers while the pass runs: one pending slot, rest folded
        for _ in 0..5 {
            queue.trigger();
        }

        // Finish pass one; the single follow-up starts
        release_tx.send(()).unwrap();
        started_rx.recv().unwrap();
        release_tx.send(()).unwrap();

        queue.shutdown();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
