//! Diagnostic report consumed by the CLI and dashboard collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::{Resolution, ServiceRegistry, ValidationReport};

/// One unresolved required dependency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingDependency {
    pub owner: String,
    pub token: String,
}

/// Fan-in/fan-out per implementation token plus the longest chain
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouplingStats {
    pub fan_in: BTreeMap<String, usize>,
    pub fan_out: BTreeMap<String, usize>,
    pub max_depth: usize,
}

/// The engine's outward-facing validation summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub is_valid: bool,
    pub total_services: usize,
    pub missing_dependencies: Vec<MissingDependency>,
    pub circular_dependencies: Vec<Vec<String>>,
    pub coupling_stats: CouplingStats,
    pub warnings: Vec<String>,
}

impl DiagnosticReport {
    pub fn build(registry: &ServiceRegistry, validation: &ValidationReport) -> Self {
        let mut missing = Vec::new();
        let mut owners: Vec<_> = registry.links().iter().collect();
        owners.sort_by_key(|(token, _)| token.as_str());
        for (_, deps) in owners {
            for dep in deps {
                if dep.resolution == Resolution::RequiredMissing {
                    missing.push(MissingDependency {
                        owner: dep.spec.owner_name.clone(),
                        token: dep.spec.token.clone(),
                    });
                }
            }
        }

        let graph = registry.graph();
        let mut fan_in: BTreeMap<String, usize> = BTreeMap::new();
        let mut fan_out: BTreeMap<String, usize> = BTreeMap::new();
        for node in graph.nodes() {
            fan_in.entry(node.clone()).or_insert(0);
            let deps = graph.dependencies_of(node);
            fan_out.insert(node.clone(), deps.len());
            for dep in deps {
                *fan_in.entry(dep.clone()).or_insert(0) += 1;
            }
        }

        Self {
            is_valid: validation.is_valid,
            total_services: registry.implementation_count(),
            missing_dependencies: missing,
            circular_dependencies: graph.detect_cycles(),
            coupling_stats: CouplingStats {
                fan_in,
                fan_out,
                max_depth: graph.max_depth(),
            },
            warnings: validation.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Annotation, ClassDecl, Declaration, SourceUnit};
    use crate::deps::DependencySpec;
    use crate::scan::{ImplementationScanner, ScannerConfig};

    fn registry_with_missing_optional() -> ServiceRegistry {
        let class = ClassDecl {
            name: "RestApiService".into(),
            annotations: vec![Annotation::new("service")],
            implements: vec![],
            extends: None,
            type_params: vec![],
            constructor_params: vec![],
            state_type: None,
            methods: vec![],
        };
        let logger = ClassDecl {
            name: "ConsoleLogger".into(),
            annotations: vec![Annotation::new("service")],
            implements: vec!["LoggerInterface".into()],
            extends: None,
            type_params: vec![],
            constructor_params: vec![],
            state_type: None,
            methods: vec![],
        };
        let unit = SourceUnit {
            path: "src/app.unit.json".into(),
            imports: vec![],
            declarations: vec![Declaration::Class(logger), Declaration::Class(class)],
        };
        let scanned = ImplementationScanner::new(ScannerConfig::default()).scan(&[unit]);

        let mut registry = ServiceRegistry::new();
        registry.register(&scanned[0], vec![]);
        registry.register(
            &scanned[1],
            vec![
                DependencySpec {
                    owner_name: "RestApiService".into(),
                    param_or_property: "logger".into(),
                    requested_type: "LoggerInterface".into(),
                    token: "LoggerInterface".into(),
                    optional: false,
                    property_path: vec!["logger".into()],
                },
                DependencySpec {
                    owner_name: "RestApiService".into(),
                    param_or_property: "metrics".into(),
                    requested_type: "MetricsInterface".into(),
                    token: "MetricsInterface".into(),
                    optional: true,
                    property_path: vec!["metrics".into()],
                },
            ],
        );
        registry.link();
        registry
    }

    #[test]
    fn optional_missing_does_not_appear_in_report() {
        let mut registry = registry_with_missing_optional();
        let validation = registry.validate();
        let report = DiagnosticReport::build(&registry, &validation);

        assert!(report.is_valid);
        assert!(report.missing_dependencies.is_empty());
        assert_eq!(report.total_services, 2);
        assert!(report.circular_dependencies.is_empty());
        assert_eq!(report.coupling_stats.fan_in["ConsoleLogger"], 1);
        assert_eq!(report.coupling_stats.fan_out["RestApiService"], 1);
        assert_eq!(report.coupling_stats.max_depth, 2);
    }

    #[test]
    fn report_serializes_to_json() {
        let mut registry = registry_with_missing_optional();
        let validation = registry.validate();
        let report = DiagnosticReport::build(&registry, &validation);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["totalServices"], 2);
    }
}
