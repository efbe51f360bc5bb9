//! Serializes a validated registry into the artifact directory: the token
//! map, the factory module, the transformed units, and the stable bridge
//! files consuming code imports from.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use wirec_core::{RegistrationKind, ServiceRegistration, ServiceRegistry, ServiceScope};

use crate::artifacts::{DI_CONFIG_FILE, REGISTRY_FILE, TRANSFORMED_DIR};
use crate::error::CodegenError;
use crate::pipeline::TransformedUnit;
use crate::templates::{
    render_template, BRIDGE_README_TEMPLATE, BRIDGE_TEMPLATE, FACTORY_TEMPLATE, REGISTRY_TEMPLATE,
};
use crate::writer::CodeWriter;

pub const BRIDGE_DIR: &str = ".wirec";
pub const BRIDGE_FILE: &str = "bridge.js";
pub const BRIDGE_README: &str = "README.md";

/// One token's entry in the generated configuration map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub factory: String,
    pub scope: ServiceScope,
    pub dependencies: Vec<String>,
    pub interface_name: Option<String>,
    pub implementation_class: String,
    pub registration_type: RegistrationKind,
    pub is_class_based: bool,
    pub is_inheritance_based: bool,
    pub is_state_based: bool,
    pub base_class: Option<String>,
    pub state_type: Option<String>,
}

/// The full `di-config.json` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiConfig {
    pub project: String,
    pub generated_at: String,
    /// Token-keyed; BTreeMap so the serialized file is byte-stable
    pub entries: BTreeMap<String, ConfigEntry>,
    pub class_index: BTreeMap<String, String>,
    pub interface_index: BTreeMap<String, Vec<String>>,
}

/// Writes every artifact of one generation pass into a staging directory
pub struct Emitter {
    writer: CodeWriter,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            writer: CodeWriter::new(),
        }
    }

    pub fn build_config(&self, project: &str, registry: &ServiceRegistry) -> DiConfig {
        let mut entries = BTreeMap::new();
        for (token, registration) in registry.registrations() {
            let Some(record) = registry.implementations().get(token) else {
                continue;
            };
            entries.insert(
                token.clone(),
                ConfigEntry {
                    factory: registration.factory_name.clone(),
                    scope: registration.scope,
                    dependencies: registration.dependency_tokens.clone(),
                    interface_name: record.interface_name.clone(),
                    implementation_class: record.implementation_name.clone(),
                    registration_type: record.kind,
                    is_class_based: record.kind == RegistrationKind::Class,
                    is_inheritance_based: record.kind == RegistrationKind::Inheritance,
                    is_state_based: record.kind == RegistrationKind::State,
                    base_class: record.base_class_info.as_ref().map(|b| b.name.clone()),
                    state_type: (record.kind == RegistrationKind::State)
                        .then(|| record.token.clone()),
                },
            );
        }

        DiConfig {
            project: project.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            entries,
            class_index: registry.class_index().iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            interface_index: registry
                .interface_index()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn write_config(&self, dir: &Path, config: &DiConfig) -> Result<(), CodegenError> {
        let content = serde_json::to_string_pretty(config)?;
        self.writer.write_if_changed(&dir.join(DI_CONFIG_FILE), &content)?;
        Ok(())
    }

    /// The registry module: one factory per implementation class, in
    /// dependency order, plus the token map pointing at the factories.
    pub fn write_registry_module(
        &self,
        dir: &Path,
        project: &str,
        ordered: &[ServiceRegistration],
    ) -> Result<(), CodegenError> {
        let mut factories = Vec::new();
        for registration in ordered {
            // One factory per implementation; the class-token registration
            // carries it, the interface/inheritance/state ones alias it
            if registration.registration_kind != RegistrationKind::Class {
                continue;
            }
            let class = registration
                .factory_name
                .strip_prefix("create")
                .unwrap_or(&registration.factory_name);
            let args = registration
                .dependency_tokens
                .iter()
                .map(|t| format!("container.resolve(\"{}\")", t))
                .collect::<Vec<_>>()
                .join(", ");

            let mut context = HashMap::new();
            context.insert("factory", registration.factory_name.clone());
            context.insert("class", class.to_string());
            context.insert("args", args);
            factories.push(render_template(FACTORY_TEMPLATE, &context)?);
        }

        let entries = ordered
            .iter()
            .map(|r| {
                format!(
                    "  \"{}\": {{ factory: {}, scope: \"{}\", dependencies: [{}] }},",
                    r.token,
                    r.factory_name,
                    scope_str(r.scope),
                    r.dependency_tokens
                        .iter()
                        .map(|t| format!("\"{}\"", t))
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut context = HashMap::new();
        context.insert("project", project.to_string());
        context.insert("generated_at", Utc::now().to_rfc3339());
        context.insert("factories", factories.join("\n\n"));
        context.insert("entries", entries);

        let content = render_template(REGISTRY_TEMPLATE, &context)?;
        self.writer.write_if_changed(&dir.join(REGISTRY_FILE), &content)?;
        Ok(())
    }

    /// Transformed units land under `transformed/`, keyed by file name
    pub fn write_transformed(
        &self,
        dir: &Path,
        units: &[TransformedUnit],
    ) -> Result<(), CodegenError> {
        let transformed_dir = dir.join(TRANSFORMED_DIR);
        std::fs::create_dir_all(&transformed_dir)?;
        for unit in units {
            let file_name = Path::new(&unit.unit.path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unit.json".to_string());
            let content = serde_json::to_string_pretty(&unit.unit)?;
            self.writer
                .write_if_changed(&transformed_dir.join(file_name), &content)?;
        }
        Ok(())
    }

    /// Bridge files live at a fixed path inside each scan root, so consuming
    /// code imports the same path no matter which fingerprint is current.
    pub fn write_bridges(
        &self,
        scan_roots: &[PathBuf],
        configs_root: &Path,
        artifact_dir: &Path,
    ) -> Result<(), CodegenError> {
        let registry_path = artifact_dir.join(REGISTRY_FILE);
        let mut context = HashMap::new();
        context.insert("artifact_dir", artifact_dir.display().to_string());
        context.insert(
            "registry_path",
            registry_path.display().to_string().replace('\\', "/"),
        );
        let bridge = render_template(BRIDGE_TEMPLATE, &context)?;

        let mut readme_context = HashMap::new();
        readme_context.insert("artifact_dir", artifact_dir.display().to_string());
        readme_context.insert("configs_root", configs_root.display().to_string());
        let readme = render_template(BRIDGE_README_TEMPLATE, &readme_context)?;

        for root in scan_roots {
            let bridge_dir = root.join(BRIDGE_DIR);
            self.writer
                .write_if_changed(&bridge_dir.join(BRIDGE_FILE), &bridge)?;
            self.writer
                .write_if_changed(&bridge_dir.join(BRIDGE_README), &readme)?;
        }
        Ok(())
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

fn scope_str(scope: ServiceScope) -> &'static str {
    match scope {
        ServiceScope::Singleton => "singleton",
        ServiceScope::Transient => "transient",
        ServiceScope::Scoped => "scoped",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirec_core::ast::{Annotation, ClassDecl, Declaration, SourceUnit};
    use wirec_core::{DependencySpec, ImplementationScanner, ScannerConfig};

    fn registry() -> ServiceRegistry {
        let units: Vec<SourceUnit> = ["ConsoleLogger", "RestApiService"]
            .iter()
            .map(|name| SourceUnit {
                path: format!("src/{}.unit.json", name.to_lowercase()),
                imports: vec![],
                declarations: vec![Declaration::Class(ClassDecl {
                    name: (*name).into(),
                    annotations: vec![Annotation::new("service")],
                    implements: if *name == "ConsoleLogger" {
                        vec!["LoggerInterface".into()]
                    } else {
                        vec![]
                    },
                    extends: None,
                    type_params: vec![],
                    constructor_params: vec![],
                    state_type: None,
                    methods: vec![],
                })],
            })
            .collect();
        let scanned = ImplementationScanner::new(ScannerConfig::default()).scan(&units);

        let mut registry = ServiceRegistry::new();
        for s in &scanned {
            let deps = if s.class.name == "RestApiService" {
                vec![DependencySpec {
                    owner_name: "RestApiService".into(),
                    param_or_property: "logger".into(),
                    requested_type: "LoggerInterface".into(),
                    token: "LoggerInterface".into(),
                    optional: false,
                    property_path: vec!["logger".into()],
                }]
            } else {
                vec![]
            };
            registry.register(s, deps);
        }
        registry.link();
        registry.validate();
        registry
    }

    #[test]
    fn config_entries_carry_registration_metadata() {
        let registry = registry();
        let config = Emitter::new().build_config("shop", &registry);

        let iface = &config.entries["LoggerInterface"];
        assert_eq!(iface.factory, "createConsoleLogger");
        assert_eq!(iface.implementation_class, "ConsoleLogger");
        assert_eq!(iface.registration_type, RegistrationKind::Interface);
        assert!(!iface.is_class_based);

        let class = &config.entries["ConsoleLogger"];
        assert!(class.is_class_based);
        assert_eq!(
            config.interface_index["LoggerInterface"],
            vec!["ConsoleLogger".to_string()]
        );
        assert_eq!(config.class_index["ConsoleLogger"], "ConsoleLogger");

        let api = &config.entries["RestApiService"];
        assert_eq!(api.dependencies, vec!["ConsoleLogger".to_string()]);
    }

    #[test]
    fn registry_module_has_one_factory_per_implementation() {
        let mut registry = registry();
        let ordered: Vec<ServiceRegistration> = registry
            .topological_order()
            .unwrap()
            .into_iter()
            .cloned()
            .collect();

        let dir = tempfile::tempdir().unwrap();
        Emitter::new()
            .write_registry_module(dir.path(), "shop", &ordered)
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join(REGISTRY_FILE)).unwrap();
        assert_eq!(content.matches("export function createConsoleLogger").count(), 1);
        assert_eq!(content.matches("export function createRestApiService").count(), 1);
        // Dependencies come before dependents
        assert!(
            content.find("createConsoleLogger").unwrap()
                < content.find("createRestApiService").unwrap()
        );
        // Interface token aliases the class factory in the map
        assert!(content.contains("\"LoggerInterface\": { factory: createConsoleLogger"));
        assert!(content.contains("container.resolve(\"ConsoleLogger\")"));
    }

    #[test]
    fn bridges_are_written_into_each_scan_root() {
        let root_a = tempfile::tempdir().unwrap();
        let root_b = tempfile::tempdir().unwrap();
        let artifact = tempfile::tempdir().unwrap();

        Emitter::new()
            .write_bridges(
                &[root_a.path().to_path_buf(), root_b.path().to_path_buf()],
                artifact.path().parent().unwrap(),
                artifact.path(),
            )
            .unwrap();

        for root in [root_a.path(), root_b.path()] {
            let bridge = root.join(BRIDGE_DIR).join(BRIDGE_FILE);
            let content = std::fs::read_to_string(bridge).unwrap();
            assert!(content.contains(REGISTRY_FILE));
            assert!(root.join(BRIDGE_DIR).join(BRIDGE_README).is_file());
        }
    }
}
