//! Implementation scanning: one walk over every loaded declaration per pass,
//! classifying each annotated service by every token it can be requested
//! under.

use std::collections::HashMap;

use crate::ast::{ClassDecl, Declaration, SourceUnit};
use crate::registry::registration::{
    sanitize_token, ImplementationRecord, RegistrationKind, ServiceScope,
};

/// Annotations that mark a class as a service
const SERVICE_ANNOTATIONS: &[&str] = &["service", "injectable", "component"];

/// One annotated class and all tokens it is addressable by
#[derive(Debug, Clone)]
pub struct ScannedImplementation {
    pub class: ClassDecl,
    pub file_path: String,
    pub scope: ServiceScope,
    pub records: Vec<ImplementationRecord>,
}

impl ScannedImplementation {
    /// The class token is always present and serves as the canonical key
    pub fn class_token(&self) -> &str {
        self.records
            .iter()
            .find(|r| r.kind == RegistrationKind::Class)
            .map(|r| r.token.as_str())
            .expect("scanner always emits a class token")
    }
}

/// Scanner configuration: which base classes yield inheritance tokens
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub recognized_bases: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            recognized_bases: ["EntityRepository", "BaseService", "StoreProvider"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Walks all source declarations and classifies annotated services
pub struct ImplementationScanner {
    config: ScannerConfig,
}

impl ImplementationScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Scan every unit. Declarations with no recognized annotation are
    /// skipped silently.
    pub fn scan(&self, units: &[SourceUnit]) -> Vec<ScannedImplementation> {
        let mut found = Vec::new();
        let mut tokens = TokenAllocator::default();
        for unit in units {
            for decl in &unit.declarations {
                let Declaration::Class(class) = decl else {
                    continue;
                };
                match self.classify(class, &unit.path, &mut tokens) {
                    Some(scanned) => found.push(scanned),
                    None => {
                        tracing::debug!(class = %class.name, "no service annotation, skipping");
                    }
                }
            }
        }
        tracing::info!(implementations = found.len(), "scan pass complete");
        found
    }

    fn classify(
        &self,
        class: &ClassDecl,
        file_path: &str,
        tokens: &mut TokenAllocator,
    ) -> Option<ScannedImplementation> {
        let annotation = SERVICE_ANNOTATIONS
            .iter()
            .find_map(|name| class.annotation(name))?;
        let scope = annotation
            .args
            .first()
            .map(|arg| ServiceScope::parse(arg))
            .unwrap_or_default();

        let mut records = Vec::new();

        // Class token first: it is the fallback addressable key
        records.push(self.record(class, file_path, &class.name, RegistrationKind::Class, None, tokens));

        for iface in &class.implements {
            records.push(self.record(
                class,
                file_path,
                iface,
                RegistrationKind::Interface,
                Some(iface.clone()),
                tokens,
            ));
        }

        if let Some(base) = &class.extends {
            if self.config.recognized_bases.iter().any(|b| b == &base.name) {
                let args: Vec<String> = base.type_args.iter().map(|t| t.display_name()).collect();
                let raw = if args.is_empty() {
                    base.name.clone()
                } else {
                    format!("{}<{}>", base.name, args.join(", "))
                };
                let mut record =
                    self.record(class, file_path, &raw, RegistrationKind::Inheritance, None, tokens);
                record.base_class_info = Some(base.clone());
                record.inheritance_chain = vec![class.name.clone(), base.name.clone()];
                records.push(record);
            }
        }

        if let Some(state) = &class.state_type {
            records.push(self.record(
                class,
                file_path,
                &state.display_name(),
                RegistrationKind::State,
                None,
                tokens,
            ));
        }

        Some(ScannedImplementation {
            class: class.clone(),
            file_path: file_path.to_string(),
            scope,
            records,
        })
    }

    fn record(
        &self,
        class: &ClassDecl,
        file_path: &str,
        raw_token: &str,
        kind: RegistrationKind,
        interface_name: Option<String>,
        tokens: &mut TokenAllocator,
    ) -> ImplementationRecord {
        ImplementationRecord {
            token: tokens.allocate(raw_token),
            interface_name,
            implementation_name: class.name.clone(),
            file_path: file_path.to_string(),
            kind,
            is_generic: !class.type_params.is_empty(),
            type_parameters: class.type_params.clone(),
            base_class_info: None,
            inheritance_chain: Vec::new(),
            has_lifecycle: class.has_lifecycle(),
        }
    }
}

/// Per-pass token allocation. The same written name always yields the same
/// token (interface sharing and last-wins ambiguity depend on that); two
/// different written names whose sanitized forms collide get numeric
/// suffixes so they stay distinct.
#[derive(Debug, Default)]
struct TokenAllocator {
    /// written name -> allocated token
    assigned: HashMap<String, String>,
    /// allocated token -> written name that owns it
    owners: HashMap<String, String>,
}

impl TokenAllocator {
    fn allocate(&mut self, raw: &str) -> String {
        if let Some(token) = self.assigned.get(raw) {
            return token.clone();
        }
        let base = sanitize_token(raw);
        let mut token = base.clone();
        let mut suffix = 2;
        while self.owners.contains_key(&token) {
            token = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if token != base {
            tracing::warn!(raw, token = %token, "sanitized token collision, suffixed");
        }
        self.assigned.insert(raw.to_string(), token.clone());
        self.owners.insert(token.clone(), raw.to_string());
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Annotation, BaseRef, TypeExpr};

    fn service_class(name: &str) -> ClassDecl {
        ClassDecl {
            name: name.into(),
            annotations: vec![Annotation::new("service")],
            implements: vec![],
            extends: None,
            type_params: vec![],
            constructor_params: vec![],
            state_type: None,
            methods: vec![],
        }
    }

    fn unit_with(classes: Vec<ClassDecl>) -> SourceUnit {
        SourceUnit {
            path: "src/app.unit.json".into(),
            imports: vec![],
            declarations: classes.into_iter().map(Declaration::Class).collect(),
        }
    }

    #[test]
    fn unannotated_class_is_skipped_silently() {
        let mut plain = service_class("Plain");
        plain.annotations.clear();
        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![plain])]);
        assert!(found.is_empty());
    }

    #[test]
    fn class_token_is_always_emitted() {
        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![service_class("ConsoleLogger")])]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].class_token(), "ConsoleLogger");
        assert_eq!(found[0].records.len(), 1);
    }

    #[test]
    fn implements_clause_yields_interface_tokens() {
        let mut class = service_class("ConsoleLogger");
        class.implements = vec!["LoggerInterface".into()];
        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![class])]);

        let records = &found[0].records;
        assert_eq!(records.len(), 2);
        let iface = records
            .iter()
            .find(|r| r.kind == RegistrationKind::Interface)
            .unwrap();
        assert_eq!(iface.token, "LoggerInterface");
        assert_eq!(iface.interface_name.as_deref(), Some("LoggerInterface"));
        assert_eq!(iface.implementation_name, "ConsoleLogger");
    }

    #[test]
    fn recognized_base_yields_inheritance_token() {
        let mut class = service_class("UserRepository");
        class.extends = Some(BaseRef {
            name: "EntityRepository".into(),
            type_args: vec![TypeExpr::named("User")],
        });
        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![class])]);

        let record = found[0]
            .records
            .iter()
            .find(|r| r.kind == RegistrationKind::Inheritance)
            .unwrap();
        assert_eq!(record.token, "EntityRepository_User");
        assert_eq!(
            record.inheritance_chain,
            vec!["UserRepository".to_string(), "EntityRepository".to_string()]
        );
    }

    #[test]
    fn unrecognized_base_yields_no_inheritance_token() {
        let mut class = service_class("Widget");
        class.extends = Some(BaseRef {
            name: "Component".into(),
            type_args: vec![],
        });
        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![class])]);
        assert!(found[0]
            .records
            .iter()
            .all(|r| r.kind != RegistrationKind::Inheritance));
    }

    #[test]
    fn state_type_yields_state_token() {
        let mut class = service_class("CartStore");
        class.state_type = Some(TypeExpr::named("CartState"));
        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![class])]);

        let record = found[0]
            .records
            .iter()
            .find(|r| r.kind == RegistrationKind::State)
            .unwrap();
        assert_eq!(record.token, "CartState");
    }

    #[test]
    fn colliding_sanitized_names_get_numeric_suffixes() {
        // Repository<User> and Repository_User both sanitize to
        // Repository_User; distinct written names must stay distinct
        let mut generic = service_class("UserRepository");
        generic.extends = Some(BaseRef {
            name: "EntityRepository".into(),
            type_args: vec![TypeExpr::named("User")],
        });
        let mut literal = service_class("LegacyUserRepository");
        literal.implements = vec!["EntityRepository_User".into()];

        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![generic, literal])]);

        let first = found[0]
            .records
            .iter()
            .find(|r| r.kind == RegistrationKind::Inheritance)
            .unwrap();
        let second = found[1]
            .records
            .iter()
            .find(|r| r.kind == RegistrationKind::Interface)
            .unwrap();
        assert_eq!(first.token, "EntityRepository_User");
        assert_eq!(second.token, "EntityRepository_User_2");
    }

    #[test]
    fn shared_interface_name_shares_one_token() {
        let mut a = service_class("ConsoleLogger");
        a.implements = vec!["LoggerInterface".into()];
        let mut b = service_class("FileLogger");
        b.implements = vec!["LoggerInterface".into()];

        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![a, b])]);
        let token_of = |s: &ScannedImplementation| {
            s.records
                .iter()
                .find(|r| r.kind == RegistrationKind::Interface)
                .unwrap()
                .token
                .clone()
        };
        assert_eq!(token_of(&found[0]), token_of(&found[1]));
    }

    #[test]
    fn scope_comes_from_annotation_argument() {
        let mut class = service_class("ReportBuilder");
        class.annotations = vec![Annotation::with_arg("service", "transient")];
        let scanner = ImplementationScanner::new(ScannerConfig::default());
        let found = scanner.scan(&[unit_with(vec![class])]);
        assert_eq!(found[0].scope, ServiceScope::Transient);
    }
}
