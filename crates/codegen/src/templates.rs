use std::collections::HashMap;

use crate::error::CodegenError;

pub fn render_template(
    template: &str,
    context: &HashMap<&str, String>,
) -> Result<String, CodegenError> {
    let mut result = template.to_string();

    for (key, value) in context {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    if let Some(start) = result.find("{{") {
        let tail: String = result[start..].chars().take(32).collect();
        return Err(CodegenError::Template {
            message: format!("unfilled placeholder near '{}'", tail),
        });
    }

    Ok(result)
}

pub static REGISTRY_TEMPLATE: &str = r#"// Generated by wirec at {{generated_at}} for project '{{project}}'.
// Do not edit; the next generation pass overwrites this file.

{{factories}}

export const registrations = {
{{entries}}
};

export function resolveRegistration(token) {
  const entry = registrations[token];
  if (!entry) {
    throw new Error("wirec: no registration for token '" + token + "'");
  }
  return entry;
}
"#;

pub static FACTORY_TEMPLATE: &str = r#"export function {{factory}}(container) {
  return new {{class}}({{args}});
}"#;

pub static BRIDGE_TEMPLATE: &str = r#"// Generated by wirec. Stable import path for the current artifact set.
// Points at {{artifact_dir}}; regenerated whenever the fingerprint changes.
export * from "{{registry_path}}";
"#;

pub static BRIDGE_README_TEMPLATE: &str = r#"# wirec generated files

This directory is rewritten by `wirec generate` on every configuration
change. Import `bridge.js` from application code; it always re-exports the
registry of the current artifact directory ({{artifact_dir}}).

Add this directory to your VCS ignore file. The fingerprinted artifact
directories under {{configs_root}} should be ignored as well.
"#;
