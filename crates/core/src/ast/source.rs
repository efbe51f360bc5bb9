//! Source units and the loader that discovers them under scan roots.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::errors::EngineError;

use super::decl::Declaration;

/// One pre-parsed source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

/// An import in a source unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub module: String,
    #[serde(default)]
    pub names: Vec<String>,
}

impl SourceUnit {
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }
}

/// Discovers and deserializes `*.unit.json` files under the scan roots.
///
/// Units load in sorted path order so registration order, and therefore
/// ambiguity resolution, is reproducible across runs.
pub struct UnitLoader {
    roots: Vec<PathBuf>,
    matcher: GlobSet,
    /// Paths that failed to parse in the last load, with the reason
    skipped: Vec<(PathBuf, String)>,
}

impl UnitLoader {
    pub fn new(roots: &[PathBuf]) -> Result<Self, EngineError> {
        let mut builder = GlobSetBuilder::new();
        builder.add(
            Glob::new("**/*.unit.json")
                .map_err(|e| EngineError::configuration(format!("bad unit glob: {}", e)))?,
        );
        let matcher = builder
            .build()
            .map_err(|e| EngineError::configuration(format!("bad unit glob: {}", e)))?;

        Ok(Self {
            roots: roots.to_vec(),
            matcher,
            skipped: Vec::new(),
        })
    }

    /// Load every unit under every root. A malformed unit is logged and
    /// skipped; a missing root is a configuration error.
    pub fn load_all(&mut self) -> Result<Vec<SourceUnit>, EngineError> {
        self.skipped.clear();
        let mut paths = Vec::new();

        for root in &self.roots {
            if !root.exists() {
                return Err(EngineError::configuration(format!(
                    "scan root does not exist: {}",
                    root.display()
                )));
            }
            for entry in WalkDir::new(root).follow_links(false) {
                let entry = entry.map_err(|e| {
                    EngineError::configuration(format!("cannot walk {}: {}", root.display(), e))
                })?;
                if entry.file_type().is_file() && self.matcher.is_match(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
        }
        paths.sort();
        paths.dedup();

        let mut units = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load_one(&path) {
                Ok(unit) => units.push(unit),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping malformed unit");
                    self.skipped.push((path, e.to_string()));
                }
            }
        }
        Ok(units)
    }

    fn load_one(&self, path: &Path) -> Result<SourceUnit, EngineError> {
        let content = std::fs::read_to_string(path)?;
        let mut unit: SourceUnit = serde_json::from_str(&content)
            .map_err(|e| EngineError::scan(path.display().to_string(), e.to_string()))?;
        unit.path = path.display().to_string().replace('\\', "/");
        Ok(unit)
    }

    /// Units that failed to parse in the last `load_all`
    pub fn skipped(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }
}
