//! `wirec.toml` manifest loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use wirec_codegen::EffectiveOptions;

pub const MANIFEST_FILE: &str = "wirec.toml";

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub project: ProjectSection,
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub generation: GenerationSection,
    #[serde(default)]
    pub markers: MarkersSection,
}

#[derive(Debug, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanSection {
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct GenerationSection {
    #[serde(default)]
    pub feature_flags: Vec<String>,
    #[serde(default = "default_true")]
    pub reuse: bool,
    #[serde(default = "default_retention")]
    pub retention: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkersSection {
    #[serde(default)]
    pub heuristic: bool,
    #[serde(default)]
    pub suffixes: Vec<String>,
    /// Extra project-specific regex for the heuristic
    #[serde(default)]
    pub pattern: Option<String>,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("src")]
}

fn default_output() -> PathBuf {
    PathBuf::from(".wirec-out")
}

fn default_true() -> bool {
    true
}

fn default_retention() -> usize {
    3
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            output: default_output(),
        }
    }
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            feature_flags: Vec::new(),
            reuse: true,
            retention: default_retention(),
        }
    }
}

impl Manifest {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid manifest {}", path.display()))
    }

    /// Fold the manifest into the options a pass runs under. Relative paths
    /// resolve against the manifest's directory.
    pub fn into_options(self, dir: &Path) -> EffectiveOptions {
        let mut options = EffectiveOptions::new(
            self.project.name,
            self.scan.roots.iter().map(|r| dir.join(r)).collect(),
            dir.join(self.scan.output),
        );
        options.environment = self.project.environment;
        options.feature_flags = self.generation.feature_flags;
        options.reuse = self.generation.reuse;
        options.retention = self.generation.retention;
        options.heuristic_markers = self.markers.heuristic;
        options.heuristic_suffixes = self.markers.suffixes;
        options.heuristic_pattern = self.markers.pattern;
        options
    }
}
