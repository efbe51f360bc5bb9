use std::fs;
use std::path::Path;

use crate::error::CodegenError;

/// Writes generated files, skipping the write when content is unchanged so
/// downstream file watchers do not see spurious events.
pub struct CodeWriter;

impl CodeWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_if_changed(&self, path: &Path, content: &str) -> Result<bool, CodegenError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            let existing = fs::read_to_string(path)?;
            if existing == content {
                return Ok(false);
            }
        }

        fs::write(path, content)?;
        Ok(true)
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
