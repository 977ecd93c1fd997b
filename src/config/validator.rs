use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

/// Flags configuration keys filemon does not recognize
pub struct ConfigValidator {
    /// Dotted paths of every recognized field
    known_fields: HashSet<&'static str>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "storage.baseline_files",
            "scan.exclude",
            "performance.parallel_threads",
            "output.color",
        ]
        .into_iter()
        .collect();

        Self { known_fields }
    }

    /// Returns the dotted paths of unknown fields in a config file
    ///
    /// A missing file has no unknown fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn unknown_fields(&self, config_path: &Path) -> Result<Vec<String>> {
        if !config_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(config_path)?;
        let parsed: toml::Value = toml::from_str(&content)?;

        let mut unknown = Vec::new();
        self.check_table(&parsed, "", &mut unknown);
        Ok(unknown)
    }

    /// Recursively collects fields of `table` that are not known
    fn check_table(&self, table: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        let Some(map) = table.as_table() else {
            return;
        };

        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if value.is_table() {
                self.check_table(value, &path, unknown);
            } else if !self.known_fields.contains(path.as_str()) {
                unknown.push(path);
            }
        }
    }
}
