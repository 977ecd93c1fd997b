/// Unknown-key detection for configuration files
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "FM_CONFIG_PATH";

/// Default configuration file path relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/filemon/config.toml";

/// Historical default snapshot location.
pub const DEFAULT_BASELINE_FILE: &str = "/tmp/fm_baseline.dat";

/// Settings read from the TOML configuration file. Every section is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// `[storage]`: snapshot locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// `[scan]`: extra exclusions
    #[serde(default)]
    pub scan: ScanConfig,

    /// `[performance]`: digest worker pool
    #[serde(default)]
    pub performance: PerformanceConfig,

    /// `[output]`: terminal styling
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where snapshots are written to and loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Candidate locations; load uses the first that parses, save writes all
    #[serde(default = "default_baseline_files")]
    pub baseline_files: Vec<PathBuf>,
}

/// Scan options merged with `--exclude` on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanConfig {
    /// Substring exclusions applied to every scan
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Worker pool sizing; `--threads` takes precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PerformanceConfig {
    /// Digest worker threads; 0 picks available parallelism capped at 8
    #[serde(default)]
    pub parallel_threads: usize,
}

/// Terminal output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Colored status lines; `--no-color` turns this off for one run
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            baseline_files: default_baseline_files(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

impl Config {
    /// Resolves the configuration path: `$FM_CONFIG_PATH`, then
    /// `~/.config/filemon/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the variable nor a home directory is available.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from a file, falling back to defaults if it is missing
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - The configuration fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Parses and validates TOML configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.storage.baseline_files.is_empty() {
            anyhow::bail!("storage.baseline_files must name at least one location");
        }
        if self
            .storage
            .baseline_files
            .iter()
            .any(|p| p.as_os_str().is_empty())
        {
            anyhow::bail!("storage.baseline_files contains an empty path");
        }
        if self.scan.exclude.iter().any(String::is_empty) {
            anyhow::bail!("scan.exclude contains an empty pattern, which would exclude everything");
        }
        Ok(())
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }
}

fn default_baseline_files() -> Vec<PathBuf> {
    vec![PathBuf::from(DEFAULT_BASELINE_FILE)]
}

const fn default_color() -> bool {
    true
}
