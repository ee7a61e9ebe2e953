//! luafann Configuration
//!
//! Handles parsing of `luafann.toml` and the environment overrides.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file searched for from the working directory up.
pub const CONFIG_FILE: &str = "luafann.toml";

/// Environment variable naming an explicit FANN library file.
pub const ENV_LIBRARY: &str = "LUAFANN_LIBRARY";

/// Environment variable enabling verbose tracing output.
pub const ENV_VERBOSE: &str = "LUAFANN_VERBOSE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching luafann.toml.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LuafannConfig {
    /// Where to find the FANN shared library
    #[serde(default)]
    pub library: LibraryConfig,

    /// Diagnostic output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LuafannConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: LuafannConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Configuration used at module load: file from the working directory,
    /// then environment overrides.
    pub fn resolve() -> ConfigResult<Self> {
        let mut config = Self::load_from_cwd()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LIBRARY).filter(|p| !p.is_empty()) {
            self.library.path = Some(path);
        }
        if let Some(flag) = lookup(ENV_VERBOSE) {
            self.logging.verbose = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }
}

/// FANN library location.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Base library name, expanded to the platform file name
    #[serde(default = "default_library_name")]
    pub name: String,

    /// Explicit library file, tried before any search
    #[serde(default)]
    pub path: Option<String>,

    /// Extra directories, searched before the platform defaults
    #[serde(default)]
    pub search_paths: Vec<String>,
}

fn default_library_name() -> String {
    "fann".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: default_library_name(),
            path: None,
            search_paths: Vec::new(),
        }
    }
}

/// Diagnostic output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Install a stderr subscriber and trace every native call
    #[serde(default)]
    pub verbose: bool,
}
