//! Pipeline configuration stored as TOML.
//!
//! ```toml
//! backend = "closure"
//! fold-constants = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{PipelineError, PipelineResult};

/// Environment variable overriding [`PipelineConfig::default_path`].
pub const ENV_CONFIG_PATH: &str = "MSTC_CONFIG_PATH";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
    /// Walk the tree on every call.
    Interpreter,
    #[default]
    Bytecode,
    Closure,
    /// `f64` opcodes; real field only.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
    pub backend: BackendKind,
    pub fold_constants: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            backend: BackendKind::default(),
            fold_constants: true,
        }
    }
}

impl PipelineConfig {
    /// Get the default path to the configuration file.
    pub fn default_path() -> PathBuf {
        if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
            return config_path.into();
        }

        let mut path = PathBuf::new();

        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                path.push(appdata);
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
                path.push(xdg_config_home);
            } else if let Ok(home) = std::env::var("HOME") {
                path.push(home);
                path.push(".config");
            }
        }

        path.push("mstc");
        path.push("config.toml");
        path
    }

    fn parse_toml(toml_str: &str, file: impl Into<String>) -> PipelineResult<Self> {
        toml::from_str(toml_str).map_err(|e| PipelineError::ConfigParseError {
            source: e,
            file: file.into(),
        })
    }

    /// Parse a configuration held in memory. Errors name the file `<string>`.
    pub fn from_toml_str(toml_str: &str) -> PipelineResult<Self> {
        Self::parse_toml(toml_str, "<string>")
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_toml(path: &Path) -> PipelineResult<Self> {
        let toml_str = std::fs::read_to_string(path)?;
        Self::parse_toml(&toml_str, path.display().to_string())
    }

    /// Like [`load_from_toml`](Self::load_from_toml) but falls back to the
    /// defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> PipelineResult<Self> {
        if !path.exists() {
            log::warn!(
                "configuration file `{}` not found, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_toml(path)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save_to_toml(&self, path: &Path) -> PipelineResult<()> {
        let toml_str = toml::to_string(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
