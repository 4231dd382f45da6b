//! Export configuration
//!
//! Stored as RON, e.g.:
//!
//! ```ron
//! (
//!     game_name: "POTS",
//!     default_texture: "dev/grey",
//!     texture_overrides: {
//!         "tools/bound_player": "dev/orange",
//!     },
//! )
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the config file looked up under the user config directory
pub const CONFIG_FILE: &str = "config.ron";
/// Subdirectory of the user config directory
pub const CONFIG_DIR: &str = "wsm-export";

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings consumed by the map exporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Written into the `// Game:` header line
    pub game_name: String,
    /// Material name -> map texture name
    pub texture_overrides: BTreeMap<String, String>,
    /// Used for every material without an override. Empty keeps material names.
    pub default_texture: String,
    /// Also write raw entity data as `wsm_*` properties
    pub emit_entity_data: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let mut texture_overrides = BTreeMap::new();
        texture_overrides.insert("tools/bound_player".to_string(), "dev/orange".to_string());
        Self {
            game_name: "POTS".to_string(),
            texture_overrides,
            default_texture: "dev/grey".to_string(),
            emit_entity_data: false,
        }
    }
}

impl ExportConfig {
    /// Texture for a material name: override, then default texture, then the name itself
    pub fn resolve_texture<'a>(&'a self, material: &'a str) -> &'a str {
        if let Some(texture) = self.texture_overrides.get(material) {
            texture
        } else if !self.default_texture.is_empty() {
            &self.default_texture
        } else {
            material
        }
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Per-user config file location, if the platform has a config directory
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}
