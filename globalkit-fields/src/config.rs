//! Runtime configuration using Figment
//!
//! Sources in precedence order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `globalkit.toml`, `globalkit.yaml`, `globalkit.yml`, `globalkit.json` in the config directory
//! 3. Environment variables prefixed `GLOBALKIT_` (`GLOBALKIT_STRICT=true` → `strict`)

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "GLOBALKIT_";

/// Base file name searched for in the config directory.
pub const CONFIG_FILE_STEM: &str = "globalkit";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalkitConfig {
    /// Registry root holding `globals/<slug>.yaml`. Relative paths resolve
    /// against the config directory.
    pub globals_dir: PathBuf,
    /// Max length applied to text fields that declare no `maxLength`.
    #[serde(default)]
    pub default_max_text_length: Option<usize>,
    /// Report document keys that no field declares.
    #[serde(default)]
    pub strict: bool,
}

impl Default for GlobalkitConfig {
    fn default() -> Self {
        Self {
            globals_dir: PathBuf::from(".globalkit"),
            default_max_text_length: None,
            strict: false,
        }
    }
}

impl GlobalkitConfig {
    /// Load configuration from `config_dir` and the environment.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config = Self::figment(config_dir).extract::<Self>()?;
        trace!(?config, "loaded configuration");
        Ok(config)
    }

    fn figment(config_dir: &Path) -> Figment {
        let file = |ext: &str| config_dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
        trace!(dir = %config_dir.display(), "layering configuration sources");
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file("toml")))
            .merge(Yaml::file(file("yaml")))
            .merge(Yaml::file(file("yml")))
            .merge(Json::file(file("json")))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// The registry root, resolved against `config_dir` when relative.
    pub fn globals_root(&self, config_dir: &Path) -> PathBuf {
        if self.globals_dir.is_absolute() {
            self.globals_dir.clone()
        } else {
            config_dir.join(&self.globals_dir)
        }
    }
}
