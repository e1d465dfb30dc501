use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fx_core::Platform;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    pub storage: StorageConfig,
    pub source: SourceConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub platform: Platform,
    #[serde(default)]
    pub experiment_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    pub payload_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig {
                platform: Platform::WordPressAndroid,
                experiment_names: vec![],
                anonymous_id: None,
            },
            storage: StorageConfig {
                db_path: ".fx/fx.db".to_string(),
            },
            source: SourceConfig {
                payload_path: ".fx/assignments.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| "parse fx.toml")?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".fx").join("fx.toml")
    }

    /// Relative paths resolve against `root`; `~` expands to the home dir.
    pub fn db_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.storage.db_path)
    }

    pub fn payload_path(&self, root: &Path) -> PathBuf {
        resolve(root, &self.source.payload_path)
    }
}

fn resolve(root: &Path, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).to_string());
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}
