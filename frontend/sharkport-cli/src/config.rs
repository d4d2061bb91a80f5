use cfg_if::cfg_if;
use gba_save_config::GbaSaveType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "sharkport-config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "true_fn")]
    pub verify_checksum: bool,
    /// Save type used when none is given on the command line
    #[serde(default)]
    pub default_save_type: GbaSaveType,
    /// Retry a failed import without checksum verification if the checksum does not match
    #[serde(default)]
    pub allow_unverified_fallback: bool,
}

fn true_fn() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true_fn(),
            default_save_type: GbaSaveType::default(),
            allow_unverified_fallback: false,
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path).unwrap_or_default();
        toml::from_str(&config_str).unwrap_or_else(|err| {
            log::error!("Error deserializing app config from '{}': {err}", path.display());
            Self::default()
        })
    }
}

#[must_use]
pub fn default_config_path() -> PathBuf {
    cfg_if! {
        if #[cfg(target_os = "linux")] {
            default_linux_config_path()
        } else {
            CONFIG_FILENAME.into()
        }
    }
}

#[cfg(target_os = "linux")]
fn default_linux_config_path() -> PathBuf {
    let Some(base_dirs) = directories::BaseDirs::new() else {
        log::error!("Unable to determine config dir; using '{CONFIG_FILENAME}' in current dir");
        return CONFIG_FILENAME.into();
    };

    base_dirs.config_dir().join("sharkport").join(CONFIG_FILENAME)
}
