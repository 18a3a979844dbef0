use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub general: GeneralSettings,
}

#[derive(Debug, Deserialize)]
pub struct GeneralSettings {
    pub registry_file: String,
    pub plugins_dir: String,
}

impl Settings {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let defaults = include_str!("../config/default.toml");
        let mut config: Settings = toml::from_str(defaults)?;

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "plugsync") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let user_str = fs::read_to_string(&config_path)?;
                config = toml::from_str(&user_str)?;
            }
        }

        config.general.registry_file = expand_tilde(&config.general.registry_file)?;
        config.general.plugins_dir = expand_tilde(&config.general.plugins_dir)?;

        Ok(config)
    }

    pub fn registry_path(&self) -> PathBuf {
        PathBuf::from(&self.general.registry_file)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        PathBuf::from(&self.general.plugins_dir)
    }
}

fn expand_tilde(path: &str) -> Result<String> {
    if !path.starts_with('~') {
        return Ok(path.to_string());
    }

    let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(path.replacen('~', &home.to_string_lossy(), 1))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
