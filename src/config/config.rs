use crate::antigen::DEFAULT_CONVERSION_TABLE;
use crate::interpretation::SoftwareInfo;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_software_name")]
    pub software_name: String,
    #[serde(default = "default_software_version")]
    pub software_version: String,
    #[serde(default = "default_conversion_table")]
    pub conversion_table: PathBuf,
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

fn default_software_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_software_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_conversion_table() -> PathBuf {
    PathBuf::from(DEFAULT_CONVERSION_TABLE)
}

fn default_output_suffix() -> String {
    "_interpreted".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            software_name: default_software_name(),
            software_version: default_software_version(),
            conversion_table: default_conversion_table(),
            output_suffix: default_output_suffix(),
        }
    }
}

impl Config {
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "haml", "haml-interpret")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
    }

    /// Loads the user config, falling back to defaults. A broken config file
    /// is reported but never stops a run.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Config::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| toml::from_str::<Config>(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: ignoring config file '{}': {}",
                    path.display(),
                    e
                );
                Config::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(config_dir) = path.parent() {
            fs::create_dir_all(config_dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn software(&self) -> SoftwareInfo {
        SoftwareInfo::new(&self.software_name, &self.software_version)
    }

    /// Relative table paths are looked up next to the executable first, then
    /// in the working directory.
    pub fn conversion_table_path(&self) -> PathBuf {
        if self.conversion_table.is_absolute() {
            return self.conversion_table.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&self.conversion_table)))
            .filter(|candidate| candidate.exists())
            .unwrap_or_else(|| self.conversion_table.clone())
    }
}
