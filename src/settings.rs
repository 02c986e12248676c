use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::DB_FILE;
use crate::error::{RecoError, Result};

/// Per-user configuration kept in `~/.config/bankreco/settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding `bankreco.db` and `exports/`.
    pub data_dir: String,
    #[serde(default)]
    pub company_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: home().join("Documents").join("bankreco").to_string_lossy().into_owned(),
            company_name: String::new(),
        }
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn settings_file() -> PathBuf {
    home().join(".config").join("bankreco").join("settings.json")
}

/// Missing file means defaults; an unreadable one is reported and ignored.
fn load_from(path: &Path) -> Settings {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        }
    }
}

fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(settings).map_err(|e| RecoError::Settings(e.to_string()))?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_settings() -> Settings {
    load_from(&settings_file())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_to(&settings_file(), settings)
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(load_settings().data_dir)
}

pub fn db_path() -> PathBuf {
    get_data_dir().join(DB_FILE)
}

/// Expand a leading `~`, otherwise canonicalize when the path exists.
pub fn shellexpand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        return format!("{}{rest}", home().to_string_lossy());
    }
    match std::fs::canonicalize(path) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => path.to_string(),
    }
}
