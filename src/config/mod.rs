use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::overlay::DEFAULT_TARGET;
use crate::settings::UserId;

const APP_DIR: &str = "overlaykit";
const APP_CONFIG_FILE: &str = "config.json";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Host settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Profile the selection document and Monet keys are written for.
    pub user_id: UserId,
    /// Package overlays are enumerated against when callers don't name one.
    pub default_target: String,
    /// Backing file for [`crate::settings::FileSettingsStore`].
    pub settings_path: Option<PathBuf>,
    pub density: f32,
    pub night_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_id: UserId::SYSTEM,
            default_target: DEFAULT_TARGET.to_string(),
            settings_path: None,
            density: 1.0,
            night_mode: false,
        }
    }
}

impl AppConfig {
    /// Explicit `settings_path`, else `settings.json` beside `config.json`.
    pub fn settings_path(&self) -> ConfigResult<PathBuf> {
        let (xdg_config_home, home) = config_env_dirs();
        self.settings_path_with(xdg_config_home.as_deref(), home.as_deref())
    }

    fn settings_path_with(
        &self,
        xdg_config_home: Option<&Path>,
        home: Option<&Path>,
    ) -> ConfigResult<PathBuf> {
        match &self.settings_path {
            Some(path) => Ok(path.clone()),
            None => app_config_path(APP_DIR, SETTINGS_FILE, xdg_config_home, home),
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
