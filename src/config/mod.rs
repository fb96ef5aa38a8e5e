use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geometry::{Color, NormPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "placard";
const APP_CONFIG_FILE: &str = "config.json";

/// Documented default layer positions, applied whenever a new base image is
/// loaded (values carried over from the reference layout).
pub const DEFAULT_NAME_POSITION: NormPoint = NormPoint::new(0.51, 0.44);
pub const DEFAULT_ID_POSITION: NormPoint = NormPoint::new(0.52, 0.52);
pub const DEFAULT_PORTRAIT_POSITION: NormPoint = NormPoint::new(0.10, 0.35);
pub const DEFAULT_PORTRAIT_WIDTH: f32 = 0.25;

/// Resolved composition defaults used to seed a new session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionConfig {
    pub text_color: Color,
    pub font_size: f32,
    pub text_rotation: f32,
    pub portrait_scale: f32,
    pub portrait_rotation: f32,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            text_color: Color::new(0, 0, 0),
            font_size: 15.0,
            text_rotation: 6.0,
            portrait_scale: 25.0,
            portrait_rotation: 0.0,
        }
    }
}

/// Raw on-disk shape of `config.json`; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    text_color: Option<String>,
    #[serde(default)]
    font_size: Option<f32>,
    #[serde(default)]
    text_rotation: Option<f32>,
    #[serde(default)]
    portrait_scale: Option<f32>,
    #[serde(default)]
    portrait_rotation: Option<f32>,
}

impl RawConfig {
    fn resolve(self) -> CompositionConfig {
        let mut config = CompositionConfig::default();
        if let Some(hex) = self.text_color {
            match Color::from_hex(&hex) {
                Some(color) => config.text_color = color,
                None => tracing::warn!(%hex, "unparseable textColor; keeping default"),
            }
        }
        if let Some(size) = self.font_size {
            config.font_size = size;
        }
        if let Some(rotation) = self.text_rotation {
            config.text_rotation = rotation;
        }
        if let Some(scale) = self.portrait_scale {
            config.portrait_scale = scale;
        }
        if let Some(rotation) = self.portrait_rotation {
            config.portrait_rotation = rotation;
        }
        config
    }
}

pub fn load_composition_config() -> CompositionConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_composition_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_composition_config_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> CompositionConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return CompositionConfig::default(),
    };
    if !path.exists() {
        return CompositionConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
            Ok(raw) => raw.resolve(),
            Err(err) => {
                tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
                CompositionConfig::default()
            }
        },
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            CompositionConfig::default()
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
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
