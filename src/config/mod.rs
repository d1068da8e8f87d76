use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::Vertex;
use crate::error::{GeofenceError, Result};
use crate::location::LocationConfig;
use crate::monitor::{COUNTDOWN_SECS, MIN_VERTICES, MonitorSettings};
use crate::view::Palette;

fn default_min_vertices() -> usize {
    MIN_VERTICES
}
fn default_countdown_secs() -> u32 {
    COUNTDOWN_SECS
}
fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_min_vertices")]
    pub min_vertices: usize,
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub palette: Palette,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            min_vertices: default_min_vertices(),
            countdown_secs: default_countdown_secs(),
            verbose: default_verbose(),
            map: MapConfig::default(),
            location: LocationConfig::default(),
            palette: Palette::default(),
        }
    }
}

fn default_center() -> [f64; 2] {
    [37.7749, -122.4194]
}
fn default_zoom() -> u8 {
    13
}
fn default_follow_zoom() -> u8 {
    16
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Initial [lat, lng] before any fix
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Zoom used when the first fix arrives
    #[serde(default = "default_follow_zoom")]
    pub follow_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            follow_zoom: default_follow_zoom(),
        }
    }
}

impl FileConfig {
    /// Read an explicitly requested config file
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Load the first config file present in the search path
    ///
    /// Returns `Ok(None)` when no file exists. A file that exists but cannot
    /// be read or parsed is an error.
    pub fn load() -> anyhow::Result<Option<(PathBuf, Self)>> {
        Self::load_first(&search_paths())
    }

    fn load_first(candidates: &[PathBuf]) -> anyhow::Result<Option<(PathBuf, Self)>> {
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            return Ok(None);
        };
        let config = Self::from_path(path)
            .with_context(|| format!("Invalid config file found at {:?}", path))?;
        Ok(Some((path.clone(), config)))
    }

    /// Validate and convert into monitor settings
    pub fn settings(&self) -> Result<MonitorSettings> {
        if self.min_vertices < 3 {
            return Err(GeofenceError::InvalidConfig(format!(
                "min_vertices must be at least 3 (got {})",
                self.min_vertices
            )));
        }

        let [lat, lng] = self.map.center;
        let center = Vertex::new(lat, lng)
            .map_err(|e| GeofenceError::InvalidConfig(format!("map.center: {}", e)))?;

        if self.location.idle_interval_ms == 0 || self.location.monitor_interval_ms == 0 {
            return Err(GeofenceError::InvalidConfig(
                "location intervals must be positive".to_string(),
            ));
        }

        Ok(MonitorSettings {
            min_vertices: self.min_vertices,
            countdown_secs: self.countdown_secs,
            center,
            zoom: self.map.zoom,
            follow_zoom: self.map.follow_zoom,
            location: self.location.clone(),
            palette: self.palette.clone(),
        })
    }
}

/// Working directory first, then the platform config dir, then `$HOME`
fn search_paths() -> Vec<PathBuf> {
    let local = ["geofence.toml", ".geofence.toml"].map(PathBuf::from);
    let platform = dirs::config_dir()
        .map(|dir| [dir.join("geofence").join("config.toml"), dir.join("geofence.toml")]);
    let home = dirs::home_dir().map(|home| {
        [
            home.join(".geofence.toml"),
            home.join(".config").join("geofence").join("config.toml"),
        ]
    });

    local
        .into_iter()
        .chain(platform.into_iter().flatten())
        .chain(home.into_iter().flatten())
        .collect()
}
