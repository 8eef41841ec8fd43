//! Persistent settings for the sketchpad.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// All persistable UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Display
    pub vertex_radius: f32,
    pub show_labels: bool,

    // Editing
    #[serde(default = "default_polygon_sides")]
    pub polygon_sides: u32,

    // Physics
    pub physics_enabled: bool,
    pub repulsion: f32,
    pub attraction: f32,
    pub centering: f32,
    pub link_distance: f32,
}

fn default_polygon_sides() -> u32 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Display
            vertex_radius: 16.0,
            show_labels: true,

            // Editing
            polygon_sides: 5,

            // Physics
            physics_enabled: true,
            repulsion: 8000.0,
            attraction: 0.08,
            centering: 0.001,
            link_distance: 150.0,
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("graphpad");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk, returning defaults if the file doesn't
    /// exist or is invalid
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    info!("loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("failed to parse settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                // File doesn't exist yet, that's fine
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            warn!("could not determine config directory, settings not saved");
            return;
        };

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("failed to create config directory: {}", e);
                return;
            }
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!("failed to write settings file: {}", e);
                } else {
                    info!("saved settings to {:?}", path);
                }
            }
            Err(e) => {
                warn!("failed to serialize settings: {}", e);
            }
        }
    }
}
