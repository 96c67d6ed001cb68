//! Game settings
//!
//! Loaded from a JSON file. Anything missing takes its default, and a file
//! that cannot be read or parsed falls back to the defaults entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAP_HEIGHT, MAX_MAP_HEIGHT, MIN_MAP_HEIGHT, WALL_PLACEMENT_ATTEMPTS,
};
use crate::scaling::ScaleProfile;
use crate::sim::Viewport;

/// Level generation and scaling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Map height in tiles when no level progression applies
    pub map_height: i32,
    /// Camera view the maps are sized to
    pub viewport: Viewport,
    /// Fixed RNG seed; `None` draws a fresh one per run
    pub seed: Option<u64>,
    /// Attempts per wall segment to find a free start cell
    pub placement_attempts: u32,
    /// Prefab size ratios
    pub scale: ScaleProfile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            map_height: DEFAULT_MAP_HEIGHT,
            viewport: Viewport::default(),
            seed: None,
            placement_attempts: WALL_PLACEMENT_ATTEMPTS,
            scale: ScaleProfile::default(),
        }
    }
}

impl Settings {
    /// Parse settings, falling back to the defaults on malformed input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("Invalid settings ({}), using defaults", err);
                Self::default()
            }
        }
    }

    /// Load settings from a file
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::from_json(&json)
            }
            Err(err) => {
                log::warn!("Could not read {} ({}), using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Clamp every field into its valid range
    pub fn sanitized(self) -> Self {
        Self {
            map_height: if self.map_height < MIN_MAP_HEIGHT {
                DEFAULT_MAP_HEIGHT
            } else {
                self.map_height.min(MAX_MAP_HEIGHT)
            },
            viewport: self.viewport.sanitized(),
            seed: self.seed,
            placement_attempts: self.placement_attempts.max(1),
            scale: self.scale.sanitized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.map_height, 16);
        assert_eq!(s.placement_attempts, 2000);
        assert_eq!(s.seed, None);
        assert_eq!(s.scale.player, 0.8);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "seed": 7, "viewport": { "half_height": 4.0 } }"#);
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.viewport.half_height, 4.0);
        assert_eq!(s.viewport.half_width, Viewport::default().half_width);
        assert_eq!(s.map_height, 16);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        assert_eq!(Settings::from_json("{ not json"), Settings::default());
        assert_eq!(Settings::from_json(r#"{ "map_height": "tall" }"#), Settings::default());
    }

    #[test]
    fn test_values_are_sanitized() {
        let s = Settings::from_json(
            r#"{ "map_height": 1, "placement_attempts": 0, "scale": { "key": -0.5 } }"#,
        );
        assert_eq!(s.map_height, 16);
        assert_eq!(s.placement_attempts, 1);
        assert_eq!(s.scale.key, 0.5);
    }

    #[test]
    fn test_json_round_trip() {
        let s = Settings {
            seed: Some(99),
            map_height: 9,
            ..Settings::default()
        };
        assert_eq!(Settings::from_json(&s.to_json()), s);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let s = Settings::load("/nonexistent/asteroid-maze/settings.json");
        assert_eq!(s, Settings::default());
    }
}
