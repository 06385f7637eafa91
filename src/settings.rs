//! Player preferences
//!
//! Persisted in LocalStorage on the web, defaults natively.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, ViewMode};
use crate::sim::GameState;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Flat top-down view or the 3D scene; decides how far behind the player entities live
    pub view_mode: ViewMode,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (no camera shake)
    pub reduced_motion: bool,
    /// Camera shake when the yeti closes in
    pub camera_shake: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Scene3d,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,
            reduced_motion: false,
            camera_shake: true,
        }
    }
}

impl Settings {
    /// Copy settings that shape the simulation into a config, before the game state is built
    pub fn apply_to(&self, config: &mut GameConfig) {
        config.slope.view_mode = self.view_mode;
    }

    /// Push simulation-shaping settings into a running session
    pub fn apply_to_state(&self, state: &mut GameState) {
        if state.config().slope.view_mode != self.view_mode {
            log::info!("View mode: {}", self.view_mode.as_str());
            state.set_view_mode(self.view_mode);
        }
    }

    /// Flip between the flat and 3D views; returns the new mode
    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.view_mode
    }

    /// Effective camera shake (respects reduced_motion)
    pub fn effective_camera_shake(&self) -> bool {
        self.camera_shake && !self.reduced_motion
    }

    /// Combined output gain for effects
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "ski_sats_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Discarding unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        log::debug!("Settings storage ({}) is browser-only; using defaults", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_view_mode() {
        let settings = Settings {
            view_mode: ViewMode::Flat,
            ..Default::default()
        };
        let mut config = GameConfig::default();
        settings.apply_to(&mut config);
        assert_eq!(config.slope.view_mode, ViewMode::Flat);
        assert_eq!(config.prune_tolerance(), 0.0);
    }

    #[test]
    fn test_toggle_view_mode_reaches_running_state() {
        let mut settings = Settings::default();
        let mut config = GameConfig::default();
        settings.apply_to(&mut config);
        let mut state = GameState::new(config, 1);
        assert_eq!(state.config().prune_tolerance(), state.config().slope.behind_distance);

        assert_eq!(settings.toggle_view_mode(), ViewMode::Flat);
        settings.apply_to_state(&mut state);
        assert_eq!(state.config().slope.view_mode, ViewMode::Flat);
        assert_eq!(state.config().prune_tolerance(), 0.0);

        settings.toggle_view_mode();
        settings.apply_to_state(&mut state);
        assert_eq!(state.config().slope.view_mode, ViewMode::Scene3d);
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut settings = Settings::default();
        assert!(settings.effective_camera_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_camera_shake());
    }

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"muted":true}"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.view_mode, ViewMode::Scene3d);
        assert!(settings.camera_shake);
    }
}
