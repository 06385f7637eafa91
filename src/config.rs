//! Game balance configuration
//!
//! Every tunable number the simulation reads lives here. A `GameConfig` is
//! built once (defaults, JSON file, or page settings) and never mutated while
//! a `GameState` holds it.

use serde::{Deserialize, Serialize};

/// Smallest spawn interval accepted from a config file.
///
/// Stream cursors advance by their interval per attempt, so zero would
/// never catch up with the player.
pub const MIN_SPAWN_INTERVAL: f32 = 1.0;

/// How the world is being presented, which decides how long entities survive
/// behind the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Flat 2-D projection looking down the slope; nothing is visible behind the player
    Flat,
    /// Chase camera behind the player; entities linger for `behind_distance`
    #[default]
    Scene3d,
}

impl ViewMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Flat => ViewMode::Scene3d,
            ViewMode::Scene3d => ViewMode::Flat,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Flat => "flat",
            ViewMode::Scene3d => "3d",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flat" | "2d" => Some(ViewMode::Flat),
            "3d" | "scene3d" => Some(ViewMode::Scene3d),
            _ => None,
        }
    }
}

/// Skier kinematics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Starting downhill speed (units/s)
    pub base_speed: f32,
    /// Downhill acceleration (units/s²)
    pub acceleration: f32,
    /// Downhill speed cap (units/s)
    pub max_speed: f32,
    /// Lateral steering speed (units/s)
    pub lateral_speed: f32,
    /// Collision circle radius
    pub radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_speed: 18.0,
            acceleration: 0.5,
            max_speed: 40.0,
            lateral_speed: 7.0,
            radius: 4.0,
        }
    }
}

/// Terrain marker spacing (always spawned, jittered spacing)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Mean forward gap between markers
    pub spacing: f32,
    /// Lower bound of the spacing multiplier
    pub jitter_min: f32,
    /// Upper bound of the spacing multiplier
    pub jitter_max: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            spacing: 20.0,
            jitter_min: 0.6,
            jitter_max: 1.4,
        }
    }
}

/// Lateral and forward spawn parameters of one probability-gated stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRule {
    /// Forward distance between spawn attempts
    pub interval: f32,
    /// Chance that an attempt produces an entity
    pub probability: f32,
    /// Leftmost lateral spawn position (clamped to the slope)
    pub min_x: f32,
    /// Rightmost lateral spawn position (clamped to the slope)
    pub max_x: f32,
    /// Player distance before which attempts never produce anything
    pub start_offset: f32,
}

/// Trees and rocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub spawn_interval: f32,
    pub probability: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub radius: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 30.0,
            probability: 0.55,
            min_x: -50.0,
            max_x: 50.0,
            radius: 5.0,
        }
    }
}

impl ObstacleConfig {
    pub fn rule(&self) -> SpawnRule {
        SpawnRule {
            interval: self.spawn_interval,
            probability: self.probability,
            min_x: self.min_x,
            max_x: self.max_x,
            start_offset: 0.0,
        }
    }
}

/// Sats tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinConfig {
    pub spawn_interval: f32,
    pub probability: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub collision_radius: f32,
    pub sats_per_coin: u32,
}

impl Default for CoinConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 40.0,
            probability: 0.5,
            min_x: -45.0,
            max_x: 45.0,
            collision_radius: 3.5,
            sats_per_coin: 1,
        }
    }
}

impl CoinConfig {
    pub fn rule(&self) -> SpawnRule {
        SpawnRule {
            interval: self.spawn_interval,
            probability: self.probability,
            min_x: self.min_x,
            max_x: self.max_x,
            start_offset: 0.0,
        }
    }
}

/// Shrubs: burnable at speed, sticky when slow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrubConfig {
    pub spawn_interval: f32,
    pub probability: f32,
    pub min_x: f32,
    pub max_x: f32,
    /// No shrubs grow until the player has skied this far
    pub start_offset: f32,
    /// Center-to-center distance that counts as running into a shrub.
    ///
    /// Independent of every other radius; the default of 3 means a squared
    /// distance below 9.
    pub contact_distance: f32,
    /// At or above this speed the shrub catches fire instead of slowing the skier
    pub fire_speed_threshold: f32,
    /// Speed multiplier applied when a shrub is hit below the fire threshold
    pub speed_slowdown: f32,
    /// Seconds after a shrub hit before another shrub can be processed
    pub cooldown: f32,
}

impl Default for ShrubConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 25.0,
            probability: 0.4,
            min_x: -55.0,
            max_x: 55.0,
            start_offset: 100.0,
            contact_distance: 3.0,
            fire_speed_threshold: 25.0,
            speed_slowdown: 0.7,
            cooldown: 0.5,
        }
    }
}

impl ShrubConfig {
    pub fn rule(&self) -> SpawnRule {
        SpawnRule {
            interval: self.spawn_interval,
            probability: self.probability,
            min_x: self.min_x,
            max_x: self.max_x,
            start_offset: self.start_offset,
        }
    }
}

/// Paired walls just outside both slope edges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallConfig {
    pub spawn_interval: f32,
    /// Distance beyond the slope edge where each wall sits
    pub lateral_offset: f32,
    pub radius: f32,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 10.0,
            lateral_offset: 4.0,
            radius: 2.0,
        }
    }
}

impl WallConfig {
    /// Walls always spawn; their lateral position is fixed at the slope edges
    pub fn rule(&self) -> SpawnRule {
        SpawnRule {
            interval: self.spawn_interval,
            probability: 1.0,
            min_x: 0.0,
            max_x: 0.0,
            start_offset: 0.0,
        }
    }
}

/// The yeti chaser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YetiConfig {
    /// Chance, rolled once per run, that a yeti shows up at all
    pub game_spawn_probability: f32,
    /// Run time before the yeti may appear (s)
    pub min_spawn_time: f32,
    /// Period of the per-check roll once eligible (s)
    pub check_interval: f32,
    /// Chance each check spawns the yeti
    pub check_probability: f32,
    /// How far behind the player it appears
    pub spawn_offset_behind: f32,
    /// How far to the side of the player it appears
    pub spawn_offset_lateral: f32,
    pub start_speed: f32,
    /// Forward acceleration (units/s²)
    pub acceleration: f32,
    pub max_speed: f32,
    /// Lateral chase speed (units/s)
    pub tracking_speed: f32,
    pub radius: f32,
}

impl Default for YetiConfig {
    fn default() -> Self {
        Self {
            game_spawn_probability: 0.6,
            min_spawn_time: 20.0,
            check_interval: 1.0,
            check_probability: 0.15,
            spawn_offset_behind: 40.0,
            spawn_offset_lateral: 20.0,
            start_speed: 15.0,
            acceleration: 1.2,
            max_speed: 50.0,
            tracking_speed: 5.0,
            radius: 5.0,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub slope: SlopeConfig,
    pub player: PlayerConfig,
    pub markers: MarkerConfig,
    pub obstacles: ObstacleConfig,
    pub coins: CoinConfig,
    pub shrubs: ShrubConfig,
    pub walls: WallConfig,
    pub yeti: YetiConfig,
}

/// Slope geometry and visibility window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopeConfig {
    /// Full width of the skiable slope
    pub width: f32,
    /// How far ahead entities are born
    pub view_distance: f32,
    /// How far behind the player entities survive in `Scene3d`
    pub behind_distance: f32,
    pub view_mode: ViewMode,
}

impl Default for SlopeConfig {
    fn default() -> Self {
        Self {
            width: 120.0,
            view_distance: 250.0,
            behind_distance: 20.0,
            view_mode: ViewMode::Scene3d,
        }
    }
}

impl GameConfig {
    /// Half the slope width; lateral positions live in `[-half, half]`
    #[inline]
    pub fn half_width(&self) -> f32 {
        self.slope.width / 2.0
    }

    /// How far behind the player an entity may be before it is pruned
    pub fn prune_tolerance(&self) -> f32 {
        match self.slope.view_mode {
            ViewMode::Flat => 0.0,
            ViewMode::Scene3d => self.slope.behind_distance.max(0.0),
        }
    }

    /// Parse a (possibly partial) JSON config; missing fields keep defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Load config from `SKI_SATS_CONFIG` or `config/ski_sats.json`, falling back to defaults
    pub fn load() -> Self {
        let candidates = std::env::var("SKI_SATS_CONFIG")
            .ok()
            .into_iter()
            .chain(std::iter::once("config/ski_sats.json".to_string()));

        for path in candidates {
            let Ok(contents) = std::fs::read_to_string(&path) else {
                continue;
            };
            match Self::from_json(&contents) {
                Ok(config) => {
                    log::info!("Loaded game config from {}", path);
                    return config;
                }
                Err(e) => log::warn!("Ignoring invalid config {}: {}", path, e),
            }
        }
        Self::default()
    }

    /// Repair values that would stall or break the generator
    pub fn sanitized(mut self) -> Self {
        let interval = |name: &str, value: &mut f32| {
            if !(*value >= MIN_SPAWN_INTERVAL) {
                log::warn!("{} spawn interval {} raised to {}", name, value, MIN_SPAWN_INTERVAL);
                *value = MIN_SPAWN_INTERVAL;
            }
        };
        interval("marker", &mut self.markers.spacing);
        interval("obstacle", &mut self.obstacles.spawn_interval);
        interval("coin", &mut self.coins.spawn_interval);
        interval("shrub", &mut self.shrubs.spawn_interval);
        interval("wall", &mut self.walls.spawn_interval);

        if self.markers.jitter_min > self.markers.jitter_max {
            std::mem::swap(&mut self.markers.jitter_min, &mut self.markers.jitter_max);
        }
        self.markers.jitter_min = self.markers.jitter_min.max(0.05);
        self.markers.jitter_max = self.markers.jitter_max.max(self.markers.jitter_min);

        for (probability, min_x, max_x) in [
            (&mut self.obstacles.probability, &mut self.obstacles.min_x, &mut self.obstacles.max_x),
            (&mut self.coins.probability, &mut self.coins.min_x, &mut self.coins.max_x),
            (&mut self.shrubs.probability, &mut self.shrubs.min_x, &mut self.shrubs.max_x),
        ] {
            *probability = clamp_probability(*probability);
            if *min_x > *max_x {
                std::mem::swap(min_x, max_x);
            }
        }

        self.yeti.game_spawn_probability = clamp_probability(self.yeti.game_spawn_probability);
        self.yeti.check_probability = clamp_probability(self.yeti.check_probability);
        if !(self.yeti.check_interval > 0.0) {
            self.yeti.check_interval = 1.0;
        }
        self.player.max_speed = self.player.max_speed.max(self.player.base_speed);
        self.yeti.max_speed = self.yeti.max_speed.max(self.yeti.start_speed);
        self.slope.width = self.slope.width.max(0.0);
        self
    }
}

fn clamp_probability(p: f32) -> f32 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.half_width(), 60.0);
        assert_eq!(config.shrubs.contact_distance, 3.0);
        assert_eq!(config.prune_tolerance(), 20.0);
    }

    #[test]
    fn test_prune_tolerance_flat() {
        let mut config = GameConfig::default();
        config.slope.view_mode = ViewMode::Flat;
        assert_eq!(config.prune_tolerance(), 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(
            r#"{ "coins": { "probability": 1.0 }, "yeti": { "game_spawn_probability": 0.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.coins.probability, 1.0);
        assert_eq!(config.coins.spawn_interval, 40.0);
        assert_eq!(config.coins.collision_radius, 3.5);
        assert_eq!(config.yeti.game_spawn_probability, 0.0);
        assert_eq!(config.yeti.min_spawn_time, 20.0);
        assert_eq!(config.slope.width, 120.0);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(GameConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_sanitized_repairs_bad_values() {
        let mut config = GameConfig::default();
        config.obstacles.spawn_interval = 0.0;
        config.coins.probability = 3.0;
        config.shrubs.min_x = 40.0;
        config.shrubs.max_x = -40.0;
        config.yeti.check_probability = f32::NAN;
        let config = config.sanitized();
        assert_eq!(config.obstacles.spawn_interval, MIN_SPAWN_INTERVAL);
        assert_eq!(config.coins.probability, 1.0);
        assert_eq!(config.shrubs.min_x, -40.0);
        assert_eq!(config.shrubs.max_x, 40.0);
        assert_eq!(config.yeti.check_probability, 0.0);
    }

    #[test]
    fn test_view_mode_from_str() {
        assert_eq!(ViewMode::from_str("2D"), Some(ViewMode::Flat));
        assert_eq!(ViewMode::from_str("scene3d"), Some(ViewMode::Scene3d));
        assert_eq!(ViewMode::from_str("iso"), None);
        assert_eq!(ViewMode::from_str(ViewMode::Flat.as_str()), Some(ViewMode::Flat));
    }
}
