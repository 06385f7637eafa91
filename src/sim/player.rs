//! Skier kinematics

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Lateral steering intent for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Steer {
    Left,
    #[default]
    Straight,
    Right,
}

impl Steer {
    /// Combine held keys; both held cancel out
    pub fn from_held(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::Straight,
        }
    }

    fn axis(self) -> f32 {
        match self {
            Steer::Left => -1.0,
            Steer::Straight => 0.0,
            Steer::Right => 1.0,
        }
    }
}

/// The skier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Lateral offset from the slope center, within `[-half_width, half_width]`
    pub x: f32,
    /// Forward distance skied this run
    pub distance: f32,
    /// Current downhill speed
    pub speed: f32,
    /// Seconds until another shrub hit can be processed
    pub shrub_cooldown: f32,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: 0.0,
            distance: 0.0,
            speed: config.player.base_speed,
            shrub_cooldown: 0.0,
        }
    }

    /// Collision-plane position (lateral, forward)
    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.distance)
    }

    /// Advance one tick: accelerate, move downhill, count down the shrub
    /// cooldown, then steer and clamp to the slope
    pub fn update(&mut self, dt: f32, steer: Steer, config: &GameConfig) {
        let p = &config.player;
        self.speed = (self.speed + p.acceleration * dt).min(p.max_speed);
        self.distance += self.speed * dt;

        if self.shrub_cooldown > 0.0 {
            self.shrub_cooldown = (self.shrub_cooldown - dt).max(0.0);
        }

        self.x += steer.axis() * p.lateral_speed * dt;
        let half = config.half_width();
        self.x = self.x.clamp(-half, half);
    }

    pub fn can_hit_shrub(&self) -> bool {
        self.shrub_cooldown <= 0.0
    }
}
