//! The yeti: a chaser that may or may not show up in a given run
//!
//! Whether it appears at all is rolled once at run start. If it will, it
//! stays dormant until the run is old enough, then rolls again once per
//! check interval. Once active it accelerates toward its speed cap and
//! drifts sideways toward the skier at a fixed tracking speed, so a quick
//! sidestep can still shake it for a while.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use super::player::Player;
use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YetiPhase {
    /// Waiting (or never going to appear this run)
    Dormant,
    /// On the slope and chasing
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Yeti {
    pub phase: YetiPhase,
    /// Outcome of the once-per-run spawn roll
    pub will_spawn: bool,
    pub pos: Vec2,
    pub speed: f32,
    /// Run time seen while dormant
    pub spawn_timer: f32,
    /// Time banked toward the next spawn check
    pub check_accumulator: f32,
}

impl Default for Yeti {
    fn default() -> Self {
        Self {
            phase: YetiPhase::Dormant,
            will_spawn: false,
            pos: Vec2::ZERO,
            speed: 0.0,
            spawn_timer: 0.0,
            check_accumulator: 0.0,
        }
    }
}

impl Yeti {
    /// Fresh yeti for a new run, with the run-level spawn roll already made
    pub fn for_run<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let will_spawn = rng.random::<f32>() < config.yeti.game_spawn_probability;
        log::debug!("Yeti will {}appear this run", if will_spawn { "" } else { "not " });
        Self {
            will_spawn,
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == YetiPhase::Active
    }

    /// Advance one tick. Returns true on the tick the yeti appears.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        player: &Player,
        config: &GameConfig,
        rng: &mut R,
    ) -> bool {
        match self.phase {
            YetiPhase::Dormant => self.wait(dt, player, config, rng),
            YetiPhase::Active => {
                self.chase(dt, player, config);
                false
            }
        }
    }

    fn wait<R: Rng + ?Sized>(&mut self, dt: f32, player: &Player, config: &GameConfig, rng: &mut R) -> bool {
        if !self.will_spawn {
            return false;
        }
        let y = &config.yeti;
        self.spawn_timer += dt;
        if self.spawn_timer < y.min_spawn_time {
            return false;
        }

        self.check_accumulator += dt;
        while self.check_accumulator >= y.check_interval {
            self.check_accumulator -= y.check_interval;
            if rng.random::<f32>() < y.check_probability {
                let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let half = config.half_width();
                let x = (player.x + side * y.spawn_offset_lateral).clamp(-half, half);
                self.activate(Vec2::new(x, player.distance - y.spawn_offset_behind), y.start_speed);
                return true;
            }
        }
        false
    }

    fn chase(&mut self, dt: f32, player: &Player, config: &GameConfig) {
        let y = &config.yeti;
        self.speed = (self.speed + y.acceleration * dt).min(y.max_speed);
        self.pos.y += self.speed * dt;

        let dx = player.x - self.pos.x;
        let step = y.tracking_speed * dt;
        self.pos.x += dx.clamp(-step, step);
    }

    /// Put the yeti on the slope at `pos`
    pub fn activate(&mut self, pos: Vec2, speed: f32) {
        self.phase = YetiPhase::Active;
        self.pos = pos;
        self.speed = speed;
        log::info!("Yeti appeared at ({:.1}, {:.1})", pos.x, pos.y);
    }

    /// True if the active yeti overlaps the player
    pub fn catches(&self, player: &Player, config: &GameConfig) -> bool {
        self.is_active()
            && circles_overlap(self.pos, player.pos(), config.player.radius + config.yeti.radius)
    }

    /// Straight-line distance to the player while active (camera shake, warnings)
    pub fn distance_to(&self, player: &Player) -> Option<f32> {
        self.is_active().then(|| self.pos.distance(player.pos()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_catch_at_player_position() {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.distance = 321.0;
        player.x = -12.0;
        let mut yeti = Yeti::default();
        assert!(!yeti.catches(&player, &config));

        yeti.activate(player.pos(), 20.0);
        assert!(yeti.catches(&player, &config));
        assert_eq!(yeti.distance_to(&player), Some(0.0));
    }

    #[test]
    fn test_never_spawns_with_zero_probability() {
        let mut config = GameConfig::default();
        config.yeti.game_spawn_probability = 0.0;
        config.yeti.check_probability = 1.0;
        let player = Player::new(&config);

        for seed in 0..20 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut yeti = Yeti::for_run(&config, &mut rng);
            for _ in 0..20_000 {
                assert!(!yeti.update(0.1, &player, &config, &mut rng));
            }
            assert!(!yeti.is_active());
            assert_eq!(yeti.distance_to(&player), None);
        }
    }

    #[test]
    fn test_waits_for_min_time_then_appears_behind() {
        let mut config = GameConfig::default();
        config.yeti.game_spawn_probability = 1.0;
        config.yeti.check_probability = 1.0;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut player = Player::new(&config);
        player.distance = 500.0;
        let mut yeti = Yeti::for_run(&config, &mut rng);
        assert!(yeti.will_spawn);

        let mut t = 0.0;
        while t + 0.5 < config.yeti.min_spawn_time {
            assert!(!yeti.update(0.5, &player, &config, &mut rng));
            t += 0.5;
        }
        let mut appeared = false;
        for _ in 0..10 {
            if yeti.update(0.5, &player, &config, &mut rng) {
                appeared = true;
                break;
            }
        }
        assert!(appeared);
        assert!(yeti.is_active());
        assert_eq!(yeti.pos.y, 500.0 - config.yeti.spawn_offset_behind);
        assert_eq!(yeti.pos.x.abs(), config.yeti.spawn_offset_lateral);
        assert_eq!(yeti.speed, config.yeti.start_speed);
    }

    #[test]
    fn test_chase_is_bounded() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut player = Player::new(&config);
        player.x = 50.0;
        let mut yeti = Yeti::default();
        yeti.activate(Vec2::new(0.0, 0.0), config.yeti.start_speed);

        yeti.update(1.0, &player, &config, &mut rng);
        assert_eq!(yeti.pos.x, config.yeti.tracking_speed);
        assert_eq!(yeti.speed, config.yeti.start_speed + config.yeti.acceleration);

        for _ in 0..1000 {
            yeti.update(0.1, &player, &config, &mut rng);
            assert!(yeti.speed <= config.yeti.max_speed);
        }
        assert_eq!(yeti.speed, config.yeti.max_speed);
        // Tracking never overshoots
        assert!((yeti.pos.x - player.x).abs() < 1e-4);
    }
}
