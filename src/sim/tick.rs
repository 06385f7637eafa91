//! Run controller and per-frame tick
//!
//! Owns every piece of mutable run state and advances it in a fixed order:
//! player, world streams, yeti, then collisions. Within one tick the yeti
//! catch is checked first, then coins, then shrubs, then obstacles and walls,
//! so a tick that is both a catch and a crash always reports the catch.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::{collect_coins, hits_obstacle, nearest_shrub, shrub_contacts};
use super::player::{Player, Steer};
use super::state::{
    BoundaryWall, Coin, EventSink, GameEvent, GamePhase, Obstacle, RunStats, Shrub,
    TerminationReason, TerrainMarker,
};
use super::world::World;
use super::yeti::Yeti;
use crate::config::{GameConfig, ViewMode};
use crate::sanitize_dt;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Steer-left held
    pub left: bool,
    /// Steer-right held
    pub right: bool,
    /// Start / restart request (edge-triggered by the input layer)
    pub confirm: bool,
}

/// Complete game state: the run controller
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    /// Seed the RNG was created from
    pub seed: u64,
    rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    pub world: World,
    pub yeti: Yeti,
    /// Sats collected this run
    pub sats: u32,
    /// Seconds spent playing this run
    pub elapsed: f32,
    /// Number of runs started this session
    pub run: u32,
    /// Session clock (seconds of ticks seen, any phase)
    pub clock: f64,
    last_run: Option<RunStats>,
}

impl GameState {
    /// Create a new session in the menu, with a populated backdrop slope
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let config = config.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let player = Player::new(&config);
        let mut world = World::new();
        world.reset(player.distance, &config, &mut rng);

        Self {
            config,
            seed,
            rng,
            phase: GamePhase::Menu,
            player,
            world,
            yeti: Yeti::default(),
            sats: 0,
            elapsed: 0.0,
            run: 0,
            clock: 0.0,
            last_run: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Change the pruning mode; applies from the next tick
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.config.slope.view_mode = mode;
    }

    /// Stats of the most recently finished run, if the session has one
    pub fn last_run(&self) -> Option<&RunStats> {
        self.last_run.as_ref()
    }

    /// Start a fresh run: reset player, world, yeti and run counters
    pub fn start_run(&mut self, events: &mut impl EventSink) {
        self.run += 1;
        self.player = Player::new(&self.config);
        self.world.reset(self.player.distance, &self.config, &mut self.rng);
        self.yeti = Yeti::for_run(&self.config, &mut self.rng);
        self.sats = 0;
        self.elapsed = 0.0;
        self.phase = GamePhase::Playing;

        log::info!("Run {} started (seed {})", self.run, self.seed);
        events.emit(GameEvent::RunStarted {
            run: self.run,
            started_at: self.clock,
            start_distance: self.player.distance,
        });
    }

    fn end_run(&mut self, reason: TerminationReason, events: &mut impl EventSink) {
        self.phase = match reason {
            TerminationReason::Obstacle => GamePhase::Crashed,
            TerminationReason::Yeti => GamePhase::Caught,
        };
        let stats = RunStats {
            run: self.run,
            distance: self.player.distance,
            elapsed: self.elapsed,
            sats: self.sats,
            reason,
        };
        log::info!(
            "Run {} ended ({:?}): {:.0} m, {} sats, {:.1} s",
            stats.run,
            reason,
            stats.distance,
            stats.sats,
            stats.elapsed
        );
        self.last_run = Some(stats.clone());
        events.emit(GameEvent::RunEnded(stats));
    }

    /// Borrowed read-only view for renderers and the HUD
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            phase: self.phase,
            run: self.run,
            view_mode: self.config.slope.view_mode,
            player: &self.player,
            markers: self.world.markers(),
            obstacles: self.world.obstacles(),
            coins: self.world.coins(),
            shrubs: self.world.shrubs(),
            walls: self.world.walls(),
            yeti: self.yeti.is_active().then_some(&self.yeti),
            yeti_distance: self.yeti.distance_to(&self.player),
            sats: self.sats,
            elapsed: self.elapsed,
        }
    }
}

/// Everything a frame needs to draw, borrowed from the state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot<'a> {
    pub phase: GamePhase,
    pub run: u32,
    pub view_mode: ViewMode,
    pub player: &'a Player,
    pub markers: &'a [TerrainMarker],
    pub obstacles: &'a [Obstacle],
    pub coins: &'a [Coin],
    pub shrubs: &'a [Shrub],
    pub walls: &'a [BoundaryWall],
    /// Present only while the yeti is on the slope
    pub yeti: Option<&'a Yeti>,
    /// Raw yeti-to-player distance; the HUD turns this into shake
    pub yeti_distance: Option<f32>,
    pub sats: u32,
    pub elapsed: f32,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, events: &mut impl EventSink) {
    let dt = sanitize_dt(dt);
    state.clock += dt as f64;

    match state.phase {
        GamePhase::Menu | GamePhase::Crashed | GamePhase::Caught => {
            if input.confirm {
                state.start_run(events);
            }
        }
        GamePhase::Playing => tick_playing(state, input, dt, events),
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32, events: &mut impl EventSink) {
    state
        .player
        .update(dt, Steer::from_held(input.left, input.right), &state.config);
    state.elapsed += dt;

    state
        .world
        .update(state.player.distance, &state.config, &mut state.rng);

    if state
        .yeti
        .update(dt, &state.player, &state.config, &mut state.rng)
    {
        events.emit(GameEvent::YetiAppeared);
    }

    if state.yeti.catches(&state.player, &state.config) {
        events.emit(GameEvent::YetiCaught);
        state.end_run(TerminationReason::Yeti, events);
        return;
    }

    let collected = collect_coins(&mut state.world, &state.player, &state.config);
    if collected > 0 {
        state.sats += collected * state.config.coins.sats_per_coin;
        events.emit(GameEvent::CoinsCollected {
            count: collected,
            sats: state.sats,
        });
    }

    resolve_shrub_hit(state, events);

    if hits_obstacle(&state.world, &state.player, &state.config) {
        events.emit(GameEvent::ObstacleCrash);
        state.end_run(TerminationReason::Obstacle, events);
    }
}

/// At most one shrub per cooldown window: the nearest unprocessed one in contact
fn resolve_shrub_hit(state: &mut GameState, events: &mut impl EventSink) {
    if !state.player.can_hit_shrub() {
        return;
    }
    let contacts = shrub_contacts(&state.world, &state.player, &state.config);
    let Some(id) = nearest_shrub(&state.world, &state.player, &contacts) else {
        return;
    };

    let shrubs = &state.config.shrubs;
    let ignite = state.player.speed >= shrubs.fire_speed_threshold;
    if !ignite {
        state.player.speed *= shrubs.speed_slowdown;
    }
    state.player.shrub_cooldown = shrubs.cooldown;

    if let Some(shrub) = state.world.shrub_mut(id) {
        shrub.processed = true;
        shrub.on_fire = ignite;
    }

    if ignite {
        events.emit(GameEvent::ShrubIgnited { id });
    } else {
        events.emit(GameEvent::ShrubThudded {
            id,
            speed: state.player.speed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NOMINAL_DT;
    use crate::sim::state::{NullSink, ObstacleKind};
    use glam::Vec2;

    const CONFIRM: TickInput = TickInput {
        left: false,
        right: false,
        confirm: true,
    };

    fn playing_state(config: GameConfig, seed: u64) -> (GameState, Vec<GameEvent>) {
        let mut state = GameState::new(config, seed);
        let mut events = Vec::new();
        tick(&mut state, &CONFIRM, NOMINAL_DT, &mut events);
        assert_eq!(state.phase, GamePhase::Playing);
        (state, events)
    }

    #[test]
    fn test_tick_menu_to_playing() {
        let mut state = GameState::new(GameConfig::default(), 12345);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(!state.world.markers().is_empty());

        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), NOMINAL_DT, &mut events);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(events.is_empty());

        tick(&mut state, &CONFIRM, NOMINAL_DT, &mut events);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.run, 1);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::RunStarted { run: 1, start_distance, .. }] if *start_distance == 0.0
        ));
        // The starting tick does not move the skier
        assert_eq!(state.player.distance, 0.0);
    }

    #[test]
    fn test_tick_first_second() {
        let (mut state, _) = playing_state(GameConfig::default(), 1);
        tick(&mut state, &TickInput::default(), 1.0, &mut NullSink);

        let p = &state.config().player;
        assert_eq!(state.player.speed, p.base_speed + p.acceleration);
        assert_eq!(state.player.distance, p.base_speed + p.acceleration);
        assert_eq!(state.player.x, 0.0);
        assert_eq!(state.elapsed, 1.0);
    }

    #[test]
    fn test_tick_ignores_negative_dt() {
        let (mut state, _) = playing_state(GameConfig::default(), 2);
        let before = state.player.clone();
        tick(&mut state, &TickInput::default(), -0.5, &mut NullSink);
        tick(&mut state, &TickInput::default(), f32::NAN, &mut NullSink);
        assert_eq!(state.player.distance, before.distance);
        assert_eq!(state.elapsed, 0.0);
    }

    #[test]
    fn test_tick_collects_coin() {
        let (mut state, _) = playing_state(GameConfig::default(), 3);
        let pos = state.player.pos();
        state.world.insert_coin(pos);

        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        assert_eq!(state.sats, 1);
        assert_eq!(events, vec![GameEvent::CoinsCollected { count: 1, sats: 1 }]);

        // Gone after the first collection
        events.clear();
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        assert_eq!(state.sats, 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_tick_shrub_slowdown_and_cooldown() {
        let (mut state, _) = playing_state(GameConfig::default(), 4);
        let pos = state.player.pos();
        let first = state.world.insert_shrub(pos);
        let second = state.world.insert_shrub(pos + Vec2::new(1.0, 0.0));
        let speed = state.player.speed;
        assert!(speed < state.config().shrubs.fire_speed_threshold);

        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        let slowed = speed * state.config().shrubs.speed_slowdown;
        assert_eq!(state.player.speed, slowed);
        assert_eq!(
            events,
            vec![GameEvent::ShrubThudded {
                id: first,
                speed: slowed
            }]
        );
        assert_eq!(state.player.shrub_cooldown, state.config().shrubs.cooldown);

        // Still overlapping the second shrub, but the cooldown blocks it
        events.clear();
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        assert!(events.is_empty());
        assert_eq!(state.player.speed, slowed);
        let unprocessed = state.world.shrubs().iter().find(|s| s.id == second).unwrap();
        assert!(!unprocessed.processed);

        state.player.shrub_cooldown = 0.0;
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        assert!(matches!(events.as_slice(), [GameEvent::ShrubThudded { id, .. }] if *id == second));
    }

    #[test]
    fn test_tick_shrub_ignites_at_speed() {
        let (mut state, _) = playing_state(GameConfig::default(), 5);
        state.player.speed = state.config().shrubs.fire_speed_threshold;
        let id = state.world.insert_shrub(state.player.pos());

        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        assert_eq!(events, vec![GameEvent::ShrubIgnited { id }]);
        assert_eq!(state.player.speed, state.config().shrubs.fire_speed_threshold);
        let shrub = state.world.shrubs().iter().find(|s| s.id == id).unwrap();
        assert!(shrub.on_fire && shrub.processed);
    }

    #[test]
    fn test_tick_yeti_catch_beats_crash() {
        let (mut state, _) = playing_state(GameConfig::default(), 6);
        let pos = state.player.pos();
        state.world.insert_obstacle(ObstacleKind::Rock, pos);
        state.yeti.activate(pos, 0.0);

        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        assert_eq!(state.phase, GamePhase::Caught);
        assert!(events.contains(&GameEvent::YetiCaught));
        assert!(!events.contains(&GameEvent::ObstacleCrash));
        assert_eq!(state.last_run().map(|r| r.reason), Some(TerminationReason::Yeti));
    }

    #[test]
    fn test_tick_crash_then_restart() {
        let (mut state, _) = playing_state(GameConfig::default(), 7);
        state.world.insert_coin(state.player.pos());
        tick(&mut state, &TickInput::default(), 0.0, &mut NullSink);
        assert_eq!(state.sats, 1);

        state
            .world
            .insert_obstacle(ObstacleKind::PineTree, state.player.pos() + Vec2::new(2.0, 0.0));
        let mut events = Vec::new();
        tick(&mut state, &TickInput::default(), 0.0, &mut events);
        assert_eq!(state.phase, GamePhase::Crashed);
        assert_eq!(events[0], GameEvent::ObstacleCrash);
        let GameEvent::RunEnded(stats) = &events[1] else {
            panic!("expected RunEnded, got {:?}", events[1]);
        };
        assert_eq!(stats.sats, 1);
        assert_eq!(stats.reason, TerminationReason::Obstacle);

        // Frozen until confirm
        let distance = state.player.distance;
        tick(&mut state, &TickInput::default(), 1.0, &mut NullSink);
        assert_eq!(state.player.distance, distance);

        tick(&mut state, &CONFIRM, NOMINAL_DT, &mut NullSink);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.run, 2);
        assert_eq!(state.sats, 0);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.player.distance, 0.0);
        assert_eq!(state.last_run().map(|r| r.run), Some(1));
    }

    #[test]
    fn test_tick_without_yeti_runs_long() {
        let mut config = GameConfig::default();
        config.yeti.game_spawn_probability = 0.0;
        config.obstacles.probability = 0.0;
        let (mut state, _) = playing_state(config, 8);

        let mut events = Vec::new();
        for _ in 0..(120.0 / NOMINAL_DT) as usize {
            tick(&mut state, &TickInput::default(), NOMINAL_DT, &mut events);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!events.contains(&GameEvent::YetiAppeared));
        assert!(state.snapshot().yeti.is_none());
        assert!(state.player.distance > 2000.0);
    }

    #[test]
    fn test_determinism() {
        let run = |seed| {
            let mut state = GameState::new(GameConfig::default(), seed);
            let mut events = Vec::new();
            tick(&mut state, &CONFIRM, NOMINAL_DT, &mut events);
            for i in 0..900 {
                let input = TickInput {
                    left: i % 120 < 40,
                    right: i % 120 >= 80,
                    confirm: false,
                };
                tick(&mut state, &input, NOMINAL_DT, &mut events);
            }
            let snapshot = serde_json::to_string(&state.snapshot()).unwrap();
            (snapshot, events)
        };

        assert_eq!(run(99999), run(99999));
        assert_ne!(run(99999).0, run(11111).0);
    }
}
