//! Endless world generation
//!
//! The slope is five independent 1-D streams laid out along the forward
//! axis. Each probability-gated stream owns a `SpawnCursor`; whenever the
//! player's distance passes the cursor, the cursor steps forward by exactly
//! one interval and one spawn attempt is made at the far edge of the view.
//! Reset uses the same stepping, replayed over the window the player would
//! already have seen, so a fresh run starts fully populated.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{
    BoundaryWall, Coin, Obstacle, ObstacleKind, Shrub, TerrainMarker, WallSide,
};
use crate::config::{GameConfig, SpawnRule};

/// Forward threshold at which a stream makes its next spawn attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnCursor {
    pub next_threshold: f32,
}

impl SpawnCursor {
    pub fn new(next_threshold: f32) -> Self {
        Self { next_threshold }
    }
}

impl Default for SpawnCursor {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// The probability-gated streams (markers use jittered spacing instead)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Obstacles,
    Coins,
    Shrubs,
    Walls,
}

impl Stream {
    pub const ALL: [Stream; 4] = [Stream::Obstacles, Stream::Coins, Stream::Shrubs, Stream::Walls];

    pub fn rule(self, config: &GameConfig) -> SpawnRule {
        match self {
            Stream::Obstacles => config.obstacles.rule(),
            Stream::Coins => config.coins.rule(),
            Stream::Shrubs => config.shrubs.rule(),
            Stream::Walls => config.walls.rule(),
        }
    }
}

/// Catch a stream's cursor up with `player_distance`.
///
/// Every attempt advances the cursor by exactly `rule.interval`, whether or
/// not the probability gate lets an entity through. Surviving attempts are
/// placed at `player_distance + view_distance` with a uniformly random
/// lateral position inside the rule's range clamped to the slope.
pub fn advance_stream<R: Rng + ?Sized>(
    cursor: SpawnCursor,
    player_distance: f32,
    rule: &SpawnRule,
    view_distance: f32,
    half_width: f32,
    rng: &mut R,
) -> (SpawnCursor, Vec<Vec2>) {
    step_stream(
        cursor,
        player_distance,
        player_distance,
        rule,
        view_distance,
        half_width,
        rng,
    )
}

/// `advance_stream` with the start-offset gate checked against `gate_distance`.
///
/// Reset replays attempts at virtual distances behind the start; the gate
/// must still see the real start distance.
fn step_stream<R: Rng + ?Sized>(
    mut cursor: SpawnCursor,
    player_distance: f32,
    gate_distance: f32,
    rule: &SpawnRule,
    view_distance: f32,
    half_width: f32,
    rng: &mut R,
) -> (SpawnCursor, Vec<Vec2>) {
    let mut spawned = Vec::new();
    if !(rule.interval > 0.0) {
        return (cursor, spawned);
    }

    while player_distance >= cursor.next_threshold {
        let next = cursor.next_threshold + rule.interval;
        if next <= cursor.next_threshold {
            // f32 ran out of precision; the stream cannot advance any further
            break;
        }
        cursor.next_threshold = next;

        let roll: f32 = rng.random();
        if gate_distance < rule.start_offset || roll >= rule.probability {
            continue;
        }
        let x = random_lateral(rule.min_x, rule.max_x, half_width, rng);
        spawned.push(Vec2::new(x, player_distance + view_distance));
    }

    (cursor, spawned)
}

/// Uniform lateral position in `[min_x, max_x]` after clamping to the slope
fn random_lateral<R: Rng + ?Sized>(min_x: f32, max_x: f32, half_width: f32, rng: &mut R) -> f32 {
    let lo = min_x.max(-half_width);
    let hi = max_x.min(half_width);
    if hi <= lo {
        return lo.clamp(-half_width, half_width);
    }
    lo + rng.random::<f32>() * (hi - lo)
}

/// All live entities plus the cursors that extend them
#[derive(Debug, Clone, Default)]
pub struct World {
    pub(crate) markers: Vec<TerrainMarker>,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) coins: Vec<Coin>,
    pub(crate) shrubs: Vec<Shrub>,
    pub(crate) walls: Vec<BoundaryWall>,
    /// Forward position of the furthest marker placed so far
    next_marker_y: f32,
    obstacle_cursor: SpawnCursor,
    coin_cursor: SpawnCursor,
    shrub_cursor: SpawnCursor,
    wall_cursor: SpawnCursor,
    next_id: u32,
}

impl World {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Rebuild the world around `start_distance`, fully populated out to the view distance
    pub fn reset<R: Rng + ?Sized>(&mut self, start_distance: f32, config: &GameConfig, rng: &mut R) {
        self.markers.clear();
        self.obstacles.clear();
        self.coins.clear();
        self.shrubs.clear();
        self.walls.clear();

        self.next_marker_y = start_distance;
        self.extend_markers(start_distance, config, rng);

        let view = config.slope.view_distance;
        for stream in Stream::ALL {
            let rule = stream.rule(config);
            let interval = rule.interval.max(f32::EPSILON);
            // Replay the attempts the player would have made over the last view distance
            let mut cursor = SpawnCursor::new(start_distance - view + interval);
            while cursor.next_threshold <= start_distance {
                let virtual_distance = cursor.next_threshold;
                let (next, spawned) = step_stream(
                    cursor,
                    virtual_distance,
                    start_distance,
                    &rule,
                    view,
                    config.half_width(),
                    rng,
                );
                if next == cursor {
                    break;
                }
                cursor = next;
                for pos in spawned {
                    self.materialize(stream, pos, config, rng);
                }
            }
            *self.cursor_mut(stream) = cursor;
        }

        log::debug!(
            "World reset at {:.1}: {} markers, {} obstacles, {} coins, {} shrubs, {} walls",
            start_distance,
            self.markers.len(),
            self.obstacles.len(),
            self.coins.len(),
            self.shrubs.len(),
            self.walls.len()
        );
    }

    /// Per-tick maintenance: prune what fell behind, then spawn what came into view
    pub fn update<R: Rng + ?Sized>(&mut self, player_distance: f32, config: &GameConfig, rng: &mut R) {
        self.prune(player_distance - config.prune_tolerance());
        self.extend_markers(player_distance, config, rng);

        for stream in Stream::ALL {
            let rule = stream.rule(config);
            let (cursor, spawned) = advance_stream(
                self.cursor(stream),
                player_distance,
                &rule,
                config.slope.view_distance,
                config.half_width(),
                rng,
            );
            *self.cursor_mut(stream) = cursor;
            for pos in spawned {
                self.materialize(stream, pos, config, rng);
            }
        }
    }

    /// Drop every entity whose forward position is below `cutoff`
    pub fn prune(&mut self, cutoff: f32) {
        self.markers.retain(|m| m.pos.y >= cutoff);
        self.obstacles.retain(|o| o.pos.y >= cutoff);
        self.coins.retain(|c| c.pos.y >= cutoff);
        self.shrubs.retain(|s| s.pos.y >= cutoff);
        self.walls.retain(|w| w.pos.y >= cutoff);
    }

    /// Markers are never gated; each one lands a jittered spacing past the last
    fn extend_markers<R: Rng + ?Sized>(&mut self, player_distance: f32, config: &GameConfig, rng: &mut R) {
        let limit = player_distance + config.slope.view_distance;
        let m = &config.markers;
        let half = config.half_width();
        while self.next_marker_y < limit {
            let jitter = if m.jitter_max > m.jitter_min {
                rng.random_range(m.jitter_min..m.jitter_max)
            } else {
                m.jitter_min
            };
            let step = (m.spacing * jitter).max(f32::EPSILON);
            let y = self.next_marker_y + step;
            if y <= self.next_marker_y {
                break;
            }
            self.next_marker_y = y;
            let x = random_lateral(-half, half, half, rng);
            self.markers.push(TerrainMarker { pos: Vec2::new(x, y) });
        }
    }

    fn materialize<R: Rng + ?Sized>(&mut self, stream: Stream, pos: Vec2, config: &GameConfig, rng: &mut R) {
        match stream {
            Stream::Obstacles => {
                let kind = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
                self.insert_obstacle(kind, pos);
            }
            Stream::Coins => {
                self.insert_coin(pos);
            }
            Stream::Shrubs => {
                self.insert_shrub(pos);
            }
            Stream::Walls => {
                let x = config.half_width() + config.walls.lateral_offset;
                for (side, x) in [(WallSide::Left, -x), (WallSide::Right, x)] {
                    let id = self.alloc_id();
                    self.walls.push(BoundaryWall {
                        id,
                        side,
                        pos: Vec2::new(x, pos.y),
                    });
                }
            }
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Place an obstacle directly (scripted scenes, tests)
    pub fn insert_obstacle(&mut self, kind: ObstacleKind, pos: Vec2) -> u32 {
        let id = self.alloc_id();
        self.obstacles.push(Obstacle { id, kind, pos });
        id
    }

    /// Place a coin directly (scripted scenes, tests)
    pub fn insert_coin(&mut self, pos: Vec2) -> u32 {
        let id = self.alloc_id();
        self.coins.push(Coin { id, pos });
        id
    }

    /// Place an untouched shrub directly (scripted scenes, tests)
    pub fn insert_shrub(&mut self, pos: Vec2) -> u32 {
        let id = self.alloc_id();
        self.shrubs.push(Shrub {
            id,
            pos,
            on_fire: false,
            processed: false,
        });
        id
    }

    pub fn cursor(&self, stream: Stream) -> SpawnCursor {
        match stream {
            Stream::Obstacles => self.obstacle_cursor,
            Stream::Coins => self.coin_cursor,
            Stream::Shrubs => self.shrub_cursor,
            Stream::Walls => self.wall_cursor,
        }
    }

    fn cursor_mut(&mut self, stream: Stream) -> &mut SpawnCursor {
        match stream {
            Stream::Obstacles => &mut self.obstacle_cursor,
            Stream::Coins => &mut self.coin_cursor,
            Stream::Shrubs => &mut self.shrub_cursor,
            Stream::Walls => &mut self.wall_cursor,
        }
    }

    pub fn markers(&self) -> &[TerrainMarker] {
        &self.markers
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn shrubs(&self) -> &[Shrub] {
        &self.shrubs
    }

    pub fn walls(&self) -> &[BoundaryWall] {
        &self.walls
    }

    pub fn shrub_mut(&mut self, id: u32) -> Option<&mut Shrub> {
        self.shrubs.iter_mut().find(|s| s.id == id)
    }

    /// Forward positions of every live entity, across all streams
    pub fn forward_positions(&self) -> impl Iterator<Item = f32> + '_ {
        self.markers
            .iter()
            .map(|m| m.pos.y)
            .chain(self.obstacles.iter().map(|o| o.pos.y))
            .chain(self.coins.iter().map(|c| c.pos.y))
            .chain(self.shrubs.iter().map(|s| s.pos.y))
            .chain(self.walls.iter().map(|w| w.pos.y))
    }
}
