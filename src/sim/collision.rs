//! Collision queries between the skier and the world streams
//!
//! Everything is a circle-circle overlap in the (lateral, forward) plane,
//! compared on squared distances. The player's forward coordinate is its
//! distance at the moment of the query, with no end-of-tick prediction.

use glam::Vec2;

use super::player::Player;
use super::world::World;
use crate::config::GameConfig;

/// True when two circles whose radii sum to `radius_sum` touch or overlap
#[inline]
pub fn circles_overlap(a: Vec2, b: Vec2, radius_sum: f32) -> bool {
    a.distance_squared(b) <= radius_sum * radius_sum
}

/// Remove every coin touching the player and return how many were taken.
///
/// Removal makes collection idempotent: a coin can only ever count once.
pub fn collect_coins(world: &mut World, player: &Player, config: &GameConfig) -> u32 {
    let reach = config.player.radius + config.coins.collision_radius;
    let pos = player.pos();
    let before = world.coins.len();
    world.coins.retain(|coin| !circles_overlap(coin.pos, pos, reach));
    (before - world.coins.len()) as u32
}

/// Ids of unprocessed shrubs within the shrub contact distance
pub fn shrub_contacts(world: &World, player: &Player, config: &GameConfig) -> Vec<u32> {
    let contact_sq = config.shrubs.contact_distance * config.shrubs.contact_distance;
    let pos = player.pos();
    world
        .shrubs
        .iter()
        .filter(|s| !s.processed && s.pos.distance_squared(pos) < contact_sq)
        .map(|s| s.id)
        .collect()
}

/// Of the given shrub ids, the one closest to the player
pub fn nearest_shrub(world: &World, player: &Player, ids: &[u32]) -> Option<u32> {
    let pos = player.pos();
    world
        .shrubs
        .iter()
        .filter(|s| ids.contains(&s.id))
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.id)
}

/// True if the player overlaps any obstacle or boundary wall
pub fn hits_obstacle(world: &World, player: &Player, config: &GameConfig) -> bool {
    let pos = player.pos();
    let obstacle_reach = config.player.radius + config.obstacles.radius;
    let wall_reach = config.player.radius + config.walls.radius;

    world
        .obstacles
        .iter()
        .any(|o| circles_overlap(o.pos, pos, obstacle_reach))
        || world
            .walls
            .iter()
            .any(|w| circles_overlap(w.pos, pos, wall_reach))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleKind;

    fn setup() -> (GameConfig, World, Player) {
        let config = GameConfig::default();
        let mut player = Player::new(&config);
        player.distance = 100.0;
        (config, World::new(), player)
    }

    #[test]
    fn test_circles_overlap_edges() {
        assert!(circles_overlap(Vec2::ZERO, Vec2::ZERO, 0.0));
        assert!(circles_overlap(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, Vec2::new(3.0, 4.1), 5.0));
    }

    #[test]
    fn test_coin_at_player_collected_once() {
        let (config, mut world, player) = setup();
        world.insert_coin(player.pos());
        world.insert_coin(Vec2::new(30.0, 100.0));

        assert_eq!(collect_coins(&mut world, &player, &config), 1);
        assert_eq!(world.coins().len(), 1);
        assert_eq!(collect_coins(&mut world, &player, &config), 0);
    }

    #[test]
    fn test_coin_reach_is_radius_sum() {
        let (config, mut world, player) = setup();
        let reach = config.player.radius + config.coins.collision_radius;
        world.insert_coin(player.pos() + Vec2::new(reach, 0.0));
        world.insert_coin(player.pos() + Vec2::new(0.0, reach + 0.01));
        assert_eq!(collect_coins(&mut world, &player, &config), 1);
    }

    #[test]
    fn test_shrub_contact_is_tight() {
        let (config, mut world, player) = setup();
        let near = world.insert_shrub(player.pos() + Vec2::new(2.9, 0.0));
        world.insert_shrub(player.pos() + Vec2::new(3.0, 0.0));
        world.insert_shrub(player.pos() + Vec2::new(0.0, 5.0));
        assert_eq!(shrub_contacts(&world, &player, &config), vec![near]);
    }

    #[test]
    fn test_processed_shrubs_ignored() {
        let (config, mut world, player) = setup();
        let id = world.insert_shrub(player.pos());
        world.shrub_mut(id).unwrap().processed = true;
        assert!(shrub_contacts(&world, &player, &config).is_empty());
    }

    #[test]
    fn test_nearest_shrub() {
        let (config, mut world, player) = setup();
        world.insert_shrub(player.pos() + Vec2::new(2.0, 0.0));
        let closest = world.insert_shrub(player.pos() + Vec2::new(0.0, -1.0));
        let ids = shrub_contacts(&world, &player, &config);
        assert_eq!(ids.len(), 2);
        assert_eq!(nearest_shrub(&world, &player, &ids), Some(closest));
        assert_eq!(nearest_shrub(&world, &player, &[]), None);
    }

    #[test]
    fn test_obstacle_and_wall_hits() {
        let (config, mut world, mut player) = setup();
        assert!(!hits_obstacle(&world, &player, &config));

        world.insert_obstacle(ObstacleKind::Rock, player.pos() + Vec2::new(8.9, 0.0));
        assert!(hits_obstacle(&world, &player, &config));

        let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(4);
        world.reset(player.distance, &config, &mut rng);
        world.obstacles.clear();
        // Hugging the right edge runs into the wall fence
        player.x = config.half_width();
        let wall_y = world.walls()[0].pos.y;
        player.distance = wall_y;
        assert!(hits_obstacle(&world, &player, &config));
        player.x = 0.0;
        assert!(!hits_obstacle(&world, &player, &config));
    }
}
