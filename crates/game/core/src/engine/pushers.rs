//! Pusher walls and crushers.
//!
//! An active pusher shoves the robot off its wall; a robot that cannot
//! give way takes the hit instead. Crushers flatten whoever is under them
//! outright.

use super::card_moves::slide_over_oil;
use crate::board::WallKind;
use crate::common::Orientation;
use crate::events::DamageReason;
use crate::state::World;

pub fn resolve_pushers(world: &mut World) {
    let phase = world.phase;
    for id in world.ids().collect::<Vec<_>>() {
        let actor = world.actor(id);
        if actor.destroyed {
            continue;
        }
        let Some(position) = actor.position else {
            continue;
        };

        let tile = world.board.tile_at(position);
        let Some(side) = Orientation::ALL.into_iter().find(|side| {
            tile.wall(*side) == WallKind::Pusher && tile.wall_active_in(*side, phase)
        }) else {
            continue;
        };

        let direction = side.opposite();
        if world.push_by_wall(id, direction) {
            slide_over_oil(world, id, direction);
        } else {
            world.apply_damage(id, DamageReason::Pusher);
        }
    }
}

pub fn resolve_crushers(world: &mut World) {
    let phase = world.phase;
    for id in world.ids().collect::<Vec<_>>() {
        let actor = world.actor(id);
        if actor.destroyed {
            continue;
        }
        let Some(position) = actor.position else {
            continue;
        };

        let tile = world.board.tile_at(position);
        let crushed = Orientation::ALL
            .into_iter()
            .any(|side| tile.wall(side).is_crusher() && tile.wall_active_in(side, phase));
        if crushed {
            world.apply_damage(id, DamageReason::Crusher);
            world.set_damage(id, crate::config::GameConfig::MAX_DAMAGE_TOKENS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::scenario::{BoardRotation, Scenario, SubBoard};
    use crate::board::tile::{PhaseMask, Tile};
    use crate::board::BoardManager;
    use crate::common::Position;
    use crate::config::GameSettings;

    fn pusher_world(width: i32, height: i32, customize: impl FnOnce(&mut Vec<Tile>)) -> World {
        let mut tiles = vec![Tile::default(); (width * height) as usize];
        customize(&mut tiles);
        let scenario = Scenario {
            name: "pushers".into(),
            width,
            height,
            boards: vec![SubBoard {
                name: "main".into(),
                grid_position: Position::new(0, 0),
                width,
                height,
                rotation: BoardRotation::None,
                tiles,
            }],
            starting_points: Vec::new(),
            starting_points_deathmatch: Vec::new(),
            flags: Vec::new(),
            king_of_flag_point: Position::new(0, 0),
            king_of_hill_point: Position::new(0, 0),
            start_orientation: Orientation::North,
            max_players: 8,
        };
        World::new(
            BoardManager::new(scenario).unwrap(),
            GameSettings::default(),
        )
    }

    #[test]
    fn pusher_shoves_away_from_its_wall() {
        let mut world = pusher_world(3, 1, |tiles| {
            tiles[0] = Tile::default().with_wall(Orientation::West, WallKind::Pusher);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::North);

        resolve_pushers(&mut world);
        assert_eq!(world.actor(id).position, Some(Position::new(1, 0)));
        assert_eq!(world.actor(id).damage, 0);
    }

    #[test]
    fn blocked_push_hurts_instead() {
        let mut world = pusher_world(2, 1, |tiles| {
            tiles[0] = Tile::default()
                .with_wall(Orientation::West, WallKind::Pusher)
                .with_wall(Orientation::East, WallKind::Standard);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::North);

        resolve_pushers(&mut world);
        assert_eq!(world.actor(id).position, Some(Position::new(0, 0)));
        assert_eq!(world.actor(id).damage, 1);
    }

    #[test]
    fn pusher_waits_for_its_phase() {
        let mut world = pusher_world(3, 1, |tiles| {
            tiles[0] = Tile::default().with_wall_phases(
                Orientation::West,
                WallKind::Pusher,
                PhaseMask::PHASE_2 | PhaseMask::PHASE_4,
            );
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::North);

        world.phase = 1;
        resolve_pushers(&mut world);
        assert_eq!(world.actor(id).position, Some(Position::new(0, 0)));

        world.phase = 2;
        resolve_pushers(&mut world);
        assert_eq!(world.actor(id).position, Some(Position::new(1, 0)));
    }

    #[test]
    fn pushed_chain_kill_blames_the_first_victim() {
        // a pusher shoves a into b, b drops off the open board end
        let mut world = pusher_world(2, 1, |tiles| {
            tiles[0] = Tile::default().with_wall(Orientation::West, WallKind::Pusher);
        });
        let a = world.add_actor(Position::new(0, 0), Orientation::North);
        let b = world.add_actor(Position::new(1, 0), Orientation::North);

        resolve_pushers(&mut world);
        world.finish_falling();
        assert!(world.actor(b).destroyed);
        assert_eq!(world.actor(a).kills, 1);
    }

    #[test]
    fn crusher_destroys_outright() {
        let mut world = pusher_world(2, 1, |tiles| {
            tiles[0] = Tile::default().with_wall(Orientation::North, WallKind::CrusherNoWall);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::North);

        resolve_crushers(&mut world);
        assert!(world.actor(id).destroyed);
        assert_eq!(world.actor(id).position, None);
    }
}
