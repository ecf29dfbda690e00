//! Between-rounds housekeeping over the world.

use crate::board::FloorKind;
use crate::state::World;

/// Kill attribution only spans one round.
pub fn reset_attributions(world: &mut World) {
    for id in world.ids().collect::<Vec<_>>() {
        let actor = world.actor_mut(id);
        actor.pushed_by = None;
        actor.shot_by = None;
    }
}

/// Virtual robots materialize once they stand alone on their tile.
pub fn solve_virtual_robots(world: &mut World) {
    for id in world.ids().collect::<Vec<_>>() {
        let actor = world.actor(id);
        if !actor.is_virtual || !actor.is_active() {
            continue;
        }
        let Some(position) = actor.position else {
            continue;
        };
        let alone = world.ids().all(|other| {
            other == id
                || !world.actor(other).is_active()
                || world.actor(other).position != Some(position)
        });
        if alone {
            world.actor_mut(id).is_virtual = false;
            world.board.place_occupant(position, id);
        }
    }
}

/// Round-end repair: one token back for everyone parked on a repair site.
pub fn repair_round_end(world: &mut World) {
    for id in world.ids().collect::<Vec<_>>() {
        let actor = world.actor(id);
        if actor.destroyed || actor.damage == 0 {
            continue;
        }
        let Some(position) = actor.position else {
            continue;
        };
        if world.board.tile_at(position).floor == FloorKind::Repair
            || world.board.tile_at(position).floor == FloorKind::RepairOptions
        {
            world.repair(id, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::scenario::{BoardRotation, Scenario, SubBoard};
    use crate::board::tile::Tile;
    use crate::board::BoardManager;
    use crate::common::{Orientation, Position};
    use crate::config::GameSettings;

    fn cleanup_world(settings: GameSettings, customize: impl FnOnce(&mut Vec<Tile>)) -> World {
        let mut tiles = vec![Tile::default(); 9];
        customize(&mut tiles);
        let scenario = Scenario {
            name: "cleanup".into(),
            width: 3,
            height: 3,
            boards: vec![SubBoard {
                name: "main".into(),
                grid_position: Position::new(0, 0),
                width: 3,
                height: 3,
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
        World::new(BoardManager::new(scenario).unwrap(), settings)
    }

    #[test]
    fn lone_virtual_robot_materializes() {
        let settings = GameSettings {
            virtual_mode: true,
            ..GameSettings::default()
        };
        let mut world = cleanup_world(settings, |_| {});
        let a = world.add_actor(Position::new(0, 0), Orientation::North);
        let b = world.add_actor(Position::new(0, 0), Orientation::North);

        // both share a tile, neither becomes real
        solve_virtual_robots(&mut world);
        assert!(world.actor(a).is_virtual);
        assert!(world.actor(b).is_virtual);

        world.actor_mut(b).position = Some(Position::new(1, 1));
        solve_virtual_robots(&mut world);
        assert!(!world.actor(a).is_virtual);
        assert!(!world.actor(b).is_virtual);
        assert_eq!(world.board.occupant_at(Position::new(0, 0)), Some(a));
    }

    #[test]
    fn repair_site_restores_one_token() {
        let mut world = cleanup_world(GameSettings::default(), |tiles| {
            tiles[0] = Tile::new(crate::board::FloorKind::Repair, Orientation::North);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::North);
        world.actor_mut(id).damage = 3;

        repair_round_end(&mut world);
        assert_eq!(world.actor(id).damage, 2);
    }

    #[test]
    fn attributions_clear_between_rounds() {
        let mut world = cleanup_world(GameSettings::default(), |_| {});
        let a = world.add_actor(Position::new(0, 0), Orientation::North);
        let b = world.add_actor(Position::new(1, 0), Orientation::North);
        world.actor_mut(a).pushed_by = Some(b);
        world.actor_mut(a).shot_by = Some(b);

        reset_attributions(&mut world);
        assert_eq!(world.actor(a).pushed_by, None);
        assert_eq!(world.actor(a).shot_by, None);
    }
}
