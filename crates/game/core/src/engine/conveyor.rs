//! Conveyor belt resolution.
//!
//! Belts resolve in two passes per phase: express belts first, then both
//! speeds together. All intents are computed up front, conflicting intents
//! cancel, and survivors apply from the back of the list so a chain of
//! riders moves as one.

use crate::board::MoveCheck;
use crate::common::{ActorId, Orientation, Position, Rotation};
use crate::state::World;

/// Which belts move in this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeltPass {
    ExpressOnly,
    All,
}

#[derive(Debug, Clone, Copy)]
struct BeltIntent {
    actor: ActorId,
    destination: Position,
    direction: Orientation,
    rotation: Rotation,
    is_virtual: bool,
}

pub fn resolve(world: &mut World, pass: BeltPass) {
    let phase = world.phase;

    let mut intents = Vec::new();
    for id in world.ids().collect::<Vec<_>>() {
        let actor = world.actor(id);
        if actor.destroyed {
            continue;
        }
        let Some(position) = actor.position else {
            continue;
        };
        let tile = world.board.tile_at(position);
        if !tile.floor.is_belt() || !tile.floor_active_in(phase) {
            continue;
        }
        if pass == BeltPass::ExpressOnly && !tile.floor.is_express_belt() {
            continue;
        }
        if let Some(intent) = belt_intent(world, id, position, pass) {
            intents.push(intent);
        }
    }

    // Two riders aiming at the same tile stand still, unless one of them
    // is virtual; virtual robots do not collide.
    let mut cancelled = vec![false; intents.len()];
    for i in 0..intents.len() {
        for j in (i + 1)..intents.len() {
            if cancelled[i] || cancelled[j] {
                continue;
            }
            if intents[i].destination == intents[j].destination
                && !intents[i].is_virtual
                && !intents[j].is_virtual
            {
                cancelled[i] = true;
                cancelled[j] = true;
            }
        }
    }

    // Tail-first so the front of a belt chain vacates its tile before the
    // rider behind arrives.
    for (index, intent) in intents.iter().enumerate().rev() {
        if cancelled[index] {
            continue;
        }
        // the tile may still be taken when the occupant's own intent was
        // cancelled; the belt stalls rather than stacking robots
        if !intent.is_virtual
            && world
                .board
                .occupant_at(intent.destination)
                .is_some_and(|occupant| occupant != intent.actor)
        {
            continue;
        }
        world.place_and_interact(intent.actor, intent.destination, intent.direction);
        world.rotate(intent.actor, intent.rotation);
    }
}

/// Whether and where the belt under `position` carries its rider.
fn belt_intent(
    world: &World,
    id: ActorId,
    position: Position,
    pass: BeltPass,
) -> Option<BeltIntent> {
    let tile = world.board.tile_at(position);
    let direction = tile.belt_direction()?;
    let destination = position.step(direction);
    let next = world.board.tile_at(destination);

    if world.board.occupant_at(destination).is_some() {
        // the occupant is only tolerated when its own belt carries it
        // away; a belt transporting it straight back at us deadlocks
        let occupant_direction = next.belt_direction()?;
        if occupant_direction == direction.opposite() {
            return None;
        }
    } else if world.board.can_move(position, direction) != MoveCheck::Allowed {
        return None;
    }

    Some(BeltIntent {
        actor: id,
        destination,
        direction,
        rotation: next.belt_rotation(direction, pass == BeltPass::ExpressOnly),
        is_virtual: world.actor(id).is_virtual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::scenario::{BoardRotation, Scenario, SubBoard};
    use crate::board::tile::{FloorKind, Tile};
    use crate::board::BoardManager;
    use crate::config::GameSettings;

    fn belt_world(width: i32, height: i32, customize: impl FnOnce(&mut Vec<Tile>)) -> World {
        let mut tiles = vec![Tile::default(); (width * height) as usize];
        customize(&mut tiles);
        let scenario = Scenario {
            name: "belts".into(),
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
    fn belt_carries_rider_one_tile() {
        let mut world = belt_world(4, 1, |tiles| {
            tiles[1] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
        });
        let id = world.add_actor(Position::new(1, 0), Orientation::North);

        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(id).position, Some(Position::new(2, 0)));
        // straight belts never rotate
        assert_eq!(world.actor(id).direction, Orientation::North);
    }

    #[test]
    fn express_pass_ignores_slow_belts() {
        let mut world = belt_world(4, 1, |tiles| {
            tiles[0] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
            tiles[2] = Tile::new(FloorKind::Belt2Straight, Orientation::East);
        });
        let slow = world.add_actor(Position::new(0, 0), Orientation::North);
        let fast = world.add_actor(Position::new(2, 0), Orientation::North);

        resolve(&mut world, BeltPass::ExpressOnly);
        assert_eq!(world.actor(slow).position, Some(Position::new(0, 0)));
        assert_eq!(world.actor(fast).position, Some(Position::new(3, 0)));
    }

    #[test]
    fn same_destination_intents_cancel() {
        let mut world = belt_world(3, 3, |tiles| {
            // two belts feeding (1, 1) from west and east
            tiles[3] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
            tiles[5] = Tile::new(FloorKind::Belt1Straight, Orientation::West);
        });
        let a = world.add_actor(Position::new(0, 1), Orientation::North);
        let b = world.add_actor(Position::new(2, 1), Orientation::North);

        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(a).position, Some(Position::new(0, 1)));
        assert_eq!(world.actor(b).position, Some(Position::new(2, 1)));
    }

    #[test]
    fn virtual_rider_does_not_conflict() {
        let mut world = belt_world(3, 3, |tiles| {
            tiles[3] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
            tiles[5] = Tile::new(FloorKind::Belt1Straight, Orientation::West);
        });
        let a = world.add_actor(Position::new(0, 1), Orientation::North);
        let b = world.add_actor(Position::new(2, 1), Orientation::North);
        world.actor_mut(b).is_virtual = true;
        world.board.remove_occupant(Position::new(2, 1));

        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(a).position, Some(Position::new(1, 1)));
        assert_eq!(world.actor(b).position, Some(Position::new(1, 1)));
    }

    #[test]
    fn chain_of_riders_moves_together() {
        let mut world = belt_world(4, 1, |tiles| {
            tiles[0] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
            tiles[1] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
        });
        let back = world.add_actor(Position::new(0, 0), Orientation::North);
        let front = world.add_actor(Position::new(1, 0), Orientation::North);

        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(back).position, Some(Position::new(1, 0)));
        assert_eq!(world.actor(front).position, Some(Position::new(2, 0)));
    }

    #[test]
    fn rider_blocked_by_parked_robot() {
        let mut world = belt_world(4, 1, |tiles| {
            tiles[0] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
        });
        let rider = world.add_actor(Position::new(0, 0), Orientation::North);
        let _parked = world.add_actor(Position::new(1, 0), Orientation::North);

        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(rider).position, Some(Position::new(0, 0)));
    }

    #[test]
    fn opposing_belts_stall_head_on() {
        let mut world = belt_world(2, 1, |tiles| {
            tiles[0] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
            tiles[1] = Tile::new(FloorKind::Belt1Straight, Orientation::West);
        });
        let a = world.add_actor(Position::new(0, 0), Orientation::North);
        let b = world.add_actor(Position::new(1, 0), Orientation::North);

        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(a).position, Some(Position::new(0, 0)));
        assert_eq!(world.actor(b).position, Some(Position::new(1, 0)));
    }

    #[test]
    fn curve_rotates_arriving_rider() {
        let mut world = belt_world(3, 3, |tiles| {
            tiles[3] = Tile::new(FloorKind::Belt1Straight, Orientation::East);
            tiles[4] = Tile::new(FloorKind::Belt1CurveRight, Orientation::North);
        });
        let id = world.add_actor(Position::new(0, 1), Orientation::North);

        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(id).position, Some(Position::new(1, 1)));
        assert_eq!(world.actor(id).direction, Orientation::East);
    }

    #[test]
    fn inactive_belt_does_not_move() {
        use crate::board::tile::PhaseMask;
        let mut world = belt_world(3, 1, |tiles| {
            tiles[0] = Tile::new(FloorKind::Belt1Straight, Orientation::East)
                .with_floor_phases(PhaseMask::PHASE_2);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::North);

        world.phase = 1;
        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(id).position, Some(Position::new(0, 0)));

        world.phase = 2;
        resolve(&mut world, BeltPass::All);
        assert_eq!(world.actor(id).position, Some(Position::new(1, 0)));
    }
}
