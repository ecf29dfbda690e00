//! Wall lasers and robot-mounted lasers.
//!
//! Wall beams run along their precomputed track and burn the first robot
//! standing in it. Robot lasers fire along the facing until a wall, the
//! board edge or a target stops the beam. Only robot fire records a
//! shooter for kill attribution.

use crate::board::{FloorKind, MoveCheck};
use crate::common::ActorId;
use crate::events::{DamageReason, GameEvent};
use crate::state::World;

pub fn resolve(world: &mut World) {
    resolve_wall_lasers(world);
    resolve_robot_lasers(world);
}

fn resolve_wall_lasers(world: &mut World) {
    let phase = world.phase;
    let lasers: Vec<_> = world.board.lasers().to_vec();

    for laser in lasers {
        if !laser.active.contains_phase(phase) {
            continue;
        }
        let mut position = laser.position;
        loop {
            if let Some(target) = world.board.occupant_at(position) {
                for _ in 0..laser.damage {
                    world.apply_damage(target, DamageReason::Laser);
                }
                break;
            }
            if position == laser.end {
                break;
            }
            position = position.step(laser.direction);
        }
    }
}

fn resolve_robot_lasers(world: &mut World) {
    for shooter in world.ids().collect::<Vec<_>>() {
        let actor = world.actor(shooter);
        if actor.destroyed || actor.powered_down || actor.is_virtual {
            continue;
        }
        let Some(mut position) = actor.position else {
            continue;
        };
        let direction = actor.direction;

        loop {
            match world.board.can_move(position, direction) {
                MoveCheck::BlockedByWall => break,
                MoveCheck::Occupied(target) => {
                    hit(world, shooter, target);
                    break;
                }
                MoveCheck::Allowed => {
                    position = position.step(direction);
                    // the beam drops off the board edge
                    if world.board.tile_at(position).floor == FloorKind::Edge {
                        break;
                    }
                }
            }
        }
    }
}

fn hit(world: &mut World, shooter: ActorId, target: ActorId) {
    // record the shooter first so a lethal hit credits the kill
    world.actor_mut(target).shot_by = Some(shooter);
    if let Some(position) = world.actor(target).position {
        world.emit(GameEvent::ShotFired {
            shooter,
            target: position,
        });
    }
    world.apply_damage(target, DamageReason::Laser);
}
