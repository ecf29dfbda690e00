//! Gear floors rotate whoever stands on them.

use crate::board::FloorKind;
use crate::common::Rotation;
use crate::state::World;

pub fn resolve(world: &mut World) {
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
        if !tile.floor_active_in(phase) {
            continue;
        }
        match tile.floor {
            FloorKind::GearLeft => world.rotate(id, Rotation::Left),
            FloorKind::GearRight => world.rotate(id, Rotation::Right),
            _ => {}
        }
    }
}
