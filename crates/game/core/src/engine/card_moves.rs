//! Program card execution for one register phase.
//!
//! Cards across all robots resolve in ascending priority order. Movement
//! kinds respect water drag and ramp force rules, and a robot ending a
//! move on oil keeps sliding. Each card contributes one animation step
//! holding every pose it changed.

use crate::board::FloorKind;
use crate::cards::{CardKind, GameCard};
use crate::common::{ActorId, Orientation, Rotation};
use crate::events::{ActorPose, CardMoveStep};
use crate::state::World;

/// One robot's card for the current phase.
#[derive(Debug, Clone, Copy)]
pub struct ProgramEntry {
    pub actor: ActorId,
    pub card: GameCard,
}

/// Execute all entries for this phase and return the animation strip.
pub fn resolve(world: &mut World, mut entries: Vec<ProgramEntry>) -> Vec<CardMoveStep> {
    entries.sort_by_key(|entry| entry.card.priority);

    let mut last_poses: Vec<Option<ActorPose>> =
        world.ids().map(|id| world.pose(id)).collect();
    let mut steps = Vec::with_capacity(entries.len());

    for entry in entries {
        execute_card(world, entry.actor, entry.card.kind);

        // diff against the last snapshot so the step carries every robot
        // this card moved, pushed included
        let mut step = CardMoveStep::new();
        for id in world.ids().collect::<Vec<_>>() {
            let pose = world.pose(id);
            if pose != last_poses[id.index()] {
                if let Some(pose) = pose {
                    step.push(pose);
                }
                last_poses[id.index()] = pose;
            }
        }
        steps.push(step);
    }

    steps
}

fn execute_card(world: &mut World, id: ActorId, kind: CardKind) {
    if world.actor(id).destroyed {
        return;
    }
    let Some(position) = world.actor(id).position else {
        return;
    };

    // wheels spin on water and oil: straight moves lose one point of
    // force before they start
    let kind = if world.board.tile_at(position).floor.slows_movement() {
        match kind {
            CardKind::Backward | CardKind::Forward1 => return,
            CardKind::Forward2 => CardKind::Forward1,
            CardKind::Forward3 => CardKind::Forward2,
            other => other,
        }
    } else {
        kind
    };

    let slide_direction = match kind {
        CardKind::TurnLeft => {
            world.rotate(id, Rotation::Left);
            None
        }
        CardKind::TurnRight => {
            world.rotate(id, Rotation::Right);
            None
        }
        CardKind::UTurn => {
            world.rotate(id, Rotation::Left);
            world.rotate(id, Rotation::Left);
            None
        }
        CardKind::Backward => {
            let direction = world.actor(id).direction.opposite();
            world.move_backward(id);
            Some(direction)
        }
        CardKind::Forward1 => {
            world.move_forward(id, 1);
            Some(world.actor(id).direction)
        }
        CardKind::Forward2 => {
            let first = world.move_forward(id, 2);
            if first.moved && !first.used_ramp {
                world.move_forward(id, 1);
            }
            Some(world.actor(id).direction)
        }
        CardKind::Forward3 => {
            let first = world.move_forward(id, 3);
            let mut second = Default::default();
            if first.moved {
                // a ramp climb eats the surplus force of the whole card
                let force = if first.used_ramp { 1 } else { 2 };
                second = world.move_forward(id, force);
            }
            if first.moved && second.moved && !first.used_ramp && !second.used_ramp {
                world.move_forward(id, 1);
            }
            Some(world.actor(id).direction)
        }
    };

    if let Some(direction) = slide_direction {
        slide_over_oil(world, id, direction);
    }
}

/// Keep sliding while the move ended on oil.
pub(crate) fn slide_over_oil(world: &mut World, id: ActorId, direction: Orientation) {
    loop {
        let Some(position) = world.actor(id).position else {
            return;
        };
        if world.board.tile_at(position).floor != FloorKind::Oil {
            return;
        }
        if !world.slide_to(id, direction) {
            return;
        }
    }
}
