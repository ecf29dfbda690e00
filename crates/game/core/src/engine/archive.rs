//! End-of-phase archive updates and mode scoring.
//!
//! Runs after all board elements of a phase resolved: repair sites
//! re-anchor the archive marker, flags advance the hunt, and the king
//! modes hand out their points.

use crate::common::ActorId;
use crate::config::GameMode;
use crate::events::GameEvent;
use crate::state::World;

pub fn resolve(world: &mut World) {
    for id in world.ids().collect::<Vec<_>>() {
        if !world.actor(id).is_active() {
            continue;
        }
        update_archive_marker(world, id);
        match world.settings.mode {
            GameMode::HuntTheFlag => touch_flags(world, id),
            GameMode::KingOfTheFlag => score_king_flag(world, id),
            GameMode::KingOfTheHill => score_king_hill(world, id),
            GameMode::DeadOrAlive => {}
        }
    }
}

fn update_archive_marker(world: &mut World, id: ActorId) {
    let Some(position) = world.actor(id).position else {
        return;
    };
    if !world.board.tile_at(position).floor.is_repair() {
        return;
    }
    if world.actor(id).archive_marker != position {
        world.actor_mut(id).archive_marker = position;
        world.emit(GameEvent::ArchiveMarkerMoved {
            actor: id,
            position,
        });
    }
}

fn touch_flags(world: &mut World, id: ActorId) {
    let Some(position) = world.actor(id).position else {
        return;
    };
    let Some(flag) = world
        .board
        .flags()
        .iter()
        .find(|flag| flag.position == position)
        .copied()
    else {
        return;
    };

    // any flag re-anchors the marker, only the hunted one scores
    if world.actor(id).archive_marker != position {
        world.actor_mut(id).archive_marker = position;
        world.emit(GameEvent::ArchiveMarkerMoved {
            actor: id,
            position,
        });
    }
    if flag.number == world.actor(id).next_flag_goal {
        let next_flag = flag.number + 1;
        world.actor_mut(id).next_flag_goal = next_flag;
        world.emit(GameEvent::FlagGoalChanged {
            actor: id,
            next_flag,
        });
    }
}

fn score_king_flag(world: &mut World, id: ActorId) {
    let Some(position) = world.actor(id).position else {
        return;
    };
    if world.board.king_flag_dropped() && world.board.king_flag_position() == position {
        world.board.pickup_king_flag();
        world.actor_mut(id).has_flag = true;
        world.emit(GameEvent::KingFlagPickedUp { actor: id });
    }
    if world.actor(id).has_flag {
        award_point(world, id);
    }
}

fn score_king_hill(world: &mut World, id: ActorId) {
    if world.actor(id).position == Some(world.board.king_hill_position()) {
        award_point(world, id);
    }
}

fn award_point(world: &mut World, id: ActorId) {
    let points = world.actor(id).king_points + 1;
    world.actor_mut(id).king_points = points;
    world.emit(GameEvent::KingPointsChanged { actor: id, points });
}
