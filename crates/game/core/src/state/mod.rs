//! World state: the board plus the actor table, and every movement
//! primitive the resolvers compose.
//!
//! Push chains, tile interaction and destruction attribution live here so
//! each phase resolver stays a thin loop over the table.

pub mod actor;

pub use actor::ActorState;

use crate::board::{BoardManager, FloorKind, MoveCheck, WallKind};
use crate::common::{ActorId, Orientation, Position, Rotation};
use crate::config::{GameConfig, GameSettings};
use crate::events::{ActorPose, DamageReason, GameEvent};

/// Result of a forward step attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    pub moved: bool,
    /// The step went up a ramp and consumed the extra force.
    pub used_ramp: bool,
}

impl MoveOutcome {
    const BLOCKED: MoveOutcome = MoveOutcome {
        moved: false,
        used_ramp: false,
    };
}

/// Board, actors and the pending event queue.
#[derive(Debug)]
pub struct World {
    pub board: BoardManager,
    actors: Vec<ActorState>,
    pub settings: GameSettings,
    /// Current register phase, 1-based. Phase-gated tiles consult this.
    pub phase: u8,
    events: Vec<GameEvent>,
}

impl World {
    pub fn new(board: BoardManager, settings: GameSettings) -> Self {
        Self {
            board,
            actors: Vec::new(),
            settings,
            phase: 1,
            events: Vec::new(),
        }
    }

    /// Register a robot at its starting point.
    pub fn add_actor(&mut self, position: Position, direction: Orientation) -> ActorId {
        let id = ActorId(self.actors.len() as u8);
        let mut actor = ActorState::new(position, direction, self.settings.effective_starting_lives());
        actor.is_virtual = self.settings.virtual_mode;
        if !actor.is_virtual {
            self.board.place_occupant(position, id);
        }
        self.actors.push(actor);
        id
    }

    pub fn actor(&self, id: ActorId) -> &ActorState {
        &self.actors[id.index()]
    }

    pub fn actor_mut(&mut self, id: ActorId) -> &mut ActorState {
        &mut self.actors[id.index()]
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = ActorId> + use<> {
        (0..self.actors.len() as u8).map(ActorId)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn pose(&self, id: ActorId) -> Option<ActorPose> {
        let actor = self.actor(id);
        actor.position.map(|position| ActorPose {
            actor: id,
            position,
            direction: actor.direction,
        })
    }

    // ------------------------------------------------------------------
    // Movement primitives
    // ------------------------------------------------------------------

    /// Turn in place and re-run the tile interaction; rotating on a
    /// hazard still burns.
    pub fn rotate(&mut self, id: ActorId, rotation: Rotation) {
        if self.actor(id).destroyed || self.actor(id).falling || rotation == Rotation::None {
            return;
        }
        let direction = self.actor(id).direction.rotated(rotation);
        self.actor_mut(id).direction = direction;
        self.emit(GameEvent::ActorRotated {
            actor: id,
            direction,
        });
        self.check_tile_interaction(id, direction);
    }

    /// One step along the current facing with the given movement force.
    pub fn move_forward(&mut self, id: ActorId, force: u8) -> MoveOutcome {
        let direction = self.actor(id).direction;
        self.try_move(id, direction, force, true)
    }

    /// One step against the facing, without turning.
    pub fn move_backward(&mut self, id: ActorId) -> bool {
        let direction = self.actor(id).direction.opposite();
        self.try_move(id, direction, 1, true).moved
    }

    /// Shove an actor one tile. Records who is ultimately responsible so
    /// a kill down the chain credits the original pusher.
    pub fn push_to(&mut self, id: ActorId, direction: Orientation, pushed_by: ActorId) -> bool {
        if self.actor(id).falling || self.settings.pushing_disabled {
            return false;
        }
        self.actor_mut(id).pushed_by = Some(pushed_by);
        self.try_move(id, direction, 1, true).moved
    }

    /// A board pusher shoves the actor. Nobody takes credit for the shove
    /// itself, but a chain started by it blames the shoved robot.
    pub fn push_by_wall(&mut self, id: ActorId, direction: Orientation) -> bool {
        if self.actor(id).falling || self.settings.pushing_disabled {
            return false;
        }
        self.actor_mut(id).pushed_by = None;
        self.try_move(id, direction, 1, true).moved
    }

    /// Belt/oil transport: stops at walls and robots instead of pushing.
    pub fn slide_to(&mut self, id: ActorId, direction: Orientation) -> bool {
        if self.actor(id).falling || self.actor(id).destroyed {
            return false;
        }
        let Some(from) = self.actor(id).position else {
            return false;
        };
        if self.board.can_move(from, direction) != MoveCheck::Allowed {
            return false;
        }
        self.place_and_interact(id, from.step(direction), direction);
        self.apply_edge_fall(id, from.step(direction), direction);
        true
    }

    fn try_move(
        &mut self,
        id: ActorId,
        direction: Orientation,
        force: u8,
        allow_push: bool,
    ) -> MoveOutcome {
        let actor = self.actor(id);
        if actor.falling || actor.destroyed {
            return MoveOutcome::BLOCKED;
        }
        let Some(from) = actor.position else {
            return MoveOutcome::BLOCKED;
        };
        let is_virtual = actor.is_virtual;

        match self.board.can_move(from, direction) {
            MoveCheck::BlockedByWall => return MoveOutcome::BLOCKED,
            MoveCheck::Occupied(other) => {
                // virtual robots move through, everyone else pushes
                if !is_virtual {
                    if !allow_push {
                        return MoveOutcome::BLOCKED;
                    }
                    let pusher = self.actor(id).pushed_by.unwrap_or(id);
                    if !self.push_to(other, direction, pusher) {
                        return MoveOutcome::BLOCKED;
                    }
                }
            }
            MoveCheck::Allowed => {}
        }

        let mut used_ramp = false;
        if self.board.tile_at(from).wall(direction) == WallKind::Ramp {
            if force < 2 {
                return MoveOutcome::BLOCKED;
            }
            used_ramp = true;
        }

        let to = from.step(direction);
        self.place_and_interact(id, to, direction);
        self.apply_edge_fall(id, to, direction);

        MoveOutcome {
            moved: true,
            used_ramp,
        }
    }

    /// Dropping in behind an edge wall hurts.
    fn apply_edge_fall(&mut self, id: ActorId, to: Position, direction: Orientation) {
        if self.board.tile_at(to).wall(direction.opposite()) == WallKind::Edge {
            self.apply_damage(id, DamageReason::Falling);
            self.apply_damage(id, DamageReason::Falling);
        }
    }

    /// Move the registration and run arrival effects.
    pub(crate) fn place_and_interact(&mut self, id: ActorId, to: Position, direction: Orientation) {
        self.place(id, to);
        self.check_tile_interaction(id, direction);
    }

    fn place(&mut self, id: ActorId, to: Position) {
        let is_virtual = self.actor(id).is_virtual;
        let old = self.actor(id).position;
        if !is_virtual {
            if let Some(old) = old
                && self.board.occupant_at(old) == Some(id)
            {
                self.board.remove_occupant(old);
            }
            self.board.place_occupant(to, id);
        }
        let direction = self.actor(id).direction;
        self.actor_mut(id).position = Some(to);
        self.emit(GameEvent::ActorMoved {
            actor: id,
            position: to,
            direction,
        });
    }

    /// Place without movement semantics, used for setup and resurrection.
    pub fn place_silently(&mut self, id: ActorId, to: Position) {
        self.place(id, to);
    }

    /// Arrival effects of the tile under the actor, in fixed order:
    /// trapdoors and pits, hazard floors, teleporters, then fire walls of
    /// the entered tile.
    pub fn check_tile_interaction(&mut self, id: ActorId, move_direction: Orientation) {
        self.tile_interaction(id, move_direction, true);
    }

    fn tile_interaction(&mut self, id: ActorId, move_direction: Orientation, allow_teleport: bool) {
        let Some(position) = self.actor(id).position else {
            return;
        };
        let tile = self.board.tile_at(position);
        let phase = self.phase;

        match tile.floor {
            FloorKind::AutoPit if !tile.floor_active_in(phase) => self.fall(id),
            FloorKind::Pit | FloorKind::WaterPit | FloorKind::HazardPit | FloorKind::Edge => {
                self.fall(id)
            }
            FloorKind::Hazard => self.apply_damage(id, DamageReason::Hazard),
            FloorKind::Teleporter if allow_teleport => {
                // two more cells along the arrival direction; the landing
                // tile takes full effect except for chaining teleporters
                let target = position.step_by(move_direction, 2);
                self.place(id, target);
                self.tile_interaction(id, move_direction, false);
                return;
            }
            _ => {}
        }

        let fire_active = Orientation::ALL.into_iter().any(|side| {
            tile.wall(side) == WallKind::Fire && tile.wall_active_in(side, phase)
        });
        if fire_active {
            self.apply_damage(id, DamageReason::Flame);
        }
    }

    // ------------------------------------------------------------------
    // Damage and destruction
    // ------------------------------------------------------------------

    pub fn apply_damage(&mut self, id: ActorId, reason: DamageReason) {
        if self.actor(id).destroyed {
            return;
        }
        if self.settings.invulnerable {
            self.actor_mut(id).damage = 0;
        } else {
            self.actor_mut(id).damage += 1;
        }
        self.emit(GameEvent::ActorDamaged {
            actor: id,
            reason,
            damage: self.actor(id).damage,
        });
        self.check_destruction(id);
    }

    /// Direct token write, bypassing invulnerability. Crushers and the
    /// falling finish use this.
    pub fn set_damage(&mut self, id: ActorId, damage: u8) {
        self.actor_mut(id).damage = damage;
        self.check_destruction(id);
    }

    pub fn repair(&mut self, id: ActorId, amount: u8) {
        let actor = self.actor_mut(id);
        actor.damage = actor.damage.saturating_sub(amount);
        let damage = actor.damage;
        self.emit(GameEvent::ActorRepaired { actor: id, damage });
    }

    /// Doom the actor: damage goes to one below the threshold and the
    /// falling flag lets presentation animate the drop before the stage
    /// barrier finishes it off.
    pub fn fall(&mut self, id: ActorId) {
        let actor = self.actor_mut(id);
        if actor.falling || actor.destroyed {
            return;
        }
        actor.falling = true;
        actor.damage = GameConfig::MAX_DAMAGE_TOKENS - 1;
        self.emit(GameEvent::ActorFalling { actor: id });
    }

    /// Called when a stage barrier releases: every falling robot is done
    /// animating and dies now.
    pub fn finish_falling(&mut self) {
        for id in self.ids().collect::<Vec<_>>() {
            if self.actor(id).falling && !self.actor(id).destroyed {
                self.set_damage(id, GameConfig::MAX_DAMAGE_TOKENS);
            }
        }
    }

    fn check_destruction(&mut self, id: ActorId) {
        if self.actor(id).damage < GameConfig::MAX_DAMAGE_TOKENS || self.actor(id).destroyed {
            return;
        }

        let (was_falling, position, is_virtual, had_flag) = {
            let actor = self.actor_mut(id);
            let was_falling = actor.falling;
            actor.destroyed = true;
            actor.falling = false;
            actor.deaths += 1;
            (was_falling, actor.position, actor.is_virtual, actor.has_flag)
        };

        if self.actor(id).lives > 0 && !self.settings.infinite_lives {
            self.actor_mut(id).lives -= 1;
        }

        if let Some(position) = position {
            if !is_virtual && self.board.occupant_at(position) == Some(id) {
                self.board.remove_occupant(position);
            }
            self.emit(GameEvent::ActorDestroyed {
                actor: id,
                position,
            });
            if had_flag {
                self.actor_mut(id).has_flag = false;
                let floor = self.board.tile_at(position).floor;
                if floor.is_pit() || floor == FloorKind::Edge || floor == FloorKind::AutoPit {
                    self.board.reset_king_flag();
                } else {
                    self.board.drop_king_flag(position);
                }
                self.emit(GameEvent::KingFlagDropped {
                    position: self.board.king_flag_position(),
                });
            }
        }
        self.actor_mut(id).position = None;

        if self.actor(id).is_dead() {
            self.emit(GameEvent::ActorDead { actor: id });
        }

        // exactly one of suicide, shooter kill, pusher kill
        let shot_by = self.actor(id).shot_by;
        let pushed_by = self.actor(id).pushed_by;
        match (shot_by, pushed_by) {
            (Some(shooter), _) if !was_falling => self.actor_mut(shooter).kills += 1,
            (_, Some(pusher)) => self.actor_mut(pusher).kills += 1,
            (Some(_), None) => self.actor_mut(id).suicides += 1,
            (None, None) => self.actor_mut(id).suicides += 1,
        }
    }

    /// Bring a destroyed robot back onto the board.
    pub fn resurrect_at(&mut self, id: ActorId, position: Position, direction: Orientation) {
        {
            let actor = self.actor_mut(id);
            actor.destroyed = false;
            actor.falling = false;
            actor.direction = direction;
            actor.powered_down = false;
            actor.pushed_by = None;
            actor.shot_by = None;
        }
        self.actor_mut(id).is_virtual = self.settings.virtual_mode;
        if !self.actor(id).is_virtual {
            self.board.place_occupant(position, id);
        }
        self.actor_mut(id).position = Some(position);
        self.set_damage(id, self.settings.damage_on_resurrect);
        self.emit(GameEvent::ActorResurrected {
            actor: id,
            position,
            direction,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::scenario::{BoardRotation, Scenario, SubBoard};
    use crate::board::tile::Tile;

    pub(crate) fn open_world(width: i32, height: i32) -> World {
        open_world_with(width, height, GameSettings::default(), |_| {})
    }

    pub(crate) fn open_world_with(
        width: i32,
        height: i32,
        settings: GameSettings,
        customize: impl FnOnce(&mut Vec<Tile>),
    ) -> World {
        let mut tiles = vec![Tile::default(); (width * height) as usize];
        customize(&mut tiles);
        let scenario = Scenario {
            name: "test".into(),
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
        World::new(BoardManager::new(scenario).unwrap(), settings)
    }

    #[test]
    fn forward_moves_along_facing() {
        let mut world = open_world(5, 5);
        let id = world.add_actor(Position::new(2, 2), Orientation::East);

        let outcome = world.move_forward(id, 1);
        assert!(outcome.moved);
        assert_eq!(world.actor(id).position, Some(Position::new(3, 2)));
        assert_eq!(world.board.occupant_at(Position::new(3, 2)), Some(id));
        assert_eq!(world.board.occupant_at(Position::new(2, 2)), None);
    }

    #[test]
    fn backward_keeps_facing() {
        let mut world = open_world(5, 5);
        let id = world.add_actor(Position::new(2, 2), Orientation::North);

        assert!(world.move_backward(id));
        assert_eq!(world.actor(id).position, Some(Position::new(2, 3)));
        assert_eq!(world.actor(id).direction, Orientation::North);
    }

    #[test]
    fn push_chain_moves_every_robot_once() {
        let mut world = open_world(6, 1);
        let a = world.add_actor(Position::new(0, 0), Orientation::East);
        let b = world.add_actor(Position::new(1, 0), Orientation::North);
        let c = world.add_actor(Position::new(2, 0), Orientation::South);

        assert!(world.move_forward(a, 1).moved);
        assert_eq!(world.actor(a).position, Some(Position::new(1, 0)));
        assert_eq!(world.actor(b).position, Some(Position::new(2, 0)));
        assert_eq!(world.actor(c).position, Some(Position::new(3, 0)));
        // everyone in the chain blames the original mover
        assert_eq!(world.actor(b).pushed_by, Some(a));
        assert_eq!(world.actor(c).pushed_by, Some(a));
    }

    #[test]
    fn push_off_the_board_dooms_the_target() {
        let mut world = open_world(2, 1);
        let a = world.add_actor(Position::new(0, 0), Orientation::East);
        let b = world.add_actor(Position::new(1, 0), Orientation::North);

        // b cannot leave the board eastwards without falling, but there is
        // no wall, so the push succeeds onto the edge and b falls
        assert!(world.move_forward(a, 1).moved);
        assert!(world.actor(b).falling);
    }

    #[test]
    fn pushing_disabled_turns_robots_into_walls() {
        let settings = GameSettings {
            pushing_disabled: true,
            ..GameSettings::default()
        };
        let mut world = open_world_with(4, 1, settings, |_| {});
        let a = world.add_actor(Position::new(0, 0), Orientation::East);
        let _b = world.add_actor(Position::new(1, 0), Orientation::North);

        assert!(!world.move_forward(a, 1).moved);
        assert_eq!(world.actor(a).position, Some(Position::new(0, 0)));
    }

    #[test]
    fn virtual_robots_move_through_others() {
        let settings = GameSettings {
            virtual_mode: true,
            ..GameSettings::default()
        };
        let mut world = open_world_with(4, 1, settings, |_| {});
        let a = world.add_actor(Position::new(0, 0), Orientation::East);
        world.actor_mut(a).is_virtual = true;
        // a real robot in the way
        let b = world.add_actor(Position::new(1, 0), Orientation::North);
        world.actor_mut(b).is_virtual = false;
        world.board.place_occupant(Position::new(1, 0), b);

        assert!(world.move_forward(a, 1).moved);
        assert_eq!(world.actor(a).position, Some(Position::new(1, 0)));
        assert_eq!(world.actor(b).position, Some(Position::new(1, 0)));
    }

    #[test]
    fn ramp_requires_extra_force() {
        let mut world = open_world_with(3, 1, GameSettings::default(), |tiles| {
            tiles[0] = Tile::default().with_wall(Orientation::East, WallKind::Ramp);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::East);

        let outcome = world.move_forward(id, 1);
        assert!(!outcome.moved);

        let outcome = world.move_forward(id, 2);
        assert!(outcome.moved);
        assert!(outcome.used_ramp);
    }

    #[test]
    fn pit_arrival_starts_falling() {
        let mut world = open_world_with(3, 1, GameSettings::default(), |tiles| {
            tiles[1] = Tile::new(FloorKind::Pit, Orientation::North);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::East);

        assert!(world.move_forward(id, 1).moved);
        assert!(world.actor(id).falling);
        assert_eq!(
            world.actor(id).damage,
            GameConfig::MAX_DAMAGE_TOKENS - 1
        );
        assert!(!world.actor(id).destroyed);

        world.finish_falling();
        assert!(world.actor(id).destroyed);
        assert_eq!(world.actor(id).position, None);
    }

    #[test]
    fn teleporter_jumps_two_cells_without_chaining() {
        let mut world = open_world_with(6, 1, GameSettings::default(), |tiles| {
            tiles[1] = Tile::new(FloorKind::Teleporter, Orientation::North);
            // landing on another teleporter must not chain
            tiles[3] = Tile::new(FloorKind::Teleporter, Orientation::North);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::East);

        assert!(world.move_forward(id, 1).moved);
        assert_eq!(world.actor(id).position, Some(Position::new(3, 0)));
    }

    #[test]
    fn teleporter_landing_tile_takes_effect() {
        let mut world = open_world_with(6, 1, GameSettings::default(), |tiles| {
            tiles[1] = Tile::new(FloorKind::Teleporter, Orientation::North);
            tiles[3] = Tile::new(FloorKind::Pit, Orientation::North);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::East);

        assert!(world.move_forward(id, 1).moved);
        assert_eq!(world.actor(id).position, Some(Position::new(3, 0)));
        assert!(world.actor(id).falling);
    }

    #[test]
    fn falling_robot_keeps_its_facing() {
        let mut world = open_world_with(3, 1, GameSettings::default(), |tiles| {
            tiles[1] = Tile::new(FloorKind::Pit, Orientation::North);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::East);
        assert!(world.move_forward(id, 1).moved);
        assert!(world.actor(id).falling);

        world.rotate(id, Rotation::Right);
        assert_eq!(world.actor(id).direction, Orientation::East);
    }

    #[test]
    fn hazard_burns_on_rotation_too() {
        let mut world = open_world_with(3, 1, GameSettings::default(), |tiles| {
            tiles[0] = Tile::new(FloorKind::Hazard, Orientation::North);
        });
        let id = world.add_actor(Position::new(0, 0), Orientation::East);

        world.rotate(id, Rotation::Left);
        assert_eq!(world.actor(id).damage, 1);
    }

    #[test]
    fn destruction_attribution_is_exclusive() {
        // suicide: no backrefs
        let mut world = open_world(3, 1);
        let id = world.add_actor(Position::new(0, 0), Orientation::East);
        world.set_damage(id, GameConfig::MAX_DAMAGE_TOKENS);
        assert_eq!(world.actor(id).suicides, 1);

        // shooter kill
        let mut world = open_world(3, 1);
        let victim = world.add_actor(Position::new(0, 0), Orientation::East);
        let shooter = world.add_actor(Position::new(2, 0), Orientation::West);
        world.actor_mut(victim).shot_by = Some(shooter);
        world.set_damage(victim, GameConfig::MAX_DAMAGE_TOKENS);
        assert_eq!(world.actor(shooter).kills, 1);
        assert_eq!(world.actor(victim).suicides, 0);

        // pusher kill on a falling death, even with a shooter on record
        let mut world = open_world(3, 1);
        let victim = world.add_actor(Position::new(0, 0), Orientation::East);
        let shooter = world.add_actor(Position::new(2, 0), Orientation::West);
        let pusher = world.add_actor(Position::new(1, 0), Orientation::West);
        world.actor_mut(victim).shot_by = Some(shooter);
        world.actor_mut(victim).pushed_by = Some(pusher);
        world.fall(victim);
        world.finish_falling();
        assert_eq!(world.actor(pusher).kills, 1);
        assert_eq!(world.actor(shooter).kills, 0);
    }

    #[test]
    fn lives_decrement_until_dead() {
        let mut world = open_world(3, 1);
        let id = world.add_actor(Position::new(0, 0), Orientation::East);
        world.actor_mut(id).lives = 1;

        world.set_damage(id, GameConfig::MAX_DAMAGE_TOKENS);
        assert!(world.actor(id).is_dead());
        assert!(
            world
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::ActorDead { .. }))
        );
    }

    #[test]
    fn resurrection_restores_board_presence() {
        let mut world = open_world(3, 3);
        let id = world.add_actor(Position::new(0, 0), Orientation::East);
        world.set_damage(id, GameConfig::MAX_DAMAGE_TOKENS);
        assert!(world.actor(id).destroyed);

        world.resurrect_at(id, Position::new(1, 1), Orientation::South);
        let actor = world.actor(id);
        assert!(!actor.destroyed);
        assert_eq!(actor.position, Some(Position::new(1, 1)));
        assert_eq!(actor.damage, world.settings.damage_on_resurrect);
        assert_eq!(world.board.occupant_at(Position::new(1, 1)), Some(id));
    }
}
