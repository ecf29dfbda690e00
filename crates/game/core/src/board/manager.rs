//! Spatial queries over a loaded scenario.
//!
//! [`BoardManager`] flattens the placed sub-boards into a per-cell lookup,
//! derives the wall-laser list with precomputed beam ends, and tracks which
//! actor stands on which tile. It answers the single-step legality question
//! every mover (cards, belts, pushers, robot lasers) asks.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::common::{ActorId, Orientation, Position};

use super::scenario::{Scenario, SpecialPoint};
use super::tile::{PhaseMask, Tile, WallKind};

/// Scenario rejected at load time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("scenario contains no sub-boards")]
    NoBoards,
    #[error("sub-board '{name}' has {actual} tiles, expected {expected}")]
    TileCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("sub-board '{name}' does not fit the scenario bounds")]
    BoardOutOfBounds { name: String },
}

/// Wall laser derived from the tile grid.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Laser {
    pub position: Position,
    /// Firing direction, away from the wall the emitter sits on.
    pub direction: Orientation,
    pub damage: u8,
    pub active: PhaseMask,
    /// Last tile the beam reaches, inclusive.
    pub end: Position,
}

/// Outcome of a single-step legality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCheck {
    Allowed,
    BlockedByWall,
    /// The destination is taken; the caller decides whether to push.
    Occupied(ActorId),
}

/// Board state: static tiles plus dynamic occupancy.
#[derive(Debug, Clone)]
pub struct BoardManager {
    scenario: Scenario,
    /// Sub-board index per scenario cell, row-major. `None` is off-board.
    lookup: Vec<Option<u16>>,
    lasers: Vec<Laser>,
    /// Non-virtual actors only; virtual robots never occupy tiles.
    occupancy: BTreeMap<Position, ActorId>,
    king_flag_position: Position,
    king_flag_dropped: bool,
}

impl BoardManager {
    pub fn new(scenario: Scenario) -> Result<Self, ScenarioError> {
        if scenario.boards.is_empty() {
            return Err(ScenarioError::NoBoards);
        }
        for board in &scenario.boards {
            let expected = (board.width * board.height) as usize;
            if board.tiles.len() != expected {
                return Err(ScenarioError::TileCountMismatch {
                    name: board.name.clone(),
                    expected,
                    actual: board.tiles.len(),
                });
            }
            let origin = board.grid_position;
            if origin.x < 0
                || origin.y < 0
                || origin.x + board.width > scenario.width
                || origin.y + board.height > scenario.height
            {
                return Err(ScenarioError::BoardOutOfBounds {
                    name: board.name.clone(),
                });
            }
        }

        let mut manager = Self {
            king_flag_position: scenario.king_of_flag_point,
            scenario,
            lookup: Vec::new(),
            lasers: Vec::new(),
            occupancy: BTreeMap::new(),
            king_flag_dropped: false,
        };
        manager.build_lookup();
        manager.build_lasers();
        Ok(manager)
    }

    fn build_lookup(&mut self) {
        let cells = (self.scenario.width * self.scenario.height) as usize;
        self.lookup = vec![None; cells];

        for (index, board) in self.scenario.boards.iter().enumerate() {
            for local_y in 0..board.height {
                for local_x in 0..board.width {
                    let global_x = board.grid_position.x + local_x;
                    let global_y = board.grid_position.y + local_y;
                    let cell = (global_y * self.scenario.width + global_x) as usize;
                    self.lookup[cell] = Some(index as u16);
                }
            }
        }
    }

    fn build_lasers(&mut self) {
        self.lasers.clear();

        for y in 0..self.scenario.height {
            for x in 0..self.scenario.width {
                let position = Position::new(x, y);
                let tile = self.tile_at(position);

                for side in Orientation::ALL {
                    let Some(damage) = tile.wall(side).laser_damage() else {
                        continue;
                    };
                    let direction = side.opposite();
                    let mut laser = Laser {
                        position,
                        direction,
                        damage,
                        active: tile.wall_phases(side),
                        end: position,
                    };
                    laser.end = self.beam_end(&laser);
                    self.lasers.push(laser);
                }
            }
        }
    }

    /// Walk from the emitter until a wall blocks the beam or the board
    /// runs out.
    fn beam_end(&self, laser: &Laser) -> Position {
        let mut end = laser.position;
        loop {
            let next = end.step(laser.direction);
            if next.x < 0
                || next.y < 0
                || next.x >= self.scenario.width
                || next.y >= self.scenario.height
            {
                return end;
            }
            if self.walls_block(end, laser.direction) {
                return end;
            }
            end = next;
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub fn flags(&self) -> &[SpecialPoint] {
        &self.scenario.flags
    }

    /// Tile at the given position; out-of-board cells read as edge tiles.
    pub fn tile_at(&self, position: Position) -> Tile {
        if position.x < 0
            || position.y < 0
            || position.x >= self.scenario.width
            || position.y >= self.scenario.height
        {
            return Tile::edge();
        }
        let cell = (position.y * self.scenario.width + position.x) as usize;
        let Some(board_index) = self.lookup[cell] else {
            return Tile::edge();
        };
        let board = &self.scenario.boards[board_index as usize];
        let local_x = position.x - board.grid_position.x;
        let local_y = position.y - board.grid_position.y;
        board
            .tile(local_x, local_y)
            .copied()
            .unwrap_or_else(Tile::edge)
    }

    /// Whether walls forbid leaving `from` in `direction`.
    ///
    /// A crusher on the far side of the destination blocks entry even
    /// though the board file notes it on one side only. Ramps and edge
    /// walls on the crossed sides override the denial.
    fn walls_block(&self, from: Position, direction: Orientation) -> bool {
        let to = from.step(direction);
        let tile_from = self.tile_at(from);
        let tile_to = self.tile_at(to);

        let exit_wall = tile_from.wall(direction);
        let entry_wall = tile_to.wall(direction.opposite());

        let blocking = exit_wall != WallKind::None
            || entry_wall != WallKind::None
            || tile_to.wall(direction) == WallKind::Crusher;
        let overridden = exit_wall == WallKind::Ramp
            || entry_wall == WallKind::Ramp
            || entry_wall == WallKind::Edge;

        blocking && !overridden
    }

    /// Single-step legality from `from` in `direction`.
    ///
    /// Push resolution is the caller's business; an occupied destination
    /// is reported, not resolved.
    pub fn can_move(&self, from: Position, direction: Orientation) -> MoveCheck {
        if self.walls_block(from, direction) {
            return MoveCheck::BlockedByWall;
        }
        match self.occupant_at(from.step(direction)) {
            Some(actor) => MoveCheck::Occupied(actor),
            None => MoveCheck::Allowed,
        }
    }

    pub fn occupant_at(&self, position: Position) -> Option<ActorId> {
        self.occupancy.get(&position).copied()
    }

    /// Registers `actor` on `position`. The tile must be free; movement
    /// code clears the old registration first.
    pub fn place_occupant(&mut self, position: Position, actor: ActorId) {
        debug_assert!(self.occupancy.get(&position).is_none_or(|id| *id == actor));
        self.occupancy.insert(position, actor);
    }

    pub fn remove_occupant(&mut self, position: Position) {
        self.occupancy.remove(&position);
    }

    /// Places a robot may be resurrected on, derived from its archive
    /// marker.
    ///
    /// The marker tile itself when free; otherwise the free neighbors
    /// that are neither pits nor edge and leave at least one legal
    /// facing.
    pub fn resurrection_points(&self, seed: Position) -> Vec<Position> {
        if self.occupant_at(seed).is_none() {
            return vec![seed];
        }

        let mut points = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                let candidate = Position::new(seed.x + dx, seed.y + dy);
                if self.occupant_at(candidate).is_some() {
                    continue;
                }
                let tile = self.tile_at(candidate);
                if tile.floor.is_pit() || tile.floor == super::tile::FloorKind::Edge {
                    continue;
                }
                if self.resurrection_orientations(candidate).is_empty() {
                    continue;
                }
                points.push(candidate);
            }
        }
        points
    }

    /// Facings allowed on a resurrection tile: a robot may not come back
    /// staring at an occupied neighbor.
    pub fn resurrection_orientations(&self, position: Position) -> Vec<Orientation> {
        Orientation::ALL
            .into_iter()
            .filter(|direction| self.occupant_at(position.step(*direction)).is_none())
            .collect()
    }

    pub fn king_flag_position(&self) -> Position {
        self.king_flag_position
    }

    pub fn king_flag_dropped(&self) -> bool {
        self.king_flag_dropped
    }

    /// Flag carrier died; the flag stays where it fell.
    pub fn drop_king_flag(&mut self, position: Position) {
        self.king_flag_dropped = true;
        self.king_flag_position = position;
    }

    /// Flag carrier fell off the board; the flag respawns at its scenario
    /// start.
    pub fn reset_king_flag(&mut self) {
        self.king_flag_dropped = true;
        self.king_flag_position = self.scenario.king_of_flag_point;
    }

    pub fn pickup_king_flag(&mut self) {
        self.king_flag_dropped = false;
    }

    pub fn king_hill_position(&self) -> Position {
        self.scenario.king_of_hill_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::scenario::{BoardRotation, SubBoard};
    use crate::board::tile::FloorKind;

    fn scenario_with_tiles(width: i32, height: i32, tiles: Vec<Tile>) -> Scenario {
        Scenario {
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
        }
    }

    fn open_board(width: i32, height: i32) -> BoardManager {
        let tiles = vec![Tile::default(); (width * height) as usize];
        BoardManager::new(scenario_with_tiles(width, height, tiles)).unwrap()
    }

    #[test]
    fn rejects_bad_scenarios() {
        let scenario = scenario_with_tiles(3, 3, vec![Tile::default(); 4]);
        assert!(matches!(
            BoardManager::new(scenario),
            Err(ScenarioError::TileCountMismatch { .. })
        ));

        let mut scenario = scenario_with_tiles(3, 3, vec![Tile::default(); 9]);
        scenario.boards[0].grid_position = Position::new(2, 0);
        assert!(matches!(
            BoardManager::new(scenario),
            Err(ScenarioError::BoardOutOfBounds { .. })
        ));
    }

    #[test]
    fn out_of_bounds_reads_as_edge() {
        let board = open_board(3, 3);
        assert_eq!(board.tile_at(Position::new(-1, 0)).floor, FloorKind::Edge);
        assert_eq!(board.tile_at(Position::new(3, 1)).floor, FloorKind::Edge);
        assert_eq!(board.tile_at(Position::new(1, 1)).floor, FloorKind::Normal);
    }

    #[test]
    fn walls_block_from_both_sides() {
        let mut tiles = vec![Tile::default(); 9];
        // wall on the east side of (0, 1)
        tiles[3] = Tile::default().with_wall(Orientation::East, WallKind::Standard);
        let board = BoardManager::new(scenario_with_tiles(3, 3, tiles)).unwrap();

        assert_eq!(
            board.can_move(Position::new(0, 1), Orientation::East),
            MoveCheck::BlockedByWall
        );
        assert_eq!(
            board.can_move(Position::new(1, 1), Orientation::West),
            MoveCheck::BlockedByWall
        );
        assert_eq!(
            board.can_move(Position::new(1, 1), Orientation::East),
            MoveCheck::Allowed
        );
    }

    #[test]
    fn far_side_crusher_blocks_entry() {
        let mut tiles = vec![Tile::default(); 9];
        // crusher noted on the east wall of (1, 1) blocks entry from the west
        tiles[4] = Tile::default().with_wall(Orientation::East, WallKind::Crusher);
        let board = BoardManager::new(scenario_with_tiles(3, 3, tiles)).unwrap();

        assert_eq!(
            board.can_move(Position::new(0, 1), Orientation::East),
            MoveCheck::BlockedByWall
        );
    }

    #[test]
    fn ramp_overrides_wall_denial() {
        let mut tiles = vec![Tile::default(); 9];
        tiles[3] = Tile::default().with_wall(Orientation::East, WallKind::Ramp);
        let board = BoardManager::new(scenario_with_tiles(3, 3, tiles)).unwrap();

        assert_eq!(
            board.can_move(Position::new(0, 1), Orientation::East),
            MoveCheck::Allowed
        );
    }

    #[test]
    fn occupied_destination_is_reported() {
        let mut board = open_board(3, 3);
        board.place_occupant(Position::new(1, 1), ActorId(2));

        assert_eq!(
            board.can_move(Position::new(0, 1), Orientation::East),
            MoveCheck::Occupied(ActorId(2))
        );

        board.remove_occupant(Position::new(1, 1));
        assert_eq!(
            board.can_move(Position::new(0, 1), Orientation::East),
            MoveCheck::Allowed
        );
    }

    #[test]
    fn laser_beam_stops_at_walls() {
        let mut tiles = vec![Tile::default(); 9];
        // emitter on the north wall of (1, 0), firing south
        tiles[1] = Tile::default().with_wall(Orientation::North, WallKind::Laser2);
        // wall between (1, 1) and (1, 2)
        tiles[4] = Tile::default().with_wall(Orientation::South, WallKind::Standard);
        let board = BoardManager::new(scenario_with_tiles(3, 3, tiles)).unwrap();

        assert_eq!(board.lasers().len(), 1);
        let laser = board.lasers()[0];
        assert_eq!(laser.direction, Orientation::South);
        assert_eq!(laser.damage, 2);
        assert_eq!(laser.position, Position::new(1, 0));
        assert_eq!(laser.end, Position::new(1, 1));
    }

    #[test]
    fn resurrection_prefers_free_marker() {
        let mut board = open_board(3, 3);
        let seed = Position::new(1, 1);
        assert_eq!(board.resurrection_points(seed), vec![seed]);

        board.place_occupant(seed, ActorId(0));
        let points = board.resurrection_points(seed);
        assert!(!points.contains(&seed));
        // all eight neighbors are inside the open board and free
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn resurrection_skips_pits_and_facing_occupants() {
        let mut tiles = vec![Tile::default(); 9];
        tiles[0] = Tile::new(FloorKind::Pit, Orientation::North);
        let mut board = BoardManager::new(scenario_with_tiles(3, 3, tiles)).unwrap();

        let seed = Position::new(1, 1);
        board.place_occupant(seed, ActorId(0));

        let points = board.resurrection_points(seed);
        assert!(!points.contains(&Position::new(0, 0)));

        let facings = board.resurrection_orientations(Position::new(1, 0));
        assert!(!facings.contains(&Orientation::South));
        assert!(facings.contains(&Orientation::North));
    }
}
