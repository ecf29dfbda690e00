//! Win condition evaluation, once per round after cleanup.

use crate::common::ActorId;
use crate::config::GameMode;
use crate::state::World;

/// How a game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Winner(ActorId),
    /// Nobody has lives left.
    AllDead,
}

pub fn check(world: &World) -> Option<Verdict> {
    let ids: Vec<ActorId> = world.ids().collect();
    let dead = ids.iter().filter(|id| world.actor(**id).is_dead()).count();

    if dead == ids.len() {
        return Some(Verdict::AllDead);
    }

    match world.settings.mode {
        GameMode::HuntTheFlag => {
            let flag_count = world.board.flags().len() as u8;
            if flag_count == 0 {
                return None;
            }
            ids.iter()
                .find(|id| world.actor(**id).next_flag_goal > flag_count)
                .map(|id| Verdict::Winner(*id))
        }
        GameMode::DeadOrAlive => {
            if let Some(id) = ids
                .iter()
                .find(|id| world.actor(**id).kills >= world.settings.kills_to_win)
            {
                return Some(Verdict::Winner(*id));
            }
            // last robot standing wins too
            if ids.len() > 1 && dead == ids.len() - 1 {
                return ids
                    .iter()
                    .find(|id| !world.actor(**id).is_dead())
                    .map(|id| Verdict::Winner(*id));
            }
            None
        }
        GameMode::KingOfTheFlag => ids
            .iter()
            .find(|id| {
                let actor = world.actor(**id);
                actor.king_points >= world.settings.points_to_win && actor.has_flag
            })
            .map(|id| Verdict::Winner(*id)),
        GameMode::KingOfTheHill => ids
            .iter()
            .find(|id| {
                let actor = world.actor(**id);
                actor.king_points >= world.settings.points_to_win
                    && actor.position == Some(world.board.king_hill_position())
            })
            .map(|id| Verdict::Winner(*id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::scenario::{BoardRotation, Scenario, SpecialPoint, SubBoard};
    use crate::board::tile::Tile;
    use crate::board::BoardManager;
    use crate::common::{Orientation, Position};
    use crate::config::{GameConfig, GameSettings};

    fn win_world(settings: GameSettings, flags: Vec<SpecialPoint>) -> World {
        let scenario = Scenario {
            name: "win".into(),
            width: 3,
            height: 3,
            boards: vec![SubBoard {
                name: "main".into(),
                grid_position: Position::new(0, 0),
                width: 3,
                height: 3,
                rotation: BoardRotation::None,
                tiles: vec![Tile::default(); 9],
            }],
            starting_points: Vec::new(),
            starting_points_deathmatch: Vec::new(),
            flags,
            king_of_flag_point: Position::new(0, 0),
            king_of_hill_point: Position::new(2, 2),
            start_orientation: Orientation::North,
            max_players: 8,
        };
        World::new(BoardManager::new(scenario).unwrap(), settings)
    }

    #[test]
    fn hunting_all_flags_wins() {
        let settings = GameSettings::default();
        let flags = vec![
            SpecialPoint {
                number: 1,
                position: Position::new(1, 0),
            },
            SpecialPoint {
                number: 2,
                position: Position::new(2, 0),
            },
        ];
        let mut world = win_world(settings, flags);
        let a = world.add_actor(Position::new(0, 0), Orientation::North);
        let _b = world.add_actor(Position::new(0, 1), Orientation::North);

        assert_eq!(check(&world), None);
        world.actor_mut(a).next_flag_goal = 3;
        assert_eq!(check(&world), Some(Verdict::Winner(a)));
    }

    #[test]
    fn kill_count_and_last_survivor_win() {
        let settings = GameSettings {
            mode: crate::config::GameMode::DeadOrAlive,
            kills_to_win: 2,
            ..GameSettings::default()
        };
        let mut world = win_world(settings, Vec::new());
        let a = world.add_actor(Position::new(0, 0), Orientation::North);
        let b = world.add_actor(Position::new(1, 0), Orientation::North);

        world.actor_mut(a).kills = 2;
        assert_eq!(check(&world), Some(Verdict::Winner(a)));

        world.actor_mut(a).kills = 0;
        world.actor_mut(b).lives = 1;
        world.set_damage(b, GameConfig::MAX_DAMAGE_TOKENS);
        assert_eq!(check(&world), Some(Verdict::Winner(a)));
    }

    #[test]
    fn king_points_need_the_flag_in_hand() {
        let settings = GameSettings {
            mode: crate::config::GameMode::KingOfTheFlag,
            points_to_win: 3,
            ..GameSettings::default()
        };
        let mut world = win_world(settings, Vec::new());
        let a = world.add_actor(Position::new(0, 0), Orientation::North);

        world.actor_mut(a).king_points = 3;
        assert_eq!(check(&world), None);
        world.actor_mut(a).has_flag = true;
        assert_eq!(check(&world), Some(Verdict::Winner(a)));
    }

    #[test]
    fn everyone_dead_ends_without_winner() {
        let mut world = win_world(GameSettings::default(), Vec::new());
        let a = world.add_actor(Position::new(0, 0), Orientation::North);
        world.actor_mut(a).lives = 1;
        world.set_damage(a, GameConfig::MAX_DAMAGE_TOKENS);

        assert_eq!(check(&world), Some(Verdict::AllDead));
    }
}
