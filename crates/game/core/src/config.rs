//! Game rule constants and per-game settings.
//!
//! [`GameConfig`] centralizes the fixed rule numbers so resolvers and decks
//! agree on limits. [`GameSettings`] carries the options chosen when a game
//! is created; the engine never mutates them after setup.

/// Compile-time rule constants.
pub struct GameConfig;

impl GameConfig {
    /// Damage tokens at which a robot is destroyed.
    pub const MAX_DAMAGE_TOKENS: u8 = 10;

    /// Maximum life tokens a robot can start with.
    pub const MAX_LIFE_TOKENS: u8 = 6;

    /// Program cards dealt to an undamaged robot each round.
    pub const DECK_SIZE: u8 = 9;

    /// Program register slots executed per round.
    pub const PROGRAM_SIZE: u8 = 5;

    /// Register phases per round; board elements carry one activity bit
    /// per phase.
    pub const PHASES_PER_ROUND: u8 = 5;

    /// Most scenarios support up to eight starting points.
    pub const MAX_PLAYERS: u8 = 8;
}

/// Victory condition variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameMode {
    /// Visit all flags in ascending order.
    #[default]
    HuntTheFlag,
    /// Reach the kill threshold or outlive everyone.
    DeadOrAlive,
    /// Carry the flag long enough.
    KingOfTheFlag,
    /// Hold the hill long enough.
    KingOfTheHill,
}

/// Which set of scenario starting points is used at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StartPosition {
    #[default]
    Normal,
    Deathmatch,
}

/// Options fixed at game creation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameSettings {
    pub mode: GameMode,
    pub start_position: StartPosition,
    /// Lives each robot starts with, capped at [`GameConfig::MAX_LIFE_TOKENS`].
    pub starting_lives: u8,
    /// Destroyed robots always come back when set.
    pub infinite_lives: bool,
    /// Damage tokens applied right after resurrection.
    pub damage_on_resurrect: u8,
    /// Robots never accumulate damage.
    pub invulnerable: bool,
    /// Robots stop instead of pushing each other.
    pub pushing_disabled: bool,
    /// Robots start and resurrect as virtual (non-colliding) until they are
    /// alone on their tile at round end.
    pub virtual_mode: bool,
    /// Kill count that wins a [`GameMode::DeadOrAlive`] game.
    pub kills_to_win: u16,
    /// Scoring phases needed to win either king mode.
    pub points_to_win: u16,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            start_position: StartPosition::default(),
            starting_lives: 3,
            infinite_lives: false,
            damage_on_resurrect: 2,
            invulnerable: false,
            pushing_disabled: false,
            virtual_mode: false,
            kills_to_win: 5,
            points_to_win: 25,
        }
    }
}

impl GameSettings {
    /// Lives actually handed out at setup.
    pub fn effective_starting_lives(&self) -> u8 {
        self.starting_lives.clamp(1, GameConfig::MAX_LIFE_TOKENS)
    }
}
