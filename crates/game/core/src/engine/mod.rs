//! The round state machine.
//!
//! A round deals cards, collects programs, then resolves five register
//! phases. Every phase runs the board elements in fixed order: card
//! moves, express belts, all belts, gears, pushers, crushers, lasers,
//! and finally the archive update. After each stage the engine suspends
//! until every participant acknowledged the animation, so all clients
//! stay in step without the core knowing anything about timing.
//!
//! Between rounds the engine repairs, resurrects (suspending for the
//! player's placement choices), processes power downs, recycles cards
//! and checks the win condition.

pub mod archive;
pub mod card_moves;
pub mod cleanup;
pub mod conveyor;
pub mod gears;
pub mod lasers;
pub mod latch;
pub mod pushers;
pub mod win;

use std::collections::{BTreeSet, VecDeque};

use thiserror::Error;

use crate::board::{BoardManager, FloorKind};
use crate::cards::{CardDeck, CardStock, DeckError, GameCard};
use crate::common::{ActorId, Orientation, Position};
use crate::config::{GameConfig, GameMode, GameSettings, StartPosition};
use crate::events::{BoardEffect, GameEvent};
use crate::participant::Participant;
use crate::state::World;

use card_moves::ProgramEntry;
use latch::AckLatch;
use win::Verdict;

/// Input rejected by the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("game already started")]
    AlreadyStarted,
    #[error("no players joined")]
    NoPlayers,
    #[error("no free starting point for player {player}")]
    NoStartingPoint { player: usize },
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),
    #[error("input does not match the current engine state")]
    UnexpectedInput,
    #[error("choice is not among the offered options")]
    InvalidChoice,
    #[error(transparent)]
    Deck(#[from] DeckError),
}

/// One resolution stage of a register phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CardMoves,
    ExpressBelts,
    AllBelts,
    Gears,
    Pushers,
    Crushers,
    Lasers,
}

impl Stage {
    pub fn effect(self) -> BoardEffect {
        match self {
            Stage::CardMoves => BoardEffect::CardMoves,
            Stage::ExpressBelts => BoardEffect::ExpressBelts,
            Stage::AllBelts => BoardEffect::AllBelts,
            Stage::Gears => BoardEffect::Gears,
            Stage::Pushers => BoardEffect::Pushers,
            Stage::Crushers => BoardEffect::Crushers,
            Stage::Lasers => BoardEffect::Lasers,
        }
    }
}

/// What the engine is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// Players may still join.
    Lobby,
    Programming {
        waiting_for: Vec<ActorId>,
    },
    /// A stage resolved; the listed participants have not acknowledged
    /// the animation yet.
    AnimatingStage {
        stage: Stage,
        waiting_for: Vec<ActorId>,
    },
    ChoosingResurrectionPoint {
        actor: ActorId,
        options: Vec<Position>,
    },
    ChoosingResurrectionOrientation {
        actor: ActorId,
        position: Position,
        options: Vec<Orientation>,
    },
    Finished {
        winner: Option<ActorId>,
    },
}

#[derive(Debug)]
enum Flow {
    Lobby,
    Programming {
        waiting: BTreeSet<ActorId>,
    },
    Animating {
        stage: Stage,
        latch: AckLatch,
    },
    ResurrectPoint {
        actor: ActorId,
        options: Vec<Position>,
    },
    ResurrectOrientation {
        actor: ActorId,
        position: Position,
        options: Vec<Orientation>,
    },
    Finished {
        winner: Option<ActorId>,
    },
}

/// Drives games from lobby to game over.
///
/// The engine is synchronous: every public input either advances the
/// round as far as it can or returns an error, and [`drain_events`]
/// yields everything that happened since the last drain.
///
/// [`drain_events`]: GameEngine::drain_events
#[derive(Debug)]
pub struct GameEngine {
    world: World,
    decks: Vec<CardDeck>,
    stock: CardStock,
    names: Vec<String>,
    announced_power_down: Vec<bool>,
    round: u32,
    resurrection_queue: VecDeque<ActorId>,
    flow: Flow,
}

impl GameEngine {
    pub fn new(board: BoardManager, settings: GameSettings, seed: u64) -> Self {
        Self {
            world: World::new(board, settings),
            decks: Vec::new(),
            stock: CardStock::standard(seed),
            names: Vec::new(),
            announced_power_down: Vec::new(),
            round: 0,
            resurrection_queue: VecDeque::new(),
            flow: Flow::Lobby,
        }
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    pub fn add_player(&mut self, name: impl Into<String>) -> Result<ActorId, EngineError> {
        if !matches!(self.flow, Flow::Lobby) {
            return Err(EngineError::AlreadyStarted);
        }
        let number = self.world.actor_count() + 1;
        if number > GameConfig::MAX_PLAYERS as usize {
            return Err(EngineError::NoStartingPoint { player: number });
        }
        let deathmatch = self.world.settings.start_position == StartPosition::Deathmatch;
        let position = self
            .world
            .board
            .scenario()
            .starting_point(number as u8, deathmatch)
            .ok_or(EngineError::NoStartingPoint { player: number })?;
        let direction = self.world.board.scenario().start_orientation;

        let id = self.world.add_actor(position, direction);
        self.decks.push(CardDeck::new());
        self.names.push(name.into());
        self.announced_power_down.push(false);
        Ok(id)
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        if !matches!(self.flow, Flow::Lobby) {
            return Err(EngineError::AlreadyStarted);
        }
        if self.world.actor_count() == 0 {
            return Err(EngineError::NoPlayers);
        }
        if self.world.settings.mode == GameMode::KingOfTheFlag {
            // the flag starts on the board, waiting to be picked up
            self.world.board.reset_king_flag();
        }
        self.world.emit(GameEvent::GameStarted {
            mode: self.world.settings.mode,
            players: self.world.actor_count() as u8,
        });
        self.begin_round();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Player inputs
    // ------------------------------------------------------------------

    /// Fill the open registers of the actor's program.
    pub fn submit_program(
        &mut self,
        id: ActorId,
        cards: &[GameCard],
    ) -> Result<(), EngineError> {
        self.ensure_actor(id)?;
        match &self.flow {
            Flow::Programming { waiting } if waiting.contains(&id) => {}
            _ => return Err(EngineError::UnexpectedInput),
        }

        self.decks[id.index()].set_program(cards)?;
        self.decks[id.index()].lock_programming(true);
        self.world.emit(GameEvent::ProgramAccepted { actor: id });

        let done = match &mut self.flow {
            Flow::Programming { waiting } => {
                waiting.remove(&id);
                waiting.is_empty()
            }
            _ => false,
        };
        if done {
            self.start_phases();
        }
        Ok(())
    }

    /// Announce (or retract) a power down for the next round.
    pub fn announce_power_down(
        &mut self,
        id: ActorId,
        announced: bool,
    ) -> Result<(), EngineError> {
        self.ensure_actor(id)?;
        if !matches!(self.flow, Flow::Programming { .. }) {
            return Err(EngineError::UnexpectedInput);
        }
        self.announced_power_down[id.index()] = announced;
        self.world
            .emit(GameEvent::PowerDownAnnounced { actor: id, announced });
        Ok(())
    }

    /// Confirm that the participant finished showing the resolved stage.
    pub fn acknowledge(&mut self, id: ActorId) -> Result<(), EngineError> {
        self.ensure_actor(id)?;
        let (stage, released) = match &mut self.flow {
            Flow::Animating { stage, latch } => (*stage, latch.acknowledge(id)),
            _ => return Err(EngineError::UnexpectedInput),
        };
        if released {
            // falling robots finished their drop animation with the stage
            self.world.finish_falling();
            self.advance(stage);
        }
        Ok(())
    }

    pub fn choose_resurrection_point(
        &mut self,
        id: ActorId,
        position: Position,
    ) -> Result<(), EngineError> {
        self.ensure_actor(id)?;
        match &self.flow {
            Flow::ResurrectPoint { actor, options } if *actor == id => {
                if !options.contains(&position) {
                    return Err(EngineError::InvalidChoice);
                }
            }
            _ => return Err(EngineError::UnexpectedInput),
        }

        let options = self.world.board.resurrection_orientations(position);
        if options.len() > 1 {
            self.flow = Flow::ResurrectOrientation {
                actor: id,
                position,
                options,
            };
        } else {
            let direction = options
                .first()
                .copied()
                .unwrap_or(self.world.board.scenario().start_orientation);
            self.world.resurrect_at(id, position, direction);
            self.continue_cleanup();
        }
        Ok(())
    }

    pub fn choose_resurrection_orientation(
        &mut self,
        id: ActorId,
        direction: Orientation,
    ) -> Result<(), EngineError> {
        self.ensure_actor(id)?;
        let position = match &self.flow {
            Flow::ResurrectOrientation {
                actor,
                position,
                options,
            } if *actor == id => {
                if !options.contains(&direction) {
                    return Err(EngineError::InvalidChoice);
                }
                *position
            }
            _ => return Err(EngineError::UnexpectedInput),
        };

        self.world.resurrect_at(id, position, direction);
        self.continue_cleanup();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn status(&self) -> EngineStatus {
        match &self.flow {
            Flow::Lobby => EngineStatus::Lobby,
            Flow::Programming { waiting } => EngineStatus::Programming {
                waiting_for: waiting.iter().copied().collect(),
            },
            Flow::Animating { stage, latch } => EngineStatus::AnimatingStage {
                stage: *stage,
                waiting_for: latch.pending().collect(),
            },
            Flow::ResurrectPoint { actor, options } => {
                EngineStatus::ChoosingResurrectionPoint {
                    actor: *actor,
                    options: options.clone(),
                }
            }
            Flow::ResurrectOrientation {
                actor,
                position,
                options,
            } => EngineStatus::ChoosingResurrectionOrientation {
                actor: *actor,
                position: *position,
                options: options.clone(),
            },
            Flow::Finished { winner } => EngineStatus::Finished { winner: *winner },
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for embedders that set up bespoke situations.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn deck(&self, id: ActorId) -> &CardDeck {
        &self.decks[id.index()]
    }

    pub fn player_name(&self, id: ActorId) -> &str {
        &self.names[id.index()]
    }

    /// Flat snapshot of one player for presentation.
    pub fn participant(&self, id: ActorId) -> Result<Participant, EngineError> {
        self.ensure_actor(id)?;
        let actor = self.world.actor(id);
        let deck = &self.decks[id.index()];

        let mut program = [None; GameConfig::PROGRAM_SIZE as usize];
        let mut locked_slots = [false; GameConfig::PROGRAM_SIZE as usize];
        for slot in 1..=GameConfig::PROGRAM_SIZE {
            program[slot as usize - 1] = deck.program_card(slot);
            locked_slots[slot as usize - 1] = deck.is_slot_locked(slot);
        }

        Ok(Participant {
            id,
            name: self.names[id.index()].clone(),
            position: actor.position,
            direction: actor.direction,
            damage: actor.damage,
            lives: actor.lives,
            kills: actor.kills,
            deaths: actor.deaths,
            suicides: actor.suicides,
            next_flag_goal: actor.next_flag_goal,
            king_points: actor.king_points,
            has_flag: actor.has_flag,
            powered_down: actor.powered_down,
            is_virtual: actor.is_virtual,
            destroyed: actor.destroyed,
            archive_marker: actor.archive_marker,
            dealt_cards: deck.deck_cards().collect(),
            program,
            locked_slots,
        })
    }

    /// Completed rounds plus the running one; zero before the game starts.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.drain_events()
    }

    // ------------------------------------------------------------------
    // Round driver
    // ------------------------------------------------------------------

    fn ensure_actor(&self, id: ActorId) -> Result<(), EngineError> {
        if id.index() < self.world.actor_count() {
            Ok(())
        } else {
            Err(EngineError::UnknownActor(id))
        }
    }

    fn begin_round(&mut self) {
        self.round += 1;
        self.world.phase = 1;
        self.deal_cards();

        let waiting: BTreeSet<ActorId> = self
            .world
            .ids()
            .filter(|id| {
                let actor = self.world.actor(*id);
                !actor.is_dead() && !actor.powered_down
            })
            .collect();
        self.world.emit(GameEvent::ProgrammingStarted);

        if waiting.is_empty() {
            // everyone is asleep; the board still runs
            self.start_phases();
        } else {
            self.flow = Flow::Programming { waiting };
        }
    }

    /// Deal one card per deal round, skipping robots whose damage caps
    /// their hand.
    fn deal_cards(&mut self) {
        let ids: Vec<ActorId> = self
            .world
            .ids()
            .filter(|id| {
                let actor = self.world.actor(*id);
                !actor.is_dead() && !actor.powered_down
            })
            .collect();

        for id in &ids {
            self.decks[id.index()].lock_programming(false);
        }
        for deal_round in 1..=GameConfig::DECK_SIZE {
            for id in &ids {
                let due = GameConfig::DECK_SIZE
                    .saturating_sub(self.world.actor(*id).damage);
                if deal_round > due {
                    continue;
                }
                if let Some(card) = self.stock.deal() {
                    self.decks[id.index()].add_card_to_deck(card);
                }
            }
        }
        for id in ids {
            self.world.emit(GameEvent::CardsDealt {
                actor: id,
                count: self.decks[id.index()].dealt_count() as u8,
            });
        }
    }

    fn start_phases(&mut self) {
        self.world.emit(GameEvent::PhaseChanged { phase: 1 });
        self.run_stage(Stage::CardMoves);
    }

    fn run_stage(&mut self, stage: Stage) {
        match stage {
            Stage::CardMoves => self.resolve_card_moves(),
            Stage::ExpressBelts => {
                conveyor::resolve(&mut self.world, conveyor::BeltPass::ExpressOnly)
            }
            Stage::AllBelts => conveyor::resolve(&mut self.world, conveyor::BeltPass::All),
            Stage::Gears => gears::resolve(&mut self.world),
            Stage::Pushers => pushers::resolve_pushers(&mut self.world),
            Stage::Crushers => pushers::resolve_crushers(&mut self.world),
            Stage::Lasers => lasers::resolve(&mut self.world),
        }

        self.world.emit(GameEvent::StageResolved {
            effect: stage.effect(),
            phase: self.world.phase,
        });
        let mut latch = AckLatch::default();
        latch.arm(self.world.ids());
        self.flow = Flow::Animating { stage, latch };
    }

    fn resolve_card_moves(&mut self) {
        let phase = self.world.phase;

        // randomizer tiles swap the register card before it runs
        for id in self.world.ids().collect::<Vec<_>>() {
            let actor = self.world.actor(id);
            if actor.destroyed || actor.powered_down {
                continue;
            }
            let Some(position) = actor.position else {
                continue;
            };
            let tile = self.world.board.tile_at(position);
            if tile.floor == FloorKind::Randomizer
                && tile.floor_active_in(phase)
                && let Some(card) = self.stock.deal()
            {
                if let Some(old) = self.decks[id.index()].replace_program_card(phase, card) {
                    self.stock.put_back(old);
                }
                self.world.emit(GameEvent::ProgramCardReplaced {
                    actor: id,
                    phase,
                    card,
                });
            }
        }

        let mut entries = Vec::new();
        for id in self.world.ids().collect::<Vec<_>>() {
            let actor = self.world.actor(id);
            if actor.destroyed || actor.powered_down {
                continue;
            }
            if let Some(card) = self.decks[id.index()].program_card(phase) {
                entries.push(ProgramEntry { actor: id, card });
            }
        }

        let steps = card_moves::resolve(&mut self.world, entries);
        self.world
            .emit(GameEvent::CardMovesResolved { phase, steps });
    }

    fn advance(&mut self, stage: Stage) {
        match stage {
            Stage::CardMoves => self.run_stage(Stage::ExpressBelts),
            Stage::ExpressBelts => self.run_stage(Stage::AllBelts),
            Stage::AllBelts => self.run_stage(Stage::Gears),
            Stage::Gears => self.run_stage(Stage::Pushers),
            Stage::Pushers => self.run_stage(Stage::Crushers),
            Stage::Crushers => self.run_stage(Stage::Lasers),
            Stage::Lasers => {
                // nobody left standing ends the round early
                if self.world.ids().all(|id| self.world.actor(id).destroyed) {
                    self.finish_round();
                    return;
                }
                archive::resolve(&mut self.world);
                if self.world.phase < GameConfig::PHASES_PER_ROUND {
                    self.world.phase += 1;
                    self.world.emit(GameEvent::PhaseChanged {
                        phase: self.world.phase,
                    });
                    self.run_stage(Stage::CardMoves);
                } else {
                    self.finish_round();
                }
            }
        }
    }

    fn finish_round(&mut self) {
        cleanup::repair_round_end(&mut self.world);
        cleanup::reset_attributions(&mut self.world);
        cleanup::solve_virtual_robots(&mut self.world);

        self.resurrection_queue = self
            .world
            .ids()
            .filter(|id| {
                let actor = self.world.actor(*id);
                actor.destroyed && !actor.is_dead()
            })
            .collect();
        self.continue_cleanup();
    }

    /// Resume cleanup after a resurrection choice came in.
    fn continue_cleanup(&mut self) {
        if let Some(actor) = self.resurrection_queue.pop_front() {
            let seed = self.world.actor(actor).archive_marker;
            let mut options = self.world.board.resurrection_points(seed);
            if options.is_empty() {
                options.push(seed);
            }
            self.flow = Flow::ResurrectPoint { actor, options };
            return;
        }
        self.finish_cleanup();
    }

    fn finish_cleanup(&mut self) {
        // robots that slept through the round wake up; locked registers
        // that lost their card get one from the stock
        for id in self.world.ids().collect::<Vec<_>>() {
            if !self.world.actor(id).powered_down || self.world.actor(id).is_dead() {
                continue;
            }
            let deck = &mut self.decks[id.index()];
            while deck.locked_slots_without_card() > 0 {
                match self.stock.deal() {
                    Some(card) => {
                        deck.add_card_to_locked_program(card);
                    }
                    None => break,
                }
            }
            self.world.actor_mut(id).powered_down = false;
        }

        // announced power downs take effect now, with a full repair
        for id in self.world.ids().collect::<Vec<_>>() {
            if !self.announced_power_down[id.index()] {
                continue;
            }
            self.announced_power_down[id.index()] = false;
            let actor = self.world.actor(id);
            if actor.is_dead() || actor.destroyed {
                continue;
            }
            self.world.actor_mut(id).powered_down = true;
            let damage = self.world.actor(id).damage;
            if damage > 0 {
                self.world.repair(id, damage);
            }
        }

        // recompute register locks from the surviving damage and recycle
        // everything that is not locked in
        for id in self.world.ids().collect::<Vec<_>>() {
            if self.world.actor(id).is_dead() {
                continue;
            }
            let deck = &mut self.decks[id.index()];
            deck.calculate_slot_locking(self.world.actor(id).damage);
            for card in deck.clear_cards() {
                self.stock.put_back(card);
            }
        }

        match win::check(&self.world) {
            Some(Verdict::Winner(winner)) => {
                self.flow = Flow::Finished {
                    winner: Some(winner),
                };
                self.world.emit(GameEvent::GameOver {
                    winner: Some(winner),
                });
            }
            Some(Verdict::AllDead) => {
                self.flow = Flow::Finished { winner: None };
                self.world.emit(GameEvent::GameOver { winner: None });
            }
            None => {
                self.world.emit(GameEvent::RoundFinished);
                self.begin_round();
            }
        }
    }
}
