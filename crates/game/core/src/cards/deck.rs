//! Per-robot card holder: nine deal slots and five program registers.
//!
//! Damage locks program registers from the back: the fifth token locks
//! register 5, the ninth locks them all. Locked registers keep their card
//! across rounds and are replayed as dealt.

use thiserror::Error;

use crate::config::GameConfig;

use super::GameCard;

const DECK: usize = GameConfig::DECK_SIZE as usize;
const PROGRAM: usize = GameConfig::PROGRAM_SIZE as usize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("program needs {expected} cards for the open registers, got {actual}")]
    WrongCardCount { expected: usize, actual: usize },
    #[error("card {0:?} is not in the deal slots")]
    CardNotInDeck(GameCard),
    #[error("programming is locked")]
    ProgrammingLocked,
}

#[derive(Debug, Clone)]
pub struct CardDeck {
    deck: [Option<GameCard>; DECK],
    program: [Option<GameCard>; PROGRAM],
    /// First locked register, 1-based. `PROGRAM + 1` means none locked.
    min_locked_slot: u8,
    programming_locked: bool,
}

impl Default for CardDeck {
    fn default() -> Self {
        Self::new()
    }
}

impl CardDeck {
    pub fn new() -> Self {
        Self {
            deck: [None; DECK],
            program: [None; PROGRAM],
            min_locked_slot: GameConfig::PROGRAM_SIZE + 1,
            programming_locked: false,
        }
    }

    /// Put a dealt card into the first free deal slot.
    pub fn add_card_to_deck(&mut self, card: GameCard) -> bool {
        for slot in self.deck.iter_mut() {
            if slot.is_none() {
                *slot = Some(card);
                return true;
            }
        }
        false
    }

    pub fn deck_cards(&self) -> impl Iterator<Item = GameCard> + '_ {
        self.deck.iter().copied().flatten()
    }

    pub fn dealt_count(&self) -> usize {
        self.deck.iter().flatten().count()
    }

    /// Card in the given program register (1-based).
    pub fn program_card(&self, slot: u8) -> Option<GameCard> {
        debug_assert!((1..=GameConfig::PROGRAM_SIZE).contains(&slot));
        self.program[slot as usize - 1]
    }

    /// Whether the register keeps its card across rounds.
    pub fn is_slot_locked(&self, slot: u8) -> bool {
        slot >= self.min_locked_slot
    }

    /// Derive register locking from the current damage. The first four
    /// tokens only slow the deal; from the fifth on, registers lock from
    /// the back.
    pub fn calculate_slot_locking(&mut self, damage: u8) {
        let free_threshold = GameConfig::MAX_DAMAGE_TOKENS - GameConfig::PROGRAM_SIZE - 1;
        self.min_locked_slot = if damage > free_threshold {
            (GameConfig::MAX_DAMAGE_TOKENS - damage).max(1)
        } else {
            GameConfig::PROGRAM_SIZE + 1
        };
    }

    /// Fill the open registers, in order, from the submitted cards.
    ///
    /// Each card must come out of the deal slots; locked registers are
    /// skipped and keep their card.
    pub fn set_program(&mut self, cards: &[GameCard]) -> Result<(), DeckError> {
        if self.programming_locked {
            return Err(DeckError::ProgrammingLocked);
        }

        let open_slots: Vec<usize> = (0..PROGRAM)
            .filter(|slot| !self.is_slot_locked(*slot as u8 + 1))
            .collect();
        if cards.len() != open_slots.len() {
            return Err(DeckError::WrongCardCount {
                expected: open_slots.len(),
                actual: cards.len(),
            });
        }

        // validate before mutating
        let mut taken = [false; DECK];
        for card in cards {
            let found = self.deck.iter().enumerate().find(|(index, slot)| {
                !taken[*index] && **slot == Some(*card)
            });
            match found {
                Some((index, _)) => taken[index] = true,
                None => return Err(DeckError::CardNotInDeck(*card)),
            }
        }

        for (slot, card) in open_slots.into_iter().zip(cards) {
            self.program[slot] = Some(*card);
        }
        for (index, was_taken) in taken.into_iter().enumerate() {
            if was_taken {
                self.deck[index] = None;
            }
        }
        Ok(())
    }

    /// Swap the card in a register, returning the old one. Used by
    /// randomizer tiles.
    pub fn replace_program_card(&mut self, slot: u8, card: GameCard) -> Option<GameCard> {
        debug_assert!((1..=GameConfig::PROGRAM_SIZE).contains(&slot));
        self.program[slot as usize - 1].replace(card)
    }

    /// Locked registers that lost their card, e.g. after a power down.
    pub fn locked_slots_without_card(&self) -> usize {
        (0..PROGRAM)
            .filter(|slot| self.is_slot_locked(*slot as u8 + 1) && self.program[*slot].is_none())
            .count()
    }

    /// Fill the first empty locked register.
    pub fn add_card_to_locked_program(&mut self, card: GameCard) -> bool {
        for slot in 0..PROGRAM {
            if self.is_slot_locked(slot as u8 + 1) && self.program[slot].is_none() {
                self.program[slot] = Some(card);
                return true;
            }
        }
        false
    }

    /// Round is over: hand back everything that is not locked in.
    pub fn clear_cards(&mut self) -> Vec<GameCard> {
        let mut returned: Vec<GameCard> = self.deck.iter_mut().filter_map(Option::take).collect();
        for slot in 0..PROGRAM {
            if !self.is_slot_locked(slot as u8 + 1)
                && let Some(card) = self.program[slot].take()
            {
                returned.push(card);
            }
        }
        returned
    }

    pub fn lock_programming(&mut self, locked: bool) {
        self.programming_locked = locked;
    }

    pub fn is_programming_locked(&self) -> bool {
        self.programming_locked
    }

    pub fn program_is_complete(&self) -> bool {
        self.program.iter().all(Option::is_some)
    }
}
