//! The dealing pile.
//!
//! The standard stock holds 84 cards. Each kind draws its priorities from
//! a fixed band, so movement cards always outrank rotations within a
//! phase. Priorities and shuffle order are derived from the game seed.

use std::collections::VecDeque;

use crate::rng::PcgRng;

use super::{CardKind, GameCard};

/// Count and priority band per card kind in the standard stock.
const DISTRIBUTION: [(CardKind, u16, u16, u16); 7] = [
    (CardKind::UTurn, 6, 10, 60),
    (CardKind::TurnLeft, 18, 70, 420),
    (CardKind::TurnRight, 18, 70, 420),
    (CardKind::Backward, 6, 430, 490),
    (CardKind::Forward1, 18, 500, 660),
    (CardKind::Forward2, 12, 710, 780),
    (CardKind::Forward3, 6, 810, 840),
];

/// Shuffled pile the engine deals from. Returned cards go to the bottom.
#[derive(Debug, Clone)]
pub struct CardStock {
    cards: VecDeque<GameCard>,
}

impl CardStock {
    /// Build and shuffle the standard 84-card stock from a seed.
    pub fn standard(seed: u64) -> Self {
        let mut rng = PcgRng::new(seed);

        let mut cards = Vec::new();
        for (kind, count, min, max) in DISTRIBUTION {
            for _ in 0..count {
                let priority = rng.range_inclusive(u32::from(min), u32::from(max)) as u16;
                cards.push(GameCard::new(kind, priority));
            }
        }

        // Fisher-Yates
        for i in (1..cards.len()).rev() {
            let j = rng.below(i as u32 + 1) as usize;
            cards.swap(i, j);
        }

        Self {
            cards: cards.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Deal the top card. `None` only when every card is in play.
    pub fn deal(&mut self) -> Option<GameCard> {
        self.cards.pop_front()
    }

    pub fn put_back(&mut self, card: GameCard) {
        self.cards.push_back(card);
    }
}
