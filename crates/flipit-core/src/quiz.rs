// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The quiz session state machine.
//!
//! A quiz walks an ordered deck once. Each card is flipped, then marked
//! correct or incorrect. Marking a card does not move to the next one right
//! away: the quiz enters a settling state so the presentation layer can show
//! the verdict, and the driver calls [`Quiz::advance`] after
//! [`SETTLE_DELAY`]. When the deck is exhausted the quiz is finished, and the
//! cards that were missed can be replayed as a new pass.
//!
//! Transitions consume the quiz and return the next state. A transition that
//! does not apply to the current state returns it unchanged.

use std::time::Duration;

use crate::types::card::Card;

/// How long the verdict stays on screen before the next card.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: usize,
    pub incorrect: usize,
}

impl Tally {
    pub fn answered(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Fraction of answered cards marked correct, in `[0, 1]`. Zero when
    /// nothing has been answered.
    pub fn accuracy(&self) -> f64 {
        match self.answered() {
            0 => 0.0,
            answered => self.correct as f64 / answered as f64,
        }
    }

    /// Accuracy as a whole percentage.
    pub fn percent(&self) -> u32 {
        (self.accuracy() * 100.0).round() as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl From<bool> for Verdict {
    fn from(correct: bool) -> Self {
        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

/// One walk over a deck.
#[derive(Clone, Debug, PartialEq)]
pub struct Pass {
    deck: Vec<Card>,
    position: usize,
    tally: Tally,
    missed: Vec<Card>,
}

impl Pass {
    fn new(deck: Vec<Card>) -> Self {
        Self {
            deck,
            position: 0,
            tally: Tally::default(),
            missed: Vec::new(),
        }
    }

    fn current(&self) -> Option<&Card> {
        self.deck.get(self.position)
    }

    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.tally.correct += 1,
            Verdict::Incorrect => {
                self.tally.incorrect += 1;
                if let Some(card) = self.deck.get(self.position) {
                    if !self.missed.iter().any(|m| m.card_id == card.card_id) {
                        self.missed.push(card.clone());
                    }
                }
            }
        }
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn missed(&self) -> &[Card] {
        &self.missed
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Quiz {
    /// The set had no cards. Nothing can happen from here.
    #[default]
    Empty,
    /// Waiting for the user to flip or answer the current card.
    Active { pass: Pass, revealed: bool },
    /// The current card was answered and is waiting for `advance`.
    Settling { pass: Pass, verdict: Verdict },
    /// Every card in the deck was answered.
    Finished { pass: Pass },
}

/// The coarse state a presentation layer switches on. `Settling` counts as
/// active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Empty,
    Active,
    Finished,
}

/// End-of-pass figures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub cards: usize,
    pub tally: Tally,
    pub missed: usize,
    pub accuracy: f64,
}

impl Quiz {
    /// Start a pass over the whole card list.
    pub fn new(cards: Vec<Card>) -> Self {
        if cards.is_empty() {
            Quiz::Empty
        } else {
            Quiz::Active {
                pass: Pass::new(cards),
                revealed: false,
            }
        }
    }

    /// Toggle the reveal flag of the current card.
    pub fn flip(self) -> Self {
        match self {
            Quiz::Active { pass, revealed } => Quiz::Active {
                pass,
                revealed: !revealed,
            },
            other => other,
        }
    }

    /// Mark the revealed card. Ignored unless the card is showing its back.
    pub fn answer(self, correct: bool) -> Self {
        match self {
            Quiz::Active {
                mut pass,
                revealed: true,
            } => {
                let verdict = Verdict::from(correct);
                pass.record(verdict);
                Quiz::Settling { pass, verdict }
            }
            other => other,
        }
    }

    /// Move past an answered card.
    pub fn advance(self) -> Self {
        match self {
            Quiz::Settling { mut pass, .. } => {
                pass.position += 1;
                if pass.position == pass.deck.len() {
                    Quiz::Finished { pass }
                } else {
                    Quiz::Active {
                        pass,
                        revealed: false,
                    }
                }
            }
            other => other,
        }
    }

    /// Start a new pass over the cards missed in the finished one.
    pub fn redo_incorrect(self) -> Self {
        match self {
            Quiz::Finished { pass } if !pass.missed.is_empty() => Quiz::Active {
                pass: Pass::new(pass.missed),
                revealed: false,
            },
            other => other,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Quiz::Empty => Status::Empty,
            Quiz::Active { .. } | Quiz::Settling { .. } => Status::Active,
            Quiz::Finished { .. } => Status::Finished,
        }
    }

    fn pass(&self) -> Option<&Pass> {
        match self {
            Quiz::Empty => None,
            Quiz::Active { pass, .. } | Quiz::Settling { pass, .. } | Quiz::Finished { pass } => {
                Some(pass)
            }
        }
    }

    /// The card on screen, if the pass is still running.
    pub fn current_card(&self) -> Option<&Card> {
        match self {
            Quiz::Active { pass, .. } | Quiz::Settling { pass, .. } => pass.current(),
            _ => None,
        }
    }

    /// Whether the back of the current card is showing. A settling card stays
    /// revealed until it is advanced past.
    pub fn is_revealed(&self) -> bool {
        match self {
            Quiz::Active { revealed, .. } => *revealed,
            Quiz::Settling { .. } => true,
            _ => false,
        }
    }

    /// The verdict waiting to be advanced past, if any.
    pub fn pending_verdict(&self) -> Option<Verdict> {
        match self {
            Quiz::Settling { verdict, .. } => Some(*verdict),
            _ => None,
        }
    }

    pub fn position(&self) -> usize {
        self.pass().map_or(0, Pass::position)
    }

    pub fn deck_len(&self) -> usize {
        self.pass().map_or(0, |pass| pass.deck.len())
    }

    pub fn tally(&self) -> Tally {
        self.pass().map_or_else(Tally::default, Pass::tally)
    }

    pub fn missed(&self) -> &[Card] {
        self.pass().map(Pass::missed).unwrap_or(&[])
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Quiz::Finished { .. })
    }

    pub fn can_redo(&self) -> bool {
        self.is_finished() && !self.missed().is_empty()
    }

    /// Figures for the finished screen. Only a finished pass has one.
    pub fn summary(&self) -> Option<Summary> {
        match self {
            Quiz::Finished { pass } => Some(Summary {
                cards: pass.deck.len(),
                tally: pass.tally,
                missed: pass.missed.len(),
                accuracy: pass.tally.accuracy(),
            }),
            _ => None,
        }
    }
}
