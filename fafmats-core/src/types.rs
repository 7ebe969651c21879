use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{PairingError, Result};

/// Caller-provided player identifier. Ordering has no meaning beyond iteration.
pub type PlayerId = i64;

/// Match result, expressed relative to the first-named player (A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    #[cfg_attr(feature = "serde", serde(rename = "2:0"))]
    TwoZero,
    #[cfg_attr(feature = "serde", serde(rename = "2:1"))]
    TwoOne,
    #[cfg_attr(feature = "serde", serde(rename = "1:2"))]
    OneTwo,
    #[cfg_attr(feature = "serde", serde(rename = "0:2"))]
    ZeroTwo,
    #[cfg_attr(feature = "serde", serde(rename = "draw"))]
    Draw,
    #[cfg_attr(feature = "serde", serde(rename = "forfeit"))]
    Forfeit,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::TwoZero,
        Outcome::TwoOne,
        Outcome::OneTwo,
        Outcome::ZeroTwo,
        Outcome::Draw,
        Outcome::Forfeit,
    ];

    /// Points scored by A: 1 for a win, 0.5 for a draw or forfeit, 0 for a loss.
    pub fn score_for_a(self) -> f64 {
        match self {
            Outcome::TwoZero | Outcome::TwoOne => 1.0,
            Outcome::OneTwo | Outcome::ZeroTwo => 0.0,
            Outcome::Draw | Outcome::Forfeit => 0.5,
        }
    }

    /// The same result seen from B's side.
    pub fn inverse(self) -> Outcome {
        match self {
            Outcome::TwoZero => Outcome::ZeroTwo,
            Outcome::TwoOne => Outcome::OneTwo,
            Outcome::OneTwo => Outcome::TwoOne,
            Outcome::ZeroTwo => Outcome::TwoZero,
            Outcome::Draw => Outcome::Draw,
            Outcome::Forfeit => Outcome::Forfeit,
        }
    }

    /// True when B won. Stored matches never carry these outcomes.
    pub fn is_reversed(self) -> bool {
        matches!(self, Outcome::OneTwo | Outcome::ZeroTwo)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::TwoZero => "2:0",
            Outcome::TwoOne => "2:1",
            Outcome::OneTwo => "1:2",
            Outcome::ZeroTwo => "0:2",
            Outcome::Draw => "draw",
            Outcome::Forfeit => "forfeit",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self> {
        Outcome::ALL
            .into_iter()
            .find(|o| o.as_str() == s.trim())
            .ok_or_else(|| PairingError::InvalidOutcome(s.to_string()))
    }
}

/// A single recorded match between two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    /// Relative to `player_a`.
    pub outcome: Outcome,
}

impl MatchResult {
    pub fn new(player_a: PlayerId, player_b: PlayerId, outcome: Outcome) -> Self {
        MatchResult { player_a, player_b, outcome }
    }

    /// Canonical storage form: A is always the winner or an equal side.
    pub fn normalized(self) -> Self {
        if self.outcome.is_reversed() {
            MatchResult {
                player_a: self.player_b,
                player_b: self.player_a,
                outcome: self.outcome.inverse(),
            }
        } else {
            self
        }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.player_a == player || self.player_b == player
    }

    /// Re-express the result with `player` as side A. `None` if they didn't play.
    pub fn from_perspective(self, player: PlayerId) -> Option<Self> {
        if self.player_a == player {
            Some(self)
        } else if self.player_b == player {
            Some(MatchResult {
                player_a: self.player_b,
                player_b: self.player_a,
                outcome: self.outcome.inverse(),
            })
        } else {
            None
        }
    }
}

/// How often each unordered pair of players has met.
#[derive(Debug, Clone, Default)]
pub struct EncounterHistory {
    counts: HashMap<(PlayerId, PlayerId), u32>,
}

impl EncounterHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_matches<'a, I>(matches: I) -> Self
    where
        I: IntoIterator<Item = &'a MatchResult>,
    {
        let mut history = EncounterHistory::new();
        for m in matches {
            history.record(m.player_a, m.player_b);
        }
        history
    }

    pub fn record(&mut self, a: PlayerId, b: PlayerId) {
        *self.counts.entry(pair_key(a, b)).or_insert(0) += 1;
    }

    pub fn count(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.counts.get(&pair_key(a, b)).copied().unwrap_or(0)
    }
}

fn pair_key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Square pairing-desirability matrix, stored row-major.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffinityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl AffinityMatrix {
    /// Build an N×N matrix by evaluating `f(i, j)` for every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(size * size);
        for i in 0..size {
            for j in 0..size {
                values.push(f(i, j));
            }
        }
        AffinityMatrix { size, values }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.size).all(|i| {
            (i + 1..self.size).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tolerance)
        })
    }
}

/// Players split into tables, in seriation order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DraftGrouping {
    pub tables: Vec<Vec<PlayerId>>,
}

impl DraftGrouping {
    pub fn player_count(&self) -> usize {
        self.tables.iter().map(Vec::len).sum()
    }
}

/// One entry of a round: either a head-to-head match or a bye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pairing {
    Match(PlayerId, PlayerId),
    Suspended(PlayerId),
}

/// All pairings for one table in one round.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairingRound {
    pub entries: Vec<Pairing>,
}

impl PairingRound {
    pub fn matches(&self) -> impl Iterator<Item = (PlayerId, PlayerId)> + '_ {
        self.entries.iter().filter_map(|p| match *p {
            Pairing::Match(a, b) => Some((a, b)),
            Pairing::Suspended(_) => None,
        })
    }

    pub fn suspended(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.entries.iter().filter_map(|p| match *p {
            Pairing::Suspended(id) => Some(id),
            Pairing::Match(..) => None,
        })
    }
}

/// Maps between caller-provided player ids and internal 0..N indices.
pub(crate) struct IdMap {
    ids: Vec<PlayerId>,
}

impl IdMap {
    pub fn from_ids(ids: &[PlayerId]) -> Result<Self> {
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in ids {
            if !seen.insert(id) {
                return Err(PairingError::DuplicatePlayer(id));
            }
        }
        Ok(IdMap { ids: ids.to_vec() })
    }

    pub fn to_ids(&self, indices: &[usize]) -> Vec<PlayerId> {
        indices.iter().map(|&idx| self.ids[idx]).collect()
    }
}
