//! Error type for rejected pairing and rating requests.
//!
//! Every variant is a caller input error: nothing in this crate fails
//! transiently, so nothing here is worth retrying.

use thiserror::Error;

use crate::types::PlayerId;

pub type Result<T> = std::result::Result<T, PairingError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PairingError {
    /// Result string is not one of the recognized outcomes.
    #[error("invalid outcome \"{0}\", expected one of 2:0, 2:1, 1:2, 0:2, draw, forfeit")]
    InvalidOutcome(String),

    /// Fewer than two players were given to a pairing request.
    #[error("need at least 2 players to pair, got {got}")]
    NotEnoughPlayers { got: usize },

    /// Requested table sizes don't add up to the number of players.
    #[error("table sizes add up to {requested} but {available} players are available")]
    TableSizeMismatch { requested: usize, available: usize },

    /// A table would seat fewer than two players. `index` is 0-based; the
    /// message numbers tables from 1.
    #[error("table {} would seat {size} player(s), tables need at least 2", .index + 1)]
    TableTooSmall { index: usize, size: usize },

    #[error("player {0} appears more than once")]
    DuplicatePlayer(PlayerId),

    /// The directory has no rating for this player.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Ratings don't line up one-to-one with the players they belong to.
    #[error("got {ratings} ratings for {players} players")]
    RatingCountMismatch { players: usize, ratings: usize },

    /// A reorder that isn't a permutation of the matrix indices.
    #[error("order is not a permutation of 0..{size}")]
    InvalidOrder { size: usize },

    /// Fun/friendship ratio outside [0, 1].
    #[error("fun/friendship ratio must be between 0 and 1, got {0}")]
    InvalidRatio(f64),

    /// Pairing for rounds after the first depends on in-draft standings,
    /// which have no defined algorithm yet.
    #[error("pairing for round {0} is not implemented, only round 1 can be auto-paired")]
    RoundUnimplemented(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_numbers_are_one_based_in_messages() {
        let err = PairingError::TableTooSmall { index: 1, size: 1 };
        assert_eq!(err.to_string(), "table 2 would seat 1 player(s), tables need at least 2");
    }
}
