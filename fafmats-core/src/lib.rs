/// fafmats-core: Pure-computation rating and draft pairing engine.
///
/// Match results → Elo rating deltas. Ratings + match history → affinity
/// matrix → Ward-linkage seriation → draft tables and first-round pairs.
/// No IO, no storage. Player records come in through [`PlayerDirectory`].
///
/// Players are identified by caller-provided `i64` IDs. The crate handles the
/// mapping to dense matrix indices internally.
///
/// # Quick start
///
/// ```rust
/// use std::collections::HashMap;
/// use fafmats_core::{compute_draft_pairing, PlayerDirectory, PlayerId};
///
/// struct Club {
///     ratings: HashMap<PlayerId, f64>,
/// }
///
/// impl PlayerDirectory for Club {
///     type Selection = ();
///     fn rating(&self, player: PlayerId) -> Option<f64> {
///         self.ratings.get(&player).copied()
///     }
///     fn encounter_count(&self, _: PlayerId, _: PlayerId) -> u32 {
///         0
///     }
///     fn list_players(&self, _: &()) -> Vec<PlayerId> {
///         self.ratings.keys().copied().collect()
///     }
/// }
///
/// let club = Club {
///     ratings: HashMap::from([(1, 1000.0), (2, 1250.0), (3, 1010.0), (4, 1240.0)]),
/// };
///
/// let draft = compute_draft_pairing(&[1, 2, 3, 4], &club, 1.0, &[2, 2]).unwrap();
/// for (i, table) in draft.tables.iter().enumerate() {
///     println!("Table {}: {:?}", i + 1, table);
/// }
/// ```

pub mod affinity;
pub mod constants;
pub mod directory;
pub mod engine;
pub mod error;
pub mod pairing;
pub mod rating;
pub mod seriation;
pub mod types;

// Re-export primary public API at crate root.
pub use directory::PlayerDirectory;
pub use engine::{
    compute_draft_pairing, compute_first_round_pairing, compute_match_rating_delta,
    compute_round_pairing, handle_table_pairing, seriate_players, SeriatedPlayers,
    TablePairingAction, TablePairingOutcome,
};
pub use error::{PairingError, Result};
pub use pairing::{pair_within_table, partition_into_tables, validate_table_sizes};
pub use rating::{expected_score, rate_match, rating_delta, EloConfig, RatingChange};
pub use types::{
    AffinityMatrix, DraftGrouping, EncounterHistory, MatchResult, Outcome, Pairing,
    PairingRound, PlayerId,
};
