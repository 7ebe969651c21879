/// Rating assigned to a player when they join the club.
pub const STARTING_RATING: f64 = 1000.0;

/// Rating gap at which the stronger player is expected to score ten times as much.
///
/// With the default of 400, a player rated 400 points higher is expected to take
/// ~91% of the points (10:1), and one rated 800 points higher ~99% (100:1).
pub const EXPECTED_TENFOLD_ADVANTAGE: f64 = 400.0;

/// Maximum rating change from a single match.
pub const K_FACTOR: f64 = 32.0;

/// Default blend between skill closeness (1.0) and pairing novelty (0.0).
pub const DEFAULT_FUN_FRIENDSHIP_RATIO: f64 = 0.5;

/// Affinity of a player with themselves. Forced onto the matrix diagonal.
pub const SELF_AFFINITY: f64 = 1.0;

/// Normalized score used when every candidate in a batch has the same value.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Smallest table a draft may be split into.
pub const MIN_TABLE_SIZE: usize = 2;
