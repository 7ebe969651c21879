/// Pairing desirability scores.
///
/// Blends two signals, each min-max normalized over the whole batch of
/// candidate pairs and inverted so that smaller is better:
///   - rating gap (close skill makes a fun match)
///   - encounter count (new opponents make friends)
///
/// Because normalization uses the batch range, a pair's score depends on
/// every other player in the request.
use crate::constants::{NEUTRAL_SCORE, SELF_AFFINITY};
use crate::error::{PairingError, Result};
use crate::types::{AffinityMatrix, PlayerId};

/// Observed [min, max] of a value across a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    /// `None` for an empty batch.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |range, v| match range {
            None => Some(ScoreRange { min: v, max: v }),
            Some(r) => Some(ScoreRange { min: r.min.min(v), max: r.max.max(v) }),
        })
    }

    /// 1 at the minimum, 0 at the maximum. Neutral when the range is empty.
    pub fn inverted_score(&self, value: f64) -> f64 {
        if self.max == self.min {
            return NEUTRAL_SCORE;
        }
        1.0 - (value - self.min) / (self.max - self.min)
    }
}

/// Affinity of a single pair in [0, 1].
///
/// `fun_friendship_ratio` = 1 pairs purely by skill, 0 purely by novelty.
pub fn pair_affinity(
    rating_gap: f64,
    encounter_count: u32,
    rating_gap_range: &ScoreRange,
    encounter_count_range: &ScoreRange,
    fun_friendship_ratio: f64,
) -> f64 {
    let rating_gap_score = rating_gap_range.inverted_score(rating_gap);
    let encounter_score = encounter_count_range.inverted_score(f64::from(encounter_count));
    rating_gap_score * fun_friendship_ratio + encounter_score * (1.0 - fun_friendship_ratio)
}

pub fn validate_ratio(fun_friendship_ratio: f64) -> Result<()> {
    if (0.0..=1.0).contains(&fun_friendship_ratio) {
        Ok(())
    } else {
        Err(PairingError::InvalidRatio(fun_friendship_ratio))
    }
}

/// Build the N×N affinity matrix for a pairing request.
///
/// `ratings[i]` is the rating of `player_ids[i]`. Ranges are taken over every
/// off-diagonal pair before any score is computed. The diagonal is always 1.
pub fn build_affinity_matrix(
    player_ids: &[PlayerId],
    ratings: &[f64],
    encounter_count: impl Fn(PlayerId, PlayerId) -> u32,
    fun_friendship_ratio: f64,
) -> Result<AffinityMatrix> {
    let n = player_ids.len();
    if ratings.len() != n {
        return Err(PairingError::RatingCountMismatch { players: n, ratings: ratings.len() });
    }
    if n < 2 {
        return Err(PairingError::NotEnoughPlayers { got: n });
    }
    validate_ratio(fun_friendship_ratio)?;

    // Gaps and counts are symmetric, so the upper triangle covers the batch.
    let mut gaps = vec![0.0; n * n];
    let mut counts = vec![0u32; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let gap = (ratings[i] - ratings[j]).abs();
            let count = encounter_count(player_ids[i], player_ids[j]);
            gaps[i * n + j] = gap;
            gaps[j * n + i] = gap;
            counts[i * n + j] = count;
            counts[j * n + i] = count;
        }
    }

    let upper = move || (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| i * n + j));
    // n >= 2 guarantees at least one off-diagonal pair.
    let gap_range = ScoreRange::from_values(upper().map(|k| gaps[k]))
        .unwrap_or(ScoreRange { min: 0.0, max: 0.0 });
    let count_range = ScoreRange::from_values(upper().map(|k| f64::from(counts[k])))
        .unwrap_or(ScoreRange { min: 0.0, max: 0.0 });

    tracing::trace!(?gap_range, ?count_range, players = n, "affinity batch ranges");

    Ok(AffinityMatrix::from_fn(n, |i, j| {
        if i == j {
            SELF_AFFINITY
        } else {
            pair_affinity(gaps[i * n + j], counts[i * n + j], &gap_range, &count_range, fun_friendship_ratio)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_history(_: PlayerId, _: PlayerId) -> u32 {
        0
    }

    #[test]
    fn test_range_inverted_score() {
        let range = ScoreRange { min: 0.0, max: 200.0 };
        assert_eq!(range.inverted_score(0.0), 1.0);
        assert_eq!(range.inverted_score(200.0), 0.0);
        assert!((range.inverted_score(50.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_equal_range_is_neutral() {
        let flat = ScoreRange { min: 3.0, max: 3.0 };
        assert_eq!(flat.inverted_score(3.0), 0.5);
    }

    #[test]
    fn test_equal_gaps_give_neutral_rating_score() {
        let gaps = ScoreRange { min: 100.0, max: 100.0 };
        let counts = ScoreRange { min: 0.0, max: 4.0 };
        for &ratio in &[0.0, 0.3, 1.0] {
            // encounter_count = 2 sits mid-range, so its score is 0.5 too
            let score = pair_affinity(100.0, 2, &gaps, &counts, ratio);
            assert!((score - 0.5).abs() < 1e-12);
        }
        // ratio 1 ignores history, leaving only the neutral rating score
        assert!((pair_affinity(100.0, 0, &gaps, &counts, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_weights() {
        let gaps = ScoreRange { min: 0.0, max: 100.0 };
        let counts = ScoreRange { min: 0.0, max: 10.0 };
        // Closest skill but most played
        assert_eq!(pair_affinity(0.0, 10, &gaps, &counts, 1.0), 1.0);
        assert_eq!(pair_affinity(0.0, 10, &gaps, &counts, 0.0), 0.0);
        assert!((pair_affinity(0.0, 10, &gaps, &counts, 0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let ids = vec![10, 20, 30, 40];
        let ratings = vec![1000.0, 1040.0, 1200.0, 980.0];
        let history = |a: PlayerId, b: PlayerId| if a + b == 30 { 3 } else { 1 };
        let m = build_affinity_matrix(&ids, &ratings, history, 0.5).unwrap();

        assert_eq!(m.size(), 4);
        assert!(m.is_symmetric(0.0));
        for i in 0..4 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..4 {
                assert!((0.0..=1.0).contains(&m.get(i, j)));
            }
        }
    }

    #[test]
    fn test_matrix_uses_whole_batch_range() {
        // Gaps: (0,1)=10, (0,2)=110, (1,2)=100. Batch range is [10, 110].
        let ids = vec![1, 2, 3];
        let ratings = vec![1000.0, 1010.0, 1110.0];
        let m = build_affinity_matrix(&ids, &ratings, no_history, 1.0).unwrap();
        assert!((m.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((m.get(0, 2) - 0.0).abs() < 1e-12);
        assert!((m.get(1, 2) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_two_players_is_degenerate_but_valid() {
        let m = build_affinity_matrix(&[1, 2], &[1000.0, 1300.0], no_history, 0.7).unwrap();
        assert!((m.get(0, 1) - 0.5).abs() < 1e-12);
        assert_eq!(m.get(0, 0), 1.0);
    }

    #[test]
    fn test_rejects_single_player() {
        let err = build_affinity_matrix(&[1], &[1000.0], no_history, 0.5).unwrap_err();
        assert_eq!(err, PairingError::NotEnoughPlayers { got: 1 });
    }

    #[test]
    fn test_rejects_misaligned_ratings() {
        let err = build_affinity_matrix(&[1, 2, 3], &[1000.0, 1000.0], no_history, 0.5).unwrap_err();
        assert_eq!(err, PairingError::RatingCountMismatch { players: 3, ratings: 2 });
    }

    #[test]
    fn test_rejects_bad_ratio() {
        let err = build_affinity_matrix(&[1, 2], &[1000.0, 1000.0], no_history, 1.5).unwrap_err();
        assert_eq!(err, PairingError::InvalidRatio(1.5));
    }
}
