/// Elo-style rating updates.
///
/// Zero-sum: whatever A gains, B loses. Pure functions, no clamping.
use crate::constants::{EXPECTED_TENFOLD_ADVANTAGE, K_FACTOR, STARTING_RATING};
use crate::types::{MatchResult, Outcome, PlayerId};

/// Rating system parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EloConfig {
    pub k_factor: f64,
    /// Rating gap that implies a 10:1 expected-score ratio.
    pub tenfold_advantage: f64,
    /// Rating given to newly added players.
    pub starting_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        EloConfig {
            k_factor: K_FACTOR,
            tenfold_advantage: EXPECTED_TENFOLD_ADVANTAGE,
            starting_rating: STARTING_RATING,
        }
    }
}

/// Expected score of A against B, in (0, 1).
pub fn expected_score(rating_a: f64, rating_b: f64, tenfold_advantage: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / tenfold_advantage))
}

/// Rating change for A. B changes by the negation.
pub fn rating_delta(rating_a: f64, rating_b: f64, outcome: Outcome, config: &EloConfig) -> f64 {
    let expected = expected_score(rating_a, rating_b, config.tenfold_advantage);
    config.k_factor * (outcome.score_for_a() - expected)
}

/// Before/after ratings for both sides of one recorded match.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingChange {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub outcome: Outcome,
    pub delta: f64,
    pub a_before: f64,
    pub a_after: f64,
    pub b_before: f64,
    pub b_after: f64,
}

/// Rate a match. The result is normalized first, so the returned change
/// always has the winner (or an equal side) as A.
///
/// `rating_a` and `rating_b` belong to `result.player_a` and `result.player_b`
/// as given, before normalization.
pub fn rate_match(result: MatchResult, rating_a: f64, rating_b: f64, config: &EloConfig) -> RatingChange {
    let normalized = result.normalized();
    let (a_before, b_before) = if normalized.player_a == result.player_a {
        (rating_a, rating_b)
    } else {
        (rating_b, rating_a)
    };

    let delta = rating_delta(a_before, b_before, normalized.outcome, config);

    RatingChange {
        player_a: normalized.player_a,
        player_b: normalized.player_b,
        outcome: normalized.outcome,
        delta,
        a_before,
        a_after: a_before + delta,
        b_before,
        b_after: b_before - delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_expected_score_equal_ratings() {
        assert!((expected_score(1000.0, 1000.0, 400.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_expected_score_tenfold() {
        // 400 points ahead => 10:1 expected ratio
        let e = expected_score(1400.0, 1000.0, 400.0);
        assert!((e / (1.0 - e) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_expected_scores_complement() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let a = rng.random_range(0.0..3000.0);
            let b = rng.random_range(0.0..3000.0);
            let sum = expected_score(a, b, 400.0) + expected_score(b, a, 400.0);
            assert!((sum - 1.0).abs() < 1e-12, "sum {sum} for {a} vs {b}");
        }
    }

    #[test]
    fn test_delta_even_win() {
        let delta = rating_delta(1000.0, 1000.0, Outcome::TwoZero, &EloConfig::default());
        assert!((delta - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_delta_favourite_draw() {
        let delta = rating_delta(1200.0, 1000.0, Outcome::Draw, &EloConfig::default());
        assert!((delta + 8.3119).abs() < 1e-3, "delta {delta}");
        assert!((1200.0 + delta - 1191.69).abs() < 1e-2);
        assert!((1000.0 - delta - 1008.31).abs() < 1e-2);
    }

    #[test]
    fn test_rate_match_conserves_total() {
        let config = EloConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let a = rng.random_range(500.0..2000.0);
            let b = rng.random_range(500.0..2000.0);
            for outcome in Outcome::ALL {
                let change = rate_match(MatchResult::new(1, 2, outcome), a, b, &config);
                let before = change.a_before + change.b_before;
                let after = change.a_after + change.b_after;
                assert!((before - after).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_rate_match_normalizes_loss() {
        let config = EloConfig::default();
        let change = rate_match(MatchResult::new(1, 2, Outcome::ZeroTwo), 1100.0, 1000.0, &config);
        assert_eq!(change.player_a, 2);
        assert_eq!(change.player_b, 1);
        assert_eq!(change.outcome, Outcome::TwoZero);
        assert_eq!(change.a_before, 1000.0);
        assert_eq!(change.b_before, 1100.0);
        // Upset win gains more than half of K
        assert!(change.delta > 16.0);
    }
}
