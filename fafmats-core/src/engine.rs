/// Pairing and rating entry points.
///
/// Stateless: every call reads ratings and encounter counts from the
/// directory it's handed, builds an affinity matrix, seriates it and slices
/// the result. Nothing is cached between calls.
///
/// Players are identified by caller-provided `i64` IDs.
use crate::affinity::{build_affinity_matrix, validate_ratio};
use crate::constants::MIN_TABLE_SIZE;
use crate::directory::PlayerDirectory;
use crate::error::{PairingError, Result};
use crate::pairing::{pair_within_table, partition_into_tables, validate_table_sizes};
use crate::rating::{rating_delta, EloConfig};
use crate::seriation::{order, reordered_matrix};
use crate::types::{AffinityMatrix, DraftGrouping, IdMap, Outcome, PairingRound, PlayerId};

/// Rating change for A after a match against B. B changes by the negation.
pub fn compute_match_rating_delta(rating_a: f64, rating_b: f64, outcome: Outcome, config: &EloConfig) -> f64 {
    rating_delta(rating_a, rating_b, outcome, config)
}

/// Players in seriation order, with the affinity matrix permuted to match.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriatedPlayers {
    pub order: Vec<PlayerId>,
    pub matrix: AffinityMatrix,
}

/// Order players so that compatible ones sit next to each other.
pub fn seriate_players<D>(
    player_ids: &[PlayerId],
    directory: &D,
    fun_friendship_ratio: f64,
) -> Result<SeriatedPlayers>
where
    D: PlayerDirectory + ?Sized,
{
    let id_map = IdMap::from_ids(player_ids)?;
    if player_ids.len() < 2 {
        return Err(PairingError::NotEnoughPlayers { got: player_ids.len() });
    }
    validate_ratio(fun_friendship_ratio)?;

    let ratings = player_ids
        .iter()
        .map(|&id| directory.rating(id).ok_or(PairingError::UnknownPlayer(id)))
        .collect::<Result<Vec<f64>>>()?;

    let affinity = build_affinity_matrix(
        player_ids,
        &ratings,
        |a, b| directory.encounter_count(a, b),
        fun_friendship_ratio,
    )?;
    let indices = order(&affinity);
    let matrix = reordered_matrix(&affinity, &indices)?;
    let order = id_map.to_ids(&indices);

    tracing::debug!(players = player_ids.len(), ?order, "seriated players");

    Ok(SeriatedPlayers { order, matrix })
}

/// Split players into draft tables of the requested sizes, most compatible
/// players together.
pub fn compute_draft_pairing<D>(
    player_ids: &[PlayerId],
    directory: &D,
    fun_friendship_ratio: f64,
    table_sizes: &[usize],
) -> Result<DraftGrouping>
where
    D: PlayerDirectory + ?Sized,
{
    if player_ids.len() < MIN_TABLE_SIZE {
        return Err(PairingError::NotEnoughPlayers { got: player_ids.len() });
    }
    validate_table_sizes(player_ids.len(), table_sizes)?;
    let seriated = seriate_players(player_ids, directory, fun_friendship_ratio)?;
    let grouping = partition_into_tables(&seriated.order, table_sizes)?;

    tracing::debug!(tables = grouping.tables.len(), "draft tables assigned");
    Ok(grouping)
}

/// First-round pairings for a single table.
pub fn compute_first_round_pairing<D>(
    player_ids: &[PlayerId],
    directory: &D,
    fun_friendship_ratio: f64,
) -> Result<PairingRound>
where
    D: PlayerDirectory + ?Sized,
{
    let seriated = seriate_players(player_ids, directory, fun_friendship_ratio)?;
    Ok(pair_within_table(&seriated.order))
}

/// Pairings for a given round of a draft (1-based).
///
/// Only round 1 is defined. Later rounds would pair by in-draft standings,
/// and return `RoundUnimplemented` until that rule exists.
pub fn compute_round_pairing<D>(
    round: u32,
    player_ids: &[PlayerId],
    directory: &D,
    fun_friendship_ratio: f64,
) -> Result<PairingRound>
where
    D: PlayerDirectory + ?Sized,
{
    match round {
        1 => compute_first_round_pairing(player_ids, directory, fun_friendship_ratio),
        other => Err(PairingError::RoundUnimplemented(other)),
    }
}

/// What to do with the players of a new draft.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TablePairingAction {
    /// Seat players automatically into tables of these sizes.
    Autopair { table_sizes: Vec<usize> },
    /// The organiser will seat players by hand.
    Decline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TablePairingOutcome {
    Paired(DraftGrouping),
    /// No tables assigned; manual seating is up to the caller.
    Declined,
}

pub fn handle_table_pairing<D>(
    action: &TablePairingAction,
    player_ids: &[PlayerId],
    directory: &D,
    fun_friendship_ratio: f64,
) -> Result<TablePairingOutcome>
where
    D: PlayerDirectory + ?Sized,
{
    match action {
        TablePairingAction::Autopair { table_sizes } => {
            compute_draft_pairing(player_ids, directory, fun_friendship_ratio, table_sizes)
                .map(TablePairingOutcome::Paired)
        }
        TablePairingAction::Decline => {
            tracing::debug!(players = player_ids.len(), "table pairing declined");
            Ok(TablePairingOutcome::Declined)
        }
    }
}
