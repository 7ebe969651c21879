/// Slicing a seriated player order into tables and head-to-head pairs.
///
/// Both steps walk the order front to back. Nothing is optimized here: the
/// seriation has already put compatible players next to each other, so
/// neighbours are paired greedily.
use crate::constants::MIN_TABLE_SIZE;
use crate::error::{PairingError, Result};
use crate::types::{DraftGrouping, Pairing, PairingRound, PlayerId};

/// Check that `table_sizes` seats exactly `player_count` players, at least
/// two per table.
pub fn validate_table_sizes(player_count: usize, table_sizes: &[usize]) -> Result<()> {
    if let Some(index) = table_sizes.iter().position(|&size| size < MIN_TABLE_SIZE) {
        return Err(PairingError::TableTooSmall { index, size: table_sizes[index] });
    }
    let requested: usize = table_sizes.iter().sum();
    if requested != player_count {
        return Err(PairingError::TableSizeMismatch { requested, available: player_count });
    }
    Ok(())
}

/// Split `order` into consecutive tables of the given sizes.
pub fn partition_into_tables(order: &[PlayerId], table_sizes: &[usize]) -> Result<DraftGrouping> {
    validate_table_sizes(order.len(), table_sizes)?;

    let mut rest = order;
    let mut tables = Vec::with_capacity(table_sizes.len());
    for &size in table_sizes {
        let (table, tail) = rest.split_at(size);
        tables.push(table.to_vec());
        rest = tail;
    }

    Ok(DraftGrouping { tables })
}

/// Pair neighbours in `order`: (0, 1), (2, 3), ... An odd player out at the
/// end sits the round out.
pub fn pair_within_table(order: &[PlayerId]) -> PairingRound {
    let entries = order
        .chunks(2)
        .map(|chunk| match *chunk {
            [a, b] => Pairing::Match(a, b),
            [single] => Pairing::Suspended(single),
            _ => unreachable!("chunks(2) yields one or two players"),
        })
        .collect();

    PairingRound { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_reconstructs_order() {
        let order: Vec<PlayerId> = vec![7, 3, 9, 1, 4, 8, 2];
        let sizes = [3, 2, 2];
        let grouping = partition_into_tables(&order, &sizes).unwrap();

        let lengths: Vec<usize> = grouping.tables.iter().map(Vec::len).collect();
        assert_eq!(lengths, sizes);
        assert_eq!(grouping.tables.concat(), order);
        assert_eq!(grouping.player_count(), 7);
    }

    #[test]
    fn test_partition_rejects_mismatched_sum() {
        let err = partition_into_tables(&[1, 2, 3, 4], &[2, 3]).unwrap_err();
        assert_eq!(err, PairingError::TableSizeMismatch { requested: 5, available: 4 });
    }

    #[test]
    fn test_partition_rejects_small_table() {
        let err = partition_into_tables(&[1, 2, 3, 4, 5], &[4, 1]).unwrap_err();
        assert_eq!(err, PairingError::TableTooSmall { index: 1, size: 1 });
    }

    #[test]
    fn test_partition_single_table() {
        let grouping = partition_into_tables(&[5, 6], &[2]).unwrap();
        assert_eq!(grouping.tables, vec![vec![5, 6]]);
    }

    #[test]
    fn test_pair_odd_table() {
        let round = pair_within_table(&[10, 20, 30, 40, 50]);
        assert_eq!(round.matches().count(), 2);
        assert_eq!(round.suspended().collect::<Vec<_>>(), vec![50]);
        assert_eq!(
            round.entries,
            vec![Pairing::Match(10, 20), Pairing::Match(30, 40), Pairing::Suspended(50)]
        );
    }

    #[test]
    fn test_pair_even_table() {
        let round = pair_within_table(&[4, 3, 2, 1]);
        assert_eq!(round.matches().collect::<Vec<_>>(), vec![(4, 3), (2, 1)]);
        assert_eq!(round.suspended().count(), 0);
    }
}
