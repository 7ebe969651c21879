/// Seriation: turn an affinity matrix into a 1-D player order.
///
/// Ward-linkage agglomerative clustering builds a binary merge tree over
/// `1 - affinity`; a left-first walk of its leaves puts players that were
/// merged early (the most compatible ones) next to each other.
///
/// Operates on dense `usize` indices. Callers map back to player ids.
use crate::error::{PairingError, Result};
use crate::types::AffinityMatrix;

/// One merge in the clustering. Cluster ids `< n` are original points,
/// id `n + k` is the cluster created by merge `k`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    /// Smaller of the two merged cluster ids.
    pub left: usize,
    pub right: usize,
    /// Ward distance at which the merge happened.
    pub distance: f64,
    /// Number of original points in the new cluster.
    pub size: usize,
}

/// The full merge tree, stored as an arena of merges in creation order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Linkage {
    pub leaves: usize,
    pub merges: Vec<Merge>,
}

impl Linkage {
    /// Id of the root cluster, `None` for an empty tree.
    pub fn root(&self) -> Option<usize> {
        match (self.leaves, self.merges.len()) {
            (0, _) => None,
            (_, 0) => Some(0),
            (n, m) => Some(n + m - 1),
        }
    }

    /// Children of an internal node; `None` for a leaf.
    pub fn children(&self, cluster: usize) -> Option<(usize, usize)> {
        cluster
            .checked_sub(self.leaves)
            .map(|k| (self.merges[k].left, self.merges[k].right))
    }
}

/// Agglomerative clustering with Ward linkage over a symmetric dissimilarity
/// matrix.
///
/// Straightforward O(n³) version: each step scans every active pair and
/// merges the closest, the first pair found winning ties. Distances to the
/// new cluster come from the Lance-Williams update for Ward's method.
pub fn ward_linkage(dissimilarity: &AffinityMatrix) -> Linkage {
    let n = dissimilarity.size();
    let mut dist: Vec<f64> = (0..n * n).map(|k| dissimilarity.get(k / n, k % n)).collect();
    // Slot i holds the cluster that originally started at point i.
    let mut cluster_id: Vec<Option<usize>> = (0..n).map(Some).collect();
    let mut sizes = vec![1usize; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for step in 0..n.saturating_sub(1) {
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..n {
            if cluster_id[i].is_none() {
                continue;
            }
            for j in (i + 1)..n {
                if cluster_id[j].is_none() {
                    continue;
                }
                let d = dist[i * n + j];
                if best.map_or(true, |(_, _, bd)| d < bd) {
                    best = Some((i, j, d));
                }
            }
        }

        let Some((i, j, d_ij)) = best else { break };
        let (Some(id_i), Some(id_j)) = (cluster_id[i], cluster_id[j]) else { break };
        let (n_i, n_j) = (sizes[i] as f64, sizes[j] as f64);

        for k in 0..n {
            if k == i || k == j || cluster_id[k].is_none() {
                continue;
            }
            let n_k = sizes[k] as f64;
            let d_ki = dist[k * n + i];
            let d_kj = dist[k * n + j];
            let squared = ((n_i + n_k) * d_ki * d_ki + (n_j + n_k) * d_kj * d_kj - n_k * d_ij * d_ij)
                / (n_i + n_j + n_k);
            let updated = squared.max(0.0).sqrt();
            dist[k * n + i] = updated;
            dist[i * n + k] = updated;
        }

        merges.push(Merge {
            left: id_i.min(id_j),
            right: id_i.max(id_j),
            distance: d_ij,
            size: sizes[i] + sizes[j],
        });
        sizes[i] += sizes[j];
        cluster_id[i] = Some(n + step);
        cluster_id[j] = None;
    }

    Linkage { leaves: n, merges }
}

/// Leaf order of the merge tree: left subtree first, then right.
///
/// Iterative so that deep, chain-shaped trees can't overflow the stack.
pub fn seriate(linkage: &Linkage) -> Vec<usize> {
    let mut order = Vec::with_capacity(linkage.leaves);
    let mut stack: Vec<usize> = linkage.root().into_iter().collect();

    while let Some(cluster) = stack.pop() {
        match linkage.children(cluster) {
            Some((left, right)) => {
                stack.push(right);
                stack.push(left);
            }
            None => order.push(cluster),
        }
    }

    order
}

/// Seriation order for an affinity matrix: a permutation of `0..n`.
pub fn order(affinity: &AffinityMatrix) -> Vec<usize> {
    let dissimilarity = AffinityMatrix::from_fn(affinity.size(), |i, j| 1.0 - affinity.get(i, j));
    let linkage = ward_linkage(&dissimilarity);
    tracing::trace!(merges = linkage.merges.len(), "ward linkage built");
    seriate(&linkage)
}

/// The matrix with rows and columns permuted into `order`, mirrored from
/// the upper triangle so it stays symmetric.
pub fn reordered_matrix(affinity: &AffinityMatrix, order: &[usize]) -> Result<AffinityMatrix> {
    let size = affinity.size();
    let mut seen = vec![false; size];
    for &idx in order {
        match seen.get_mut(idx) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(PairingError::InvalidOrder { size }),
        }
    }
    if order.len() != size {
        return Err(PairingError::InvalidOrder { size });
    }

    Ok(AffinityMatrix::from_fn(size, |i, j| {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        affinity.get(order[lo], order[hi])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_affinity(n: usize, rng: &mut impl Rng) -> AffinityMatrix {
        let mut upper = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                upper[i * n + j] = rng.random::<f64>();
            }
        }
        AffinityMatrix::from_fn(n, |i, j| match i.cmp(&j) {
            std::cmp::Ordering::Equal => 1.0,
            std::cmp::Ordering::Less => upper[i * n + j],
            std::cmp::Ordering::Greater => upper[j * n + i],
        })
    }

    fn assert_permutation(order: &[usize], n: usize) {
        assert_eq!(order.len(), n);
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn test_order_is_bijection_for_four() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let m = random_affinity(4, &mut rng);
            assert_permutation(&order(&m), 4);
        }
    }

    #[test]
    fn test_order_is_bijection_for_many_sizes() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in 2..30 {
            let m = random_affinity(n, &mut rng);
            assert_permutation(&order(&m), n);
        }
    }

    #[test]
    fn test_two_points_single_merge() {
        let m = AffinityMatrix::from_fn(2, |i, j| if i == j { 1.0 } else { 0.3 });
        let dissimilarity = AffinityMatrix::from_fn(2, |i, j| 1.0 - m.get(i, j));
        let linkage = ward_linkage(&dissimilarity);
        assert_eq!(linkage.merges.len(), 1);
        assert_eq!(linkage.merges[0].size, 2);
        assert_permutation(&order(&m), 2);
    }

    #[test]
    fn test_trivial_sizes() {
        assert!(order(&AffinityMatrix::from_fn(0, |_, _| 1.0)).is_empty());
        assert_eq!(order(&AffinityMatrix::from_fn(1, |_, _| 1.0)), vec![0]);
    }

    #[test]
    fn test_all_equal_affinities_break_ties_in_scan_order() {
        // Every pair is equally distant, so each step merges the first active
        // pair in scan order into the lower slot. The cluster in slot 0 keeps
        // absorbing the next point, and the newcomer (the smaller id) is walked first.
        let flat = |n: usize| AffinityMatrix::from_fn(n, |i, j| if i == j { 1.0 } else { 0.5 });
        assert_eq!(order(&flat(4)), vec![3, 2, 0, 1]);
        assert_eq!(order(&flat(7)), vec![6, 5, 4, 3, 2, 0, 1]);

        let dissimilarity = AffinityMatrix::from_fn(4, |i, j| 1.0 - flat(4).get(i, j));
        let linkage = ward_linkage(&dissimilarity);
        let pairs: Vec<(usize, usize)> = linkage.merges.iter().map(|m| (m.left, m.right)).collect();
        assert_eq!(pairs, vec![(0, 1), (2, 4), (3, 5)]);
    }

    #[test]
    fn test_reordered_matrix_rejects_non_permutations() {
        let m = AffinityMatrix::from_fn(3, |i, j| if i == j { 1.0 } else { 0.2 });
        let bad_orders: [&[usize]; 4] = [&[0, 1], &[0, 1, 1], &[0, 1, 3], &[0, 1, 2, 0]];
        for bad in bad_orders {
            assert_eq!(reordered_matrix(&m, bad).unwrap_err(), PairingError::InvalidOrder { size: 3 });
        }
        assert!(reordered_matrix(&m, &[2, 0, 1]).is_ok());
    }

    #[test]
    fn test_compatible_players_end_up_adjacent() {
        // 0-2 and 1-3 are strong pairs; everything else is weak.
        let strong = |i: usize, j: usize| matches!((i.min(j), i.max(j)), (0, 2) | (1, 3));
        let m = AffinityMatrix::from_fn(4, |i, j| {
            if i == j {
                1.0
            } else if strong(i, j) {
                0.9
            } else {
                0.1
            }
        });
        assert_eq!(order(&m), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_merge_tree_shape() {
        let mut rng = StdRng::seed_from_u64(9);
        let m = random_affinity(12, &mut rng);
        let dissimilarity = AffinityMatrix::from_fn(12, |i, j| 1.0 - m.get(i, j));
        let linkage = ward_linkage(&dissimilarity);

        assert_eq!(linkage.merges.len(), 11);
        assert_eq!(linkage.root(), Some(22));
        assert_eq!(linkage.merges.last().map(|m| m.size), Some(12));
        for (k, merge) in linkage.merges.iter().enumerate() {
            assert!(merge.left < merge.right);
            assert!(merge.right < 12 + k, "merge {k} refers to a later cluster");
        }
        // Ward is monotone: merge heights never decrease
        for pair in linkage.merges.windows(2) {
            assert!(pair[1].distance >= pair[0].distance - 1e-12);
        }
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        // Nested merges: each point joins the growing cluster in turn.
        let n = 5000;
        let linkage = Linkage {
            leaves: n,
            merges: (0..n - 1)
                .map(|k| Merge {
                    left: if k == 0 { 0 } else { k + 1 },
                    right: if k == 0 { 1 } else { n + k - 1 },
                    distance: k as f64,
                    size: k + 2,
                })
                .collect(),
        };
        assert_permutation(&seriate(&linkage), n);
    }

    #[test]
    fn test_reordered_matrix_is_symmetric_permutation() {
        let mut rng = StdRng::seed_from_u64(5);
        let m = random_affinity(6, &mut rng);
        let o = order(&m);
        let r = reordered_matrix(&m, &o).unwrap();
        assert!(r.is_symmetric(0.0));
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(r.get(i, j), m.get(o[i], o[j]));
            }
        }
    }
}
