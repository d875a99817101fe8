//! Subset enumeration for legal moves.

use itertools::Itertools;

use crate::game::Move;

/// Every subset of `values` (size >= 1) whose elements sum to `target`.
///
/// Each subset is ascending and the result is deduplicated and sorted
/// lexicographically, so identical inputs always give identical output.
/// Brute force over all subset sizes; boards hold at most a dozen tiles.
#[must_use]
pub fn combos_that_sum(values: &[u8], target: u8) -> Vec<Move> {
    let mut values = values.to_vec();
    values.sort_unstable();
    let target = u32::from(target);

    let mut out: Vec<Move> = (1..=values.len())
        .flat_map(|k| values.iter().copied().combinations(k))
        .filter(|combo| combo.iter().map(|&v| u32::from(v)).sum::<u32>() == target)
        .map(Move::new)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}
