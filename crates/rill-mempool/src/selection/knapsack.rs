//! 0/1 knapsack reference selection over parentless transactions only
//! (§4.I). Intended for small inputs; not CPFP-aware.

use tracing::info;

use crate::mempool::Mempool;
use crate::selection::SelectionResult;

/// Transactions considered beyond this count are trimmed to the highest
/// fee-per-byte `MAX_CANDIDATES`, to keep the DP table bounded.
const MAX_CANDIDATES: usize = 100;

/// Size values are scaled by this factor before building the DP table, so
/// a byte budget in the tens of thousands doesn't blow up the table when
/// transaction sizes are small.
const SIZE_SCALE: u64 = 1000;

/// Standard 0/1 knapsack over parentless mempool transactions, capped to
/// [`MAX_CANDIDATES`] highest-fee-rate candidates when the pool has more.
pub fn select(pool: &Mempool, budget: u64) -> SelectionResult {
    let mut candidates: Vec<_> = pool.iter().filter(|tx| tx.parents.is_empty()).collect();

    if candidates.len() > MAX_CANDIDATES {
        candidates.sort_by(|a, b| crate::entry::fee_rate_cmp(b, a));
        candidates.truncate(MAX_CANDIDATES);
    }

    // Scale sizes down by SIZE_SCALE (rounding up) so the DP table has at
    // most budget/SIZE_SCALE + 1 columns.
    let scaled_budget = (budget / SIZE_SCALE) as usize;
    let scaled_sizes: Vec<usize> = candidates
        .iter()
        .map(|tx| ((tx.size + SIZE_SCALE - 1) / SIZE_SCALE) as usize)
        .collect();

    let n = candidates.len();
    // table[i][w] = best fee achievable using the first i candidates within
    // scaled weight w.
    let mut table = vec![vec![0u64; scaled_budget + 1]; n + 1];

    for i in 1..=n {
        let size = scaled_sizes[i - 1];
        let fee = candidates[i - 1].fee;
        for w in 0..=scaled_budget {
            table[i][w] = table[i - 1][w];
            if size <= w {
                table[i][w] = table[i][w].max(table[i - 1][w - size] + fee);
            }
        }
    }

    // Backtrack to recover the chosen items.
    let mut selected_ids = Vec::new();
    let mut total_fee = 0u64;
    let mut total_size = 0u64;
    let mut w = scaled_budget;
    for i in (1..=n).rev() {
        if table[i][w] != table[i - 1][w] {
            let tx = candidates[i - 1];
            selected_ids.push(tx.tx_id.clone());
            total_fee += tx.fee;
            total_size += tx.size;
            w -= scaled_sizes[i - 1];
        }
    }
    selected_ids.reverse();

    info!(strategy = "knapsack", selected = selected_ids.len(), total_fee, "selection complete");
    SelectionResult {
        selected_ids,
        total_fee,
        total_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mempool;

    #[test]
    fn picks_the_higher_fee_item_when_only_one_fits() {
        let mut pool = Mempool::new();
        pool.add("low", 1000, 1000, []).unwrap();
        pool.add("high", 5000, 1000, []).unwrap();
        let result = select(&pool, 1000);
        assert_eq!(result.selected_ids, vec!["high".to_string()]);
    }

    #[test]
    fn fills_budget_with_best_combination() {
        let mut pool = Mempool::new();
        pool.add("a", 60, 1000, []).unwrap();
        pool.add("b", 100, 1000, []).unwrap();
        pool.add("c", 120, 1000, []).unwrap();
        let result = select(&pool, 2000);
        assert_eq!(result.total_fee, 220);
        assert_eq!(result.total_size, 2000);
    }

    #[test]
    fn ignores_transactions_with_parents() {
        let mut pool = Mempool::new();
        pool.add("p", 10, 500, []).unwrap();
        pool.add("c", 100_000, 500, ["p".to_string()]).unwrap();
        let result = select(&pool, 1000);
        assert!(!result.selected_ids.contains(&"c".to_string()));
    }

    #[test]
    fn caps_candidates_at_one_hundred() {
        let mut pool = Mempool::new();
        for i in 0..150 {
            pool.add(format!("t{i}"), 100 + i as u64, 1000, []).unwrap();
        }
        // Budget large enough for all 150 if uncapped, but the cap limits
        // consideration to the 100 highest fee-rate candidates.
        let result = select(&pool, 150_000);
        assert!(result.selected_ids.len() <= 100);
    }
}
