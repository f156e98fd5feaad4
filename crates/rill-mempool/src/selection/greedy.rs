//! Baseline greedy selection: sort by fee rate descending, take what fits
//! and whose parents are already selected (§4.I).

use std::collections::HashSet;

use tracing::info;

use crate::entry::fee_rate_cmp;
use crate::mempool::Mempool;
use crate::selection::SelectionResult;

/// O(n log n): one sort, one linear scan.
pub fn select(pool: &Mempool, budget: u64) -> SelectionResult {
    let mut candidates: Vec<_> = pool.iter().collect();
    candidates.sort_by(|a, b| fee_rate_cmp(b, a));

    let mut selected_ids = Vec::new();
    let mut selected_set: HashSet<String> = HashSet::new();
    let mut total_fee = 0u64;
    let mut total_size = 0u64;

    for tx in candidates {
        if !tx.parents.iter().all(|p| selected_set.contains(p)) {
            continue;
        }
        if total_size + tx.size > budget {
            continue;
        }
        selected_ids.push(tx.tx_id.clone());
        selected_set.insert(tx.tx_id.clone());
        total_fee += tx.fee;
        total_size += tx.size;
    }

    info!(strategy = "greedy", selected = selected_ids.len(), total_fee, "selection complete");
    SelectionResult {
        selected_ids,
        total_fee,
        total_size,
    }
}
