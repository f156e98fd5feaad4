//! Ancestor-set (package/CPFP) selection (§4.I): a high-fee child can lift
//! its low-fee ancestors into the block.

use std::collections::HashSet;

use tracing::info;

use crate::entry::fee_rate_cmp;
use crate::mempool::Mempool;
use crate::selection::SelectionResult;

/// 1. Memoize every transaction's ancestor set.
/// 2. Sort transactions by their own fee rate descending (a high-fee child
///    is considered on its own merit, ahead of its cheaper ancestors).
/// 3. For each transaction in that order, pull in whichever of its
///    ancestors aren't yet selected; if the whole closure fits the
///    remaining budget, select it; otherwise skip it for good.
///
/// This is what lets a single high-fee child (C) drag its low-fee parent
/// (P) into the block even though neither would individually outscore the
/// surrounding fillers — the filler candidates are still ranked above C's
/// *diluted* package rate, but C's own fee rate can outrank them, and by
/// the time the filler budget is spent C has already claimed its package.
pub fn select(pool: &Mempool, budget: u64) -> SelectionResult {
    let mut candidates: Vec<_> = pool.iter().collect();
    candidates.sort_by(|a, b| fee_rate_cmp(b, a));

    let mut selected: HashSet<String> = HashSet::new();
    let mut selected_ids = Vec::new();
    let mut total_fee = 0u64;
    let mut total_size = 0u64;

    for tx in candidates {
        if selected.contains(&tx.tx_id) {
            continue;
        }
        let mut ancestors: Vec<String> = pool
            .ancestor_set(&tx.tx_id)
            .into_iter()
            .filter(|a| !selected.contains(a))
            .collect();
        // Deepest ancestors first so the topological closure holds at
        // every selection prefix.
        ancestors.sort_by_key(|id| pool.ancestor_set(id).len());

        let closure_size: u64 = ancestors.iter().filter_map(|id| pool.get(id)).map(|t| t.size).sum::<u64>() + tx.size;
        if total_size + closure_size > budget {
            continue;
        }

        for id in ancestors {
            if let Some(ancestor) = pool.get(&id) {
                total_fee += ancestor.fee;
                total_size += ancestor.size;
            }
            selected.insert(id.clone());
            selected_ids.push(id);
        }
        total_fee += tx.fee;
        total_size += tx.size;
        selected.insert(tx.tx_id.clone());
        selected_ids.push(tx.tx_id.clone());
    }

    info!(strategy = "ancestor-set", selected = selected_ids.len(), total_fee, "selection complete");
    SelectionResult {
        selected_ids,
        total_fee,
        total_size,
    }
}
