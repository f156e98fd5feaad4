//! Simulated annealing selection (§4.I): seeded with greedy's output, then
//! perturbed under a cooling schedule to search for a higher-fee valid
//! selection. Deterministic given a fixed RNG seed.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::mempool::Mempool;
use crate::selection::{greedy, SelectionResult};

pub const DEFAULT_ITERATIONS: u32 = 8_000;
pub const DEFAULT_COOLING_RATE: f64 = 0.995;
pub const DEFAULT_START_TEMPERATURE: f64 = 1000.0;

struct State<'a> {
    pool: &'a Mempool,
    budget: u64,
    selected: HashSet<String>,
}

impl<'a> State<'a> {
    fn fee(&self) -> u64 {
        self.selected.iter().filter_map(|id| self.pool.get(id)).map(|t| t.fee).sum()
    }

    fn size(&self) -> u64 {
        self.selected.iter().filter_map(|id| self.pool.get(id)).map(|t| t.size).sum()
    }

    /// Remove `tx_id` and every transaction that (transitively) depends on
    /// it, so the selection never leaves a child whose parent was pulled
    /// out.
    fn remove_with_descendants(&mut self, tx_id: &str) {
        let mut stack = vec![tx_id.to_string()];
        while let Some(id) = stack.pop() {
            if self.selected.remove(&id) {
                if let Some(tx) = self.pool.get(&id) {
                    stack.extend(tx.children.iter().cloned());
                }
            }
        }
    }

    /// Attempt to add `tx_id` plus whichever of its ancestors aren't
    /// already selected, if the whole closure fits the remaining budget.
    fn try_add_with_ancestors(&mut self, tx_id: &str) -> bool {
        if self.selected.contains(tx_id) {
            return false;
        }
        let Some(tx) = self.pool.get(tx_id) else { return false };
        let mut closure: Vec<String> = self
            .pool
            .ancestor_set(tx_id)
            .into_iter()
            .filter(|a| !self.selected.contains(a))
            .collect();
        closure.push(tx_id.to_string());

        let closure_size: u64 = closure.iter().filter_map(|id| self.pool.get(id)).map(|t| t.size).sum();
        if self.size() + closure_size > self.budget {
            return false;
        }
        for id in closure {
            self.selected.insert(id);
        }
        true
    }
}

/// Run simulated annealing over `pool` for `iterations` steps, starting
/// from greedy's output, with the given cooling rate and start
/// temperature. Deterministic for a fixed `seed`.
pub fn select_with_params(pool: &Mempool, budget: u64, seed: u64, iterations: u32, cooling_rate: f64, start_temperature: f64) -> SelectionResult {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let initial = greedy::select(pool, budget);
    let mut state = State {
        pool,
        budget,
        selected: initial.selected_ids.iter().cloned().collect(),
    };

    let mut best: HashMap<String, ()> = state.selected.iter().map(|id| (id.clone(), ())).collect();
    let mut best_fee = state.fee();

    let mut temperature = start_temperature;
    let all_ids: Vec<String> = pool.iter().map(|tx| tx.tx_id.clone()).collect();

    for _ in 0..iterations {
        if all_ids.is_empty() {
            break;
        }
        let previous = state.selected.clone();
        let before_fee = state.fee();

        if rng.gen_bool(0.5) {
            if let Some(victim) = state.selected.iter().cloned().collect::<Vec<_>>().choose(&mut rng) {
                state.remove_with_descendants(victim);
            }
        } else {
            let candidate = &all_ids[rng.gen_range(0..all_ids.len())];
            state.try_add_with_ancestors(candidate);
        }

        let after_fee = state.fee();
        let accept = if after_fee >= before_fee {
            true
        } else {
            let delta = (after_fee as f64) - (before_fee as f64);
            rng.gen_bool((delta / temperature).exp().min(1.0))
        };

        if !accept {
            state.selected = previous;
        } else if after_fee > best_fee && state.size() <= budget {
            best = state.selected.iter().map(|id| (id.clone(), ())).collect();
            best_fee = after_fee;
        }

        temperature *= cooling_rate;
    }

    let mut selected_ids: Vec<String> = best.into_keys().collect();
    selected_ids.sort();
    let total_fee: u64 = selected_ids.iter().filter_map(|id| pool.get(id)).map(|t| t.fee).sum();
    let total_size: u64 = selected_ids.iter().filter_map(|id| pool.get(id)).map(|t| t.size).sum();

    info!(strategy = "annealing", selected = selected_ids.len(), total_fee, "selection complete");
    SelectionResult {
        selected_ids,
        total_fee,
        total_size,
    }
}

/// [`select_with_params`] with the protocol's default schedule.
pub fn select(pool: &Mempool, budget: u64, seed: u64) -> SelectionResult {
    select_with_params(pool, budget, seed, DEFAULT_ITERATIONS, DEFAULT_COOLING_RATE, DEFAULT_START_TEMPERATURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mempool;

    #[test]
    fn same_seed_reproduces_identical_output() {
        let mut pool = Mempool::new();
        for i in 0..20 {
            pool.add(format!("t{i}"), 1000 + i as u64 * 137, 300 + (i as u64 * 17) % 200, []).unwrap();
        }
        let a = select_with_params(&pool, 3000, 42, 500, 0.99, 1000.0);
        let b = select_with_params(&pool, 3000, 42, 500, 0.99, 1000.0);
        assert_eq!(a, b);
    }

    #[test]
    fn result_never_exceeds_budget() {
        let mut pool = Mempool::new();
        for i in 0..30 {
            pool.add(format!("t{i}"), 500 + i as u64 * 53, 200 + (i as u64 * 11) % 300, []).unwrap();
        }
        let result = select_with_params(&pool, 2500, 7, 1000, 0.995, 1000.0);
        assert!(result.total_size <= 2500);
    }

    #[test]
    fn result_is_at_least_as_good_as_greedy_seed() {
        let mut pool = Mempool::new();
        pool.add("P", 1000, 400, []).unwrap();
        pool.add("C", 80_000, 300, ["P".to_string()]).unwrap();
        for i in 0..20 {
            pool.add(format!("filler{i}"), 50_000, 400, []).unwrap();
        }
        let budget = 8_000;
        let greedy_fee = greedy::select(&pool, budget).total_fee;
        let result = select_with_params(&pool, budget, 99, 2000, 0.995, 1000.0);
        assert!(result.total_fee >= greedy_fee);
    }
}
