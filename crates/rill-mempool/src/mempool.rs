//! The mempool DAG: storage, edge bookkeeping, and ancestor-set queries
//! (§4.H, §9).

use std::collections::{BTreeSet, HashMap, HashSet};

use rill_core::error::MempoolError;

use crate::entry::MempoolTransaction;

/// In-memory pool of unconfirmed transactions linked by spend (parent) and
/// spent-by (child) edges. Not thread-safe; callers serialize access
/// externally (§5).
#[derive(Debug, Clone, Default)]
pub struct Mempool {
    entries: HashMap<String, MempoolTransaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, tx_id: &str) -> bool {
        self.entries.contains_key(tx_id)
    }

    pub fn get(&self, tx_id: &str) -> Option<&MempoolTransaction> {
        self.entries.get(tx_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MempoolTransaction> {
        self.entries.values()
    }

    /// Insert a transaction with the given declared parents. Every parent
    /// must already be in the pool (§9); a declared parent set that would
    /// create a cycle is rejected before anything is mutated.
    pub fn add(
        &mut self,
        tx_id: impl Into<String>,
        fee: u64,
        size: u64,
        parents: impl IntoIterator<Item = String>,
    ) -> Result<(), MempoolError> {
        let tx_id = tx_id.into();
        if self.entries.contains_key(&tx_id) {
            return Err(MempoolError::AlreadyExists(tx_id));
        }
        let parents: BTreeSet<String> = parents.into_iter().collect();

        for parent in &parents {
            if !self.entries.contains_key(parent) {
                return Err(MempoolError::UnknownParent {
                    child: tx_id.clone(),
                    parent: parent.clone(),
                });
            }
        }
        if parents.contains(&tx_id) || self.would_cycle(&tx_id, &parents) {
            return Err(MempoolError::WouldCycle(tx_id));
        }

        for parent in &parents {
            self.entries
                .get_mut(parent)
                .expect("checked above")
                .children
                .insert(tx_id.clone());
        }
        self.entries
            .insert(tx_id.clone(), MempoolTransaction::new(tx_id, fee, size, parents));
        Ok(())
    }

    /// `tx_id` would create a cycle if it is already reachable as an
    /// ancestor of one of its declared parents — only possible if a stale
    /// id is reused, since a not-yet-inserted node has no existing edges
    /// pointing at it.
    fn would_cycle(&self, tx_id: &str, parents: &BTreeSet<String>) -> bool {
        parents.iter().any(|parent| self.ancestor_set(parent).contains(tx_id))
    }

    /// Remove a transaction, rewiring its neighbors: it is dropped from
    /// each parent's `children` and each child's `parents` (§4.H's
    /// bidirectional invariant). Children are not reparented onto the
    /// removed transaction's own parents — removal just severs the edges
    /// touching it.
    pub fn remove(&mut self, tx_id: &str) -> Option<MempoolTransaction> {
        let entry = self.entries.remove(tx_id)?;
        for parent in &entry.parents {
            if let Some(p) = self.entries.get_mut(parent) {
                p.children.remove(tx_id);
            }
        }
        for child in &entry.children {
            if let Some(c) = self.entries.get_mut(child) {
                c.parents.remove(tx_id);
            }
        }
        Some(entry)
    }

    /// The full set of ancestors of `tx_id` (parents, grandparents, ...),
    /// computed by DFS with per-call memoization. Does not include `tx_id`
    /// itself.
    pub fn ancestor_set(&self, tx_id: &str) -> HashSet<String> {
        let mut memo = HashMap::new();
        self.ancestor_set_memoized(tx_id, &mut memo)
    }

    fn ancestor_set_memoized(&self, tx_id: &str, memo: &mut HashMap<String, HashSet<String>>) -> HashSet<String> {
        if let Some(cached) = memo.get(tx_id) {
            return cached.clone();
        }
        let mut result = HashSet::new();
        if let Some(entry) = self.entries.get(tx_id) {
            for parent in &entry.parents {
                result.insert(parent.clone());
                result.extend(self.ancestor_set_memoized(parent, memo));
            }
        }
        memo.insert(tx_id.to_string(), result.clone());
        result
    }

    /// Total fee across every transaction in the pool. O(n).
    pub fn total_fee(&self) -> u64 {
        self.entries.values().map(|t| t.fee).sum()
    }

    /// Total size across every transaction in the pool. O(n).
    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|t| t.size).sum()
    }
}
