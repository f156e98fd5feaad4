//! # rill-mempool
//! Mempool parent/child DAG and fee-maximizing transaction selection
//! strategies for the Rill protocol.

pub mod entry;
pub mod mempool;
pub mod selection;

pub use entry::{fee_rate_cmp, MempoolTransaction};
pub use mempool::Mempool;
