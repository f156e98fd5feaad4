//! # rill-consensus — chain validation and mining orchestration.
//!
//! Wraps rill-core's `Block`/`Transaction`/`UTXOSet` primitives in a
//! [`Chain`] that owns pending-pool bookkeeping, the leading-zero
//! proof-of-work search, and whole-chain validation (§4.G).

pub mod chain;

pub use chain::Chain;
