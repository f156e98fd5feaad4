//! Integration test suite for the Rill protocol.
//!
//! These are end-to-end and adversarial tests that exercise `rill-core`,
//! `rill-consensus`, and `rill-mempool` together rather than in isolation.

pub mod helpers;
