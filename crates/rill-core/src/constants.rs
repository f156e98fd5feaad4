//! Protocol constants. All monetary amounts are in satoshis.

/// Smallest subdivision boundary for one nominal coin (informational only;
/// amounts are carried as raw satoshi `u64`s throughout).
pub const COIN: u64 = 100_000_000;

/// Default mining reward paid to the coinbase output of a mined block.
pub const DEFAULT_MINING_REWARD: u64 = 50 * COIN;

/// Threshold separating block-height locks from Unix-timestamp locks in
/// CLTV comparisons, identical to Bitcoin's `LOCKTIME_THRESHOLD`.
pub const LOCKTIME_THRESHOLD: u64 = 500_000_000;

/// Maximum number of elements allowed on the VM's main or alt stack at once.
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of opcodes executed per script, aligned with Bitcoin Core.
pub const MAX_SCRIPT_OPS: usize = 201;

/// Default attempt cap for the proof-of-work search loop, bounding mining
/// latency per §5's cooperative-cancellation requirement.
pub const DEFAULT_MAX_MINING_ATTEMPTS: u64 = 10_000_000;

/// Genesis block index.
pub const GENESIS_INDEX: u64 = 0;

/// The all-zero hash used for the genesis block's `previous_hash` and for
/// coinbase `prev_tx_hash` fields (64 hex-nibble zero string, i.e. a 32-byte
/// hash hex-encoded).
pub const ZERO_HASH_HEX: &str = "0000000000000000000000000000000000000000000000000000000000000000";
