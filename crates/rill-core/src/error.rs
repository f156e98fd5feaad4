//! Error types for the Rill protocol.
use thiserror::Error;

/// Errors raised while executing a script.
///
/// `ScriptError` never escapes [`crate::vm::execute`] to callers — per the
/// error handling policy, script failures are caught there and converted to
/// a plain `false` return. The variants exist so the VM's internal control
/// flow and its unit tests can distinguish failure causes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("stack underflow: need {need}, have {have}")] StackUnderflow { need: usize, have: usize },
    #[error("truncated push at offset {0}")] TruncatedPush(usize),
    #[error("unknown opcode: 0x{0:02x}")] UnknownOpcode(u8),
    #[error("stack size {size} exceeds limit {limit}")] StackOverflow { size: usize, limit: usize },
    #[error("opcode count {count} exceeds limit {limit}")] TooManyOps { count: usize, limit: usize },
    #[error("OP_VERIFY failed")] VerifyFailed,
    #[error("OP_RETURN")] Return,
    #[error("OP_EQUALVERIFY failed")] EqualVerifyFailed,
    #[error("OP_CHECKSIGVERIFY failed")] CheckSigVerifyFailed,
    #[error("CLTV lock not yet satisfied")] LockTimeNotSatisfied,
    #[error("CSV relative lock not yet satisfied")] SequenceLockNotSatisfied,
    #[error("unbalanced conditional (ELSE/ENDIF without matching IF)")] UnbalancedConditional,
    #[error("script ended with an open IF/NOTIF")] UnterminatedConditional,
}

/// Errors raised validating a transaction against the UTXO set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("unknown UTXO: {0}")] UnknownUtxo(String),
    #[error("outputs {outputs} exceed inputs {inputs}")] OutputsExceedInputs { inputs: u64, outputs: u64 },
    #[error("signature verification failed on input {index}")] InvalidSignature { index: usize },
    #[error("duplicate input within transaction: {0}")] DuplicateInput(String),
    #[error("empty inputs or outputs")] EmptyInputsOrOutputs,
    #[error("value overflow")] ValueOverflow,
    #[error("zero-value output at index {0}")] ZeroValueOutput(usize),
    #[error("null outpoint in non-coinbase input {0}")] NullOutpointInRegularTx(usize),
    #[error("serialization error: {0}")] Serialization(String),
}

/// Errors raised validating a block or connecting it to the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("block hash does not meet difficulty {difficulty}")] InsufficientProofOfWork { difficulty: u32 },
    #[error("previous_hash does not match chain tip")] InvalidPrevHash,
    #[error("block index {got} does not follow tip index {expected}")] IndexMismatch { expected: u64, got: u64 },
    #[error("no transactions in block")] EmptyBlock,
    #[error("first transaction is not coinbase")] FirstTxNotCoinbase,
    #[error("multiple coinbase transactions")] MultipleCoinbase,
    #[error("duplicate transaction hash in block: {0}")] DuplicateTxHash(String),
    #[error("transaction error at index {index}: {source}")] TransactionError { index: usize, source: TransactionError },
    #[error("proof-of-work search exhausted its attempt budget")] ProofOfWorkNotFound,
    #[error("stored block hash does not match recomputed hash")] HashMismatch,
}

/// Errors raised by chain-level bookkeeping (tip linkage, height, storage).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("empty chain: no blocks connected")] EmptyChain,
    #[error("block not found at height {0}")] BlockNotFound(u64),
    #[error("block at height {0} fails validation or chain linkage")] InvalidBlock(u64),
}

/// Errors raised by the mempool DAG.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MempoolError {
    #[error("transaction already in pool: {0}")] AlreadyExists(String),
    #[error("unknown transaction: {0}")] NotFound(String),
    #[error("parent {parent} not present in pool for child {child}")] UnknownParent { child: String, parent: String },
    #[error("adding {0} would create a cycle in the dependency graph")] WouldCycle(String),
}

/// Top-level error aggregate for the Rill protocol.
#[derive(Error, Debug)]
pub enum RillError {
    #[error(transparent)] Script(#[from] ScriptError),
    #[error(transparent)] Transaction(#[from] TransactionError),
    #[error(transparent)] Block(#[from] BlockError),
    #[error(transparent)] Chain(#[from] ChainError),
    #[error(transparent)] Mempool(#[from] MempoolError),
}
