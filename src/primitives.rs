pub use revm::primitives::{
    address,
    bytes,
    hex,
    keccak256,
    uint,
    AccountInfo,
    Address,
    Bytecode,
    Bytes,
    ExecutionResult as EvmExecutionResult,
    Output,
    SpecId,
    TxEnv,
    TxKind,
    B256,
    KECCAK_EMPTY,
    U256,
};

/// Metadata of a confirmed contract creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Address the contract was created at.
    pub address: Address,
    /// Hash of the creation transaction, if the network exposes one.
    pub tx_hash: Option<B256>,
    /// Block the creation was included in.
    pub block_number: u64,
    pub gas_used: u64,
}
