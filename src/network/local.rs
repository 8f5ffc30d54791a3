use crate::{
    error::NetworkError,
    network::Network,
    primitives::{
        address,
        uint,
        AccountInfo,
        Address,
        Bytes,
        Deployment,
        EvmExecutionResult,
        Output,
        SpecId,
        TxEnv,
        TxKind,
        KECCAK_EMPTY,
        U256,
    },
};

use parking_lot::Mutex;
use revm::{
    db::{
        DatabaseCommit,
        DatabaseRef,
        InMemoryDB,
    },
    Evm,
};
use tracing::{
    debug,
    instrument,
    trace,
};

/// Chain id used by Hardhat and Anvil development networks.
pub const DEFAULT_CHAIN_ID: u64 = 31337;

/// Well known development accounts, pre-funded on every local network.
pub const DEV_ACCOUNTS: [Address; 3] = [
    address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
    address!("70997970c51812dc3a010c7d01b50e0d17dc79c8"),
    address!("3c44cdddb6a900fa2b585dd299e03d12fa4293bc"),
];

const DEV_ACCOUNT_BALANCE: U256 = uint!(10_000_000_000_000_000_000_000_U256);

const BLOCK_GAS_LIMIT: u64 = 30_000_000;

/// Timestamp of the genesis block.
const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

#[derive(Debug)]
struct ChainState {
    db: InMemoryDB,
    block_number: u64,
}

/// An in-process EVM chain that mines one block per transaction.
#[derive(Debug)]
pub struct LocalNetwork {
    chain_id: u64,
    state: Mutex<ChainState>,
}

impl Default for LocalNetwork {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_ID)
    }
}

impl LocalNetwork {
    /// Creates a fresh chain at genesis with the [`DEV_ACCOUNTS`] funded.
    pub fn new(chain_id: u64) -> Self {
        let mut db = InMemoryDB::default();
        for account in DEV_ACCOUNTS {
            db.insert_account_info(
                account,
                AccountInfo {
                    nonce: 0,
                    balance: DEV_ACCOUNT_BALANCE,
                    code_hash: KECCAK_EMPTY,
                    code: None,
                },
            );
        }

        Self {
            chain_id,
            state: Mutex::new(ChainState {
                db,
                block_number: 0,
            }),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Number of the latest mined block.
    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    /// Overwrites a storage slot, bypassing execution.
    pub fn set_storage(&self, address: Address, slot: U256, value: U256) -> Result<(), NetworkError> {
        self.state
            .lock()
            .db
            .insert_account_storage(address, slot, value)
            .map_err(|e| NetworkError::Evm(e.to_string()))
    }

    /// Reads a storage slot at the latest state.
    pub fn storage(&self, address: Address, slot: U256) -> Result<U256, NetworkError> {
        self.state
            .lock()
            .db
            .storage_ref(address, slot)
            .map_err(|e| NetworkError::Evm(e.to_string()))
    }

    /// Executes `tx_env` on top of the latest block. State changes are only
    /// committed, and a new block mined, when `commit` is set.
    fn transact(&self, tx_env: TxEnv, commit: bool) -> Result<(EvmExecutionResult, u64), NetworkError> {
        let mut state = self.state.lock();
        let number = state.block_number + 1;

        let result_and_state = {
            let mut evm = Evm::builder()
                .with_db(&mut state.db)
                .with_spec_id(SpecId::CANCUN)
                .modify_cfg_env(|cfg| cfg.chain_id = self.chain_id)
                .modify_block_env(|block| {
                    block.number = U256::from(number);
                    block.timestamp = U256::from(GENESIS_TIMESTAMP + number);
                    block.gas_limit = U256::from(BLOCK_GAS_LIMIT);
                })
                .modify_tx_env(|env| *env = tx_env)
                .build();

            evm.transact()
                .map_err(|e| NetworkError::Evm(format!("{e:?}")))?
        };

        if commit {
            state.db.commit(result_and_state.state);
            state.block_number = number;
            trace!(block_number = number, "Mined block");
        }

        Ok((result_and_state.result, number))
    }
}

impl Network for LocalNetwork {
    fn deployer(&self) -> Address {
        DEV_ACCOUNTS[0]
    }

    async fn accounts(&self) -> Result<Vec<Address>, NetworkError> {
        Ok(DEV_ACCOUNTS.to_vec())
    }

    #[instrument(skip_all, fields(chain_id = self.chain_id))]
    async fn deploy(&self, init_code: Bytes) -> Result<Deployment, NetworkError> {
        let tx_env = TxEnv {
            caller: self.deployer(),
            transact_to: TxKind::Create,
            data: init_code,
            gas_limit: BLOCK_GAS_LIMIT,
            ..Default::default()
        };

        // Failed transactions are still mined.
        let (result, block_number) = self.transact(tx_env, true)?;

        match result {
            EvmExecutionResult::Success {
                output: Output::Create(_, Some(address)),
                gas_used,
                ..
            } => {
                debug!(%address, block_number, gas_used, "Contract created");
                Ok(Deployment {
                    address,
                    tx_hash: None,
                    block_number,
                    gas_used,
                })
            }
            EvmExecutionResult::Success { .. } => Err(NetworkError::MissingContractAddress),
            EvmExecutionResult::Revert { output, .. } => Err(NetworkError::Reverted(output)),
            EvmExecutionResult::Halt { reason, .. } => {
                Err(NetworkError::Halted(format!("{reason:?}")))
            }
        }
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, NetworkError> {
        let tx_env = TxEnv {
            caller: self.deployer(),
            transact_to: TxKind::Call(to),
            data: input,
            gas_limit: BLOCK_GAS_LIMIT,
            ..Default::default()
        };

        let (result, _) = self.transact(tx_env, false)?;

        match result {
            EvmExecutionResult::Success { output, .. } => Ok(output.into_data()),
            EvmExecutionResult::Revert { output, .. } => Err(NetworkError::Reverted(output)),
            EvmExecutionResult::Halt { reason, .. } => {
                Err(NetworkError::Halted(format!("{reason:?}")))
            }
        }
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, NetworkError> {
        let state = self.state.lock();
        let info = state
            .db
            .basic_ref(address)
            .map_err(|e| NetworkError::Evm(e.to_string()))?;

        let code = match info {
            Some(AccountInfo {
                code: Some(code), ..
            }) => code.original_bytes(),
            Some(info) => {
                state
                    .db
                    .code_by_hash_ref(info.code_hash)
                    .map_err(|e| NetworkError::Evm(e.to_string()))?
                    .original_bytes()
            }
            None => Bytes::new(),
        };

        Ok(code)
    }
}
