//! Contract execution environments a deployment can target.

mod local;
pub use local::{
    LocalNetwork,
    DEFAULT_CHAIN_ID,
    DEV_ACCOUNTS,
};

mod rpc;
pub use rpc::RpcNetwork;

use crate::{
    error::NetworkError,
    primitives::{
        Address,
        Bytes,
        Deployment,
    },
};

/// A blockchain network contracts can be deployed to and queried on.
///
/// Every method suspends until the network has answered. `deploy` only
/// returns once the creation transaction has been confirmed.
#[allow(async_fn_in_trait)]
pub trait Network {
    /// Account that signs and pays for deployments.
    fn deployer(&self) -> Address;

    /// Signer identities available on the network, deployer first.
    async fn accounts(&self) -> Result<Vec<Address>, NetworkError>;

    /// Submits a contract creation transaction carrying `init_code` and waits
    /// for it to be confirmed.
    async fn deploy(&self, init_code: Bytes) -> Result<Deployment, NetworkError>;

    /// Executes a read only call against the latest state, nothing is
    /// committed.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, NetworkError>;

    /// Runtime code stored at `address`, empty for accounts without code.
    async fn code_at(&self, address: Address) -> Result<Bytes, NetworkError>;
}
