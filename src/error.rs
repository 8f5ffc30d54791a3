use crate::primitives::{
    Address,
    Bytes,
    B256,
};

use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;
use std::{
    path::PathBuf,
    time::Duration,
};
use thiserror::Error;

/// Failure to load or resolve compiled contract artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read artifact at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed artifact at {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Malformed bundled artifact")]
    Bundled(#[source] serde_json::Error),
    #[error("Contract artifact `{0}` not found")]
    NotFound(String),
    #[error("Contract name `{name}` is ambiguous, use one of: {}", .candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },
}

/// Errors surfaced by a [`Network`](crate::network::Network) implementation.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Failed to await transaction confirmation: {0}")]
    Confirmation(#[from] PendingTransactionError),
    #[error("Transaction {0} failed on chain")]
    Failed(B256),
    #[error("Receipt carries no contract address")]
    MissingContractAddress,
    #[error("Execution reverted with output {0}")]
    Reverted(Bytes),
    #[error("Execution halted: {0}")]
    Halted(String),
    #[error("EVM error: {0}")]
    Evm(String),
}

/// Errors returned by [`Deployer::deploy`](crate::Deployer::deploy).
#[derive(Error, Debug)]
pub enum DeploymentError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error("Contract `{0}` has no creation bytecode, is it abstract or an interface?")]
    NotDeployable(String),
    #[error("Contract `{name}` must be linked against {} before deployment", .libraries.join(", "))]
    Unlinked { name: String, libraries: Vec<String> },
    #[error("Contract `{name}` has malformed creation bytecode")]
    InvalidBytecode {
        name: String,
        #[source]
        source: alloy_primitives::hex::FromHexError,
    },
    #[error("Network rejected deployment of `{name}`")]
    Rejected {
        name: String,
        #[source]
        source: NetworkError,
    },
    #[error("Deployment of `{name}` not confirmed within {timeout:?}")]
    ConfirmationTimeout { name: String, timeout: Duration },
    #[error("No code found at {address} after deploying `{name}`")]
    NoCode { name: String, address: Address },
}

/// Errors returned by read calls through a
/// [`ContractHandle`](crate::ContractHandle).
#[derive(Error, Debug)]
pub enum CallError {
    #[error("Call to `{contract}` failed")]
    Network {
        contract: String,
        #[source]
        source: NetworkError,
    },
    #[error("Failed to decode return data")]
    Decode(#[from] alloy_sol_types::Error),
}

/// Invalid deploy script configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("A private key is required when deploying over RPC")]
    MissingPrivateKey,
    #[error("Invalid private key")]
    InvalidPrivateKey(#[from] alloy_signer_local::LocalSignerError),
    #[error("Artifact error")]
    Artifact(#[from] ArtifactError),
}
