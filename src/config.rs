use crate::{
    artifact::ArtifactRegistry,
    error::ConfigError,
    network::DEFAULT_CHAIN_ID,
    DEFAULT_CONFIRMATION_TIMEOUT,
};

use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use std::{
    path::PathBuf,
    time::Duration,
};
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Deploys the microloan platform contract", long_about = None)]
pub struct DeployConfig {
    /// Name of the contract to deploy, bare or fully qualified.
    #[arg(long, env = "CONTRACT", default_value = "MicroloanPlatform")]
    pub contract: String,
    /// JSON-RPC endpoint of the target network. Deploys to an in-process
    /// network when unset.
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<Url>,
    /// Hex encoded private key of the account funding the deployment.
    /// Required with `--rpc-url`.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
    /// Directory of compiled Hardhat artifacts, searched recursively.
    /// Contract names found there take precedence over the bundled ones.
    #[arg(long, env = "ARTIFACTS_DIR")]
    pub artifacts: Option<PathBuf>,
    /// Seconds to wait for the deployment to be confirmed.
    #[arg(long, env = "CONFIRMATION_TIMEOUT", default_value_t = DEFAULT_CONFIRMATION_TIMEOUT.as_secs())]
    pub confirmation_timeout: u64,
    /// Chain id of the in-process network.
    #[arg(long, env = "CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,
}

/// The network a deployment targets.
#[derive(Debug, Clone)]
pub enum NetworkConfig {
    /// A fresh in-process chain.
    Local { chain_id: u64 },
    /// A remote node, deployments are signed by `signer`.
    Rpc { url: Url, signer: PrivateKeySigner },
}

impl DeployConfig {
    /// Resolves the target network.
    pub fn network(&self) -> Result<NetworkConfig, ConfigError> {
        let Some(url) = self.rpc_url.clone() else {
            return Ok(NetworkConfig::Local {
                chain_id: self.chain_id,
            });
        };

        let signer = self
            .private_key
            .as_deref()
            .ok_or(ConfigError::MissingPrivateKey)?
            .parse::<PrivateKeySigner>()?;

        Ok(NetworkConfig::Rpc { url, signer })
    }

    /// Artifacts of the configured directory, falling back to the bundled
    /// ones for contract names it does not declare.
    pub fn registry(&self) -> Result<ArtifactRegistry, ConfigError> {
        let mut registry = ArtifactRegistry::new();
        if let Some(dir) = &self.artifacts {
            registry.load_dir(dir)?;
        }
        Ok(registry.with_fallback(ArtifactRegistry::builtin()?))
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout)
    }
}
