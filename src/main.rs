use microloan_deployer::{
    config::{
        DeployConfig,
        NetworkConfig,
    },
    network::{
        LocalNetwork,
        Network,
        RpcNetwork,
    },
    ArtifactRegistry,
    Deployer,
};

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout only carries the deployment report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI args
    let config = DeployConfig::parse();
    let registry = config.registry()?;
    let timeout = config.confirmation_timeout();

    match config.network()? {
        NetworkConfig::Local { chain_id } => {
            deploy(LocalNetwork::new(chain_id), registry, &config.contract, timeout).await
        }
        NetworkConfig::Rpc { url, signer } => {
            deploy(RpcNetwork::connect(url, signer), registry, &config.contract, timeout).await
        }
    }
}

async fn deploy<N: Network>(
    network: N,
    registry: ArtifactRegistry,
    contract: &str,
    timeout: Duration,
) -> Result<()> {
    let deployer = Deployer::new(network, registry).with_confirmation_timeout(timeout);
    let contract = deployer.deploy(contract).await?;

    println!("{}", contract.report_address());

    Ok(())
}
