use crate::{
    artifact::ArtifactRegistry,
    error::DeploymentError,
    handle::ContractHandle,
    network::Network,
};

use std::{
    sync::Arc,
    time::Duration,
};
use tracing::{
    debug,
    info,
    instrument,
};

/// Default upper bound on waiting for a deployment to be confirmed.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Deploys contracts from an [`ArtifactRegistry`] to a [`Network`].
#[derive(Debug)]
pub struct Deployer<N> {
    network: Arc<N>,
    registry: ArtifactRegistry,
    confirmation_timeout: Duration,
}

impl<N: Network> Deployer<N> {
    pub fn new(network: N, registry: ArtifactRegistry) -> Self {
        Self::with_shared_network(Arc::new(network), registry)
    }

    /// Creates a deployer on a network that is also used elsewhere.
    pub fn with_shared_network(network: Arc<N>, registry: ArtifactRegistry) -> Self {
        Self {
            network,
            registry,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// Deploys a new instance of the contract named `name`.
    ///
    /// Suspends until the creation transaction is confirmed and code is
    /// present at the new address, or until the confirmation timeout elapses.
    /// Every call creates an independent instance.
    #[instrument(skip(self), fields(timeout = ?self.confirmation_timeout))]
    pub async fn deploy(&self, name: &str) -> Result<ContractHandle<N>, DeploymentError> {
        let artifact = self.registry.resolve(name)?;
        let name = artifact.contract_name.clone();

        if !artifact.is_deployable() {
            return Err(DeploymentError::NotDeployable(name));
        }

        let libraries = artifact.unlinked_libraries();
        if !libraries.is_empty() {
            return Err(DeploymentError::Unlinked { name, libraries });
        }

        let init_code = artifact
            .creation_code()
            .map_err(|source| {
                DeploymentError::InvalidBytecode {
                    name: name.clone(),
                    source,
                }
            })?;

        debug!(
            source = %artifact.source_name,
            init_code_len = init_code.len(),
            "Submitting deployment"
        );

        let confirmed = async {
            let deployment = self
                .network
                .deploy(init_code)
                .await
                .map_err(|source| {
                    DeploymentError::Rejected {
                        name: name.clone(),
                        source,
                    }
                })?;

            let code = self
                .network
                .code_at(deployment.address)
                .await
                .map_err(|source| {
                    DeploymentError::Rejected {
                        name: name.clone(),
                        source,
                    }
                })?;

            if code.is_empty() {
                return Err(DeploymentError::NoCode {
                    name: name.clone(),
                    address: deployment.address,
                });
            }

            Ok::<_, DeploymentError>(deployment)
        };

        let deployment = tokio::time::timeout(self.confirmation_timeout, confirmed)
            .await
            .map_err(|_| {
                DeploymentError::ConfirmationTimeout {
                    name: name.clone(),
                    timeout: self.confirmation_timeout,
                }
            })??;

        info!(
            contract = %name,
            address = %deployment.address,
            block_number = deployment.block_number,
            gas_used = deployment.gas_used,
            "Contract deployed"
        );

        Ok(ContractHandle::new(
            name,
            deployment,
            Arc::clone(&self.network),
        ))
    }
}
