use crate::{
    error::CallError,
    network::Network,
    primitives::{
        Address,
        Deployment,
        U256,
    },
};

use alloy_sol_types::{
    sol,
    SolCall,
};
use std::sync::Arc;
use tracing::trace;

sol! {
    /// Read surface of the microloan platform contract.
    #[derive(Debug, PartialEq)]
    interface IMicroloanPlatform {
        function getLoanCounter() external view returns (uint256);
    }
}

/// A live contract instance on a network.
#[derive(Debug)]
pub struct ContractHandle<N> {
    name: String,
    deployment: Deployment,
    network: Arc<N>,
}

impl<N: Network> ContractHandle<N> {
    pub(crate) fn new(name: String, deployment: Deployment, network: Arc<N>) -> Self {
        Self {
            name,
            deployment,
            network,
        }
    }

    /// Name of the deployed contract.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// On-chain address of the contract.
    pub fn address(&self) -> Address {
        self.deployment.address
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Human readable line naming the contract and its address.
    pub fn report_address(&self) -> String {
        format!("{} deployed at: {}", self.name, self.address())
    }

    /// Whether the network still holds code at the contract's address.
    pub async fn is_live(&self) -> Result<bool, CallError> {
        let code = self
            .network
            .code_at(self.address())
            .await
            .map_err(|source| self.call_error(source))?;
        Ok(!code.is_empty())
    }

    /// Executes a typed read only call against the contract.
    pub async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, CallError> {
        trace!(contract = %self.name, signature = C::SIGNATURE, "Calling contract");

        let output = self
            .network
            .call(self.address(), call.abi_encode().into())
            .await
            .map_err(|source| self.call_error(source))?;

        Ok(C::abi_decode_returns(&output, true)?)
    }

    /// Current value of the contract's loan counter.
    pub async fn get_loan_counter(&self) -> Result<U256, CallError> {
        Ok(self
            .call(IMicroloanPlatform::getLoanCounterCall {})
            .await?
            ._0)
    }

    fn call_error(&self, source: crate::error::NetworkError) -> CallError {
        CallError::Network {
            contract: self.name.clone(),
            source,
        }
    }
}
