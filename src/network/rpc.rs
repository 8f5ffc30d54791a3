use crate::{
    error::NetworkError,
    network::Network,
    primitives::{
        Address,
        Bytes,
        Deployment,
    },
};

use alloy_network::{
    EthereumWallet,
    ReceiptResponse,
    TransactionBuilder,
};
use alloy_provider::{
    Provider,
    ProviderBuilder,
};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use tracing::{
    debug,
    instrument,
};
use url::Url;

/// A remote network reached over JSON-RPC.
///
/// Transactions are signed locally by the configured signer, the node is only
/// used for submission and queries.
#[derive(Debug, Clone)]
pub struct RpcNetwork<P> {
    provider: P,
    signer: Address,
}

impl RpcNetwork<()> {
    /// Connects to `url` over HTTP, signing with `signer`.
    ///
    /// No request is made until the network is first used, an unreachable
    /// endpoint surfaces as a transport error at that point.
    pub fn connect(url: Url, signer: PrivateKeySigner) -> RpcNetwork<impl Provider + Clone> {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .on_http(url);

        RpcNetwork::new(provider, address)
    }
}

impl<P: Provider> RpcNetwork<P> {
    /// Wraps an existing provider. `signer` must be an account the provider
    /// can sign for.
    pub fn new(provider: P, signer: Address) -> Self {
        Self { provider, signer }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> Network for RpcNetwork<P> {
    fn deployer(&self) -> Address {
        self.signer
    }

    async fn accounts(&self) -> Result<Vec<Address>, NetworkError> {
        let mut accounts = vec![self.signer];

        // Hosted endpoints commonly reject `eth_accounts`.
        match self.provider.get_accounts().await {
            Ok(unlocked) => {
                accounts.extend(
                    unlocked
                        .into_iter()
                        .filter(|account| *account != self.signer),
                )
            }
            Err(err) => debug!(%err, "Node accounts unavailable, using the signer only"),
        }

        Ok(accounts)
    }

    #[instrument(skip_all, fields(signer = %self.signer))]
    async fn deploy(&self, init_code: Bytes) -> Result<Deployment, NetworkError> {
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_deploy_code(init_code);

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "Deployment transaction submitted");

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(NetworkError::Failed(tx_hash));
        }

        let address = receipt
            .contract_address()
            .ok_or(NetworkError::MissingContractAddress)?;

        Ok(Deployment {
            address,
            tx_hash: Some(tx_hash),
            block_number: receipt.block_number().unwrap_or_default(),
            gas_used: receipt.gas_used(),
        })
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, NetworkError> {
        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_to(to)
            .with_input(input);

        Ok(self.provider.call(&tx).await?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, NetworkError> {
        Ok(self.provider.get_code_at(address).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        handle::IMicroloanPlatform,
        network::DEV_ACCOUNTS,
        primitives::{
            address,
            bytes,
            B256,
            U256,
        },
    };

    use alloy_sol_types::SolCall;
    use jsonrpsee::{
        server::{
            RpcModule,
            ServerBuilder,
            ServerHandle,
        },
        types::ErrorObjectOwned,
    };
    use serde_json::{
        json,
        Value,
    };
    use std::net::SocketAddr;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    const TX_HASH: B256 = B256::repeat_byte(0x11);

    const CONTRACT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

    fn signer() -> PrivateKeySigner {
        DEV_KEY.parse().unwrap()
    }

    fn unreachable() -> RpcNetwork<impl Provider + Clone> {
        // Nothing listens on the discard port.
        RpcNetwork::connect("http://127.0.0.1:9".parse().unwrap(), signer())
    }

    /// Canned state of a development node.
    struct MockNode {
        status: bool,
        contract_address: Option<Address>,
        /// `None` when the node rejects `eth_accounts`.
        accounts: Option<Vec<Address>>,
    }

    impl Default for MockNode {
        fn default() -> Self {
            Self {
                status: true,
                contract_address: Some(CONTRACT),
                accounts: Some(DEV_ACCOUNTS.to_vec()),
            }
        }
    }

    impl MockNode {
        fn receipt(&self) -> Value {
            let status = if self.status { "0x1" } else { "0x0" };
            json!({
                "type": "0x2",
                "status": status,
                "cumulativeGasUsed": "0xd7f4",
                "logs": [],
                "logsBloom": format!("0x{}", "0".repeat(512)),
                "transactionHash": TX_HASH,
                "transactionIndex": "0x0",
                "blockHash": B256::repeat_byte(0x22),
                "blockNumber": "0x1",
                "gasUsed": "0xd7f4",
                "effectiveGasPrice": "0x3b9aca00",
                "from": DEV_ACCOUNTS[0],
                "to": null,
                "contractAddress": self.contract_address,
            })
        }
    }

    /// Serves `node` over HTTP and connects a network to it.
    async fn connect_mock(node: MockNode) -> (ServerHandle, RpcNetwork<impl Provider + Clone>) {
        let server = ServerBuilder::default()
            .build("127.0.0.1:0".parse::<SocketAddr>().unwrap())
            .await
            .unwrap();
        let url = format!("http://{}", server.local_addr().unwrap())
            .parse()
            .unwrap();

        let loan_counter = U256::from(7).to_be_bytes::<32>();
        let static_responses = [
            ("eth_chainId", json!("0x7a69")),
            ("eth_blockNumber", json!("0x1")),
            ("eth_getTransactionCount", json!("0x0")),
            ("eth_estimateGas", json!("0xd7f4")),
            (
                "eth_feeHistory",
                json!({
                    "oldestBlock": "0x1",
                    "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
                    "gasUsedRatio": [0.5],
                    "reward": [["0x3b9aca00"]],
                }),
            ),
            ("eth_sendRawTransaction", json!(TX_HASH)),
            ("eth_getCode", json!("0x00")),
            ("eth_call", json!(Bytes::from(loan_counter.to_vec()))),
        ];

        let mut module = RpcModule::new(node);
        for (method, response) in static_responses {
            module
                .register_method(method, move |_, _, _| Ok::<_, ErrorObjectOwned>(response.clone()))
                .unwrap();
        }
        module
            .register_method("eth_getTransactionReceipt", |_, node, _| {
                Ok::<_, ErrorObjectOwned>(node.receipt())
            })
            .unwrap();
        module
            .register_method("eth_accounts", |_, node, _| {
                match &node.accounts {
                    Some(accounts) => Ok(json!(accounts)),
                    None => {
                        Err(ErrorObjectOwned::owned(
                            -32601,
                            "the method eth_accounts does not exist",
                            None::<()>,
                        ))
                    }
                }
            })
            .unwrap();

        let handle = server.start(module);
        (handle, RpcNetwork::connect(url, signer()))
    }

    #[test]
    fn test_deployer_is_signer() {
        let network = unreachable();
        assert_eq!(network.deployer(), DEV_ACCOUNTS[0]);
    }

    #[tokio::test]
    async fn test_deploy_unreachable_node() {
        let network = unreachable();

        let err = network.deploy(bytes!("6000")).await.unwrap_err();
        assert!(matches!(err, NetworkError::Transport(_)));
    }

    #[tokio::test]
    async fn test_code_at_unreachable_node() {
        let network = unreachable();

        let err = network.code_at(Address::ZERO).await.unwrap_err();
        assert!(matches!(err, NetworkError::Transport(_)));
    }

    #[tokio::test]
    async fn test_deploy_confirmed() {
        let (_server, network) = connect_mock(MockNode::default()).await;

        let deployment = network.deploy(bytes!("6000")).await.unwrap();

        assert_eq!(
            deployment,
            Deployment {
                address: CONTRACT,
                tx_hash: Some(TX_HASH),
                block_number: 1,
                gas_used: 0xd7f4,
            }
        );
    }

    #[tokio::test]
    async fn test_deploy_failed_on_chain() {
        let (_server, network) = connect_mock(MockNode {
            status: false,
            ..Default::default()
        })
        .await;

        let err = network.deploy(bytes!("6000")).await.unwrap_err();

        assert!(matches!(err, NetworkError::Failed(hash) if hash == TX_HASH));
    }

    #[tokio::test]
    async fn test_deploy_receipt_without_contract_address() {
        let (_server, network) = connect_mock(MockNode {
            contract_address: None,
            ..Default::default()
        })
        .await;

        let err = network.deploy(bytes!("6000")).await.unwrap_err();

        assert!(matches!(err, NetworkError::MissingContractAddress));
    }

    #[tokio::test]
    async fn test_call_and_code_at() {
        let (_server, network) = connect_mock(MockNode::default()).await;

        let output = network
            .call(CONTRACT, IMicroloanPlatform::getLoanCounterCall {}.abi_encode().into())
            .await
            .unwrap();
        let counter = IMicroloanPlatform::getLoanCounterCall::abi_decode_returns(&output, true)
            .unwrap()
            ._0;

        assert_eq!(counter, U256::from(7));
        assert_eq!(network.code_at(CONTRACT).await.unwrap(), bytes!("00"));
    }

    #[tokio::test]
    async fn test_accounts_start_with_signer() {
        let (_server, network) = connect_mock(MockNode {
            accounts: Some(vec![DEV_ACCOUNTS[1], DEV_ACCOUNTS[0], DEV_ACCOUNTS[2]]),
            ..Default::default()
        })
        .await;

        assert_eq!(network.accounts().await.unwrap(), DEV_ACCOUNTS.to_vec());
    }

    #[tokio::test]
    async fn test_accounts_when_node_rejects_eth_accounts() {
        let (_server, network) = connect_mock(MockNode {
            accounts: None,
            ..Default::default()
        })
        .await;

        assert_eq!(network.accounts().await.unwrap(), vec![DEV_ACCOUNTS[0]]);
    }
}
