#![cfg(any(test, feature = "test"))]

use crate::{
    network::{
        LocalNetwork,
        Network,
    },
    primitives::Address,
    ArtifactRegistry,
    ContractHandle,
    Deployer,
};

use std::sync::Arc;

pub const MICROLOAN_PLATFORM: &str = "MicroloanPlatform";

/// Per test state: a fresh in-process network with a freshly deployed
/// microloan platform.
#[derive(Debug)]
pub struct Fixture {
    pub owner: Address,
    pub borrower: Address,
    pub deployer: Deployer<LocalNetwork>,
    pub contract: ContractHandle<LocalNetwork>,
}

impl Fixture {
    /// Builds a new fixture. Nothing is shared between calls.
    pub async fn setup() -> Fixture {
        let network = Arc::new(LocalNetwork::default());

        let accounts = network.accounts().await.unwrap();
        let [owner, borrower, ..] = accounts[..] else {
            panic!("local network has fewer than two accounts");
        };

        let registry = ArtifactRegistry::builtin().unwrap();
        let deployer = Deployer::with_shared_network(network, registry);
        let contract = deployer.deploy(MICROLOAN_PLATFORM).await.unwrap();

        Fixture {
            owner,
            borrower,
            deployer,
            contract,
        }
    }

    pub fn network(&self) -> &LocalNetwork {
        self.deployer.network()
    }
}
