mod error;
pub use error::{
    ArtifactError,
    CallError,
    ConfigError,
    DeploymentError,
    NetworkError,
};

pub mod artifact;
pub use artifact::{
    ArtifactRegistry,
    ContractArtifact,
};

mod deployer;
pub use deployer::{
    Deployer,
    DEFAULT_CONFIRMATION_TIMEOUT,
};

mod handle;
pub use handle::{
    ContractHandle,
    IMicroloanPlatform,
};

pub mod config;

pub mod network;

pub mod primitives;

#[cfg(any(test, feature = "test"))]
pub mod test_utils;
