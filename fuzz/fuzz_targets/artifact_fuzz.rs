#![no_main]
use libfuzzer_sys::fuzz_target;
use microloan_deployer::{
    ArtifactRegistry,
    ContractArtifact,
};

fuzz_target!(|data: &[u8]| {
    let Ok(artifact) = ContractArtifact::from_json_slice(data) else {
        return;
    };

    // Accessors must hold for anything that parses
    let _ = artifact.function_names().count();
    let _ = artifact.unlinked_libraries();
    if let Ok(code) = artifact.creation_code() {
        assert_eq!(code.is_empty(), !artifact.is_deployable());
    }
    assert!(artifact
        .fully_qualified_name()
        .ends_with(&artifact.contract_name));

    // A registered artifact is always reachable by its qualified name
    let mut registry = ArtifactRegistry::new();
    registry.insert(artifact.clone());
    if !artifact.contract_name.contains(':') {
        assert_eq!(
            registry.resolve(&artifact.fully_qualified_name()).ok(),
            Some(&artifact)
        );
    }
});
