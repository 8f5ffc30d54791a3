//! Compiled contract artifacts.
//!
//! Artifacts follow the Hardhat `hh-sol-artifact-1` layout. Only the fields
//! needed for deployment are modelled, everything else in the file is ignored.
//! Bytecode is kept as the hex string the compiler emitted, since code that
//! still needs library linking carries `__$…$__` placeholders and is not
//! valid hex until linked.

use crate::error::ArtifactError;

use alloy_primitives::{
    hex,
    Bytes,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::{
        BTreeMap,
        BTreeSet,
        HashMap,
    },
    fs,
    path::{
        Path,
        PathBuf,
    },
};
use tracing::{
    debug,
    trace,
};

const MICROLOAN_PLATFORM_ARTIFACT: &str = include_str!("../artifacts/MicroloanPlatform.json");

/// Name of the Hardhat directory holding full compiler input/output.
const BUILD_INFO_DIR: &str = "build-info";

/// Suffix of the Hardhat debug files written next to each artifact.
const DEBUG_FILE_SUFFIX: &str = ".dbg.json";

/// Position of a library address placeholder within bytecode, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    pub start: usize,
    pub length: usize,
}

/// Library placeholders by source file, then by library name.
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>;

/// A compiled contract, ready for deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub abi: Vec<serde_json::Value>,
    /// Creation code, hex encoded.
    #[serde(default)]
    pub bytecode: String,
    /// Runtime code, hex encoded.
    #[serde(default)]
    pub deployed_bytecode: String,
    #[serde(default)]
    pub link_references: LinkReferences,
    #[serde(default)]
    pub deployed_link_references: LinkReferences,
}

impl ContractArtifact {
    /// Parses an artifact from its JSON representation.
    pub fn from_json_slice(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    /// Fully qualified name, e.g. `contracts/Foo.sol:Foo`.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Names of the functions declared in the ABI.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.abi
            .iter()
            .filter(|item| item.get("type").and_then(|t| t.as_str()) == Some("function"))
            .filter_map(|item| item.get("name").and_then(|name| name.as_str()))
    }

    /// Abstract contracts and interfaces compile to empty creation code.
    pub fn is_deployable(&self) -> bool {
        !strip_hex_prefix(&self.bytecode).is_empty()
    }

    /// Libraries the creation code must be linked against, as
    /// `source:Library`.
    pub fn unlinked_libraries(&self) -> Vec<String> {
        self.link_references
            .iter()
            .flat_map(|(source, libraries)| {
                libraries
                    .keys()
                    .map(move |library| format!("{source}:{library}"))
            })
            .collect()
    }

    /// Decoded creation code.
    pub fn creation_code(&self) -> Result<Bytes, hex::FromHexError> {
        hex::decode(&self.bytecode).map(Bytes::from)
    }

    /// Decoded runtime code.
    pub fn runtime_code(&self) -> Result<Bytes, hex::FromHexError> {
        hex::decode(&self.deployed_bytecode).map(Bytes::from)
    }
}

fn strip_hex_prefix(code: &str) -> &str {
    code.strip_prefix("0x").unwrap_or(code)
}

/// Registry of compiled artifacts, keyed by fully qualified name.
#[derive(Debug, Clone, Default)]
pub struct ArtifactRegistry {
    artifacts: HashMap<String, ContractArtifact>,
    /// Fully qualified names declaring each bare contract name.
    names: HashMap<String, BTreeSet<String>>,
}

impl ArtifactRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the artifacts bundled with this crate.
    pub fn builtin() -> Result<Self, ArtifactError> {
        let mut registry = Self::new();
        let artifact = ContractArtifact::from_json_slice(MICROLOAN_PLATFORM_ARTIFACT.as_bytes())
            .map_err(ArtifactError::Bundled)?;
        registry.insert(artifact);
        Ok(registry)
    }

    /// Adds an artifact, replacing any previous one with the same fully
    /// qualified name.
    pub fn insert(&mut self, artifact: ContractArtifact) -> Option<ContractArtifact> {
        let fully_qualified_name = artifact.fully_qualified_name();
        self.names
            .entry(artifact.contract_name.clone())
            .or_default()
            .insert(fully_qualified_name.clone());
        self.artifacts.insert(fully_qualified_name, artifact)
    }

    /// Adds every artifact of `fallback` whose bare contract name is not
    /// already known.
    pub fn with_fallback(mut self, fallback: ArtifactRegistry) -> Self {
        for artifact in fallback.artifacts.into_values() {
            if !self.contains_name(&artifact.contract_name) {
                self.insert(artifact);
            }
        }
        self
    }

    /// Recursively loads every artifact under `dir`.
    ///
    /// Debug files and the `build-info` directory are skipped. Returns the
    /// number of artifacts loaded.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, ArtifactError> {
        let mut loaded = 0;
        let mut pending = vec![dir.as_ref().to_path_buf()];

        while let Some(dir) = pending.pop() {
            for path in read_dir(&dir)? {
                if path.is_dir() {
                    if path.file_name().is_some_and(|name| name == BUILD_INFO_DIR) {
                        continue;
                    }
                    pending.push(path);
                } else if is_artifact_file(&path) {
                    let json = fs::read(&path).map_err(|source| {
                        ArtifactError::Io {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    let artifact = ContractArtifact::from_json_slice(&json)
                        .map_err(|source| ArtifactError::Malformed { path: path.clone(), source })?;

                    trace!(name = %artifact.fully_qualified_name(), ?path, "Loaded artifact");
                    self.insert(artifact);
                    loaded += 1;
                }
            }
        }

        debug!(loaded, dir = ?dir.as_ref(), "Loaded artifacts");
        Ok(loaded)
    }

    /// Resolves a bare (`Foo`) or fully qualified (`contracts/Foo.sol:Foo`)
    /// contract name.
    ///
    /// A bare name declared by more than one source is ambiguous and must be
    /// fully qualified.
    pub fn resolve(&self, name: &str) -> Result<&ContractArtifact, ArtifactError> {
        let not_found = || ArtifactError::NotFound(name.to_string());

        if name.contains(':') {
            return self.artifacts.get(name).ok_or_else(not_found);
        }

        let candidates = self.names.get(name).ok_or_else(not_found)?;
        if candidates.len() > 1 {
            return Err(ArtifactError::Ambiguous {
                name: name.to_string(),
                candidates: candidates.iter().cloned().collect(),
            });
        }

        candidates
            .first()
            .and_then(|fully_qualified_name| self.artifacts.get(fully_qualified_name))
            .ok_or_else(not_found)
    }

    /// Whether any artifact declares the bare contract name `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
    let io_err = |source| {
        ArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        }
    };

    let mut paths = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    paths.sort();
    Ok(paths)
}

fn is_artifact_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    file_name.ends_with(".json") && !file_name.ends_with(DEBUG_FILE_SUFFIX)
}
