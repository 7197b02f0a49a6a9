//! Normalized compiler artifacts.
//!
//! Both Foundry (`out/<File>.sol/<Name>.json`) and Hardhat
//! (`artifacts/contracts/<File>.sol/<Name>.json`) outputs are accepted. Which one a file is gets
//! decided by the shape of its `bytecode` field.

use alloy_json_abi::{JsonAbi, Param};
use alloy_primitives::{Bytes, hex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Errors that can occur while reading an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact {} is not valid JSON", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} is neither a Foundry nor a Hardhat artifact")]
    UnknownFormat(String),
    #[error("invalid ABI in artifact {name}")]
    InvalidAbi {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bytecode of {name} contains unlinked library references")]
    Unlinked { name: String },
    #[error("bytecode of {name} is not valid hex")]
    InvalidBytecode {
        name: String,
        #[source]
        source: hex::FromHexError,
    },
    #[error("{name} has no deployable bytecode (interface or abstract contract?)")]
    EmptyBytecode { name: String },
}

/// The build tool an artifact was produced by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Foundry,
    Hardhat,
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Foundry => "foundry",
            Self::Hardhat => "hardhat",
        })
    }
}

/// A compiled contract, independent of the tool that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractArtifact {
    /// Symbolic contract name.
    pub name: String,
    /// Contract interface. Holds at most one constructor.
    pub abi: JsonAbi,
    /// Creation bytecode.
    pub bytecode: Bytes,
    /// Where the artifact came from.
    pub framework: Framework,
}

impl ContractArtifact {
    /// Reads the artifact at `path`, using the file stem as name when the artifact doesn't carry
    /// one.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ArtifactError::Io { path: path.to_path_buf(), source })?;
        let json: Value = serde_json::from_str(&content)
            .map_err(|source| ArtifactError::Json { path: path.to_path_buf(), source })?;
        let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
        Self::from_json(&stem, &json)
    }

    /// Recursively loads every artifact below `root`.
    ///
    /// JSON files that are not artifacts (build info, debug files) and contracts without
    /// bytecode are skipped. The result is sorted by path.
    pub fn load_dir(root: impl AsRef<Path>) -> Result<Vec<Self>, ArtifactError> {
        let mut artifacts = Vec::new();
        for entry in walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != "build-info")
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::load(path) {
                Ok(artifact) => artifacts.push(artifact),
                Err(
                    err @ (ArtifactError::UnknownFormat(_) | ArtifactError::EmptyBytecode { .. }),
                ) => trace!(path = %path.display(), %err, "skipping file"),
                Err(err) => return Err(err),
            }
        }
        Ok(artifacts)
    }

    /// Normalizes an already parsed artifact.
    ///
    /// `fallback_name` is used for Foundry artifacts, which don't record the contract name, and
    /// for Hardhat artifacts missing `contractName`.
    pub fn from_json(fallback_name: &str, json: &Value) -> Result<Self, ArtifactError> {
        let Some(abi) = json.get("abi") else {
            return Err(ArtifactError::UnknownFormat(fallback_name.to_string()));
        };

        let (name, bytecode, framework) =
            if let Some(object) = json.pointer("/bytecode/object").and_then(Value::as_str) {
                (fallback_name.to_string(), object, Framework::Foundry)
            } else if let Some(code) =
                json.get("bytecode").and_then(Value::as_str).filter(|code| code.starts_with("0x"))
            {
                let name = json
                    .get("contractName")
                    .and_then(Value::as_str)
                    .unwrap_or(fallback_name)
                    .to_string();
                (name, code, Framework::Hardhat)
            } else {
                return Err(ArtifactError::UnknownFormat(fallback_name.to_string()));
            };

        let abi = serde_json::from_value::<JsonAbi>(abi.clone())
            .map_err(|source| ArtifactError::InvalidAbi { name: name.clone(), source })?;
        let bytecode = decode_bytecode(&name, bytecode)?;

        debug!(%name, %framework, len = bytecode.len(), "loaded artifact");
        Ok(Self { name, abi, bytecode, framework })
    }

    /// Returns the constructor parameters, empty if the ABI has no constructor.
    pub fn constructor_params(&self) -> &[Param] {
        self.abi.constructor.as_ref().map(|c| c.inputs.as_slice()).unwrap_or_default()
    }
}

fn decode_bytecode(name: &str, code: &str) -> Result<Bytes, ArtifactError> {
    let code = code.strip_prefix("0x").unwrap_or(code);
    // Library link references look like `__$<hash>$__`.
    if code.contains("__") {
        return Err(ArtifactError::Unlinked { name: name.to_string() });
    }
    if code.is_empty() {
        return Err(ArtifactError::EmptyBytecode { name: name.to_string() });
    }
    hex::decode(code)
        .map(Bytes::from)
        .map_err(|source| ArtifactError::InvalidBytecode { name: name.to_string(), source })
}
