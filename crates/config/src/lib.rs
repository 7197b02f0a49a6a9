//! # parx-config
//!
//! parx configuration.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. [`Config::default`]
//! 2. `parx.toml` in the project root (or the file named by `PARX_CONFIG`)
//! 3. `PARX_`-prefixed environment variables, e.g. `PARX_RPC_URL`
//!
//! `parx.toml` may hold `[profile.<name>]` tables, the active one is picked with `PARX_PROFILE`.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

use alloy_primitives::Address;
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Serialized},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub mod error;
pub use error::ExtractConfigError;

mod providers;
use providers::TomlFileProvider;

/// Project configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The selected profile.
    #[serde(skip)]
    pub profile: Profile,
    /// The project root. Relative paths are resolved against it.
    #[serde(skip)]
    pub root: PathBuf,
    /// JSON-RPC endpoint of the node to deploy to.
    pub rpc_url: String,
    /// Expected chain id. When set, deploying to a node reporting another chain fails.
    pub chain_id: Option<u64>,
    /// Account to send from when the node manages the keys.
    pub sender: Option<Address>,
    /// Where run records are written, relative to `root`.
    pub state_dir: PathBuf,
    /// The contracts to deploy.
    pub contracts: Vec<ContractConfig>,
}

/// One contract of the batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Path of the compiled artifact, relative to the project root.
    pub artifact: PathBuf,
    /// Overrides the name recorded in the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw constructor arguments. `{{Name}}` refers to the address of contract `Name`.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    /// The default profile: "default"
    pub const DEFAULT_PROFILE: Profile = Profile::Default;

    /// File name of the project config.
    pub const FILE_NAME: &'static str = "parx.toml";

    /// Environment variable overriding the config file location.
    pub const FILE_ENV_VAR: &'static str = "PARX_CONFIG";

    /// Prefix of the environment variables read into the config.
    pub const ENV_PREFIX: &'static str = "PARX_";

    /// Loads the config of the project at `root`.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ExtractConfigError> {
        let root = absolute_root(root.as_ref());
        let mut config = Self::try_from(Self::figment_with_root(&root))?;
        config.root = root;
        Ok(config)
    }

    /// Loads the config of the project at `root` with `overrides` merged on top, e.g. command
    /// line flags.
    pub fn load_with_overrides<T: Provider>(
        root: impl AsRef<Path>,
        overrides: T,
    ) -> Result<Self, ExtractConfigError> {
        let root = absolute_root(root.as_ref());
        let mut config = Self::try_from(Self::figment_with_root(&root).merge(overrides))?;
        config.root = root;
        Ok(config)
    }

    /// Attempts to extract a `Config` from `provider`.
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        let figment = Figment::from(provider);
        trace!(profile = %figment.profile(), "extracting config");
        let mut config = figment.extract::<Self>().map_err(|err| ExtractConfigError::new(err, &figment))?;
        config.profile = figment.profile().clone();
        Ok(config)
    }

    /// Returns the figment for the project at `root`.
    ///
    /// `root` should be absolute: a relative `parx.toml` path is searched for in the parent
    /// directories as well.
    pub fn figment_with_root(root: impl AsRef<Path>) -> Figment {
        let root = root.as_ref();
        let profile = Self::selected_profile();
        Figment::from(Self::default())
            .merge(TomlFileProvider::new(Some(Self::FILE_ENV_VAR), root.join(Self::FILE_NAME)))
            .merge(Env::prefixed(Self::ENV_PREFIX).ignore(&["PROFILE", "CONFIG", "DEBUG"]).global())
            .select(profile)
    }

    /// Returns the profile named by `PARX_PROFILE`, falling back to the default profile.
    pub fn selected_profile() -> Profile {
        Profile::from_env_or("PARX_PROFILE", Self::DEFAULT_PROFILE)
    }

    /// Parses the configured RPC endpoint.
    pub fn rpc_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.rpc_url)
    }

    /// Resolves `path` against the project root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Returns the directory holding the run records of chain `chain_id`.
    pub fn state_dir_for(&self, chain_id: u64) -> PathBuf {
        self.resolve(&self.state_dir).join(chain_id.to_string())
    }
}

/// Makes `root` absolute against the current directory, so the config file is only looked up
/// inside the project.
fn absolute_root(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Self::DEFAULT_PROFILE,
            root: PathBuf::new(),
            rpc_url: "http://localhost:8545".to_string(),
            chain_id: None,
            sender: None,
            state_dir: PathBuf::from("deployments"),
            contracts: Vec::new(),
        }
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("parx defaults")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}
