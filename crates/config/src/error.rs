//! Config extraction errors.

use crate::ContractConfig;
use figment::{
    Figment,
    providers::{Format, Toml},
};
use std::{collections::HashSet, error::Error, fmt};

/// The header printed above the individual extraction errors.
pub const FAILED_TO_EXTRACT_CONFIG_MSG: &str = "failed to extract parx config:";

/// A failed attempt to extract the [`Config`](crate::Config) from its figment.
///
/// Holds every distinct problem found, so a broken `parx.toml` is reported in one go.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    error: figment::Error,
    errors: Vec<ParxConfigError>,
}

impl ExtractConfigError {
    /// Sorts the errors of `error` by origin, using `figment` to locate bad contract entries.
    pub fn new(error: figment::Error, figment: &Figment) -> Self {
        let mut errors = Vec::with_capacity(error.count());
        let mut unique = HashSet::with_capacity(error.count());
        for err in error.clone() {
            let err = ParxConfigError::classify(err, figment);
            if unique.insert(err.to_string()) {
                errors.push(err);
            }
        }
        Self { error, errors }
    }

    pub fn errors(&self) -> &[ParxConfigError] {
        &self.errors
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{FAILED_TO_EXTRACT_CONFIG_MSG}")?;
        for err in &self.errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Error::source(&self.error)
    }
}

/// A single problem found while building the config.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParxConfigError {
    /// A `[[contracts]]` entry that does not describe a contract.
    #[error("parx.toml error in contract #{position} ({artifact}): {error}")]
    Contract {
        /// 1-based position in the `[[contracts]]` list.
        position: usize,
        artifact: String,
        error: figment::Error,
    },
    /// Thrown while reading `parx.toml`
    #[error("parx.toml error: {0}{s}", s = setting(.0))]
    Toml(figment::Error),
    /// Thrown by any other provider, or while deserializing
    #[error("parx config error: {0}{s}", s = setting(.0))]
    Other(figment::Error),
}

impl ParxConfigError {
    fn classify(error: figment::Error, figment: &Figment) -> Self {
        if error.path.first().is_none_or(|key| key == "contracts")
            && let Some((position, artifact)) = offending_contract(figment)
        {
            return Self::Contract { position, artifact, error };
        }
        let from_toml =
            error.metadata.as_ref().is_some_and(|meta| meta.name.contains(Toml::NAME));
        if from_toml { Self::Toml(error) } else { Self::Other(error) }
    }
}

fn setting(error: &figment::Error) -> String {
    if error.path.is_empty() {
        String::new()
    } else {
        format!(" for setting `{}`", error.path.join("."))
    }
}

/// Returns the position and artifact of the first `[[contracts]]` entry that fails to
/// deserialize on its own.
fn offending_contract(figment: &Figment) -> Option<(usize, String)> {
    let contracts = figment.find_value("contracts").ok()?.into_array()?;
    contracts.iter().enumerate().find_map(|(index, value)| {
        value.deserialize::<ContractConfig>().err()?;
        let artifact = value.find_ref("artifact").and_then(|artifact| artifact.as_str());
        Some((index + 1, artifact.unwrap_or("no artifact").to_string()))
    })
}
