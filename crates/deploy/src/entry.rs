use crate::{
    artifact::{ContractArtifact, Framework},
    value::{ArgError, ArgValue},
};
use alloy_json_abi::{JsonAbi, Param};
use alloy_primitives::Bytes;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a [`ContractEntry`], assigned at intake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generates a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One contract queued for deployment.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractEntry {
    id: EntryId,
    artifact: ContractArtifact,
    constructor_args: Vec<ArgValue>,
}

impl ContractEntry {
    /// Creates an entry without constructor arguments.
    pub fn new(artifact: ContractArtifact) -> Self {
        Self { id: EntryId::random(), artifact, constructor_args: Vec::new() }
    }

    /// Sets the constructor arguments.
    pub fn with_args(mut self, args: impl IntoIterator<Item = ArgValue>) -> Self {
        self.set_args(args);
        self
    }

    /// Parses raw inputs against the constructor's parameters and uses them as arguments.
    pub fn with_raw_args<S: AsRef<str>>(mut self, inputs: &[S]) -> Result<Self, ArgError> {
        self.constructor_args = ArgValue::parse_all(inputs, self.constructor_params())?;
        Ok(self)
    }

    /// Replaces the constructor arguments.
    pub fn set_args(&mut self, args: impl IntoIterator<Item = ArgValue>) {
        self.constructor_args = args.into_iter().collect();
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.artifact.abi
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.artifact.bytecode
    }

    pub fn framework(&self) -> Framework {
        self.artifact.framework
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    pub fn constructor_args(&self) -> &[ArgValue] {
        &self.constructor_args
    }

    pub fn constructor_params(&self) -> &[Param] {
        self.artifact.constructor_params()
    }

    /// Names of the contracts referenced by placeholders, in order of first appearance.
    ///
    /// Always derived from the arguments, so it can't disagree with them.
    pub fn depends_on(&self) -> Vec<&str> {
        self.constructor_args.iter().filter_map(ArgValue::dependency).unique().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypedValue;

    fn artifact(name: &str) -> ContractArtifact {
        ContractArtifact {
            name: name.to_string(),
            abi: JsonAbi::default(),
            bytecode: Bytes::from_static(&[0x60, 0x80]),
            framework: Framework::Foundry,
        }
    }

    #[test]
    fn ids_are_unique() {
        let a = ContractEntry::new(artifact("A"));
        let b = ContractEntry::new(artifact("A"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn derives_dependencies_from_arguments() {
        let entry = ContractEntry::new(artifact("Router")).with_args([
            ArgValue::placeholder("Factory"),
            ArgValue::Concrete(TypedValue::Bool(true)),
            ArgValue::placeholder("Weth"),
            ArgValue::placeholder("Factory"),
        ]);
        assert_eq!(entry.depends_on(), ["Factory", "Weth"]);
    }

    #[test]
    fn replacing_arguments_updates_dependencies() {
        let mut entry =
            ContractEntry::new(artifact("Vault")).with_args([ArgValue::placeholder("Token")]);
        assert_eq!(entry.depends_on(), ["Token"]);

        entry.set_args([ArgValue::Concrete(TypedValue::Bool(false))]);
        assert!(entry.depends_on().is_empty());
    }
}
