use crate::{
    entry::{ContractEntry, EntryId},
    resolver::{CycleError, DeploymentPlan, resolve_dependency_order},
    value::ArgValue,
};

/// Errors raised while assembling or planning a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("contract name {0:?} is used more than once in the batch")]
    DuplicateName(String),
    #[error("no contract with id {0} in the batch")]
    UnknownEntry(EntryId),
    #[error("{entry} references {dependency:?}, which is not part of the batch")]
    UnknownDependency { entry: String, dependency: String },
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// The working set of contracts to deploy together.
///
/// Contract names are unique within a batch: they are the keys placeholders resolve against.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    entries: Vec<ContractEntry>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a batch, rejecting duplicate names.
    pub fn from_entries(
        entries: impl IntoIterator<Item = ContractEntry>,
    ) -> Result<Self, BatchError> {
        let mut batch = Self::new();
        for entry in entries {
            batch.push(entry)?;
        }
        Ok(batch)
    }

    /// Adds an entry to the batch.
    pub fn push(&mut self, entry: ContractEntry) -> Result<EntryId, BatchError> {
        if self.by_name(entry.name()).is_some() {
            return Err(BatchError::DuplicateName(entry.name().to_string()));
        }
        let id = entry.id();
        debug!(%id, name = entry.name(), "added contract to batch");
        self.entries.push(entry);
        Ok(id)
    }

    /// Removes the entry with the given id.
    pub fn remove(&mut self, id: EntryId) -> Option<ContractEntry> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        Some(self.entries.remove(index))
    }

    /// Replaces the constructor arguments of an entry.
    pub fn set_args(
        &mut self,
        id: EntryId,
        args: impl IntoIterator<Item = ArgValue>,
    ) -> Result<(), BatchError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .ok_or(BatchError::UnknownEntry(id))?;
        entry.set_args(args);
        Ok(())
    }

    pub fn get(&self, id: EntryId) -> Option<&ContractEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&ContractEntry> {
        self.entries.iter().find(|entry| entry.name() == name)
    }

    pub fn entries(&self) -> &[ContractEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every placeholder names a contract of this batch.
    pub fn check_references(&self) -> Result<(), BatchError> {
        for entry in &self.entries {
            let missing = entry.depends_on().into_iter().find(|dep| self.by_name(dep).is_none());
            if let Some(dependency) = missing {
                return Err(BatchError::UnknownDependency {
                    entry: entry.name().to_string(),
                    dependency: dependency.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Validates references and computes the deployment order.
    pub fn plan(&self) -> Result<DeploymentPlan, BatchError> {
        self.check_references()?;
        let plan = resolve_dependency_order(&self.entries)?;
        debug!(order = ?plan.names().collect::<Vec<_>>(), "resolved deployment order");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ContractArtifact, Framework};
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::Bytes;

    fn entry(name: &str, deps: &[&str]) -> ContractEntry {
        let artifact = ContractArtifact {
            name: name.to_string(),
            abi: JsonAbi::default(),
            bytecode: Bytes::from_static(&[0x00]),
            framework: Framework::Foundry,
        };
        ContractEntry::new(artifact).with_args(deps.iter().map(|dep| ArgValue::placeholder(*dep)))
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut batch = Batch::new();
        batch.push(entry("Token", &[])).unwrap();
        let err = batch.push(entry("Token", &[])).unwrap_err();
        assert!(matches!(err, BatchError::DuplicateName(name) if name == "Token"));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn plans_in_dependency_order() {
        let batch = Batch::from_entries([entry("Vault", &["Token"]), entry("Token", &[])]).unwrap();
        let plan = batch.plan().unwrap();
        assert_eq!(plan.names().collect::<Vec<_>>(), ["Token", "Vault"]);
    }

    #[test]
    fn fails_fast_on_unknown_reference() {
        let batch = Batch::from_entries([entry("Vault", &["Token"])]).unwrap();
        let err = batch.plan().unwrap_err();
        assert_eq!(err.to_string(), "Vault references \"Token\", which is not part of the batch");
    }

    #[test]
    fn surfaces_cycles() {
        let batch = Batch::from_entries([entry("A", &["B"]), entry("B", &["A"])]).unwrap();
        assert!(matches!(batch.plan(), Err(BatchError::Cycle(_))));
    }

    #[test]
    fn edits_arguments_by_id() {
        let mut batch = Batch::from_entries([entry("Token", &[]), entry("Vault", &[])]).unwrap();
        let vault = batch.by_name("Vault").unwrap().id();
        batch.set_args(vault, [ArgValue::placeholder("Token")]).unwrap();
        assert_eq!(batch.get(vault).unwrap().depends_on(), ["Token"]);

        let removed = batch.remove(vault).unwrap();
        let err = batch.set_args(removed.id(), Vec::new()).unwrap_err();
        assert!(matches!(err, BatchError::UnknownEntry(id) if id == removed.id()));
    }
}
