//! The deployment pipeline.
//!
//! A [`DeploymentSession`] walks a [`DeploymentPlan`] one contract at a time. Placeholders are
//! replaced with the addresses of contracts deployed earlier in the run (or seeded from a
//! previous run), and the first failing step halts the run. Nothing is rolled back: everything
//! that succeeded stays recorded in the [`SessionState`], which can be fed into a new session to
//! pick up where the last one stopped.

use crate::{
    deployer::{DeployReceipt, Deployer},
    error::display_chain,
    entry::{ContractEntry, EntryId},
    resolver::DeploymentPlan,
    value::{ArgError, ArgValue, TypedValue, resolve_type},
};
use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, error::Error as StdError, fmt};

/// Deployment status of a single entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Pending,
    Deploying,
    Succeeded,
    Failed,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Deploying => "deploying",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Failure,
    Skipped,
}

/// One line of the human-readable session log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            LogKind::Info => "info",
            LogKind::Success => "ok",
            LogKind::Failure => "error",
            LogKind::Skipped => "skip",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// Everything a session has learned so far.
///
/// Addresses and transaction hashes are only ever added, never removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    resolved_addresses: BTreeMap<String, Address>,
    #[serde(default)]
    tx_hashes: BTreeMap<String, TxHash>,
    #[serde(default)]
    entry_status: BTreeMap<EntryId, EntryStatus>,
    #[serde(default)]
    log: Vec<LogEntry>,
}

impl SessionState {
    /// Returns the deployed address of contract `name`.
    pub fn address(&self, name: &str) -> Option<Address> {
        self.resolved_addresses.get(name).copied()
    }

    pub fn resolved_addresses(&self) -> &BTreeMap<String, Address> {
        &self.resolved_addresses
    }

    /// Returns the creation transaction of contract `name`, if it was deployed by a session.
    pub fn tx_hash(&self, name: &str) -> Option<TxHash> {
        self.tx_hashes.get(name).copied()
    }

    pub fn status(&self, id: EntryId) -> EntryStatus {
        self.entry_status.get(&id).copied().unwrap_or_default()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Records an address obtained outside of this session.
    ///
    /// An address already recorded for `name` is kept.
    pub fn seed(&mut self, name: impl Into<String>, address: Address) {
        self.resolved_addresses.entry(name.into()).or_insert(address);
    }

    fn record(&mut self, entry: &ContractEntry, receipt: DeployReceipt) {
        self.resolved_addresses.entry(entry.name().to_string()).or_insert(receipt.address);
        self.tx_hashes.entry(entry.name().to_string()).or_insert(receipt.tx_hash);
        self.entry_status.insert(entry.id(), EntryStatus::Succeeded);
    }

    fn set_status(&mut self, id: EntryId, status: EntryStatus) {
        self.entry_status.insert(id, status);
    }

    fn push_log(&mut self, kind: LogKind, message: String) {
        if kind == LogKind::Failure {
            error!(target: "parx::session", "{message}");
        } else {
            info!(target: "parx::session", "{message}");
        }
        self.log.push(LogEntry { kind, message });
    }
}

/// Why a deployment step failed.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("{entry} depends on {dependency}, which has no known address")]
    UnresolvedDependency { entry: String, dependency: String },
    #[error("{entry} appears more than once in the plan and already has an address")]
    DuplicateName { entry: String },
    #[error("{entry} expects {expected} constructor arguments, got {actual}")]
    ArgumentArity { entry: String, expected: usize, actual: usize },
    #[error("invalid constructor argument for {entry}")]
    ArgumentType {
        entry: String,
        #[source]
        source: ArgError,
    },
    #[error("failed to deploy {entry}")]
    Deploy {
        entry: String,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

impl StepError {
    /// The name of the contract whose step failed.
    pub fn entry(&self) -> &str {
        match self {
            Self::UnresolvedDependency { entry, .. }
            | Self::DuplicateName { entry }
            | Self::ArgumentArity { entry, .. }
            | Self::ArgumentType { entry, .. }
            | Self::Deploy { entry, .. } => entry,
        }
    }
}

/// The final state of one entry after a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOutcome {
    pub id: EntryId,
    pub name: String,
    pub status: EntryStatus,
    pub address: Option<Address>,
    pub tx_hash: Option<TxHash>,
}

/// What a call to [`DeploymentSession::run`] produced.
#[derive(Debug)]
pub struct SessionReport {
    /// One outcome per plan entry, in plan order.
    pub outcomes: Vec<EntryOutcome>,
    /// The log lines written during this run.
    pub log: Vec<LogEntry>,
    /// The error that halted the run.
    pub error: Option<StepError>,
}

impl SessionReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn outcome(&self, name: &str) -> Option<&EntryOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }
}

/// Runs deployment plans against a [`Deployer`].
#[derive(Clone, Debug, Default)]
pub struct DeploymentSession {
    state: SessionState,
}

impl DeploymentSession {
    /// Creates a session with an empty address table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues from the state of an earlier session.
    pub fn resume(state: SessionState) -> Self {
        Self { state }
    }

    /// Creates a session that already knows the given addresses.
    ///
    /// Plan entries whose name is seeded are treated as deployed.
    pub fn seeded(addresses: impl IntoIterator<Item = (String, Address)>) -> Self {
        let mut state = SessionState::default();
        for (name, address) in addresses {
            state.seed(name, address);
        }
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Deploys every entry of `plan` in order, stopping at the first failure.
    pub async fn run<D: Deployer + ?Sized>(
        &mut self,
        plan: &DeploymentPlan,
        deployer: &D,
    ) -> SessionReport {
        self.run_with_observer(plan, deployer, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `observer` with the state after every step.
    pub async fn run_with_observer<D, F>(
        &mut self,
        plan: &DeploymentPlan,
        deployer: &D,
        mut observer: F,
    ) -> SessionReport
    where
        D: Deployer + ?Sized,
        F: FnMut(&SessionState),
    {
        let log_start = self.state.log.len();
        self.reset_statuses(plan);

        let mut error = None;
        for entry in plan {
            let name = entry.name();
            if self.state.status(entry.id()) == EntryStatus::Succeeded {
                let message = match self.state.address(name) {
                    Some(address) => format!("{name} already deployed at {address}, skipping"),
                    None => format!("{name} already deployed, skipping"),
                };
                self.state.push_log(LogKind::Skipped, message);
                observer(&self.state);
                continue;
            }

            self.state.set_status(entry.id(), EntryStatus::Deploying);
            self.state.push_log(LogKind::Info, format!("deploying {name}"));

            match self.step(entry, deployer).await {
                Ok(receipt) => {
                    self.state.record(entry, receipt);
                    self.state.push_log(
                        LogKind::Success,
                        format!("{name} deployed at {} (tx {})", receipt.address, receipt.tx_hash),
                    );
                    observer(&self.state);
                }
                Err(err) => {
                    self.state.set_status(entry.id(), EntryStatus::Failed);
                    self.state.push_log(LogKind::Failure, display_chain(&err));
                    observer(&self.state);
                    error = Some(err);
                    break;
                }
            }
        }

        SessionReport {
            outcomes: plan.iter().map(|entry| self.outcome(entry)).collect(),
            log: self.state.log[log_start..].to_vec(),
            error,
        }
    }

    /// Marks every plan entry pending, except the ones that are known to be deployed.
    fn reset_statuses(&mut self, plan: &DeploymentPlan) {
        for entry in plan {
            let deployed = self.state.status(entry.id()) == EntryStatus::Succeeded
                || self.state.resolved_addresses.contains_key(entry.name());
            let status = if deployed { EntryStatus::Succeeded } else { EntryStatus::Pending };
            self.state.set_status(entry.id(), status);
        }
    }

    async fn step<D: Deployer + ?Sized>(
        &self,
        entry: &ContractEntry,
        deployer: &D,
    ) -> Result<DeployReceipt, StepError> {
        let name = entry.name();
        // Entries seeded or deployed earlier are skipped, so a known name here is a second plan
        // entry with that name. Its address would shadow the first one.
        if self.state.resolved_addresses.contains_key(name) {
            return Err(StepError::DuplicateName { entry: name.to_string() });
        }

        let params = entry.constructor_params();
        let args = entry.constructor_args();
        if args.len() != params.len() {
            return Err(StepError::ArgumentArity {
                entry: name.to_string(),
                expected: params.len(),
                actual: args.len(),
            });
        }

        let resolved = args
            .iter()
            .map(|arg| self.resolve_arg(name, arg))
            .collect::<Result<Vec<_>, _>>()?;

        let values = resolved
            .iter()
            .zip(params)
            .map(|(value, param)| value.to_sol(&resolve_type(param)?))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StepError::ArgumentType { entry: name.to_string(), source })?;

        debug!(contract = name, args = values.len(), "sending deployment");
        let receipt = deployer
            .deploy(entry.bytecode(), entry.abi(), &values)
            .await
            .map_err(|err| StepError::Deploy { entry: name.to_string(), source: err.into() })?;
        debug!(contract = name, address = %receipt.address, tx = %receipt.tx_hash, "deployed");
        Ok(receipt)
    }

    fn resolve_arg(&self, entry: &str, arg: &ArgValue) -> Result<TypedValue, StepError> {
        match arg {
            ArgValue::Concrete(value) => Ok(value.clone()),
            ArgValue::Placeholder(dependency) => self
                .state
                .address(dependency)
                .map(TypedValue::Address)
                .ok_or_else(|| StepError::UnresolvedDependency {
                    entry: entry.to_string(),
                    dependency: dependency.clone(),
                }),
        }
    }

    fn outcome(&self, entry: &ContractEntry) -> EntryOutcome {
        let status = self.state.status(entry.id());
        let deployed = status == EntryStatus::Succeeded;
        EntryOutcome {
            id: entry.id(),
            name: entry.name().to_string(),
            status,
            address: deployed.then(|| self.state.address(entry.name())).flatten(),
            tx_hash: deployed.then(|| self.state.tx_hash(entry.name())).flatten(),
        }
    }
}
