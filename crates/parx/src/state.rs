//! Run records written after every deployment.
//!
//! Each run is stored as `run-<timestamp>.json` in the chain's state directory, and copied to
//! `run-latest.json` which `parx deploy --resume` reads back.

use eyre::{Result, WrapErr};
use parx_deploy::{EntryOutcome, SessionReport, SessionState};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// The outcome of a `parx deploy` run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    pub chain_id: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub outcomes: Vec<EntryOutcome>,
    /// Error of the step that halted the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub state: SessionState,
}

impl RunRecord {
    pub const LATEST: &'static str = "run-latest.json";

    pub fn new(chain_id: u64, report: &SessionReport, state: SessionState) -> Self {
        let timestamp =
            SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
        Self {
            chain_id,
            timestamp,
            outcomes: report.outcomes.clone(),
            error: report.error.as_ref().map(|err| parx_deploy::error::display_chain(err)),
            state,
        }
    }

    /// Writes the record to `dir`, returning the path of the timestamped copy.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("failed to create {}", dir.display()))?;
        let json = serde_json::to_string_pretty(self)?;

        let path = dir.join(format!("run-{}.json", self.timestamp));
        std::fs::write(&path, &json)
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        let latest = dir.join(Self::LATEST);
        std::fs::write(&latest, &json)
            .wrap_err_with(|| format!("failed to write {}", latest.display()))?;

        debug!(path = %path.display(), "saved run record");
        Ok(path)
    }

    /// Reads `run-latest.json` from `dir`, if there is one.
    pub fn load_latest(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(Self::LATEST);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let record = serde_json::from_str(&content)
            .wrap_err_with(|| format!("{} is not a valid run record", path.display()))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use parx_deploy::DeploymentSession;

    #[test]
    fn saves_and_loads_latest() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("deployments/31337");
        assert_eq!(RunRecord::load_latest(&state_dir).unwrap(), None);

        let session =
            DeploymentSession::seeded([("Token".to_string(), Address::with_last_byte(7))]);
        let report = SessionReport { outcomes: Vec::new(), log: Vec::new(), error: None };
        let record = RunRecord::new(31337, &report, session.into_state());
        let path = record.save(&state_dir).unwrap();
        assert!(path.is_file());

        let latest = RunRecord::load_latest(&state_dir).unwrap().unwrap();
        assert_eq!(latest, record);
        assert_eq!(latest.state.address("Token"), Some(Address::with_last_byte(7)));
    }

    #[test]
    fn rejects_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RunRecord::LATEST), "{").unwrap();
        let err = RunRecord::load_latest(dir.path()).unwrap_err();
        assert!(err.to_string().ends_with("is not a valid run record"), "{err}");
    }
}
