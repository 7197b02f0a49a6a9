use crate::{
    intake::load_batch,
    opts::{ProjectOpts, RpcOpts, WalletOpts},
    provider::RpcDeployer,
    state::RunRecord,
};
use clap::Parser;
use comfy_table::{Cell, Table, modifiers::UTF8_ROUND_CORNERS};
use eyre::{Result, WrapErr};
use parx_config::Config;
use parx_deploy::{
    DeploymentPlan, DeploymentSession, Deployer, EntryOutcome, EntryStatus, LogKind,
};
use yansi::Paint;

/// CLI arguments for `parx deploy`.
#[derive(Clone, Debug, Parser)]
pub struct DeployArgs {
    /// Skip the contracts deployed by the previous run on this chain.
    #[arg(long)]
    pub resume: bool,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub project: ProjectOpts,

    #[command(flatten)]
    pub rpc: RpcOpts,

    #[command(flatten)]
    pub wallet: WalletOpts,
}

impl DeployArgs {
    pub async fn run(self) -> Result<()> {
        let Self { resume, json, project, rpc, wallet } = self;
        let config = rpc.load_config(&project)?;

        // Bad artifacts and cycles are reported before talking to the node.
        let batch = load_batch(&config)?;
        let plan = batch.plan()?;

        let url = config.rpc_url().wrap_err_with(|| format!("invalid RPC URL {}", config.rpc_url))?;
        let deployer = RpcDeployer::new(url, wallet.choose(&config)?);
        let chain_id = deployer.chain_id().await?;
        info!(chain_id, sender = %deployer.sender(), contracts = plan.len(), "deploying");

        DeployRun { config: &config, chain_id, resume, json }.execute(&plan, &deployer).await?;
        Ok(())
    }
}

/// One `parx deploy` run against a node on `chain_id`.
pub struct DeployRun<'a> {
    pub config: &'a Config,
    pub chain_id: u64,
    pub resume: bool,
    pub json: bool,
}

impl DeployRun<'_> {
    /// Deploys `plan`, saves the run record and prints the outcome.
    ///
    /// The record is saved even when the run halts, the halting error is returned afterwards.
    pub async fn execute<D: Deployer + ?Sized>(
        &self,
        plan: &DeploymentPlan,
        deployer: &D,
    ) -> Result<RunRecord> {
        let Self { config, chain_id, resume, json } = *self;
        if let Some(expected) = config.chain_id
            && expected != chain_id
        {
            eyre::bail!("the node is on chain {chain_id}, expected chain {expected}");
        }

        let state_dir = config.state_dir_for(chain_id);
        let mut session = if resume {
            match RunRecord::load_latest(&state_dir)? {
                Some(record) => DeploymentSession::resume(record.state),
                None => {
                    warn!(dir = %state_dir.display(), "no previous run to resume from");
                    DeploymentSession::new()
                }
            }
        } else {
            DeploymentSession::new()
        };

        let mut printed = session.state().log().len();
        let report = session
            .run_with_observer(plan, deployer, |state| {
                if json {
                    return;
                }
                for line in &state.log()[printed..] {
                    let tag = match line.kind {
                        LogKind::Info => "info".cyan(),
                        LogKind::Success => "ok".green(),
                        LogKind::Failure => "error".red(),
                        LogKind::Skipped => "skip".yellow(),
                    };
                    eprintln!("[{tag}] {}", line.message);
                }
                printed = state.log().len();
            })
            .await;

        let record = RunRecord::new(chain_id, &report, session.into_state());
        let path = record.save(&state_dir)?;
        debug!(path = %path.display(), "run recorded");

        if json {
            println!("{}", serde_json::to_string_pretty(&record)?);
        } else {
            println!("{}", summary_table(&report.outcomes));
        }

        match report.error {
            Some(err) => Err(err.into()),
            None => Ok(record),
        }
    }
}

fn summary_table(outcomes: &[EntryOutcome]) -> Table {
    let mut table = Table::new();
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(["Contract", "Status", "Address", "Tx"]);
    for outcome in outcomes {
        table.add_row([
            Cell::new(&outcome.name),
            Cell::new(status_label(outcome.status)),
            Cell::new(outcome.address.map(|a| a.to_string()).unwrap_or_default()),
            Cell::new(outcome.tx_hash.map(|h| h.to_string()).unwrap_or_default()),
        ]);
    }
    table
}

fn status_label(status: EntryStatus) -> String {
    match status {
        EntryStatus::Succeeded => status.green().to_string(),
        EntryStatus::Failed => status.red().to_string(),
        EntryStatus::Pending | EntryStatus::Deploying => status.dim().to_string(),
    }
}
