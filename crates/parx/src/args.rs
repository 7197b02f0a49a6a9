use crate::cmd::{deploy::DeployArgs, inspect::InspectArgs, plan::PlanArgs};
use clap::{Parser, Subcommand};

const VERSION_MESSAGE: &str = env!("CARGO_PKG_VERSION");

/// Deploy interdependent contracts in dependency order.
#[derive(Parser)]
#[command(
    name = "parx",
    version = VERSION_MESSAGE,
    after_help = "Find more information in the README: https://github.com/parx-rs/parx",
    next_display_order = None,
)]
pub struct Parx {
    #[command(subcommand)]
    pub cmd: ParxSubcommand,
}

#[derive(Subcommand)]
pub enum ParxSubcommand {
    /// Print the deployment order of the configured contracts.
    #[command(visible_alias = "p")]
    Plan(PlanArgs),

    /// Deploy the configured contracts.
    #[command(visible_alias = "d")]
    Deploy(DeployArgs),

    /// Show what parx reads from an artifact.
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Parx::command().debug_assert();
    }

    #[test]
    fn parses_deploy_flags() {
        let args = Parx::parse_from(["parx", "deploy", "--resume", "--json", "--root", "proj"]);
        let ParxSubcommand::Deploy(deploy) = args.cmd else { panic!("expected deploy") };
        assert!(deploy.resume);
        assert!(deploy.json);
        assert_eq!(deploy.project.root, std::path::PathBuf::from("proj"));
    }
}
