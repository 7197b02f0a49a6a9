use alloy_json_abi::Param;
use clap::Parser;
use eyre::Result;
use itertools::Itertools;
use parx_deploy::ContractArtifact;
use std::path::PathBuf;
use yansi::Paint;

/// CLI arguments for `parx inspect`.
#[derive(Clone, Debug, Parser)]
pub struct InspectArgs {
    /// A Foundry or Hardhat artifact, or a directory to search for artifacts (e.g. `out`).
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

impl InspectArgs {
    pub fn run(self) -> Result<()> {
        if self.path.is_dir() {
            return list(&self.path);
        }

        let artifact = ContractArtifact::load(&self.path)?;
        println!("{}: {}", "Name".bold(), artifact.name);
        println!("{}: {}", "Framework".bold(), artifact.framework);
        println!("{}: {} bytes", "Bytecode".bold(), artifact.bytecode.len());

        let params = artifact.constructor_params();
        if params.is_empty() {
            println!("{}: none", "Constructor".bold());
        } else {
            println!("{}:", "Constructor".bold());
            for param in params {
                println!("  {}: {}", param_name(param), param.selector_type());
            }
        }
        Ok(())
    }
}

/// Prints one line per deployable artifact below `dir`.
fn list(dir: &std::path::Path) -> Result<()> {
    let artifacts = ContractArtifact::load_dir(dir)?;
    if artifacts.is_empty() {
        eyre::bail!("no deployable artifacts found in {}", dir.display());
    }
    for artifact in &artifacts {
        let params = artifact
            .constructor_params()
            .iter()
            .map(|param| format!("{} {}", param.selector_type(), param_name(param)))
            .join(", ");
        println!(
            "{} {} constructor({params})",
            artifact.name.bold(),
            format!("[{}]", artifact.framework).dim()
        );
    }
    Ok(())
}

fn param_name(param: &Param) -> &str {
    if param.name.is_empty() { "_" } else { param.name.as_str() }
}
