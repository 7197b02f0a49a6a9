use crate::{intake::load_batch, opts::ProjectOpts};
use clap::Parser;
use eyre::Result;
use itertools::Itertools;
use yansi::Paint;

/// CLI arguments for `parx plan`.
#[derive(Clone, Debug, Parser)]
pub struct PlanArgs {
    #[command(flatten)]
    pub project: ProjectOpts,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let config = parx_config::Config::load(&self.project.root)?;
        let batch = load_batch(&config)?;
        let plan = batch.plan()?;

        for (i, entry) in plan.iter().enumerate() {
            let deps = entry.depends_on();
            if deps.is_empty() {
                println!("{}. {}", i + 1, entry.name().bold());
            } else {
                println!(
                    "{}. {} {}",
                    i + 1,
                    entry.name().bold(),
                    format!("(after {})", deps.iter().join(", ")).dim()
                );
            }
        }
        Ok(())
    }
}
