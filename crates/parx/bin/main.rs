use clap::Parser;
use eyre::Result;
use parx::{
    args::{Parx, ParxSubcommand},
    handler, utils,
};

fn main() -> Result<()> {
    handler::install();
    utils::subscriber();
    utils::enable_paint();
    let args = Parx::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Parx) -> Result<()> {
    match args.cmd {
        ParxSubcommand::Plan(cmd) => cmd.run(),
        ParxSubcommand::Inspect(cmd) => cmd.run(),
        ParxSubcommand::Deploy(cmd) => cmd.run().await,
    }
}
