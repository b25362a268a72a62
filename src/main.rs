// main.rs
use anyhow::Result;
use clap::Parser;

use sentia_intake::cli::{self, Args, Commands};
use sentia_intake::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let accepted = match args.command {
        Commands::Template => {
            cli::handle_template()?;
            true
        }
        Commands::Validate { answers, photo } => cli::handle_validate(args.config_dir, answers, photo)?,
        Commands::Submit { answers, photo, endpoint } => {
            cli::handle_submit(args.config_dir, answers, photo, endpoint).await?
        }
        Commands::Config => {
            cli::handle_config(args.config_dir)?;
            true
        }
    };

    if !accepted {
        std::process::exit(1);
    }
    Ok(())
}
