//! Command line front end: build a model instance from a configuration file

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "mola", about = "Build a solver-ready model instance from a configuration")]
struct Args {
    /// Path to the model configuration JSON file
    config: PathBuf,

    /// Print the full resolved instance instead of the entry-count summary
    #[arg(long)]
    full: bool,
}

fn main() -> anyhow::Result<()> {
    mola_build::logging::init();
    let args = Args::parse();

    let config = mola_build::get_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let instance = mola_build::build_instance(&config, None)
        .context("building model instance")?;

    let output = if args.full {
        serde_json::to_string_pretty(&instance)?
    } else {
        serde_json::to_string_pretty(&instance.summary())?
    };
    println!("{output}");
    Ok(())
}
