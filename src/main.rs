use anyhow::Result;
use clap::Parser;
use tracing::error;

use fofak::{pipeline, utils, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    match pipeline::run(&args) {
        Ok(outcome) => {
            pipeline::print_run_outcome(&outcome);
            Ok(())
        }
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
