//! mat2hdf5 - Convert MATLAB .mat recordings to HDF5.
//!
//! Reads one .mat file, or every songNN_Imputed.mat file of a directory,
//! and writes one .hdf5 file per source into the destination directory.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Args;

fn main() {
    let args = Args::parse();

    init_logging(&args);

    if let Err(e) = run(&args) {
        // Nothing to convert is reported, not failed.
        if let Some(setup) = e
            .downcast_ref::<mat_h5::Error>()
            .filter(|err| err.is_setup_error())
        {
            output::print_setup_error(setup);
            return;
        }

        output::print_error(&e);
        std::process::exit(1);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_logging(args: &Args) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<()> {
    commands::convert::run(args)
}
