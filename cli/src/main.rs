mod args;
mod compute;
mod input;
mod label;
mod logging;

use clap::Parser;
use tracing::debug;

use crate::args::{Commands, FullArgs};
use crate::logging::{Verbosity, init_subscriber};

fn main() -> anyhow::Result<()> {
    let args = FullArgs::parse();
    init_subscriber(Verbosity::from_flags(args.verbose, args.quiet));
    debug!(args = %serde_json::to_string(&args)?, "parsed arguments");

    let sep = args.sep.as_str();
    match args.command {
        Commands::Gcompute(a) => compute::gcompute::run(a, sep, args.verbose),
        Commands::Compute(a) => compute::level::run(a, sep, args.verbose),
        Commands::Glabel(a) => label::glabel(a, sep),
        Commands::Label(a) => label::label(a, sep),
    }
}
