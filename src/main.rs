mod args;
mod election;

use clap::Parser;
use log::debug;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    debug!("args: {:?}", args);

    if let Err(e) = election::run_election(&args) {
        eprintln!("An error occured: {}", e);
        std::process::exit(1);
    }
}
