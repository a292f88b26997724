mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{build, summary};
use log::LevelFilter;

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var("RUST_LOG").is_err() {
        let level = match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };
        builder.filter_level(level);
    }
    let _ = builder.format_timestamp_millis().try_init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Build(args) => build::run(&cli, args),
        Commands::Summary(args) => summary::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
