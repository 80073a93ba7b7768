//! `markov-bot` - command line front end of the Markov chain bot.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let cli = Cli::parse();

	match cli.command {
		Commands::Build(cmd) => commands::build(cmd)?,
		Commands::Post(cmd) => commands::post(cmd)?,
		Commands::Run(cmd) => commands::run(cmd)?,
	}

	Ok(())
}
