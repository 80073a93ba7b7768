use std::time::SystemTime;

use anyhow::{Context, Result};
use log::info;
use markov_bot_core::analyzer::{Analyzer, MecabAnalyzer, WhitespaceAnalyzer};
use markov_bot_core::blog::{BlogClient, StdioClient};
use markov_bot_core::config::BotConfig;
use markov_bot_core::handler::{self, BuildOptions, PostOptions};
use markov_bot_core::store::FileStore;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::{AnalyzerKind, BuildCommand, BuildFlags, CommonArgs, PostCommand, PostFlags, RunCommand};

/// Loads the configuration file, or the stdio defaults without one.
fn load_config(common: &CommonArgs) -> Result<BotConfig> {
	match &common.config_file {
		Some(path) => BotConfig::from_file(path).with_context(|| format!("load config {}", path.display())),
		None => Ok(BotConfig::default()),
	}
}

fn analyzer(flags: &BuildFlags) -> Box<dyn Analyzer> {
	match flags.analyzer {
		AnalyzerKind::Mecab => Box::new(MecabAnalyzer::new(flags.mecab_dictionary.clone())),
		AnalyzerKind::Whitespace => Box::new(WhitespaceAnalyzer),
	}
}

fn post_client(config: &BotConfig, flags: &PostFlags) -> Box<dyn BlogClient> {
	if flags.dry_run {
		Box::new(StdioClient)
	} else {
		config.output.client()
	}
}

fn rng(seed: Option<u64>) -> StdRng {
	match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	}
}

pub fn build(cmd: BuildCommand) -> Result<()> {
	let mut config = load_config(&cmd.common)?;
	cmd.build.apply(&mut config.chain);

	let mut store = FileStore::new(&cmd.common.model_file);
	let mut client = config.input.client();
	let analyzer = analyzer(&cmd.build);

	let chain = handler::build_chain(client.as_mut(), analyzer.as_ref(), &mut store, &BuildOptions::from(&config.chain))
		.context("build chain")?;
	info!("saved chain with {} nodes to {}", chain.node_count(), cmd.common.model_file.display());
	Ok(())
}

pub fn post(cmd: PostCommand) -> Result<()> {
	let mut config = load_config(&cmd.common)?;
	cmd.post.apply(&mut config.chain);

	let store = FileStore::new(&cmd.common.model_file);
	let mut client = post_client(&config, &cmd.post);

	handler::generate_and_post(client.as_mut(), &store, &mut rng(cmd.post.seed), &PostOptions::from(&config.chain))
		.context("generate and post")?;
	Ok(())
}

pub fn run(cmd: RunCommand) -> Result<()> {
	let mut config = load_config(&cmd.common)?;
	cmd.build.apply(&mut config.chain);
	cmd.post.apply(&mut config.chain);
	if let Some(expires_in) = cmd.expires_in {
		config.chain.expires_in = expires_in;
	}

	let mut store = FileStore::new(&cmd.common.model_file);
	let mut fetch_client = config.input.client();
	let mut post_client = post_client(&config, &cmd.post);
	let analyzer = analyzer(&cmd.build);

	handler::run(
		&config.chain,
		fetch_client.as_mut(),
		post_client.as_mut(),
		analyzer.as_ref(),
		&mut store,
		&mut rng(cmd.post.seed),
		SystemTime::now(),
	)
	.context("run")?;
	Ok(())
}
