use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use markov_bot_core::config::ChainConfig;

#[derive(Parser)]
#[command(name = "markov-bot")]
#[command(about = "Builds a Markov chain from posts and publishes generated ones", long_about = None)]
#[command(version)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Builds chain model and save it
	Build(BuildCommand),
	/// Posts new text from built chain
	Post(PostCommand),
	/// Posts new text after building chain if it expired
	Run(RunCommand),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AnalyzerKind {
	/// MeCab morphological analyzer (wakati output)
	Mecab,
	/// Split lines on whitespace
	Whitespace,
}

/// Flags shared by every command.
#[derive(Args)]
pub struct CommonArgs {
	/// Load configuration from FILE (JSON, or YAML for .yml/.yaml). Command line flags and environment variables override it.
	#[arg(long, value_name = "FILE")]
	pub config_file: Option<PathBuf>,

	/// Load or save the model at FILE.
	#[arg(long, value_name = "FILE")]
	pub model_file: PathBuf,
}

#[derive(Args)]
pub struct BuildFlags {
	/// The state size of markov chain
	#[arg(long, env = "STATE_SIZE")]
	pub state_size: Option<usize>,

	/// The number of statuses to fetch from source account
	#[arg(long, env = "FETCH_STATUS_COUNT")]
	pub fetch_status_count: Option<usize>,

	/// Tokenizer used on fetched posts
	#[arg(long, value_enum, default_value_t = AnalyzerKind::Mecab)]
	pub analyzer: AnalyzerKind,

	/// MeCab dictionary name, looked up under `mecab-config --dicdir`
	#[arg(long, default_value = "mecab-ipadic-neologd")]
	pub mecab_dictionary: String,
}

#[derive(Args)]
pub struct PostFlags {
	/// Print the generated text instead of posting it
	#[arg(long, env = "DRY_RUN")]
	pub dry_run: bool,

	/// Minimum number of words of a generated post
	#[arg(long, env = "MIN_WORDS_COUNT")]
	pub min_words_count: Option<usize>,

	/// Seed of the random generator (random when omitted)
	#[arg(long)]
	pub seed: Option<u64>,
}

#[derive(Args)]
pub struct BuildCommand {
	#[command(flatten)]
	pub common: CommonArgs,
	#[command(flatten)]
	pub build: BuildFlags,
}

#[derive(Args)]
pub struct PostCommand {
	#[command(flatten)]
	pub common: CommonArgs,
	#[command(flatten)]
	pub post: PostFlags,
}

#[derive(Args)]
pub struct RunCommand {
	#[command(flatten)]
	pub common: CommonArgs,
	#[command(flatten)]
	pub build: BuildFlags,
	#[command(flatten)]
	pub post: PostFlags,

	/// Duration in seconds after which the model is rebuilt
	#[arg(long, env = "EXPIRES_IN")]
	pub expires_in: Option<u64>,
}

impl BuildFlags {
	/// Overrides the configuration with the flags that were given.
	pub fn apply(&self, config: &mut ChainConfig) {
		if let Some(state_size) = self.state_size {
			config.state_size = state_size;
		}
		if let Some(fetch_status_count) = self.fetch_status_count {
			config.fetch_status_count = fetch_status_count;
		}
	}
}

impl PostFlags {
	/// Overrides the configuration with the flags that were given.
	pub fn apply(&self, config: &mut ChainConfig) {
		if let Some(min_words_count) = self.min_words_count {
			config.min_words_count = min_words_count;
		}
	}
}
