use log::{debug, info};

use crate::analyzer::Analyzer;
use crate::blog::BlogClient;
use crate::chunk::ChunkIter;
use crate::config::ChainConfig;
use crate::error::Result;
use crate::model::Chain;
use crate::store::PersistentStore;

/// Parameters of [`build_chain`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
	/// Order of the built chain.
	pub state_size: usize,
	/// Maximum number of posts to read.
	pub fetch_status_count: usize,
}

impl Default for BuildOptions {
	fn default() -> Self {
		ChainConfig::default().into()
	}
}

impl From<&ChainConfig> for BuildOptions {
	fn from(config: &ChainConfig) -> Self {
		Self {
			state_size: config.state_size,
			fetch_status_count: config.fetch_status_count,
		}
	}
}

impl From<ChainConfig> for BuildOptions {
	fn from(config: ChainConfig) -> Self {
		(&config).into()
	}
}

/// Builds a chain from the client's posts and saves it to `store`.
///
/// # Behavior
/// - Pulls at most `fetch_status_count` posts, page after page
/// - Splits every post into sentences with `analyzer`
/// - Adds each sentence to a new chain of order `state_size`
/// - Saves the encoded chain, replacing what the store held
///
/// # Errors
/// Fetch, analyzer and store errors are returned unchanged; nothing is saved
/// in that case.
pub fn build_chain(
	client: &mut dyn BlogClient,
	analyzer: &dyn Analyzer,
	store: &mut dyn PersistentStore,
	options: &BuildOptions,
) -> Result<Chain> {
	let mut chain = Chain::new(options.state_size);
	let mut statuses = 0;
	let mut sentences = 0;

	for status in ChunkIter::new(client.posts_fetcher()).take(options.fetch_status_count) {
		let status = status?;
		for sentence in analyzer.analyze(&status)? {
			chain.add_source(&sentence);
			sentences += 1;
		}
		statuses += 1;
	}
	debug!("analyzed {statuses} statuses into {sentences} sentences");

	let dump = chain.dump()?;
	store.save(&dump)?;
	info!(
		"built chain of order {} from {statuses} statuses ({} nodes, {} bytes)",
		chain.order(),
		chain.node_count(),
		dump.len()
	);

	Ok(chain)
}
