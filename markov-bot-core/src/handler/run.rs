use std::time::{Duration, SystemTime};

use log::{info, warn};
use rand::Rng;

use super::build::{BuildOptions, build_chain};
use super::post::{PostOptions, generate_and_post};
use crate::analyzer::Analyzer;
use crate::blog::BlogClient;
use crate::config::ChainConfig;
use crate::error::Result;
use crate::store::PersistentStore;

/// Returns `true` when data saved at `mod_time` is older than `expires_in` seconds at `now`.
///
/// A modification time in the future never expires.
pub fn is_expired(mod_time: SystemTime, now: SystemTime, expires_in: u64) -> bool {
	now.duration_since(mod_time)
		.is_ok_and(|age| age > Duration::from_secs(expires_in))
}

/// One full bot cycle: refresh the chain if needed, then post.
///
/// # Behavior
/// - No stored chain: build one. A failure here is returned.
/// - Stored chain older than `expires_in`: rebuild it. A failure is logged and
///   the previous chain is used.
/// - Then generate and publish a post with `post_client`.
pub fn run<R: Rng + ?Sized>(
	config: &ChainConfig,
	fetch_client: &mut dyn BlogClient,
	post_client: &mut dyn BlogClient,
	analyzer: &dyn Analyzer,
	store: &mut dyn PersistentStore,
	rng: &mut R,
	now: SystemTime,
) -> Result<String> {
	let build_options = BuildOptions::from(config);

	match store.mod_time()? {
		None => {
			info!("no stored chain, building");
			build_chain(fetch_client, analyzer, store, &build_options)?;
		}
		Some(mod_time) if is_expired(mod_time, now, config.expires_in) => {
			info!("stored chain expired, rebuilding");
			if let Err(err) = build_chain(fetch_client, analyzer, store, &build_options) {
				warn!("rebuild failed, using the previous chain: {err}");
			}
		}
		Some(_) => {}
	}

	generate_and_post(post_client, store, rng, &PostOptions::from(config))
}
