use log::{debug, info};
use rand::Rng;

use crate::blog::BlogClient;
use crate::config::ChainConfig;
use crate::error::{Error, Result};
use crate::model::Chain;
use crate::store::PersistentStore;
use crate::text::join_tokens;

/// Generation attempts made by default before giving up.
pub const MAX_ATTEMPTS: usize = 100;

/// Parameters of [`generate_text`] and [`generate_and_post`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostOptions {
	/// Minimum number of tokens of an accepted post. Values below 1 count as 1.
	pub min_words_count: usize,
	/// Number of generations tried before failing.
	pub max_attempts: usize,
	/// Generated sequences are truncated to this many tokens, if set.
	pub max_words_count: Option<usize>,
}

impl Default for PostOptions {
	fn default() -> Self {
		Self {
			min_words_count: 1,
			max_attempts: MAX_ATTEMPTS,
			max_words_count: None,
		}
	}
}

impl From<&ChainConfig> for PostOptions {
	fn from(config: &ChainConfig) -> Self {
		Self {
			min_words_count: config.min_words_count,
			max_attempts: config.max_attempts,
			max_words_count: config.max_words_count,
		}
	}
}

/// Loads and decodes the chain held by `store`.
pub fn load_chain(store: &dyn PersistentStore) -> Result<Chain> {
	let data = store.load()?;
	Chain::load(&data)
}

/// Generates the text of one post.
///
/// Sequences shorter than `min_words_count` are thrown away and generation is
/// retried, up to `max_attempts` times. An empty sequence is never accepted.
///
/// # Errors
/// Returns [`Error::GenerationExhausted`] once every attempt has been used.
pub fn generate_text<R: Rng + ?Sized>(chain: &mut Chain, rng: &mut R, options: &PostOptions) -> Result<String> {
	let min_words = options.min_words_count.max(1);

	for attempt in 1..=options.max_attempts {
		let generated = match options.max_words_count {
			Some(max_words) => chain.generate_capped(rng, max_words),
			None => chain.generate(rng),
		};
		if generated.len() < min_words {
			debug!("attempt {attempt}: {} words, {min_words} required", generated.len());
			continue;
		}
		return Ok(join_tokens(&generated));
	}

	Err(Error::GenerationExhausted {
		attempts: options.max_attempts,
		min_words,
	})
}

/// Generates a post from the stored chain and publishes it with `client`.
///
/// Returns the published text.
pub fn generate_and_post<R: Rng + ?Sized>(
	client: &mut dyn BlogClient,
	store: &dyn PersistentStore,
	rng: &mut R,
	options: &PostOptions,
) -> Result<String> {
	let mut chain = load_chain(store)?;
	let text = generate_text(&mut chain, rng, options)?;
	client.create_post(&text)?;
	info!("posted {} characters", text.chars().count());
	Ok(text)
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::blog::RecordableClient;
	use crate::store::MemoryStore;

	fn rng() -> StdRng {
		StdRng::seed_from_u64(11)
	}

	fn stored(chain: &Chain) -> MemoryStore {
		let mut store = MemoryStore::new();
		store.save(&chain.dump().unwrap()).unwrap();
		store
	}

	#[test]
	fn trained_chain_is_posted() {
		let mut chain = Chain::new(2);
		chain.add_source(&["Hello", "world", "！"]);
		let mut client = RecordableClient::default();

		let text = generate_and_post(&mut client, &stored(&chain), &mut rng(), &PostOptions::default()).unwrap();
		assert_eq!(text, "Hello world！");
		assert_eq!(client.posted(), ["Hello world！"]);
	}

	#[test]
	fn empty_chain_exhausts_attempts() {
		let mut client = RecordableClient::default();
		let err = generate_and_post(&mut client, &stored(&Chain::new(3)), &mut rng(), &PostOptions::default())
			.unwrap_err();
		assert!(matches!(err, Error::GenerationExhausted { attempts: MAX_ATTEMPTS, min_words: 1 }));
		assert!(client.posted().is_empty());
	}

	#[test]
	fn short_sequences_are_rejected() {
		let mut chain = Chain::new(1);
		chain.add_source(&["too", "short"]);
		let options = PostOptions { min_words_count: 3, max_attempts: 5, max_words_count: None };
		let err = generate_text(&mut chain, &mut rng(), &options).unwrap_err();
		assert!(matches!(err, Error::GenerationExhausted { attempts: 5, min_words: 3 }));
	}

	#[test]
	fn long_enough_sequences_are_kept() {
		let mut chain = Chain::new(1);
		chain.add_source(&["a"]);
		chain.add_source(&["b", "c", "d"]);
		let options = PostOptions { min_words_count: 3, ..PostOptions::default() };
		for _ in 0..20 {
			assert_eq!(generate_text(&mut chain, &mut rng(), &options).unwrap(), "b c d");
		}
	}

	#[test]
	fn zero_minimum_still_rejects_empty_text() {
		let options = PostOptions { min_words_count: 0, max_attempts: 3, max_words_count: None };
		let err = generate_text(&mut Chain::new(2), &mut rng(), &options).unwrap_err();
		assert!(matches!(err, Error::GenerationExhausted { min_words: 1, .. }));
	}

	#[test]
	fn max_words_truncates() {
		let mut chain = Chain::new(2);
		chain.add_source(&["one", "two", "three", "four"]);
		let options = PostOptions { max_words_count: Some(2), ..PostOptions::default() };
		assert_eq!(generate_text(&mut chain, &mut rng(), &options).unwrap(), "one two");
	}

	#[test]
	fn malformed_model_is_a_decode_error() {
		let store = MemoryStore::with_content(vec![0xff; 3], std::time::SystemTime::now());
		let mut client = RecordableClient::default();
		let err = generate_and_post(&mut client, &store, &mut rng(), &PostOptions::default()).unwrap_err();
		assert!(matches!(err, Error::Decode { .. }));
	}
}
