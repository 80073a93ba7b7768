use std::time::SystemTime;

use markov_bot_core::analyzer::WhitespaceAnalyzer;
use markov_bot_core::blog::{BlogClient, RecordableClient};
use markov_bot_core::config::{BotConfig, PlatformConfig};
use markov_bot_core::handler::{self, BuildOptions, PostOptions};
use markov_bot_core::store::{FileStore, MemoryStore, PersistentStore};
use markov_bot_core::{Chain, Error};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn empty_timeline_fails_with_generation_exhausted() {
	let mut fetch = RecordableClient::new([""]);
	let mut post = RecordableClient::default();
	let mut store = MemoryStore::new();

	handler::build_chain(&mut fetch, &WhitespaceAnalyzer, &mut store, &BuildOptions::default()).unwrap();
	let err = handler::generate_and_post(&mut post, &store, &mut StdRng::seed_from_u64(1), &PostOptions::default())
		.unwrap_err();

	assert!(matches!(err, Error::GenerationExhausted { .. }));
	assert!(post.posted().is_empty());
}

#[test]
fn file_timeline_to_file_output() {
	let dir = tempfile::tempdir().unwrap();
	let timeline = dir.path().join("timeline.txt");
	let output = dir.path().join("posted.txt");
	let model = dir.path().join("model.bin");
	std::fs::write(&timeline, "the cat sleeps\nthe dog sleeps\na cat eats fish\n").unwrap();

	let config = BotConfig::from_json(&format!(
		r#"{{
			"input": {{"platform": "file", "path": {timeline:?}, "chunk_size": 2}},
			"output": {{"platform": "file", "path": {output:?}}},
			"state_size": 1
		}}"#
	))
	.unwrap();
	assert!(matches!(config.input, PlatformConfig::File { .. }));

	let mut fetch = config.input.client();
	let mut post = config.output.client();
	let mut store = FileStore::new(&model);
	let mut rng = StdRng::seed_from_u64(2024);

	let text = handler::run(
		&config.chain,
		fetch.as_mut(),
		post.as_mut(),
		&WhitespaceAnalyzer,
		&mut store,
		&mut rng,
		SystemTime::now(),
	)
	.unwrap();

	assert_eq!(std::fs::read_to_string(&output).unwrap(), format!("{text}\n"));
	let words: Vec<&str> = text.split(' ').collect();
	assert!(!words.is_empty());
	for word in words {
		assert!(["the", "a", "cat", "dog", "sleeps", "eats", "fish"].contains(&word), "{word}");
	}

	let chain = Chain::load(&store.load().unwrap()).unwrap();
	assert_eq!(chain.order(), 1);
	assert!(chain.is_trained());
}

#[test]
fn shared_prefix_survives_a_store_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let mut store = FileStore::new(dir.path().join("model.bin"));

	let mut chain = Chain::new(2);
	chain.add_source(&["A", "B", "C"]);
	chain.add_source(&["A", "B", "Z"]);
	store.save(&chain.dump().unwrap()).unwrap();

	let restored = handler::load_chain(&store).unwrap();
	assert_eq!(restored, chain);

	let document = restored.to_document();
	let after_ab = &document.root.children["A"].children["B"].children;
	assert_eq!(after_ab.len(), 2);
	assert_eq!(after_ab["C"].occurrences, 1);
	assert_eq!(after_ab["Z"].occurrences, 1);
}

#[test]
fn recorded_posts_accumulate() {
	let mut chain = Chain::new(3);
	chain.add_source(&["A", "B", "C"]);
	let store = MemoryStore::with_content(chain.dump().unwrap(), SystemTime::now());
	let mut post = RecordableClient::default();
	let mut rng = StdRng::seed_from_u64(3);

	for _ in 0..3 {
		handler::generate_and_post(&mut post, &store, &mut rng, &PostOptions::default()).unwrap();
	}
	assert_eq!(post.posted(), ["A B C", "A B C", "A B C"]);

	// The client trait is object safe.
	let client: &mut dyn BlogClient = &mut post;
	client.create_post("manual").unwrap();
	assert_eq!(post.posted().len(), 4);
}
