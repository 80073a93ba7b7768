//! Markov chain text bot.
//!
//! This crate reads short posts, tokenizes them, learns a fixed-order Markov
//! chain from them and publishes new posts sampled from that chain:
//! - An arena-backed trie chain with weighted generation (`model`)
//! - A `postcard` encoding of the chain for persistence
//! - An adapter turning paginated sources into item iterators (`chunk`)
//! - Collaborators: analyzers, blog clients, byte stores, configuration
//! - The build / post / run handlers tying everything together

/// Markov chain model and its encoding.
pub mod model;

/// Paginated source → item iterator adapter.
pub mod chunk;

/// Text normalization and token joining.
pub mod text;

/// Tokenizers turning raw posts into sentences.
pub mod analyzer;

/// Sources of posts and publishers.
pub mod blog;

/// Byte-stream stores holding the encoded chain.
pub mod store;

/// JSON configuration of the bot.
pub mod config;

/// Build, post and run handlers.
pub mod handler;

/// Error type shared by the whole crate.
pub mod error;

/// File helpers.
///
/// Not exposed
pub(crate) mod io;

pub use error::{Error, Result};
pub use model::Chain;
