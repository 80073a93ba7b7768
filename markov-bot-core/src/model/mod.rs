//! Statistical sequence model of the bot.
//!
//! This module provides:
//! - A fixed-order Markov chain stored as an arena-backed trie (`Chain`)
//! - Weighted sampling of new token sequences
//! - The byte encoding used to persist a chain

/// Markov chain over string tokens: training and generation.
pub mod chain;

/// `postcard` encoding of a chain and structural equality.
///
/// Nodes are written flat in pre-order with their child counts, and read back
/// with bounded depth.
pub mod codec;

/// Trie node storage and weighted candidate selection.
///
/// Not exposed.
mod node;

pub use chain::{BOS, Chain, EOS, MAX_ORDER};
pub use codec::{ChainDocument, NodeDocument};
