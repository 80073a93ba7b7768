use std::collections::BTreeMap;

use rand::Rng;

/// Index of a node inside the chain arena.
pub(crate) type NodeId = usize;

/// The arena slot of the root node.
pub(crate) const ROOT: NodeId = 0;

/// A node of the chain trie.
///
/// A node does not own its children directly: it maps each token to the arena
/// index of the child reached through that token. Every index appears in
/// exactly one parent map, so the arena still forms a tree.
///
/// # Invariants
/// - `occurrences` only grows, and only while training
/// - the root keeps `occurrences == 0`
#[derive(Clone, Debug, Default)]
pub(crate) struct Node {
	/// Outgoing edges keyed by token. Ordered so that sampling with a seeded
	/// generator is reproducible.
	pub(crate) children: BTreeMap<String, NodeId>,
	/// How many times this node was observed as the next token of its parent state.
	pub(crate) occurrences: u64,
}

/// Candidate continuations of a state, ready for weighted sampling.
///
/// `cumulative[i]` is the sum of the occurrences of `tokens[..=i]`.
#[derive(Debug)]
pub(crate) struct Candidates<'a> {
	tokens: Vec<&'a str>,
	cumulative: Vec<u64>,
}

impl<'a> Candidates<'a> {
	/// Collects the children of `node` with their running occurrence total.
	pub(crate) fn collect(nodes: &'a [Node], node: NodeId) -> Self {
		let children = &nodes[node].children;
		let mut tokens = Vec::with_capacity(children.len());
		let mut cumulative = Vec::with_capacity(children.len());
		let mut sum: u64 = 0;
		for (token, &child) in children {
			// Decoding rejects sibling totals above `u64::MAX`; saturating keeps
			// the sums monotonic for chains trained past that.
			sum = sum.saturating_add(nodes[child].occurrences);
			tokens.push(token.as_str());
			cumulative.push(sum);
		}
		Self { tokens, cumulative }
	}

	/// Total weight of all candidates.
	pub(crate) fn total(&self) -> u64 {
		self.cumulative.last().copied().unwrap_or(0)
	}

	/// Picks a token with probability proportional to its occurrences.
	///
	/// Returns `None` when there is nothing to pick from (no children, or only
	/// zero-weight placeholders).
	pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'a str> {
		let total = self.total();
		if total == 0 {
			return None;
		}
		let r = rng.random_range(0..total);
		// First candidate whose running total exceeds `r`.
		let index = self.cumulative.partition_point(|&sum| sum <= r);
		self.tokens.get(index).copied()
	}
}
