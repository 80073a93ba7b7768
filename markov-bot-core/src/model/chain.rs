use rand::Rng;

use super::node::{Candidates, Node, NodeId, ROOT};

/// Token padding the beginning of every trained sequence.
pub const BOS: &str = "__BOS__";

/// Token terminating every trained sequence.
pub const EOS: &str = "__EOS__";

/// Largest order a chain can have.
///
/// A state is a path of `order` edges, so the order also bounds the depth of
/// the trie, and with it the depth of any encoded chain.
pub const MAX_ORDER: usize = 64;

/// Markov chain of fixed order over string tokens.
///
/// The chain is a trie: a path of `order` edges from the root spells a state
/// (the last `order` tokens), and the children of that state's node are the
/// tokens observed right after it, weighted by their occurrence counts.
///
/// Nodes live in an arena addressed by index, the root being slot 0.
///
/// ## Responsibilities:
/// - Record (state → next token) transitions from tokenized sentences
/// - Sample new token sequences proportionally to the recorded counts
///
/// ## Invariants
/// - `1 <= order <= MAX_ORDER` and never changes
/// - No node sits deeper than `order + 1` edges below the root
/// - Each arena slot other than the root has exactly one parent edge
/// - Counts are only incremented, and only by `add_source`
#[derive(Clone, Debug)]
pub struct Chain {
	/// Number of preceding tokens used as the state.
	order: usize,
	/// Trie nodes, root first.
	pub(crate) nodes: Vec<Node>,
}

impl Chain {
	/// Creates an empty chain of the given order.
	///
	/// The order is clamped to `1..=MAX_ORDER`: a chain always looks at least
	/// one token back.
	pub fn new(order: usize) -> Self {
		Self::with_nodes(order.clamp(1, MAX_ORDER), vec![Node::default()])
	}

	pub(crate) fn with_nodes(order: usize, nodes: Vec<Node>) -> Self {
		Self { order, nodes }
	}

	/// Returns the order (state size) of the chain.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of trie nodes, root included.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Returns `true` once at least one transition has been recorded.
	pub fn is_trained(&self) -> bool {
		self.nodes.iter().any(|node| node.occurrences > 0)
	}

	/// Adds a single tokenized sentence to the chain.
	///
	/// The sentence is padded with `order` [`BOS`] tokens and one [`EOS`]; empty
	/// tokens are dropped. Every window of `order` tokens then records the
	/// token that follows it.
	///
	/// # Notes
	/// - A sentence without any non-empty token is ignored, so that empty
	///   inputs do not inflate the `BOS → EOS` transition.
	pub fn add_source<S: AsRef<str>>(&mut self, source: &[S]) {
		let run = self.make_run(source);

		// Only padding: nothing to learn.
		if run.len() == self.order + 1 {
			return;
		}

		for window in run.windows(self.order + 1) {
			let (state, next) = window.split_at(self.order);
			let tail = self.find_or_add_tail(state);
			let follow = self.find_or_add_child(tail, next[0]);
			self.nodes[follow].occurrences = self.nodes[follow].occurrences.saturating_add(1);
		}
	}

	/// Generates one sequence from the chain.
	///
	/// Starting from the all-[`BOS`] state, tokens are sampled until [`EOS`]
	/// comes out. The returned sequence carries neither padding nor [`EOS`].
	///
	/// Returns an empty sequence if a reached state has no known continuation,
	/// which is always the case for an untrained chain.
	///
	/// # Notes
	/// - Looking up a state that was never trained inserts empty nodes for it.
	///   They carry no weight and never change what can be generated.
	/// - The loop has no length bound. See [`Chain::generate_capped`].
	pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<String> {
		self.generate_inner(rng, None)
	}

	/// Same as [`Chain::generate`], but stops once `max_tokens` tokens have been
	/// produced and returns them as they are.
	pub fn generate_capped<R: Rng + ?Sized>(&mut self, rng: &mut R, max_tokens: usize) -> Vec<String> {
		self.generate_inner(rng, Some(max_tokens))
	}

	fn generate_inner<R: Rng + ?Sized>(&mut self, rng: &mut R, limit: Option<usize>) -> Vec<String> {
		let mut buf: Vec<String> = vec![BOS.to_owned(); self.order];

		loop {
			if limit.is_some_and(|limit| buf.len() - self.order >= limit) {
				break;
			}

			let tail = self.find_or_add_tail(&buf[buf.len() - self.order..]);
			let candidates = Candidates::collect(&self.nodes, tail);
			let elected = match candidates.sample(rng) {
				Some(token) => token,
				// No continuation known for this state
				None => return Vec::new(),
			};
			if elected == EOS {
				break;
			}
			let elected = elected.to_owned();
			buf.push(elected);
		}

		buf.split_off(self.order)
	}

	/// Builds `[BOS * order, non-empty tokens of source, EOS]`.
	fn make_run<'a, S: AsRef<str>>(&self, source: &'a [S]) -> Vec<&'a str> {
		let mut run = Vec::with_capacity(source.len() + self.order + 1);
		run.extend(std::iter::repeat_n(BOS, self.order));
		run.extend(source.iter().map(AsRef::as_ref).filter(|token| !token.is_empty()));
		run.push(EOS);
		run
	}

	/// Walks the trie along `state`, creating the missing nodes, and returns the last one.
	pub(crate) fn find_or_add_tail<S: AsRef<str>>(&mut self, state: &[S]) -> NodeId {
		state
			.iter()
			.fold(ROOT, |node, token| self.find_or_add_child(node, token.as_ref()))
	}

	fn find_or_add_child(&mut self, parent: NodeId, token: &str) -> NodeId {
		if let Some(&child) = self.nodes[parent].children.get(token) {
			return child;
		}
		let child = self.nodes.len();
		self.nodes.push(Node::default());
		self.nodes[parent].children.insert(token.to_owned(), child);
		child
	}

	/// Arena index of the node reached by following `path` from the root, if any.
	#[cfg(test)]
	pub(crate) fn lookup(&self, path: &[&str]) -> Option<NodeId> {
		path.iter()
			.try_fold(ROOT, |node, token| self.nodes[node].children.get(*token).copied())
	}
}
