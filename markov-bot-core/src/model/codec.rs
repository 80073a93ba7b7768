use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use super::chain::{Chain, MAX_ORDER};
use super::node::{Node, NodeId, ROOT};
use crate::error::{Error, Result};

/// Tree view of a chain, as returned by [`Chain::to_document`].
///
/// The view does not depend on the order in which nodes were allocated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainDocument {
	pub order: usize,
	pub root: NodeDocument,
}

/// Tree view of a trie node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeDocument {
	pub children: BTreeMap<String, NodeDocument>,
	pub occurrences: u64,
}

/// Wire form of a chain: the trie nodes in pre-order, each followed by its
/// subtree. The root comes first with an empty token.
#[derive(Serialize, Deserialize, Debug)]
struct EncodedChain {
	order: usize,
	nodes: Vec<EncodedNode>,
}

#[derive(Serialize, Deserialize, Debug)]
struct EncodedNode {
	/// Token on the edge from the parent.
	token: String,
	occurrences: u64,
	/// Number of children, encoded right after this node.
	children: usize,
}

impl Chain {
	/// Encodes the chain with `postcard`.
	///
	/// # Errors
	/// Returns [`Error::Encode`] if the encoder fails.
	pub fn dump(&self) -> Result<Vec<u8>> {
		let mut nodes = Vec::with_capacity(self.nodes.len());
		self.encode_node(ROOT, String::new(), &mut nodes);
		postcard::to_stdvec(&EncodedChain { order: self.order(), nodes }).map_err(Error::Encode)
	}

	fn encode_node(&self, id: NodeId, token: String, out: &mut Vec<EncodedNode>) {
		let node = &self.nodes[id];
		out.push(EncodedNode {
			token,
			occurrences: node.occurrences,
			children: node.children.len(),
		});
		for (token, &child) in &node.children {
			self.encode_node(child, token.clone(), out);
		}
	}

	/// Decodes a chain written by [`Chain::dump`].
	///
	/// Nodes are rebuilt with an explicit stack, so a hostile input cannot
	/// exhaust the call stack.
	///
	/// # Errors
	/// Returns [`Error::Decode`] if the bytes are truncated, malformed or
	/// followed by trailing data, or if they describe something no chain can be:
	/// an order outside `1..=MAX_ORDER`, a node deeper than `order + 1`, two
	/// edges with the same token, or siblings whose occurrences add up past
	/// `u64::MAX`.
	pub fn load(bytes: &[u8]) -> Result<Self> {
		let (encoded, rest): (EncodedChain, _) = postcard::take_from_bytes(bytes)?;
		if !rest.is_empty() {
			return Err(Error::malformed(format!("{} trailing bytes", rest.len())));
		}
		encoded.into_chain()
	}

	/// Returns the chain as a tree.
	pub fn to_document(&self) -> ChainDocument {
		ChainDocument {
			order: self.order(),
			root: self.node_document(ROOT),
		}
	}

	fn node_document(&self, id: NodeId) -> NodeDocument {
		let node = &self.nodes[id];
		NodeDocument {
			children: node
				.children
				.iter()
				.map(|(token, &child)| (token.clone(), self.node_document(child)))
				.collect(),
			occurrences: node.occurrences,
		}
	}
}

impl EncodedChain {
	fn into_chain(self) -> Result<Chain> {
		let order = self.order;
		if !(1..=MAX_ORDER).contains(&order) {
			return Err(Error::malformed(format!("order {order} outside 1..={MAX_ORDER}")));
		}

		let mut encoded = self.nodes.into_iter();
		let root = encoded.next().ok_or_else(|| Error::malformed("missing root node"))?;
		if root.occurrences != 0 {
			return Err(Error::malformed("root node has occurrences"));
		}

		let mut nodes = vec![Node::default()];
		// (arena index, children left to read, occurrences of the children read so far)
		let mut pending: Vec<(NodeId, usize, u64)> = vec![(ROOT, root.children, 0)];
		while let Some(top) = pending.last_mut() {
			if top.1 == 0 {
				pending.pop();
				continue;
			}
			top.1 -= 1;
			let parent = top.0;
			let node = encoded.next().ok_or_else(|| Error::malformed("node list ends early"))?;
			top.2 = top
				.2
				.checked_add(node.occurrences)
				.ok_or_else(|| Error::malformed("sibling occurrences overflow"))?;

			// The new node sits `pending.len()` edges below the root.
			if pending.len() > order + 1 {
				return Err(Error::malformed(format!("node deeper than {} edges", order + 1)));
			}

			let id = nodes.len();
			match nodes[parent].children.entry(node.token) {
				Entry::Occupied(entry) => {
					return Err(Error::malformed(format!("duplicate token {:?}", entry.key())));
				}
				Entry::Vacant(entry) => {
					entry.insert(id);
				}
			}
			nodes.push(Node {
				children: BTreeMap::new(),
				occurrences: node.occurrences,
			});
			pending.push((id, node.children, 0));
		}

		if encoded.next().is_some() {
			return Err(Error::malformed("nodes left after the root subtree"));
		}
		Ok(Chain::with_nodes(order, nodes))
	}
}

/// Two chains are equal when they have the same order, the same trie shape and
/// the same counts, wherever their nodes sit in the arena.
impl PartialEq for Chain {
	fn eq(&self, other: &Self) -> bool {
		self.to_document() == other.to_document()
	}
}

impl Eq for Chain {}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn trained() -> Chain {
		let mut chain = Chain::new(2);
		chain.add_source(&["A", "B", "C"]);
		chain.add_source(&["A", "B", "Z"]);
		chain
	}

	#[test]
	fn dump_then_load_keeps_branches() {
		let restored = Chain::load(&trained().dump().unwrap()).unwrap();
		assert_eq!(restored, trained());
		assert_eq!(restored.order(), 2);

		let state = restored.lookup(&["A", "B"]).unwrap();
		let children: Vec<_> = restored.nodes[state]
			.children
			.iter()
			.map(|(token, &id)| (token.as_str(), restored.nodes[id].occurrences))
			.collect();
		assert_eq!(children, vec![("C", 1), ("Z", 1)]);
	}

	#[test]
	fn dump_then_load_keeps_placeholders() {
		let mut chain = trained();
		// Looking up an unseen state adds zero-count nodes.
		chain.find_or_add_tail(&["never", "seen"]);
		assert!(chain.node_count() > trained().node_count());

		let restored = Chain::load(&chain.dump().unwrap()).unwrap();
		assert_eq!(restored.node_count(), chain.node_count());
		assert_eq!(restored, chain);
		assert_ne!(restored, trained());
	}

	#[test]
	fn empty_chain_round_trips() {
		let chain = Chain::new(4);
		let restored = Chain::load(&chain.dump().unwrap()).unwrap();
		assert_eq!(restored, chain);
		assert_eq!(restored.order(), 4);
		assert!(!restored.is_trained());
	}

	#[test]
	fn restored_chain_generates_the_trained_sequence() {
		let mut chain = Chain::new(3);
		chain.add_source(&["A", "B", "C"]);
		let mut restored = Chain::load(&chain.dump().unwrap()).unwrap();
		assert_eq!(restored.generate(&mut StdRng::seed_from_u64(9)), vec!["A", "B", "C"]);
	}

	#[test]
	fn equality_ignores_arena_layout() {
		let mut left = Chain::new(1);
		left.add_source(&["x"]);
		left.add_source(&["y"]);
		let mut right = Chain::new(1);
		right.add_source(&["y"]);
		right.add_source(&["x"]);
		assert_eq!(left, right);
	}

	#[test]
	fn truncated_bytes_fail_to_decode() {
		let bytes = trained().dump().unwrap();
		let err = Chain::load(&bytes[..bytes.len() / 2]).unwrap_err();
		assert!(matches!(err, Error::Decode { .. }));
	}

	#[test]
	fn trailing_bytes_fail_to_decode() {
		let mut bytes = trained().dump().unwrap();
		bytes.push(0);
		assert!(matches!(Chain::load(&bytes), Err(Error::Decode { .. })));
	}

	fn node(token: &str, occurrences: u64, children: usize) -> EncodedNode {
		EncodedNode { token: token.to_owned(), occurrences, children }
	}

	fn encode(order: usize, nodes: Vec<EncodedNode>) -> Vec<u8> {
		postcard::to_stdvec(&EncodedChain { order, nodes }).unwrap()
	}

	fn shape_error(bytes: &[u8]) -> String {
		match Chain::load(bytes) {
			Err(Error::Decode { context, source: None }) => context,
			other => panic!("expected a shape error, got {other:?}"),
		}
	}

	#[test]
	fn hand_encoded_chain_loads() {
		let bytes = encode(1, vec![node("", 0, 1), node("a", 0, 1), node("b", 2, 0)]);
		let chain = Chain::load(&bytes).unwrap();
		assert_eq!(chain.node_count(), 3);
		assert_eq!(chain.to_document().root.children["a"].children["b"].occurrences, 2);
		assert_eq!(Chain::load(&chain.dump().unwrap()).unwrap(), chain);
	}

	#[test]
	fn order_out_of_range_fails_to_decode() {
		for order in [0, MAX_ORDER + 1, usize::MAX] {
			let message = shape_error(&encode(order, vec![node("", 0, 0)]));
			assert!(message.contains("order"), "{message}");
		}
		assert_eq!(Chain::load(&encode(MAX_ORDER, vec![node("", 0, 0)])).unwrap().order(), MAX_ORDER);
	}

	#[test]
	fn deep_nesting_fails_to_decode() {
		// A single path far deeper than any state.
		let depth = 200_000;
		let mut nodes: Vec<EncodedNode> = (0..depth).map(|_| node("a", 0, 1)).collect();
		nodes.insert(0, node("", 0, 1));
		nodes.push(node("a", 1, 0));
		let message = shape_error(&encode(1, nodes));
		assert!(message.contains("deeper"), "{message}");
	}

	#[test]
	fn one_level_too_deep_fails_to_decode() {
		let within = vec![node("", 0, 1), node("x", 0, 1), node("y", 0, 1), node("z", 1, 0)];
		assert!(Chain::load(&encode(2, within)).is_ok());

		let beyond = vec![
			node("", 0, 1),
			node("x", 0, 1),
			node("y", 0, 1),
			node("z", 0, 1),
			node("w", 1, 0),
		];
		assert!(shape_error(&encode(2, beyond)).contains("deeper"));
	}

	#[test]
	fn overflowing_occurrences_fail_to_decode() {
		let bytes = encode(1, vec![node("", 0, 1), node("a", 0, 2), node("b", u64::MAX, 0), node("c", 1, 0)]);
		assert!(shape_error(&bytes).contains("overflow"));
	}

	#[test]
	fn inconsistent_node_lists_fail_to_decode() {
		assert!(shape_error(&encode(1, Vec::new())).contains("root"));
		assert!(shape_error(&encode(1, vec![node("", 3, 0)])).contains("root"));
		assert!(shape_error(&encode(1, vec![node("", 0, 2), node("a", 1, 0)])).contains("early"));
		assert!(shape_error(&encode(1, vec![node("", 0, 0), node("a", 1, 0)])).contains("left"));
		assert!(shape_error(&encode(1, vec![node("", 0, 2), node("a", 1, 0), node("a", 1, 0)])).contains("duplicate"));
	}

	#[test]
	fn invalid_encoding_keeps_its_source() {
		let err = Chain::load(&[0x02, 0xff, 0xff, 0xff]).unwrap_err();
		assert!(std::error::Error::source(&err).is_some());
	}

	#[test]
	fn garbage_fails_to_decode() {
		assert!(matches!(Chain::load(&[]), Err(Error::Decode { .. })));
		assert!(matches!(Chain::load(&[0x02, 0xff, 0xff, 0xff]), Err(Error::Decode { .. })));
	}
}
