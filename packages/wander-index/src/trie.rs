use std::collections::{BTreeSet, HashMap};

use wander_domain::NormalizedText;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
	children: HashMap<char, usize>,
	/// Tags whose synonym ends exactly here. A set so that an ambiguous source still decodes;
	/// the catalog keeps it a singleton.
	terminal_tag_ids: BTreeSet<String>,
}

/// Character-level prefix tree over normalized synonyms of one language.
///
/// Nodes live in a single arena vector and refer to children by index. The structure is built
/// once from a complete synonym list and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Trie {
	nodes: Vec<TrieNode>,
	entries: usize,
}
impl Trie {
	/// Builds a trie from `(synonym, tag_id)` pairs. Synonyms are normalized here; pairs whose
	/// synonym folds to the empty string are skipped.
	pub fn build<I, S, T>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (S, T)>,
		S: AsRef<str>,
		T: AsRef<str>,
	{
		let mut trie = Self::default();

		for (synonym, tag_id) in pairs {
			let text = NormalizedText::new(synonym.as_ref());

			if text.is_empty() {
				continue;
			}

			trie.insert(&text, tag_id.as_ref());
		}

		trie
	}

	/// Tags whose synonym equals `text`.
	pub fn lookup_exact(&self, text: &NormalizedText) -> BTreeSet<&str> {
		self.walk(text)
			.map(|idx| self.nodes[idx].terminal_tag_ids.iter().map(String::as_str).collect())
			.unwrap_or_default()
	}

	/// Tags with at least one synonym starting with `text`, exact matches included.
	///
	/// The empty text is a prefix of everything and returns every tag in the trie; callers
	/// that take raw user input are expected to reject it first.
	pub fn lookup_prefix(&self, text: &NormalizedText) -> BTreeSet<&str> {
		let Some(start) = self.walk(text) else { return BTreeSet::new() };
		let mut out = BTreeSet::new();
		let mut stack = vec![start];

		while let Some(idx) = stack.pop() {
			let node = &self.nodes[idx];

			out.extend(node.terminal_tag_ids.iter().map(String::as_str));
			stack.extend(node.children.values().copied());
		}

		out
	}

	/// Number of distinct `(synonym, tag_id)` entries.
	pub fn len(&self) -> usize {
		self.entries
	}

	pub fn is_empty(&self) -> bool {
		self.entries == 0
	}

	#[cfg(test)]
	fn node_count(&self) -> usize {
		self.nodes.len()
	}

	fn insert(&mut self, text: &NormalizedText, tag_id: &str) {
		let mut current = ROOT;

		for ch in text.as_str().chars() {
			current = match self.nodes[current].children.get(&ch) {
				Some(&child) => child,
				None => {
					let child = self.nodes.len();

					self.nodes.push(TrieNode::default());
					self.nodes[current].children.insert(ch, child);

					child
				},
			};
		}

		if self.nodes[current].terminal_tag_ids.insert(tag_id.to_string()) {
			self.entries += 1;
		}
	}

	fn walk(&self, text: &NormalizedText) -> Option<usize> {
		let mut current = ROOT;

		for ch in text.as_str().chars() {
			current = *self.nodes[current].children.get(&ch)?;
		}

		Some(current)
	}
}

impl Default for Trie {
	fn default() -> Self {
		Self { nodes: vec![TrieNode::default()], entries: 0 }
	}
}
