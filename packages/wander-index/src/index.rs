use std::collections::{BTreeMap, BTreeSet};

use wander_domain::{LanguageCode, NormalizedText};

use crate::{TagCatalog, Trie};

/// One independent [`Trie`] per language.
#[derive(Debug, Clone, Default)]
pub struct MultilingualIndex {
	tries: BTreeMap<LanguageCode, Trie>,
}
impl MultilingualIndex {
	/// Builds a trie for every language the catalog has synonyms in.
	pub fn from_catalog(catalog: &TagCatalog) -> Self {
		let mut index = Self::default();

		for language in catalog.languages() {
			index.build(language.clone(), catalog.all_synonyms(language));
		}

		tracing::debug!(
			languages = index.tries.len(),
			entries = index.tries.values().map(Trie::len).sum::<usize>(),
			"Trie index built."
		);

		index
	}

	/// Constructs a fresh trie for `language`, replacing any existing one.
	pub fn build<I, S, T>(&mut self, language: LanguageCode, pairs: I)
	where
		I: IntoIterator<Item = (S, T)>,
		S: AsRef<str>,
		T: AsRef<str>,
	{
		self.tries.insert(language, Trie::build(pairs));
	}

	pub fn trie(&self, language: &LanguageCode) -> Option<&Trie> {
		self.tries.get(language)
	}

	/// Exact hits in one language. A language without a trie yields nothing.
	pub fn lookup_exact(&self, language: &LanguageCode, text: &NormalizedText) -> BTreeSet<&str> {
		self.trie(language).map(|trie| trie.lookup_exact(text)).unwrap_or_default()
	}

	/// Prefix hits in one language. A language without a trie yields nothing.
	pub fn lookup_prefix(&self, language: &LanguageCode, text: &NormalizedText) -> BTreeSet<&str> {
		self.trie(language).map(|trie| trie.lookup_prefix(text)).unwrap_or_default()
	}

	pub fn languages(&self) -> impl Iterator<Item = &LanguageCode> {
		self.tries.keys()
	}

	pub fn tries(&self) -> impl Iterator<Item = (&LanguageCode, &Trie)> {
		self.tries.iter()
	}

	pub fn is_empty(&self) -> bool {
		self.tries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use wander_domain::NormalizedText;
	use wander_testkit::{lang, tag};

	use super::MultilingualIndex;
	use crate::TagCatalog;

	fn catalog() -> TagCatalog {
		TagCatalog::build(vec![
			tag("mountain", "scenery", &[("ja", "山"), ("en", "mountain")]),
			tag("mountain_zh", "scenery", &[("zh", "山")]),
		])
		.expect("valid catalog")
	}

	#[test]
	fn languages_do_not_leak_into_each_other() {
		let index = MultilingualIndex::from_catalog(&catalog());
		let text = NormalizedText::new("山");

		assert_eq!(index.lookup_exact(&lang("ja"), &text).into_iter().collect::<Vec<_>>(), [
			"mountain"
		]);
		assert_eq!(index.lookup_exact(&lang("zh"), &text).into_iter().collect::<Vec<_>>(), [
			"mountain_zh"
		]);
		assert!(index.lookup_exact(&lang("en"), &text).is_empty());
	}

	#[test]
	fn missing_language_resolves_to_nothing() {
		let index = MultilingualIndex::from_catalog(&catalog());

		assert!(index.trie(&lang("fr")).is_none());
		assert!(index.lookup_prefix(&lang("fr"), &NormalizedText::new("m")).is_empty());
	}

	#[test]
	fn build_replaces_existing_trie() {
		let mut index = MultilingualIndex::from_catalog(&catalog());

		index.build(lang("en"), [("peak", "mountain")]);

		assert!(index.lookup_exact(&lang("en"), &NormalizedText::new("mountain")).is_empty());
		assert!(index.lookup_exact(&lang("en"), &NormalizedText::new("peak")).contains("mountain"));
		assert_eq!(index.languages().map(|l| l.as_str()).collect::<Vec<_>>(), ["en", "ja", "zh"]);
	}
}
