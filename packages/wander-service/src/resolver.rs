//! Phrase to tag resolution over a [`MultilingualIndex`].
//!
//! Each phrase is folded with the same normalization used when indexing, then looked up per
//! language: exact hits score `1.0`, otherwise prefix hits score the configured prefix
//! confidence. Languages contribute independently and every tag keeps its best confidence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wander_domain::{LanguageCode, NormalizedText, detect_language};
use wander_index::MultilingualIndex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPhrase {
	pub text: String,
	/// Restricts lookup to one language trie.
	#[serde(default)]
	pub language: Option<String>,
}
impl QueryPhrase {
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into(), language: None }
	}

	pub fn in_language(text: impl Into<String>, language: impl Into<String>) -> Self {
		Self { text: text.into(), language: Some(language.into()) }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
	Exact,
	Prefix,
	Unresolved,
	/// The language hint is not a well-formed language code.
	InvalidLanguage,
}

/// Per-phrase diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseResolution {
	pub text: String,
	pub normalized: String,
	pub language: Option<String>,
	pub detected_language: Option<String>,
	pub outcome: MatchOutcome,
	pub tag_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
	/// Tag id to the best confidence any phrase produced for it.
	pub resolved_tags: BTreeMap<String, f32>,
	/// Phrases that matched nothing, in input order.
	pub unresolved_phrases: Vec<String>,
	pub phrases: Vec<PhraseResolution>,
}

pub struct Resolver<'a> {
	index: &'a MultilingualIndex,
	prefix_confidence: f32,
	auto_detect: bool,
}
impl<'a> Resolver<'a> {
	pub fn new(index: &'a MultilingualIndex, prefix_confidence: f32) -> Self {
		Self { index, prefix_confidence, auto_detect: false }
	}

	/// Resolves unhinted phrases against their detected language first.
	pub fn with_auto_detect(mut self, enabled: bool) -> Self {
		self.auto_detect = enabled;

		self
	}

	pub fn resolve(&self, phrases: &[QueryPhrase]) -> Resolution {
		let mut resolution = Resolution::default();

		for phrase in phrases {
			let (diagnostics, matches) = self.resolve_phrase(phrase);

			if matches.is_empty() {
				resolution.unresolved_phrases.push(phrase.text.clone());
			}

			for (tag_id, confidence) in matches {
				merge_max(&mut resolution.resolved_tags, tag_id, confidence);
			}

			resolution.phrases.push(diagnostics);
		}

		resolution
	}

	fn resolve_phrase(&self, phrase: &QueryPhrase) -> (PhraseResolution, BTreeMap<String, f32>) {
		let normalized = NormalizedText::new(&phrase.text);
		let mut diagnostics = PhraseResolution {
			text: phrase.text.clone(),
			normalized: normalized.as_str().to_string(),
			language: None,
			detected_language: None,
			outcome: MatchOutcome::Unresolved,
			tag_ids: Vec::new(),
		};

		if let Some(raw) = phrase.language.as_deref() {
			let Some(language) = LanguageCode::parse(raw) else {
				diagnostics.language = Some(raw.to_string());
				diagnostics.outcome = MatchOutcome::InvalidLanguage;

				return (diagnostics, BTreeMap::new());
			};

			diagnostics.language = Some(language.to_string());

			if normalized.is_empty() {
				return (diagnostics, BTreeMap::new());
			}

			let (outcome, matches) = self.lookup(&normalized, [&language]);

			return finish(diagnostics, outcome, matches);
		}

		if normalized.is_empty() {
			return (diagnostics, BTreeMap::new());
		}

		if self.auto_detect
			&& let Some(detected) = detect_language(&phrase.text)
		{
			diagnostics.detected_language = Some(detected.to_string());

			if self.index.trie(&detected).is_some() {
				let (outcome, matches) = self.lookup(&normalized, [&detected]);

				if !matches.is_empty() {
					return finish(diagnostics, outcome, matches);
				}
			}
		}

		let (outcome, matches) = self.lookup(&normalized, self.index.languages());

		finish(diagnostics, outcome, matches)
	}

	fn lookup<'l, I>(
		&self,
		text: &NormalizedText,
		languages: I,
	) -> (MatchOutcome, BTreeMap<String, f32>)
	where
		I: IntoIterator<Item = &'l LanguageCode>,
	{
		let mut matches = BTreeMap::new();
		let mut outcome = MatchOutcome::Unresolved;

		for language in languages {
			let exact = self.index.lookup_exact(language, text);

			if !exact.is_empty() {
				outcome = MatchOutcome::Exact;

				for tag_id in exact {
					merge_max(&mut matches, tag_id.to_string(), 1.0);
				}

				continue;
			}

			let prefix = self.index.lookup_prefix(language, text);

			if !prefix.is_empty() && outcome == MatchOutcome::Unresolved {
				outcome = MatchOutcome::Prefix;
			}

			for tag_id in prefix {
				merge_max(&mut matches, tag_id.to_string(), self.prefix_confidence);
			}
		}

		(outcome, matches)
	}
}

fn finish(
	mut diagnostics: PhraseResolution,
	outcome: MatchOutcome,
	matches: BTreeMap<String, f32>,
) -> (PhraseResolution, BTreeMap<String, f32>) {
	diagnostics.outcome = outcome;
	diagnostics.tag_ids = matches.keys().cloned().collect();

	(diagnostics, matches)
}

fn merge_max(target: &mut BTreeMap<String, f32>, tag_id: String, confidence: f32) {
	let slot = target.entry(tag_id).or_insert(confidence);

	if confidence > *slot {
		*slot = confidence;
	}
}

#[cfg(test)]
mod tests {
	use wander_index::{MultilingualIndex, TagCatalog};
	use wander_testkit::tag;

	use super::{MatchOutcome, QueryPhrase, Resolver};

	fn index() -> MultilingualIndex {
		let catalog = TagCatalog::build(vec![
			tag("historic", "culture", &[("en", "historic"), ("en", "heritage"), ("ja", "歴史")]),
			tag("hiking", "activity", &[("en", "hiking")]),
			tag("hot_spring", "activity", &[("ja", "温泉"), ("zh", "温泉"), ("zh", "溫泉")]),
			tag("mountain", "scenery", &[("ja", "山")]),
			tag("mountain_range", "scenery", &[("zh", "山")]),
			tag("history_zh", "culture", &[("zh", "歴史博物館")]),
			tag("onsen_en", "activity", &[("en", "온천")]),
		])
		.expect("valid catalog");

		MultilingualIndex::from_catalog(&catalog)
	}

	#[test]
	fn exact_match_scores_one() {
		let index = index();
		let resolution =
			Resolver::new(&index, 0.6).resolve(&[QueryPhrase::in_language("Heritage", "en")]);

		assert_eq!(resolution.resolved_tags.get("historic"), Some(&1.0));
		assert_eq!(resolution.phrases[0].outcome, MatchOutcome::Exact);
		assert!(resolution.unresolved_phrases.is_empty());
	}

	#[test]
	fn prefix_match_keeps_every_tag_at_prefix_confidence() {
		let index = index();
		let resolution =
			Resolver::new(&index, 0.6).resolve(&[QueryPhrase::in_language("hi", "en")]);

		assert_eq!(resolution.resolved_tags.get("historic"), Some(&0.6));
		assert_eq!(resolution.resolved_tags.get("hiking"), Some(&0.6));
		assert_eq!(resolution.phrases[0].outcome, MatchOutcome::Prefix);
	}

	#[test]
	fn hint_restricts_lookup_to_one_language() {
		let index = index();
		let resolution =
			Resolver::new(&index, 0.6).resolve(&[QueryPhrase::in_language("山", "ja")]);

		assert_eq!(resolution.resolved_tags.keys().collect::<Vec<_>>(), ["mountain"]);
	}

	#[test]
	fn unhinted_phrase_merges_every_language() {
		let index = index();
		let resolution = Resolver::new(&index, 0.6).resolve(&[QueryPhrase::new("山")]);

		assert_eq!(resolution.resolved_tags.get("mountain"), Some(&1.0));
		assert_eq!(resolution.resolved_tags.get("mountain_range"), Some(&1.0));
	}

	#[test]
	fn languages_contribute_independently() {
		let index = index();
		// Exact in ja, prefix-only in zh.
		let resolution = Resolver::new(&index, 0.6).resolve(&[QueryPhrase::new("歴史")]);

		assert_eq!(resolution.resolved_tags.get("historic"), Some(&1.0));
		assert_eq!(resolution.resolved_tags.get("history_zh"), Some(&0.6));
		assert_eq!(resolution.phrases[0].outcome, MatchOutcome::Exact);
	}

	#[test]
	fn repeated_tags_combine_by_max() {
		let index = index();
		let resolution = Resolver::new(&index, 0.6).resolve(&[
			QueryPhrase::in_language("hist", "en"),
			QueryPhrase::in_language("historic", "en"),
			QueryPhrase::in_language("her", "en"),
		]);

		assert_eq!(resolution.resolved_tags.get("historic"), Some(&1.0));
		assert_eq!(resolution.resolved_tags.len(), 1);
	}

	#[test]
	fn blank_and_unknown_phrases_are_unresolved() {
		let index = index();
		let resolution = Resolver::new(&index, 0.6).resolve(&[
			QueryPhrase::new("   "),
			QueryPhrase::in_language("xyz", "en"),
			QueryPhrase::in_language("heritage", "fr"),
		]);

		assert!(resolution.resolved_tags.is_empty());
		assert_eq!(resolution.unresolved_phrases, ["   ", "xyz", "heritage"]);
	}

	#[test]
	fn malformed_hint_is_reported() {
		let index = index();
		let resolution =
			Resolver::new(&index, 0.6).resolve(&[QueryPhrase::in_language("heritage", "??")]);

		assert_eq!(resolution.phrases[0].outcome, MatchOutcome::InvalidLanguage);
		assert_eq!(resolution.unresolved_phrases, ["heritage"]);
	}

	#[test]
	fn empty_phrase_list_resolves_to_nothing() {
		let index = index();
		let resolution = Resolver::new(&index, 0.6).resolve(&[]);

		assert!(resolution.resolved_tags.is_empty());
		assert!(resolution.unresolved_phrases.is_empty());
	}

	#[test]
	fn auto_detect_prefers_the_detected_language() {
		let index = index();
		let resolution =
			Resolver::new(&index, 0.6).with_auto_detect(true).resolve(&[QueryPhrase::new("温泉")]);

		// Han without kana detects as zh.
		assert_eq!(resolution.phrases[0].detected_language.as_deref(), Some("zh"));
		assert_eq!(resolution.resolved_tags.keys().collect::<Vec<_>>(), ["hot_spring"]);
	}

	#[test]
	fn auto_detect_falls_back_to_every_language() {
		let index = index();
		// Detected as ko, which has no trie; the en trie still knows the word.
		let resolution =
			Resolver::new(&index, 0.6).with_auto_detect(true).resolve(&[QueryPhrase::new("온천")]);

		assert_eq!(resolution.phrases[0].detected_language.as_deref(), Some("ko"));
		assert_eq!(resolution.resolved_tags.get("onsen_en"), Some(&1.0));
	}

	#[test]
	fn auto_detect_stops_at_the_detected_language() {
		let index = index();
		let resolution =
			Resolver::new(&index, 0.6).with_auto_detect(true).resolve(&[QueryPhrase::new("山")]);

		assert_eq!(resolution.resolved_tags.keys().collect::<Vec<_>>(), ["mountain_range"]);
	}
}
