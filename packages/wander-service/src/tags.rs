use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use wander_domain::{LanguageCode, NormalizedText, Tag};

use crate::{Result, Snapshot, WanderService, clamp_limit, parse_language, ranking::cmp_f32_desc};

/// A tag as presented in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
	pub id: String,
	pub name: String,
	pub category: String,
	pub description: Option<String>,
	pub synonyms: Vec<String>,
	pub weight: f32,
	pub parent_id: Option<String>,
}
impl TagSummary {
	fn new(tag: &Tag, language: &LanguageCode, fallback: &LanguageCode) -> Self {
		let synonyms = match tag.synonyms_in(language) {
			[] => tag.synonyms_in(fallback),
			synonyms => synonyms,
		};

		Self {
			id: tag.id.clone(),
			name: tag.name(language, fallback).to_string(),
			category: tag.category.clone(),
			description: tag.description_in(language, fallback).map(str::to_string),
			synonyms: synonyms.to_vec(),
			weight: tag.weight,
			parent_id: tag.parent_id.clone(),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagSearchRequest {
	pub prefix: String,
	#[serde(default)]
	pub language: Option<String>,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSearchResponse {
	pub tags: Vec<TagSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRequest {
	pub category: String,
	#[serde(default)]
	pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
	pub category: String,
	pub tags: Vec<TagSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
	pub category: String,
	pub tag_count: usize,
}

impl WanderService {
	/// Tags with a synonym starting with `prefix`, heaviest first.
	///
	/// With a language only that trie is consulted; without one every trie is. A blank prefix
	/// returns nothing.
	pub fn search_tags(&self, req: TagSearchRequest) -> Result<TagSearchResponse> {
		let requested = req.language.as_deref().map(parse_language).transpose()?;
		let limit = clamp_limit(req.limit, self.cfg.tag_search_limit, self.cfg.max_top_k);
		let prefix = NormalizedText::new(&req.prefix);

		if prefix.is_empty() {
			return Ok(TagSearchResponse { tags: Vec::new() });
		}

		let snapshot = self.snapshot();
		let mut ids = BTreeSet::new();

		match requested.as_ref() {
			Some(language) => ids.extend(snapshot.index.lookup_prefix(language, &prefix)),
			None => {
				for language in snapshot.index.languages() {
					ids.extend(snapshot.index.lookup_prefix(language, &prefix));
				}
			},
		}

		let language = requested.unwrap_or_else(|| self.fallback_language.clone());
		let mut matched: Vec<&Tag> =
			ids.into_iter().filter_map(|id| snapshot.catalog.lookup_by_id(id)).collect();

		matched.sort_by(|a, b| cmp_f32_desc(a.weight, b.weight).then_with(|| a.id.cmp(&b.id)));
		matched.truncate(limit);

		let tags = matched
			.into_iter()
			.map(|tag| TagSummary::new(tag, &language, &self.fallback_language))
			.collect();

		Ok(TagSearchResponse { tags })
	}

	/// Every tag in `category`, ordered by id. Unknown categories are empty.
	pub fn tags_by_category(&self, req: CategoryRequest) -> Result<CategoryResponse> {
		let language = self.display_language(req.language.as_deref())?;
		let snapshot = self.snapshot();
		let tags = snapshot
			.catalog
			.by_category(req.category.trim())
			.map(|tag| TagSummary::new(tag, &language, &self.fallback_language))
			.collect();

		Ok(CategoryResponse { category: req.category, tags })
	}

	pub fn categories(&self) -> Vec<CategorySummary> {
		category_summaries(&self.snapshot())
	}
}

pub(crate) fn category_summaries(snapshot: &Snapshot) -> Vec<CategorySummary> {
	snapshot
		.catalog
		.categories()
		.map(|(category, tag_count)| CategorySummary { category: category.to_string(), tag_count })
		.collect()
}
