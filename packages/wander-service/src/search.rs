use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wander_domain::LanguageCode;

use crate::{
	Error, Result, WanderService, clamp_limit,
	ranking::{self, RankOptions, TagContribution},
	resolver::{PhraseResolution, QueryPhrase, Resolver},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	pub phrases: Vec<QueryPhrase>,
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default)]
	pub min_score: Option<f32>,
	#[serde(default)]
	pub explain: bool,
	/// Language for destination names in the response.
	#[serde(default)]
	pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
	pub destination_id: String,
	pub name: String,
	pub country_code: Option<String>,
	pub score: f32,
	pub matched_tags: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub explain: Option<Vec<TagContribution>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
	pub snapshot_version: u64,
	pub results: Vec<SearchResult>,
	pub unresolved_phrases: Vec<String>,
	pub resolved_tags: BTreeMap<String, f32>,
	pub phrases: Vec<PhraseResolution>,
}

impl WanderService {
	/// Resolves the phrases and ranks destinations of the current snapshot against them.
	///
	/// Unresolved phrases and empty result lists are regular outcomes. A malformed display
	/// language falls back to the configured one. Only a non-finite `min_score` is an error.
	pub fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		if let Some(min_score) = req.min_score
			&& !min_score.is_finite()
		{
			return Err(Error::InvalidRequest {
				message: "min_score must be a finite number.".to_string(),
			});
		}

		let language = match req.language.as_deref() {
			Some(raw) => LanguageCode::parse(raw).unwrap_or_else(|| {
				tracing::warn!(
					language = raw,
					fallback = %self.fallback_language,
					"Ignoring malformed display language."
				);

				self.fallback_language.clone()
			}),
			None => self.fallback_language.clone(),
		};
		let snapshot = self.snapshot();
		let resolution = Resolver::new(&snapshot.index, self.cfg.prefix_confidence)
			.with_auto_detect(self.cfg.auto_detect_language)
			.resolve(&req.phrases);
		let options = RankOptions {
			top_k: clamp_limit(req.top_k, self.cfg.default_top_k, self.cfg.max_top_k),
			min_score: req.min_score,
			explain: req.explain,
		};
		let results: Vec<SearchResult> =
			ranking::rank(&snapshot.destinations, &resolution.resolved_tags, options)
				.into_iter()
				.map(|ranked| SearchResult {
					destination_id: ranked.destination.id.clone(),
					name: ranked.destination.name(&language, &self.fallback_language).to_string(),
					country_code: ranked.destination.country_code.clone(),
					score: ranked.score,
					matched_tags: ranked.matched_tags,
					explain: ranked.explain,
				})
				.collect();

		tracing::debug!(
			snapshot_version = snapshot.version,
			phrases = req.phrases.len(),
			resolved_tags = resolution.resolved_tags.len(),
			unresolved = resolution.unresolved_phrases.len(),
			results = results.len(),
			"Search completed."
		);

		Ok(SearchResponse {
			snapshot_version: snapshot.version,
			results,
			unresolved_phrases: resolution.unresolved_phrases,
			resolved_tags: resolution.resolved_tags,
			phrases: resolution.phrases,
		})
	}
}
