pub mod admin;
pub mod ranking;
pub mod resolver;
pub mod search;
pub mod snapshot;
pub mod tags;
pub mod time_serde;

mod error;

pub use admin::{CatalogStats, ReloadReport, UpsertReport};
pub use error::{Error, Result};
pub use ranking::{RankOptions, RankedDestination, TagContribution};
pub use resolver::{MatchOutcome, PhraseResolution, QueryPhrase, Resolution, Resolver};
pub use search::{SearchRequest, SearchResponse, SearchResult};
pub use snapshot::{Snapshot, SnapshotHandle};
pub use tags::{
	CategoryRequest, CategoryResponse, CategorySummary, TagSearchRequest, TagSearchResponse,
	TagSummary,
};

use std::sync::Arc;

use wander_config::Search;
use wander_domain::LanguageCode;

/// Query and maintenance operations over the currently published [`Snapshot`].
pub struct WanderService {
	pub cfg: Search,
	fallback_language: LanguageCode,
	snapshots: SnapshotHandle,
}
impl WanderService {
	/// Starts with an empty snapshot; call [`WanderService::reload`] to publish data.
	pub fn new(cfg: Search) -> Result<Self> {
		validate_search(&cfg)?;

		let fallback_language = LanguageCode::parse(&cfg.fallback_language).ok_or_else(|| {
			Error::InvalidConfig {
				message: format!(
					"search.fallback_language {:?} is not a language code.",
					cfg.fallback_language
				),
			}
		})?;
		let snapshots = SnapshotHandle::new(Snapshot::empty()?);

		Ok(Self { cfg, fallback_language, snapshots })
	}

	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.snapshots.current()
	}

	pub fn fallback_language(&self) -> &LanguageCode {
		&self.fallback_language
	}

	/// Language used for names and synonyms in responses.
	pub(crate) fn display_language(&self, requested: Option<&str>) -> Result<LanguageCode> {
		match requested {
			Some(raw) => parse_language(raw),
			None => Ok(self.fallback_language.clone()),
		}
	}
}

pub(crate) fn parse_language(raw: &str) -> Result<LanguageCode> {
	LanguageCode::parse(raw).ok_or_else(|| Error::InvalidRequest {
		message: format!("language {raw:?} is not a language code."),
	})
}

/// Missing limits take `default`; the rest are clamped into `1..=max`.
pub(crate) fn clamp_limit(requested: Option<u32>, default: u32, max: u32) -> usize {
	requested.unwrap_or(default).clamp(1, max) as usize
}

fn validate_search(cfg: &Search) -> Result<()> {
	if !(cfg.prefix_confidence.is_finite()
		&& cfg.prefix_confidence > 0.0
		&& cfg.prefix_confidence < 1.0)
	{
		return Err(Error::InvalidConfig {
			message: "search.prefix_confidence must be strictly between 0.0 and 1.0.".to_string(),
		});
	}
	if cfg.default_top_k == 0 || cfg.max_top_k < cfg.default_top_k {
		return Err(Error::InvalidConfig {
			message: "search.max_top_k must be at least search.default_top_k, which must be positive."
				.to_string(),
		});
	}
	if cfg.tag_search_limit == 0 {
		return Err(Error::InvalidConfig {
			message: "search.tag_search_limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}
