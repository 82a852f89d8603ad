use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::LanguageCode;

/// Canonical, language-independent tag with localized synonyms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
	pub id: String,
	/// Informational label such as `scenery` or `budget`. Not used in scoring.
	pub category: String,
	/// Surface strings per language, in order of preference. The first one is the display name.
	#[serde(default)]
	pub synonyms: BTreeMap<LanguageCode, Vec<String>>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub description: BTreeMap<LanguageCode, String>,
	/// Orders tag search results. Independent of destination weights.
	#[serde(default = "default_tag_weight")]
	pub weight: f32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
}
impl Tag {
	pub fn synonyms_in(&self, language: &LanguageCode) -> &[String] {
		self.synonyms.get(language).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn name(&self, language: &LanguageCode, fallback: &LanguageCode) -> &str {
		self.synonyms_in(language)
			.first()
			.or_else(|| self.synonyms_in(fallback).first())
			.map(String::as_str)
			.unwrap_or(&self.id)
	}

	pub fn description_in(&self, language: &LanguageCode, fallback: &LanguageCode) -> Option<&str> {
		self.description.get(language).or_else(|| self.description.get(fallback)).map(String::as_str)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
	pub lat: f64,
	pub lng: f64,
}

/// A place carrying a sparse tag-weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
	pub id: String,
	#[serde(default)]
	pub display_name: BTreeMap<LanguageCode, String>,
	/// Tag id to relevance weight in `[0.0, 1.0]`.
	#[serde(default)]
	pub tags: BTreeMap<String, f32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub coordinates: Option<Coordinates>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub country_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub administrative_level: Option<String>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub metadata: Map<String, Value>,
}
impl Destination {
	pub fn name(&self, language: &LanguageCode, fallback: &LanguageCode) -> &str {
		self.display_name
			.get(language)
			.or_else(|| self.display_name.get(fallback))
			.map(String::as_str)
			.unwrap_or(&self.id)
	}

	pub fn weight(&self, tag_id: &str) -> f32 {
		self.tags.get(tag_id).copied().unwrap_or(0.0)
	}
}

fn default_tag_weight() -> f32 {
	1.0
}
