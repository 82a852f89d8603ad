use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub data: Data,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub mcp_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// Locations of the JSON documents. Relative paths are resolved against the directory of the
/// config file when loaded through [`crate::load`].
#[derive(Debug, Clone, Deserialize)]
pub struct Data {
	pub tags_path: PathBuf,
	pub destinations_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Confidence assigned to prefix-only matches. Must lie strictly between 0 and 1.
	#[serde(default = "default_prefix_confidence")]
	pub prefix_confidence: f32,
	#[serde(default = "default_top_k")]
	pub default_top_k: u32,
	#[serde(default = "default_max_top_k")]
	pub max_top_k: u32,
	#[serde(default = "default_tag_search_limit")]
	pub tag_search_limit: u32,
	/// Language used for display names when the requested one is missing.
	#[serde(default = "default_fallback_language")]
	pub fallback_language: String,
	#[serde(default)]
	pub auto_detect_language: bool,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			prefix_confidence: default_prefix_confidence(),
			default_top_k: default_top_k(),
			max_top_k: default_max_top_k(),
			tag_search_limit: default_tag_search_limit(),
			fallback_language: default_fallback_language(),
			auto_detect_language: false,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	#[serde(default = "default_auth_mode")]
	pub auth_mode: String,
	pub auth_token: Option<String>,
}
impl Default for Security {
	fn default() -> Self {
		Self { auth_mode: default_auth_mode(), auth_token: None }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_prefix_confidence() -> f32 {
	0.6
}

fn default_top_k() -> u32 {
	10
}

fn default_max_top_k() -> u32 {
	100
}

fn default_tag_search_limit() -> u32 {
	10
}

fn default_fallback_language() -> String {
	"en".to_string()
}

fn default_auth_mode() -> String {
	"off".to_string()
}
