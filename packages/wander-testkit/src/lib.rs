mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use serde::Deserialize;
use wander_domain::{Destination, LanguageCode, Tag};

const SAMPLE_TAGS: &str = include_str!("../../../data/tags.json");
const SAMPLE_DESTINATIONS: &str = include_str!("../../../data/destinations.json");

/// Scratch directory under the system temp dir, removed on drop.
pub struct TestDir {
	path: PathBuf,
	cleaned: bool,
}
impl TestDir {
	pub fn new(prefix: &str) -> Result<Self> {
		static COUNTER: AtomicU64 = AtomicU64::new(0);

		let nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_err(|err| Error::Message(format!("System time is before the epoch: {err}.")))?
			.as_nanos();
		let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
		let pid = std::process::id();
		let path = env::temp_dir().join(format!("{prefix}_{nanos}_{pid}_{ordinal}"));

		fs::create_dir_all(&path)?;

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn join(&self, name: &str) -> PathBuf {
		self.path.join(name)
	}

	/// Writes `contents` to `name` inside the directory and returns the full path.
	pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
		let path = self.join(name);

		fs::write(&path, contents)?;

		Ok(path)
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		fs::remove_dir_all(&self.path)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDir {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Test directory cleanup failed: {err}.");
		}
	}
}

#[derive(Deserialize)]
struct TagDocument {
	tags: Vec<Tag>,
}

#[derive(Deserialize)]
struct DestinationDocument {
	destinations: Vec<Destination>,
}

pub fn lang(code: &str) -> LanguageCode {
	LanguageCode::parse(code).unwrap_or_else(|| panic!("invalid test language code {code:?}"))
}

/// Tag with `(language, synonym)` pairs. Repeated languages append in order.
pub fn tag(id: &str, category: &str, synonyms: &[(&str, &str)]) -> Tag {
	let mut tag = Tag {
		id: id.to_string(),
		category: category.to_string(),
		synonyms: Default::default(),
		description: Default::default(),
		weight: 1.0,
		parent_id: None,
	};

	for (language, synonym) in synonyms {
		tag.synonyms.entry(lang(language)).or_default().push((*synonym).to_string());
	}

	tag
}

/// Destination with `(tag_id, weight)` pairs and an English display name equal to its id.
pub fn destination(id: &str, weights: &[(&str, f32)]) -> Destination {
	Destination {
		id: id.to_string(),
		display_name: [(lang("en"), id.to_string())].into_iter().collect(),
		tags: weights.iter().map(|(tag_id, weight)| ((*tag_id).to_string(), *weight)).collect(),
		coordinates: None,
		country_code: None,
		administrative_level: None,
		metadata: Default::default(),
	}
}

/// `historic` with `en: historic, heritage` and `ja: 歴史`.
pub fn heritage_tags() -> Vec<Tag> {
	vec![tag(
		"historic",
		"culture",
		&[("en", "historic"), ("en", "heritage"), ("ja", "歴史")],
	)]
}

/// `D1` weighs `historic` at 0.9 and `D2` at 0.3.
pub fn heritage_destinations() -> Vec<Destination> {
	vec![destination("D1", &[("historic", 0.9)]), destination("D2", &[("historic", 0.3)])]
}

/// The multilingual catalog shipped in `data/tags.json`.
pub fn sample_tags() -> Vec<Tag> {
	let document: TagDocument =
		serde_json::from_str(SAMPLE_TAGS).unwrap_or_else(|err| panic!("data/tags.json: {err}"));

	document.tags
}

/// The destinations shipped in `data/destinations.json`.
pub fn sample_destinations() -> Vec<Destination> {
	let document: DestinationDocument = serde_json::from_str(SAMPLE_DESTINATIONS)
		.unwrap_or_else(|err| panic!("data/destinations.json: {err}"));

	document.destinations
}

pub fn sample_tags_json() -> &'static str {
	SAMPLE_TAGS
}

pub fn sample_destinations_json() -> &'static str {
	SAMPLE_DESTINATIONS
}
