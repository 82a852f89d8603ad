//! JSON documents holding the tag catalog and the destinations.
//!
//! Tags live in `{"tags": [...]}` and destinations in `{"destinations": [...]}`. Saves write a
//! sibling temporary file and rename it over the target so readers never see a partial file.

mod error;

pub use error::Error;

use std::{
	fs,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use wander_config::Data;
use wander_domain::{Destination, Tag};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagDocument {
	pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationDocument {
	pub destinations: Vec<Destination>,
}

/// Both record batches as read from disk, unvalidated.
#[derive(Debug, Clone, Default)]
pub struct Records {
	pub tags: Vec<Tag>,
	pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone)]
pub struct JsonStore {
	tags_path: PathBuf,
	destinations_path: PathBuf,
}
impl JsonStore {
	pub fn new(tags_path: impl Into<PathBuf>, destinations_path: impl Into<PathBuf>) -> Self {
		Self { tags_path: tags_path.into(), destinations_path: destinations_path.into() }
	}

	pub fn from_config(data: &Data) -> Self {
		Self::new(&data.tags_path, &data.destinations_path)
	}

	pub fn tags_path(&self) -> &Path {
		&self.tags_path
	}

	pub fn destinations_path(&self) -> &Path {
		&self.destinations_path
	}

	pub fn load(&self) -> Result<Records> {
		let tags = self.load_tags()?;
		let destinations = self.load_destinations()?;

		tracing::debug!(
			tags = tags.len(),
			destinations = destinations.len(),
			tags_path = %self.tags_path.display(),
			destinations_path = %self.destinations_path.display(),
			"Records read."
		);

		Ok(Records { tags, destinations })
	}

	pub fn load_tags(&self) -> Result<Vec<Tag>> {
		let document: TagDocument = read_json(&self.tags_path)?;

		Ok(document.tags)
	}

	pub fn load_destinations(&self) -> Result<Vec<Destination>> {
		let document: DestinationDocument = read_json(&self.destinations_path)?;

		Ok(document.destinations)
	}

	pub fn save_tags(&self, tags: Vec<Tag>) -> Result<()> {
		let count = tags.len();

		write_json(&self.tags_path, &TagDocument { tags })?;

		tracing::info!(tags = count, path = %self.tags_path.display(), "Tags saved.");

		Ok(())
	}

	pub fn save_destinations(&self, destinations: Vec<Destination>) -> Result<()> {
		let count = destinations.len();

		write_json(&self.destinations_path, &DestinationDocument { destinations })?;

		tracing::info!(
			destinations = count,
			path = %self.destinations_path.display(),
			"Destinations saved."
		);

		Ok(())
	}
}

fn read_json<T>(path: &Path) -> Result<T>
where
	T: for<'de> Deserialize<'de>,
{
	let raw = fs::read_to_string(path)
		.map_err(|source| Error::ReadFile { path: path.to_path_buf(), source })?;

	serde_json::from_str(&raw).map_err(|source| Error::ParseFile { path: path.to_path_buf(), source })
}

fn write_json<T>(path: &Path, value: &T) -> Result<()>
where
	T: Serialize,
{
	let mut payload = serde_json::to_string_pretty(value)
		.map_err(|source| Error::EncodeFile { path: path.to_path_buf(), source })?;

	payload.push('\n');

	let staging = staging_path(path);

	fs::write(&staging, payload)
		.map_err(|source| Error::WriteFile { path: staging.clone(), source })?;
	fs::rename(&staging, path)
		.map_err(|source| Error::WriteFile { path: path.to_path_buf(), source })?;

	Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
	let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();

	name.push(".tmp");

	path.with_file_name(name)
}

#[cfg(test)]
mod tests {
	use std::path::Path;

	use super::staging_path;

	#[test]
	fn staging_file_sits_next_to_the_target() {
		assert_eq!(
			staging_path(Path::new("/srv/data/destinations.json")),
			Path::new("/srv/data/destinations.json.tmp")
		);
	}
}
