use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use time::OffsetDateTime;
use wander_domain::{Destination, Tag};
use wander_index::{DestinationStore, MultilingualIndex, TagCatalog};

use crate::{Error, Result};

/// Immutable view that queries run against: catalog, tries and destinations built together.
#[derive(Debug)]
pub struct Snapshot {
	/// Zero for the empty snapshot a service starts with, then one per publication.
	pub version: u64,
	pub loaded_at: OffsetDateTime,
	/// blake3 hex digest of the canonical JSON of every record.
	pub digest: String,
	pub catalog: TagCatalog,
	pub index: MultilingualIndex,
	pub destinations: DestinationStore,
}
impl Snapshot {
	pub fn empty() -> Result<Self> {
		Self::build(Vec::new(), Vec::new(), 0)
	}

	/// Validates both batches and builds every derived structure. Nothing is shared with any
	/// existing snapshot.
	pub fn build(tags: Vec<Tag>, destinations: Vec<Destination>, version: u64) -> Result<Self> {
		let catalog = TagCatalog::build(tags)?;
		let destinations = DestinationStore::build(destinations, &catalog)?;
		let index = MultilingualIndex::from_catalog(&catalog);
		let digest = content_digest(&catalog, &destinations)?;

		Ok(Self {
			version,
			loaded_at: OffsetDateTime::now_utc(),
			digest,
			catalog,
			index,
			destinations,
		})
	}
}

/// Publication point for [`Snapshot`]s.
///
/// Readers clone the current `Arc` and never observe a half-built snapshot. Writers are
/// serialized and build outside the read lock, which is only taken for the pointer swap.
#[derive(Debug)]
pub struct SnapshotHandle {
	current: RwLock<Arc<Snapshot>>,
	writer: Mutex<()>,
}
impl SnapshotHandle {
	pub fn new(initial: Snapshot) -> Self {
		Self { current: RwLock::new(Arc::new(initial)), writer: Mutex::new(()) }
	}

	pub fn current(&self) -> Arc<Snapshot> {
		self.current.read().clone()
	}

	/// Builds the next snapshot from the records `next` derives from the current one and
	/// publishes it. On error the current snapshot stays active.
	pub fn publish_with<F>(&self, next: F) -> Result<Arc<Snapshot>>
	where
		F: FnOnce(&Snapshot) -> Result<(Vec<Tag>, Vec<Destination>)>,
	{
		let _writer = self.writer.lock();
		let base = self.current();
		let (tags, destinations) = next(&base)?;
		let snapshot = Arc::new(Snapshot::build(tags, destinations, base.version + 1)?);

		*self.current.write() = snapshot.clone();

		Ok(snapshot)
	}
}

#[derive(Serialize)]
struct CanonicalRecords<'a> {
	tags: Vec<&'a Tag>,
	destinations: Vec<&'a Destination>,
}

fn content_digest(catalog: &TagCatalog, destinations: &DestinationStore) -> Result<String> {
	let records = CanonicalRecords {
		tags: catalog.iter().collect(),
		destinations: destinations.all().collect(),
	};
	let raw = serde_json::to_vec(&records).map_err(|err| Error::Encode {
		message: format!("Failed to encode snapshot records: {err}"),
	})?;

	Ok(blake3::hash(&raw).to_hex().to_string())
}
