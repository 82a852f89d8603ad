use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use wander_domain::{Destination, Tag};

use crate::{CategorySummary, Result, Snapshot, WanderService, tags::category_summaries};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadReport {
	pub version: u64,
	pub tag_count: usize,
	pub destination_count: usize,
	pub digest: String,
	#[serde(with = "crate::time_serde")]
	pub loaded_at: OffsetDateTime,
}
impl ReloadReport {
	fn new(snapshot: &Snapshot) -> Self {
		Self {
			version: snapshot.version,
			tag_count: snapshot.catalog.len(),
			destination_count: snapshot.destinations.len(),
			digest: snapshot.digest.clone(),
			loaded_at: snapshot.loaded_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertReport {
	pub version: u64,
	pub destination_id: String,
	/// False when an existing destination was replaced.
	pub created: bool,
	pub destination_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
	pub version: u64,
	pub tag_count: usize,
	pub destination_count: usize,
	pub languages: Vec<String>,
	pub categories: Vec<CategorySummary>,
	#[serde(with = "crate::time_serde")]
	pub loaded_at: OffsetDateTime,
	pub digest: String,
}

impl WanderService {
	/// Replaces catalog and destinations with a freshly validated snapshot.
	///
	/// Any validation failure rejects both batches and the current snapshot keeps serving.
	pub fn reload(&self, tags: Vec<Tag>, destinations: Vec<Destination>) -> Result<ReloadReport> {
		let result = self.snapshots.publish_with(|_| Ok((tags, destinations)));

		match result {
			Ok(snapshot) => {
				tracing::info!(
					version = snapshot.version,
					tags = snapshot.catalog.len(),
					destinations = snapshot.destinations.len(),
					languages = snapshot.index.languages().count(),
					digest = %snapshot.digest,
					"Snapshot published."
				);

				Ok(ReloadReport::new(&snapshot))
			},
			Err(err) => {
				tracing::warn!(error = %err, "Reload rejected. Keeping the current snapshot.");

				Err(err)
			},
		}
	}

	/// Inserts or replaces one destination by rebuilding the snapshot around it.
	pub fn upsert_destination(&self, destination: Destination) -> Result<UpsertReport> {
		let destination_id = destination.id.clone();
		let mut created = true;
		let result = self.snapshots.publish_with(|current| {
			let mut records = current.destinations.records();

			created = current.destinations.get(&destination.id).is_none();

			if !created {
				records.retain(|record| record.id != destination.id);
			}

			records.push(destination);

			Ok((current.catalog.records(), records))
		});

		match result {
			Ok(snapshot) => {
				tracing::info!(
					version = snapshot.version,
					destination_id = %destination_id,
					created,
					"Destination upserted."
				);

				Ok(UpsertReport {
					version: snapshot.version,
					destination_id,
					created,
					destination_count: snapshot.destinations.len(),
				})
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					destination_id = %destination_id,
					"Destination upsert rejected."
				);

				Err(err)
			},
		}
	}

	pub fn stats(&self) -> CatalogStats {
		let snapshot = self.snapshot();

		CatalogStats {
			version: snapshot.version,
			tag_count: snapshot.catalog.len(),
			destination_count: snapshot.destinations.len(),
			languages: snapshot.index.languages().map(ToString::to_string).collect(),
			categories: category_summaries(&snapshot),
			loaded_at: snapshot.loaded_at,
			digest: snapshot.digest.clone(),
		}
	}

	/// Destination records of the current snapshot, ordered by id.
	pub fn destination_records(&self) -> Vec<Destination> {
		self.snapshot().destinations.records()
	}

	pub fn tag_records(&self) -> Vec<Tag> {
		self.snapshot().catalog.records()
	}
}
