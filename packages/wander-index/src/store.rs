use std::collections::BTreeMap;

use wander_domain::Destination;

use crate::{Error, Result, TagCatalog};

/// Destinations keyed by id, validated against a [`TagCatalog`].
#[derive(Debug, Clone, Default)]
pub struct DestinationStore {
	destinations: BTreeMap<String, Destination>,
}
impl DestinationStore {
	/// Validates a complete batch against `catalog` and returns the store it describes.
	pub fn build(records: Vec<Destination>, catalog: &TagCatalog) -> Result<Self> {
		let mut destinations = BTreeMap::new();

		for destination in records {
			validate_destination(&destination, catalog)?;

			if destinations.contains_key(&destination.id) {
				return Err(Error::destination(&destination.id, "duplicate destination id."));
			}

			destinations.insert(destination.id.clone(), destination);
		}

		Ok(Self { destinations })
	}

	/// Replaces the store with `records`. On error the current contents are kept.
	pub fn load(&mut self, records: Vec<Destination>, catalog: &TagCatalog) -> Result<()> {
		let next = Self::build(records, catalog)?;

		*self = next;

		tracing::debug!(destinations = self.destinations.len(), "Destination store loaded.");

		Ok(())
	}

	/// Every destination ordered by id.
	pub fn all(&self) -> impl Iterator<Item = &Destination> {
		self.destinations.values()
	}

	pub fn get(&self, id: &str) -> Option<&Destination> {
		self.destinations.get(id)
	}

	pub fn len(&self) -> usize {
		self.destinations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.destinations.is_empty()
	}

	pub fn records(&self) -> Vec<Destination> {
		self.destinations.values().cloned().collect()
	}
}

fn validate_destination(destination: &Destination, catalog: &TagCatalog) -> Result<()> {
	let id = destination.id.as_str();

	if id.trim().is_empty() {
		return Err(Error::destination(id, "id must be non-empty."));
	}
	if id.trim() != id {
		return Err(Error::destination(id, "id must not have surrounding whitespace."));
	}

	for (tag_id, weight) in &destination.tags {
		if !catalog.contains(tag_id) {
			return Err(Error::destination(
				id,
				format!("tag {tag_id:?} does not exist in the tag catalog."),
			));
		}
		if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
			return Err(Error::destination(
				id,
				format!("weight for tag {tag_id:?} must be in [0.0, 1.0], got {weight}."),
			));
		}
	}

	if let Some(coordinates) = destination.coordinates {
		if !(-90.0..=90.0).contains(&coordinates.lat) {
			return Err(Error::destination(id, "coordinates.lat must be in [-90, 90]."));
		}
		if !(-180.0..=180.0).contains(&coordinates.lng) {
			return Err(Error::destination(id, "coordinates.lng must be in [-180, 180]."));
		}
	}

	Ok(())
}
