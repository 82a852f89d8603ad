use std::collections::{BTreeMap, BTreeSet, HashMap};

use wander_domain::{LanguageCode, NormalizedText, Tag};

use crate::{Error, Result};

/// Registry of canonical tags keyed by id, with a category side index.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
	tags: BTreeMap<String, Tag>,
	by_category: BTreeMap<String, BTreeSet<String>>,
}
impl TagCatalog {
	/// Validates a complete batch and returns the catalog it describes.
	pub fn build(records: Vec<Tag>) -> Result<Self> {
		let mut tags = BTreeMap::new();
		let mut by_category: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
		let mut owners: HashMap<(LanguageCode, String), String> = HashMap::new();

		for tag in records {
			validate_tag(&tag)?;

			if tags.contains_key(&tag.id) {
				return Err(Error::tag(&tag.id, "duplicate tag id."));
			}

			for (language, synonyms) in &tag.synonyms {
				for synonym in synonyms {
					let folded = NormalizedText::new(synonym);

					if folded.is_empty() {
						return Err(Error::tag(
							&tag.id,
							format!("synonym {synonym:?} in language {language} is empty."),
						));
					}

					let key = (language.clone(), folded.into_string());

					match owners.get(&key) {
						Some(owner) if owner != &tag.id => {
							return Err(Error::tag(
								&tag.id,
								format!(
									"synonym {synonym:?} in language {language} already belongs to tag {owner:?}."
								),
							));
						},
						Some(_) => {},
						None => {
							owners.insert(key, tag.id.clone());
						},
					}
				}
			}

			by_category.entry(tag.category.clone()).or_default().insert(tag.id.clone());
			tags.insert(tag.id.clone(), tag);
		}

		validate_parents(&tags)?;

		Ok(Self { tags, by_category })
	}

	/// Replaces the catalog with `records`. On error the current contents are kept.
	pub fn load(&mut self, records: Vec<Tag>) -> Result<()> {
		let next = Self::build(records)?;

		*self = next;

		tracing::debug!(tags = self.tags.len(), "Tag catalog loaded.");

		Ok(())
	}

	pub fn lookup_by_id(&self, id: &str) -> Option<&Tag> {
		self.tags.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.tags.contains_key(id)
	}

	/// `(synonym, tag_id)` pairs of one language, as written in the records.
	pub fn all_synonyms<'a>(
		&'a self,
		language: &'a LanguageCode,
	) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
		self.tags.values().flat_map(move |tag| {
			tag.synonyms_in(language).iter().map(move |synonym| (synonym.as_str(), tag.id.as_str()))
		})
	}

	/// Every language at least one tag has synonyms in.
	pub fn languages(&self) -> BTreeSet<&LanguageCode> {
		self.tags
			.values()
			.flat_map(|tag| {
				tag.synonyms.iter().filter(|(_, names)| !names.is_empty()).map(|(lang, _)| lang)
			})
			.collect()
	}

	pub fn by_category<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a Tag> + 'a {
		self.by_category
			.get(category)
			.into_iter()
			.flatten()
			.filter_map(|id| self.tags.get(id))
	}

	/// Categories with their tag counts, ordered by category.
	pub fn categories(&self) -> impl Iterator<Item = (&str, usize)> {
		self.by_category.iter().map(|(category, ids)| (category.as_str(), ids.len()))
	}

	pub fn iter(&self) -> impl Iterator<Item = &Tag> {
		self.tags.values()
	}

	pub fn len(&self) -> usize {
		self.tags.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tags.is_empty()
	}

	/// Owned copies of the records, ordered by id.
	pub fn records(&self) -> Vec<Tag> {
		self.tags.values().cloned().collect()
	}
}

fn validate_tag(tag: &Tag) -> Result<()> {
	if tag.id.trim().is_empty() {
		return Err(Error::tag(&tag.id, "id must be non-empty."));
	}
	if tag.id.trim() != tag.id {
		return Err(Error::tag(&tag.id, "id must not have surrounding whitespace."));
	}
	if tag.category.trim().is_empty() {
		return Err(Error::tag(&tag.id, "category must be non-empty."));
	}
	if !tag.weight.is_finite() || tag.weight < 0.0 {
		return Err(Error::tag(&tag.id, "weight must be a finite number, zero or greater."));
	}
	if tag.parent_id.as_deref() == Some(tag.id.as_str()) {
		return Err(Error::tag(&tag.id, "parent_id must not reference the tag itself."));
	}

	Ok(())
}

fn validate_parents(tags: &BTreeMap<String, Tag>) -> Result<()> {
	for tag in tags.values() {
		let mut current = tag;
		let mut steps = 0_usize;

		while let Some(parent_id) = current.parent_id.as_deref() {
			let Some(parent) = tags.get(parent_id) else {
				return Err(Error::tag(
					&tag.id,
					format!("parent_id {parent_id:?} does not reference a known tag."),
				));
			};

			steps += 1;

			if steps > tags.len() {
				return Err(Error::tag(&tag.id, "parent_id chain contains a cycle."));
			}

			current = parent;
		}
	}

	Ok(())
}
