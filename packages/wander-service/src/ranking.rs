use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};
use wander_domain::Destination;
use wander_index::DestinationStore;

#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
	pub top_k: usize,
	/// Results scoring below this are dropped before truncation.
	pub min_score: Option<f32>,
	pub explain: bool,
}

/// One resolved tag's share of a destination score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagContribution {
	pub tag_id: String,
	pub confidence: f32,
	pub weight: f32,
	pub contribution: f32,
}

#[derive(Debug, Clone)]
pub struct RankedDestination<'a> {
	pub destination: &'a Destination,
	pub score: f32,
	/// Tags with a positive contribution, largest first.
	pub matched_tags: Vec<String>,
	pub explain: Option<Vec<TagContribution>>,
}

/// Scores every destination as the dot product of `resolved_tags` and its weight vector.
///
/// Destinations scoring zero are excluded. Order is score descending, then destination id
/// ascending, so repeated calls over the same store return identical output.
pub fn rank<'a>(
	store: &'a DestinationStore,
	resolved_tags: &BTreeMap<String, f32>,
	options: RankOptions,
) -> Vec<RankedDestination<'a>> {
	if resolved_tags.is_empty() || options.top_k == 0 {
		return Vec::new();
	}

	let mut ranked = Vec::new();

	for destination in store.all() {
		let mut score = 0.0_f32;
		let mut contributions = Vec::new();

		for (tag_id, confidence) in resolved_tags {
			let weight = destination.weight(tag_id);

			if weight <= 0.0 {
				continue;
			}

			let contribution = confidence * weight;

			score += contribution;
			contributions.push(TagContribution {
				tag_id: tag_id.clone(),
				confidence: *confidence,
				weight,
				contribution,
			});
		}

		if score <= 0.0 {
			continue;
		}
		if options.min_score.is_some_and(|min| score < min) {
			continue;
		}

		contributions.sort_by(|a, b| {
			cmp_f32_desc(a.contribution, b.contribution).then_with(|| a.tag_id.cmp(&b.tag_id))
		});

		let matched_tags = contributions.iter().map(|c| c.tag_id.clone()).collect();

		ranked.push(RankedDestination {
			destination,
			score,
			matched_tags,
			explain: options.explain.then_some(contributions),
		});
	}

	ranked.sort_by(|a, b| {
		cmp_f32_desc(a.score, b.score).then_with(|| a.destination.id.cmp(&b.destination.id))
	});
	ranked.truncate(options.top_k);

	ranked
}

/// Descending order with NaN last.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
