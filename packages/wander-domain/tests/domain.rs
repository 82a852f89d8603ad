use wander_domain::{Destination, LanguageCode, NormalizedText, Tag};

fn code(raw: &str) -> LanguageCode {
	LanguageCode::parse(raw).expect("valid language code")
}

fn sample_tag() -> Tag {
	serde_json::from_value(serde_json::json!({
		"id": "historical",
		"category": "culture",
		"synonyms": {
			"en": ["historical", "ancient", "heritage"],
			"ja": ["歴史的", "遺跡"]
		},
		"description": { "en": "Sites with a long recorded history." }
	}))
	.expect("tag record")
}

#[test]
fn tag_defaults_weight_and_parent() {
	let tag = sample_tag();

	assert!((tag.weight - 1.0).abs() < f32::EPSILON);
	assert!(tag.parent_id.is_none());
}

#[test]
fn tag_name_prefers_requested_language_then_fallback_then_id() {
	let tag = sample_tag();

	assert_eq!(tag.name(&code("ja"), &code("en")), "歴史的");
	assert_eq!(tag.name(&code("fr"), &code("en")), "historical");
	assert_eq!(tag.name(&code("fr"), &code("de")), "historical");
}

#[test]
fn tag_description_falls_back() {
	let tag = sample_tag();

	assert_eq!(
		tag.description_in(&code("ja"), &code("en")),
		Some("Sites with a long recorded history.")
	);
	assert_eq!(tag.description_in(&code("ja"), &code("zh")), None);
}

#[test]
fn tag_record_rejects_invalid_language_key() {
	let raw = serde_json::json!({
		"id": "beach",
		"category": "scenery",
		"synonyms": { "English": ["beach"] }
	});

	assert!(serde_json::from_value::<Tag>(raw).is_err());
}

#[test]
fn destination_weight_defaults_to_zero() {
	let destination: Destination = serde_json::from_value(serde_json::json!({
		"id": "geoname:1850147",
		"display_name": { "en": "Tokyo", "ja": "東京" },
		"tags": { "culture": 0.85 }
	}))
	.expect("destination record");

	assert!((destination.weight("culture") - 0.85).abs() < f32::EPSILON);
	assert_eq!(destination.weight("beach"), 0.0);
	assert_eq!(destination.name(&code("ja"), &code("en")), "東京");
	assert_eq!(destination.name(&code("ko"), &code("en")), "Tokyo");
}

#[test]
fn destination_serialization_skips_empty_optionals() {
	let destination: Destination =
		serde_json::from_value(serde_json::json!({ "id": "d1", "tags": { "beach": 0.5 } }))
			.expect("destination record");
	let value = serde_json::to_value(&destination).expect("serialize");
	let object = value.as_object().expect("object");

	assert!(!object.contains_key("coordinates"));
	assert!(!object.contains_key("metadata"));
	assert!(object.contains_key("display_name"));
}

#[test]
fn normalized_text_matches_between_synonym_and_query() {
	assert_eq!(NormalizedText::new("Family-Friendly"), NormalizedText::new(" family-friendly "));
	assert_ne!(NormalizedText::new("family friendly"), NormalizedText::new("family-friendly"));
}
