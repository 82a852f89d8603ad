use wander_storage::{Error, JsonStore};
use wander_testkit::{
	TestDir, destination, heritage_tags, sample_destinations, sample_destinations_json,
	sample_tags, sample_tags_json,
};

#[test]
fn loads_the_shipped_documents() {
	let dir = TestDir::new("wander_storage_load").expect("temp dir");
	let tags_path = dir.write("tags.json", sample_tags_json()).expect("tags");
	let destinations_path =
		dir.write("destinations.json", sample_destinations_json()).expect("destinations");
	let records = JsonStore::new(tags_path, destinations_path).load().expect("load");

	assert_eq!(records.tags, sample_tags());
	assert_eq!(records.destinations, sample_destinations());
}

#[test]
fn saved_destinations_load_back_unchanged() {
	let dir = TestDir::new("wander_storage_save").expect("temp dir");
	let store = JsonStore::new(dir.join("tags.json"), dir.join("destinations.json"));
	let mut records = sample_destinations();

	records.push(destination("D1", &[("historic", 0.9)]));

	store.save_tags(heritage_tags()).expect("save tags");
	store.save_destinations(records.clone()).expect("save destinations");

	assert_eq!(store.load_tags().expect("load tags"), heritage_tags());
	assert_eq!(store.load_destinations().expect("load destinations"), records);
	assert!(!dir.join("destinations.json.tmp").exists());
}

#[test]
fn missing_file_names_the_path() {
	let dir = TestDir::new("wander_storage_missing").expect("temp dir");
	let store = JsonStore::new(dir.join("absent.json"), dir.join("absent.json"));
	let err = store.load().expect_err("missing file");

	assert!(matches!(err, Error::ReadFile { .. }));
	assert!(err.to_string().contains("absent.json"), "unexpected error: {err}");
}

#[test]
fn malformed_document_is_a_parse_error() {
	let dir = TestDir::new("wander_storage_malformed").expect("temp dir");
	let tags_path = dir.write("tags.json", r#"{"tags": [{"id": "beach"}]}"#).expect("tags");
	let store = JsonStore::new(tags_path, dir.join("destinations.json"));

	assert!(matches!(store.load_tags(), Err(Error::ParseFile { .. })));
}
