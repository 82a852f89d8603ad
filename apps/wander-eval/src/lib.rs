use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use wander_service::{QueryPhrase, SearchRequest, WanderService};
use wander_storage::JsonStore;

#[derive(Debug, Parser)]
#[command(
	version = wander_cli::VERSION,
	rename_all = "kebab",
	styles = wander_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'q', value_name = "FILE")]
	pub queries: PathBuf,
	/// Overrides `search.default_top_k` for queries without their own `top_k`.
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EvalDataset {
	name: Option<String>,
	queries: Vec<EvalQuery>,
}

#[derive(Debug, Deserialize)]
struct EvalQuery {
	id: Option<String>,
	phrases: Vec<DatasetPhrase>,
	top_k: Option<u32>,
	#[serde(default)]
	expected: Vec<String>,
}

/// A bare string is an unhinted phrase.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatasetPhrase {
	Text(String),
	Phrase(QueryPhrase),
}
impl From<DatasetPhrase> for QueryPhrase {
	fn from(phrase: DatasetPhrase) -> Self {
		match phrase {
			DatasetPhrase::Text(text) => QueryPhrase::new(text),
			DatasetPhrase::Phrase(phrase) => phrase,
		}
	}
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	dataset: EvalDatasetInfo,
	settings: EvalSettings,
	summary: EvalSummary,
	queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
struct EvalDatasetInfo {
	name: String,
	query_count: usize,
}

#[derive(Debug, Serialize)]
struct EvalSettings {
	config_path: String,
	top_k: Option<u32>,
	prefix_confidence: f32,
	auto_detect_language: bool,
	snapshot_version: u64,
	digest: String,
}

#[derive(Debug, Serialize)]
struct EvalSummary {
	/// Queries with at least one expected destination.
	judged_queries: usize,
	hit_rate_at_k: f64,
	avg_recall_at_k: f64,
	mean_rr: f64,
	unresolved_phrases: usize,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
struct QueryReport {
	id: String,
	phrases: Vec<QueryPhrase>,
	results: Vec<ResultItem>,
	unresolved_phrases: Vec<String>,
	expected: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	hit_at_k: Option<bool>,
	recall_at_k: f64,
	rr: f64,
	latency_ms: f64,
}

#[derive(Debug, Serialize)]
struct ResultItem {
	destination_id: String,
	score: f32,
	matched_tags: Vec<String>,
}

struct Metrics {
	hit: bool,
	recall_at_k: f64,
	rr: f64,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = wander_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let records = JsonStore::from_config(&config.data).load()?;
	let service = WanderService::new(config.search.clone())?;

	service.reload(records.tags, records.destinations)?;

	let dataset = load_dataset(&args.queries)?;
	let output = evaluate(&service, dataset, args.top_k, &args.config)?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

fn evaluate(
	service: &WanderService,
	dataset: EvalDataset,
	top_k: Option<u32>,
	config_path: &Path,
) -> color_eyre::Result<EvalOutput> {
	let snapshot = service.snapshot();
	let query_count = dataset.queries.len();
	let mut reports = Vec::with_capacity(query_count);
	let mut latencies_ms = Vec::with_capacity(query_count);

	for (idx, query) in dataset.queries.into_iter().enumerate() {
		let id = query.id.unwrap_or_else(|| format!("q{}", idx + 1));
		let phrases: Vec<QueryPhrase> = query.phrases.into_iter().map(QueryPhrase::from).collect();
		let started = Instant::now();
		let response = service.search(SearchRequest {
			phrases: phrases.clone(),
			top_k: query.top_k.or(top_k),
			..SearchRequest::default()
		})?;
		let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
		let retrieved: Vec<&str> =
			response.results.iter().map(|result| result.destination_id.as_str()).collect();
		let metrics = compute_metrics(&retrieved, &query.expected);

		tracing::debug!(query_id = %id, results = retrieved.len(), latency_ms, "Query evaluated.");

		latencies_ms.push(latency_ms);
		reports.push(QueryReport {
			id,
			phrases,
			results: response
				.results
				.into_iter()
				.map(|result| ResultItem {
					destination_id: result.destination_id,
					score: result.score,
					matched_tags: result.matched_tags,
				})
				.collect(),
			unresolved_phrases: response.unresolved_phrases,
			hit_at_k: (!query.expected.is_empty()).then_some(metrics.hit),
			expected: query.expected,
			recall_at_k: metrics.recall_at_k,
			rr: metrics.rr,
			latency_ms,
		});
	}

	let summary = summarize(&reports, &latencies_ms);

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.unwrap_or_else(|| "unnamed".to_string()),
			query_count,
		},
		settings: EvalSettings {
			config_path: config_path.display().to_string(),
			top_k,
			prefix_confidence: service.cfg.prefix_confidence,
			auto_detect_language: service.cfg.auto_detect_language,
			snapshot_version: snapshot.version,
			digest: snapshot.digest.clone(),
		},
		summary,
		queries: reports,
	})
}

fn compute_metrics(retrieved: &[&str], expected: &[String]) -> Metrics {
	let expected: HashSet<&str> = expected.iter().map(String::as_str).collect();

	if expected.is_empty() {
		return Metrics { hit: false, recall_at_k: 0.0, rr: 0.0 };
	}

	let first_hit = retrieved.iter().position(|id| expected.contains(id));
	let relevant = retrieved.iter().filter(|id| expected.contains(*id)).count();

	Metrics {
		hit: first_hit.is_some(),
		recall_at_k: relevant as f64 / expected.len() as f64,
		rr: first_hit.map(|idx| 1.0 / (idx + 1) as f64).unwrap_or(0.0),
	}
}

fn summarize(reports: &[QueryReport], latencies_ms: &[f64]) -> EvalSummary {
	let judged: Vec<&QueryReport> = reports.iter().filter(|r| r.hit_at_k.is_some()).collect();
	let count = judged.len().max(1) as f64;
	let hits = judged.iter().filter(|r| r.hit_at_k == Some(true)).count();
	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(|a, b| a.total_cmp(b));

	EvalSummary {
		judged_queries: judged.len(),
		hit_rate_at_k: hits as f64 / count,
		avg_recall_at_k: judged.iter().map(|r| r.recall_at_k).sum::<f64>() / count,
		mean_rr: judged.iter().map(|r| r.rr).sum::<f64>() / count,
		unresolved_phrases: reports.iter().map(|r| r.unresolved_phrases.len()).sum(),
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
	}
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let clamped = percentile.clamp(0.0, 1.0);
	let pos = clamped * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}
