pub mod server;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use wander_config::{Config, Security};
use wander_service::WanderService;
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
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum McpAuthState {
	Off,
	StaticToken { bearer_token: String },
}

pub async fn run(args: Args) -> Result<()> {
	let config = wander_config::load(&args.config)?;

	init_tracing(&config);

	let auth_state = build_auth_state(&config.security, &config.service.mcp_bind)?;
	let store = JsonStore::from_config(&config.data);
	let service = WanderService::new(config.search.clone())?;
	let records = store.load()?;

	service.reload(records.tags, records.destinations)?;

	server::serve_mcp(&config.service.mcp_bind, auth_state, Arc::new(service), store).await
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_auth_state(security: &Security, mcp_bind: &str) -> Result<McpAuthState> {
	match security.auth_mode.trim() {
		"off" => {
			enforce_loopback_for_off_mode(mcp_bind)?;

			Ok(McpAuthState::Off)
		},
		"static_token" => {
			let token = security.auth_token.as_deref().map(str::trim).unwrap_or_default();

			if token.is_empty() {
				return Err(eyre::eyre!(
					"security.auth_mode=static_token requires a non-empty security.auth_token."
				));
			}

			Ok(McpAuthState::StaticToken { bearer_token: token.to_string() })
		},
		other => Err(eyre::eyre!(
			"security.auth_mode must be one of off or static_token for wander-mcp, got {other}."
		)),
	}
}

fn enforce_loopback_for_off_mode(mcp_bind: &str) -> Result<()> {
	let bind_addr: SocketAddr = mcp_bind.parse().map_err(|err| {
		eyre::eyre!(
			"service.mcp_bind must be a valid socket address when security.auth_mode=off: {err}"
		)
	})?;

	if !bind_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"service.mcp_bind must be a loopback address when security.auth_mode=off."
		));
	}

	Ok(())
}
