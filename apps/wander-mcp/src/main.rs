use clap::Parser;

use wander_mcp::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	wander_mcp::run(args).await
}
