use clap::Parser;

use wander_eval::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	wander_eval::run(args)
}
