use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = mention_api::Args::parse();

	mention_api::run(args).await
}
