use std::sync::Arc;

use mention_config::Config;
use mention_service::{MentionService, Stores};
use mention_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MentionService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = MentionService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}

	/// Builds the state over caller-provided stores instead of Postgres.
	pub fn with_stores(config: Config, stores: Stores) -> Self {
		Self { service: Arc::new(MentionService::with_stores(config, stores)) }
	}
}
