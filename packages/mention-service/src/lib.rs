pub mod autocomplete;
pub mod privacy;

mod error;

pub use autocomplete::{AutocompleteItem, AutocompleteRequest, AutocompleteResponse};
pub use error::{Error, Result};
pub use privacy::PrivacyMode;

use std::{future::Future, pin::Pin, sync::Arc};

use sqlx::PgPool;
use uuid::Uuid;

use mention_config::Config;
use mention_domain::scope::Requester;
use mention_storage::{
	db::Db,
	models::{ActivityRecord, MemberProfile, RequesterMemberships},
	queries::{self, GroupFilter, MemberPrefixQuery},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Filters applied by [`DirectoryStore::find_by_prefix`] on top of the prefix match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixFilter {
	pub exclude: Vec<Uuid>,
	pub privacy: PrivacyMode,
	pub group: Option<GroupFilter>,
}

pub trait ActivityStore
where
	Self: Send + Sync,
{
	/// Newest group messages whose sender username starts with `prefix`, at most `limit`.
	fn find_recent<'a>(
		&'a self,
		group_id: Uuid,
		prefix: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ActivityRecord>>>;
}

pub trait DirectoryStore
where
	Self: Send + Sync,
{
	/// Eligible profiles among `ids` under `privacy`, in no particular order.
	fn find_by_identities<'a>(
		&'a self,
		ids: &'a [Uuid],
		privacy: PrivacyMode,
	) -> BoxFuture<'a, Result<Vec<MemberProfile>>>;

	/// Eligible profiles whose lower-cased username starts with `prefix`, most recently logged in
	/// first, at most `limit`.
	fn find_by_prefix<'a>(
		&'a self,
		prefix: &'a str,
		filter: &'a PrefixFilter,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<MemberProfile>>>;

	/// Party and guild memberships of `member_id`, or `None` for an unknown member.
	fn find_requester<'a>(
		&'a self,
		member_id: Uuid,
	) -> BoxFuture<'a, Result<Option<RequesterMemberships>>>;
}

#[derive(Clone)]
pub struct Stores {
	pub activity: Arc<dyn ActivityStore>,
	pub directory: Arc<dyn DirectoryStore>,
}
impl Stores {
	pub fn new(activity: Arc<dyn ActivityStore>, directory: Arc<dyn DirectoryStore>) -> Self {
		Self { activity, directory }
	}

	pub fn postgres(pool: PgPool) -> Self {
		let stores = Arc::new(PgStores { pool });

		Self { activity: stores.clone(), directory: stores }
	}
}

pub struct MentionService {
	pub cfg: Config,
	pub stores: Stores,
}
impl MentionService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, stores: Stores::postgres(db.pool) }
	}

	pub fn with_stores(cfg: Config, stores: Stores) -> Self {
		Self { cfg, stores }
	}

	/// Resolves the party and guild memberships of an authenticated member.
	pub async fn load_requester(&self, member_id: Uuid) -> Result<Option<Requester>> {
		let memberships = self.stores.directory.find_requester(member_id).await?;

		Ok(memberships.map(|row| Requester { party_id: row.party_id, guild_ids: row.guild_ids }))
	}
}

struct PgStores {
	pool: PgPool,
}

impl ActivityStore for PgStores {
	fn find_recent<'a>(
		&'a self,
		group_id: Uuid,
		prefix: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ActivityRecord>>> {
		Box::pin(async move {
			Ok(queries::find_recent_activity(&self.pool, group_id, prefix, limit).await?)
		})
	}
}

impl DirectoryStore for PgStores {
	fn find_by_identities<'a>(
		&'a self,
		ids: &'a [Uuid],
		privacy: PrivacyMode,
	) -> BoxFuture<'a, Result<Vec<MemberProfile>>> {
		Box::pin(async move {
			Ok(queries::find_members_by_ids(&self.pool, ids, privacy.enforces_searchable()).await?)
		})
	}

	fn find_by_prefix<'a>(
		&'a self,
		prefix: &'a str,
		filter: &'a PrefixFilter,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<MemberProfile>>> {
		Box::pin(async move {
			let query = MemberPrefixQuery {
				prefix,
				exclude: filter.exclude.as_slice(),
				enforce_searchable: filter.privacy.enforces_searchable(),
				group: filter.group,
				limit,
			};

			Ok(queries::find_members_by_prefix(&self.pool, &query).await?)
		})
	}

	fn find_requester<'a>(
		&'a self,
		member_id: Uuid,
	) -> BoxFuture<'a, Result<Option<RequesterMemberships>>> {
		Box::pin(async move { Ok(queries::find_requester(&self.pool, member_id).await?) })
	}
}
