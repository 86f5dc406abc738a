use std::{
	cmp::Reverse,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use uuid::Uuid;

use mention_service::{
	ActivityStore, BoxFuture, DirectoryStore, Error, PrefixFilter, PrivacyMode, Result, Stores,
};
use mention_storage::{
	models::{ActivityRecord, MemberProfile, RequesterMemberships},
	queries::GroupFilter,
};

/// Number of calls made to each store method.
#[derive(Debug, Default)]
pub struct Calls {
	pub recent: AtomicUsize,
	pub identities: AtomicUsize,
	pub prefix: AtomicUsize,
	pub requester: AtomicUsize,
}
impl Calls {
	pub fn get(counter: &AtomicUsize) -> usize {
		counter.load(Ordering::SeqCst)
	}

	pub fn total(&self) -> usize {
		Self::get(&self.recent)
			+ Self::get(&self.identities)
			+ Self::get(&self.prefix)
			+ Self::get(&self.requester)
	}
}

/// Vector-backed stores applying the same filters and ordering as the Postgres queries.
pub struct MemoryStores {
	pub members: Vec<MemberProfile>,
	pub activity: Vec<ActivityRecord>,
	pub calls: Arc<Calls>,
	/// Makes `find_by_prefix` fail with a storage error.
	pub fail_prefix: bool,
	/// Skips privacy, exclusion and limit handling, returning every prefix match of the group.
	pub ignore_filters: bool,
}
impl MemoryStores {
	pub fn new(members: Vec<MemberProfile>, activity: Vec<ActivityRecord>) -> Self {
		Self {
			members,
			activity,
			calls: Arc::new(Calls::default()),
			fail_prefix: false,
			ignore_filters: false,
		}
	}

	/// Wraps the stores for a service, keeping a handle on the call counters.
	pub fn into_stores(self) -> (Stores, Arc<Calls>) {
		let calls = self.calls.clone();
		let shared = Arc::new(self);

		(Stores::new(shared.clone(), shared), calls)
	}

	fn eligible(&self, member: &MemberProfile, privacy: PrivacyMode) -> bool {
		self.ignore_filters
			|| (member.verified_username
				&& !member.blocked
				&& !member.chat_revoked
				&& (!privacy.enforces_searchable() || member.is_searchable()))
	}
}
impl ActivityStore for MemoryStores {
	fn find_recent<'a>(
		&'a self,
		group_id: Uuid,
		prefix: &'a str,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<ActivityRecord>>> {
		self.calls.recent.fetch_add(1, Ordering::SeqCst);

		let mut records = self
			.activity
			.iter()
			.filter(|record| record.group_id == group_id)
			.filter(|record| record.sender_username.to_lowercase().starts_with(prefix))
			.cloned()
			.collect::<Vec<_>>();

		records.sort_by_key(|record| Reverse(record.created_at));
		records.truncate(limit as usize);

		Box::pin(async move { Ok(records) })
	}
}
impl DirectoryStore for MemoryStores {
	fn find_by_identities<'a>(
		&'a self,
		ids: &'a [Uuid],
		privacy: PrivacyMode,
	) -> BoxFuture<'a, Result<Vec<MemberProfile>>> {
		self.calls.identities.fetch_add(1, Ordering::SeqCst);

		let mut found = self
			.members
			.iter()
			.filter(|member| ids.contains(&member.member_id))
			.filter(|member| self.eligible(member, privacy))
			.cloned()
			.collect::<Vec<_>>();

		// Unordered by contract.
		found.reverse();

		Box::pin(async move { Ok(found) })
	}

	fn find_by_prefix<'a>(
		&'a self,
		prefix: &'a str,
		filter: &'a PrefixFilter,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<MemberProfile>>> {
		self.calls.prefix.fetch_add(1, Ordering::SeqCst);

		if self.fail_prefix {
			return Box::pin(async move {
				Err(Error::Storage { message: "directory unavailable".to_string() })
			});
		}

		let mut found = self
			.members
			.iter()
			.filter(|member| member.lower_case_username.starts_with(prefix))
			.filter(|member| self.eligible(member, filter.privacy))
			.filter(|member| self.ignore_filters || !filter.exclude.contains(&member.member_id))
			.filter(|member| match filter.group {
				Some(GroupFilter::Party(party_id)) => member.party_id == Some(party_id),
				Some(GroupFilter::Guild(guild_id)) => member.guild_ids.contains(&guild_id),
				None => true,
			})
			.cloned()
			.collect::<Vec<_>>();

		found.sort_by_key(|member| Reverse(member.last_login_at));

		if !self.ignore_filters {
			found.truncate(limit as usize);
		}

		Box::pin(async move { Ok(found) })
	}

	fn find_requester<'a>(
		&'a self,
		member_id: Uuid,
	) -> BoxFuture<'a, Result<Option<RequesterMemberships>>> {
		self.calls.requester.fetch_add(1, Ordering::SeqCst);

		let found = self.members.iter().find(|member| member.member_id == member_id).map(|member| {
			RequesterMemberships {
				member_id: member.member_id,
				party_id: member.party_id,
				guild_ids: member.guild_ids.clone(),
			}
		});

		Box::pin(async move { Ok(found) })
	}
}
