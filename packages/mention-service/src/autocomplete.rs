use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	MentionService, PrefixFilter, Result,
	privacy::{self, PrivacyMode},
};
use mention_domain::{
	scope::{self, GroupKind, Requester, Scope, ScopeContext, ScopeDecision},
	username,
};
use mention_storage::{
	models::{ActivityRecord, MemberProfile},
	queries::GroupFilter,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteRequest {
	/// Raw user input, possibly starting with `@`.
	pub username: String,
	pub context: Option<ScopeContext>,
	pub group_id: Option<Uuid>,
	pub requester_party_id: Option<Uuid>,
	#[serde(default)]
	pub requester_guild_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteItem {
	pub id: Uuid,
	pub display_name: String,
	pub username: String,
	pub contributor_level: Option<i16>,
}
impl From<MemberProfile> for AutocompleteItem {
	fn from(member: MemberProfile) -> Self {
		Self {
			id: member.member_id,
			display_name: member.display_name,
			username: member.username,
			contributor_level: member.contributor_level,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
	pub items: Vec<AutocompleteItem>,
}

/// Members picked so far plus the budget left for later phases.
#[derive(Debug)]
struct Candidates {
	members: Vec<MemberProfile>,
	seen: HashSet<Uuid>,
	limit: usize,
}
impl Candidates {
	fn new(limit: usize) -> Self {
		Self { members: Vec::with_capacity(limit), seen: HashSet::with_capacity(limit), limit }
	}

	fn remaining(&self) -> usize {
		self.limit.saturating_sub(self.members.len())
	}

	fn excluded(&self) -> Vec<Uuid> {
		self.members.iter().map(|member| member.member_id).collect()
	}

	fn extend(mut self, batch: Vec<MemberProfile>) -> Self {
		for member in batch {
			if self.remaining() == 0 {
				break;
			}
			if self.seen.insert(member.member_id) {
				self.members.push(member);
			}
		}

		self
	}

	fn into_response(self) -> AutocompleteResponse {
		let items = self.members.into_iter().map(AutocompleteItem::from).collect();

		AutocompleteResponse { items }
	}
}

impl MentionService {
	/// Suggests up to `autocomplete.result_limit` members whose username starts with the input.
	///
	/// Recent chatters of the scoped group come first, then the best remaining directory matches.
	/// An unauthorized scope yields the same empty response as a search without matches.
	pub async fn resolve_autocomplete(
		&self,
		req: AutocompleteRequest,
	) -> Result<AutocompleteResponse> {
		let Some(prefix) = username::normalize_prefix(&req.username) else {
			return Ok(AutocompleteResponse::default());
		};
		let requester =
			Requester { party_id: req.requester_party_id, guild_ids: req.requester_guild_ids };
		let scope = match scope::authorize(
			req.context,
			req.group_id,
			&requester,
			self.cfg.autocomplete.tavern_id,
		) {
			ScopeDecision::Unscoped => None,
			ScopeDecision::Scoped(scope) => Some(scope),
			ScopeDecision::Denied => {
				tracing::debug!(
					context = req.context.map(ScopeContext::as_str),
					"Autocomplete scope denied."
				);

				return Ok(AutocompleteResponse::default());
			},
		};
		let candidates = Candidates::new(self.cfg.autocomplete.result_limit as usize);
		let candidates = match scope.as_ref() {
			Some(scope) => self.collect_recent(scope, &prefix, candidates).await?,
			None => candidates,
		};
		let recent_count = candidates.members.len();
		let candidates = self.fill_from_directory(scope.as_ref(), &prefix, candidates).await?;

		tracing::debug!(
			scoped = scope.is_some(),
			recent = recent_count,
			fallback = candidates.members.len() - recent_count,
			"Autocomplete resolved."
		);

		Ok(candidates.into_response())
	}

	async fn collect_recent(
		&self,
		scope: &Scope,
		prefix: &str,
		candidates: Candidates,
	) -> Result<Candidates> {
		let records = self
			.stores
			.activity
			.find_recent(scope.group_id, prefix, self.cfg.autocomplete.activity_scan_window)
			.await
			.inspect_err(|err| {
				tracing::warn!(error = %err, phase = "recent", "Autocomplete store call failed.")
			})?;

		if records.is_empty() {
			return Ok(candidates);
		}

		let sender_ids = unique_senders(&records);
		let mode = PrivacyMode::for_scope(Some(scope));
		let profiles = self
			.stores
			.directory
			.find_by_identities(&sender_ids, mode)
			.await
			.inspect_err(|err| {
				tracing::warn!(error = %err, phase = "recent", "Autocomplete store call failed.")
			})?;
		let ranked = rank_recent(profiles, &sender_ids, mode, candidates.remaining());

		Ok(candidates.extend(ranked))
	}

	async fn fill_from_directory(
		&self,
		scope: Option<&Scope>,
		prefix: &str,
		candidates: Candidates,
	) -> Result<Candidates> {
		let remaining = candidates.remaining();

		if remaining == 0 {
			return Ok(candidates);
		}

		let filter = PrefixFilter {
			exclude: candidates.excluded(),
			privacy: PrivacyMode::for_scope(scope),
			group: scope.and_then(group_filter),
		};
		let found = self
			.stores
			.directory
			.find_by_prefix(prefix, &filter, remaining as u32)
			.await
			.inspect_err(|err| {
				tracing::warn!(error = %err, phase = "fallback", "Autocomplete store call failed.")
			})?;
		let found = found
			.into_iter()
			.filter(|member| privacy::member_visible(member, filter.privacy))
			.collect();

		Ok(candidates.extend(found))
	}
}

/// Sender ids in order of their most recent message.
fn unique_senders(records: &[ActivityRecord]) -> Vec<Uuid> {
	let mut seen = HashSet::with_capacity(records.len());

	records.iter().map(|record| record.sender_id).filter(|id| seen.insert(*id)).collect()
}

/// Orders recent chatters by last login, keeping activity order between equal logins.
fn rank_recent(
	profiles: Vec<MemberProfile>,
	sender_ids: &[Uuid],
	mode: PrivacyMode,
	budget: usize,
) -> Vec<MemberProfile> {
	let position = |id: &Uuid| sender_ids.iter().position(|sender| sender == id);
	let mut ranked = profiles
		.into_iter()
		.filter(|member| privacy::member_visible(member, mode))
		.filter_map(|member| position(&member.member_id).map(|rank| (rank, member)))
		.collect::<Vec<_>>();

	ranked.sort_by(|(a_rank, a), (b_rank, b)| {
		b.last_login_at.cmp(&a.last_login_at).then_with(|| a_rank.cmp(b_rank))
	});
	ranked.dedup_by_key(|(rank, _)| *rank);
	ranked.truncate(budget);

	ranked.into_iter().map(|(_, member)| member).collect()
}

fn group_filter(scope: &Scope) -> Option<GroupFilter> {
	match scope.kind {
		GroupKind::Party => Some(GroupFilter::Party(scope.group_id)),
		GroupKind::Guild => Some(GroupFilter::Guild(scope.group_id)),
		GroupKind::Tavern => None,
	}
}
