use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MemberProfile {
	pub member_id: Uuid,
	pub display_name: String,
	pub username: String,
	/// Generated by the store from `username`; never written directly.
	pub lower_case_username: String,
	pub verified_username: bool,
	pub blocked: bool,
	pub chat_revoked: bool,
	/// `None` means the member never changed the preference, which counts as searchable.
	pub searchable_username: Option<bool>,
	pub party_id: Option<Uuid>,
	pub guild_ids: Vec<Uuid>,
	pub contributor_level: Option<i16>,
	pub last_login_at: OffsetDateTime,
}
impl MemberProfile {
	pub fn is_searchable(&self) -> bool {
		self.searchable_username != Some(false)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ActivityRecord {
	pub message_id: Uuid,
	pub group_id: Uuid,
	pub sender_id: Uuid,
	pub sender_username: String,
	pub created_at: OffsetDateTime,
}

/// Party and guild memberships used to authorize a scoped search.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct RequesterMemberships {
	pub member_id: Uuid,
	pub party_id: Option<Uuid>,
	pub guild_ids: Vec<Uuid>,
}
