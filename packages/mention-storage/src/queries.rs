use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{ActivityRecord, MemberProfile, RequesterMemberships},
};

const MEMBER_COLUMNS: &str = "\
member_id, display_name, username, lower_case_username, verified_username, blocked, \
chat_revoked, searchable_username, party_id, guild_ids, contributor_level, last_login_at";

/// Restricts a member lookup to the members of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFilter {
	Party(Uuid),
	Guild(Uuid),
}

#[derive(Debug, Clone)]
pub struct MemberPrefixQuery<'a> {
	pub prefix: &'a str,
	pub exclude: &'a [Uuid],
	pub enforce_searchable: bool,
	pub group: Option<GroupFilter>,
	pub limit: u32,
}

/// Builds a `LIKE` pattern matching strings that start with `prefix` literally.
pub fn prefix_pattern(prefix: &str) -> String {
	let mut pattern = String::with_capacity(prefix.len() + 1);

	for ch in prefix.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			pattern.push('\\');
		}

		pattern.push(ch);
	}

	pattern.push('%');

	pattern
}

pub async fn find_recent_activity<'e, E>(
	executor: E,
	group_id: Uuid,
	prefix: &str,
	limit: u32,
) -> Result<Vec<ActivityRecord>>
where
	E: PgExecutor<'e>,
{
	if limit == 0 {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, ActivityRecord>(
		"\
SELECT message_id, group_id, sender_id, sender_username, created_at
FROM group_messages
WHERE group_id = $1
	AND lower(sender_username) LIKE $2
ORDER BY created_at DESC, message_id DESC
LIMIT $3",
	)
	.bind(group_id)
	.bind(prefix_pattern(prefix))
	.bind(i64::from(limit))
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Loads the eligible profiles among `ids`. Order of the returned rows is unspecified.
pub async fn find_members_by_ids<'e, E>(
	executor: E,
	ids: &[Uuid],
	enforce_searchable: bool,
) -> Result<Vec<MemberProfile>>
where
	E: PgExecutor<'e>,
{
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let mut builder = QueryBuilder::<Postgres>::new(format!(
		"SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = ANY("
	));

	builder.push_bind(ids.to_vec());
	builder.push(")");
	push_privacy_filter(&mut builder, enforce_searchable);

	let rows = builder.build_query_as::<MemberProfile>().fetch_all(executor).await?;

	Ok(rows)
}

/// Prefix search over eligible profiles, most recently logged in first.
pub async fn find_members_by_prefix<'e, E>(
	executor: E,
	query: &MemberPrefixQuery<'_>,
) -> Result<Vec<MemberProfile>>
where
	E: PgExecutor<'e>,
{
	if query.limit == 0 {
		return Ok(Vec::new());
	}

	let mut builder = QueryBuilder::<Postgres>::new(format!(
		"SELECT {MEMBER_COLUMNS} FROM members WHERE lower_case_username LIKE "
	));

	builder.push_bind(prefix_pattern(query.prefix));
	push_privacy_filter(&mut builder, query.enforce_searchable);

	if !query.exclude.is_empty() {
		builder.push(" AND NOT (member_id = ANY(");
		builder.push_bind(query.exclude.to_vec());
		builder.push("))");
	}

	match query.group {
		Some(GroupFilter::Party(party_id)) => {
			builder.push(" AND party_id = ");
			builder.push_bind(party_id);
		},
		Some(GroupFilter::Guild(guild_id)) => {
			builder.push(" AND ");
			builder.push_bind(guild_id);
			builder.push(" = ANY(guild_ids)");
		},
		None => {},
	}

	builder.push(" ORDER BY last_login_at DESC, member_id ASC LIMIT ");
	builder.push_bind(i64::from(query.limit));

	let rows = builder.build_query_as::<MemberProfile>().fetch_all(executor).await?;

	Ok(rows)
}

pub async fn find_requester<'e, E>(
	executor: E,
	member_id: Uuid,
) -> Result<Option<RequesterMemberships>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, RequesterMemberships>(
		"\
SELECT member_id, party_id, guild_ids
FROM members
WHERE member_id = $1",
	)
	.bind(member_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn insert_member<'e, E>(executor: E, member: &MemberProfile) -> Result<()>
where
	E: PgExecutor<'e>,
{
	if member.username.trim().is_empty() {
		return Err(Error::InvalidArgument("username must be non-empty.".to_string()));
	}

	sqlx::query(
		"\
INSERT INTO members (
	member_id,
	display_name,
	username,
	verified_username,
	blocked,
	chat_revoked,
	searchable_username,
	party_id,
	guild_ids,
	contributor_level,
	last_login_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
	)
	.bind(member.member_id)
	.bind(member.display_name.as_str())
	.bind(member.username.as_str())
	.bind(member.verified_username)
	.bind(member.blocked)
	.bind(member.chat_revoked)
	.bind(member.searchable_username)
	.bind(member.party_id)
	.bind(member.guild_ids.as_slice())
	.bind(member.contributor_level)
	.bind(member.last_login_at)
	.execute(executor)
	.await?;

	Ok(())
}

/// Renames a member. The store recomputes `lower_case_username` from the new value.
pub async fn set_username<'e, E>(executor: E, member_id: Uuid, username: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	if username.trim().is_empty() {
		return Err(Error::InvalidArgument("username must be non-empty.".to_string()));
	}

	let result = sqlx::query("UPDATE members SET username = $1 WHERE member_id = $2")
		.bind(username)
		.bind(member_id)
		.execute(executor)
		.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("member {member_id}")));
	}

	Ok(())
}

pub async fn insert_activity<'e, E>(executor: E, record: &ActivityRecord) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO group_messages (message_id, group_id, sender_id, sender_username, created_at)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(record.message_id)
	.bind(record.group_id)
	.bind(record.sender_id)
	.bind(record.sender_username.as_str())
	.bind(record.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

fn push_privacy_filter(builder: &mut QueryBuilder<'_, Postgres>, enforce_searchable: bool) {
	builder.push(" AND verified_username AND NOT blocked AND NOT chat_revoked");

	if enforce_searchable {
		builder.push(" AND searchable_username IS DISTINCT FROM false");
	}
}
