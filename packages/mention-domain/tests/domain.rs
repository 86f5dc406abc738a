use uuid::Uuid;

use mention_domain::{
	scope::{self, GroupKind, Requester, Scope, ScopeContext, ScopeDecision, Visibility},
	username,
};

const TAVERN: Uuid = Uuid::from_u128(0x00000000_0000_4000_a000_000000000000);

fn requester(party: u128, guilds: &[u128]) -> Requester {
	Requester {
		party_id: Some(Uuid::from_u128(party)),
		guild_ids: guilds.iter().copied().map(Uuid::from_u128).collect(),
	}
}

#[test]
fn strips_one_leading_at_and_lowercases() {
	assert_eq!(username::normalize_prefix("@AnNa").as_deref(), Some("anna"));
	assert_eq!(username::normalize_prefix("@@bob").as_deref(), Some("@bob"));
	assert_eq!(username::normalize_prefix("Carl@").as_deref(), Some("carl@"));
}

#[test]
fn empty_input_has_no_prefix() {
	assert_eq!(username::normalize_prefix(""), None);
	assert_eq!(username::normalize_prefix("@"), None);
}

#[test]
fn missing_context_is_unscoped() {
	let decision = scope::authorize(None, Some(Uuid::from_u128(9)), &requester(1, &[]), TAVERN);

	assert_eq!(decision, ScopeDecision::Unscoped);
}

#[test]
fn own_party_is_private_scope() {
	let decision = scope::authorize(
		Some(ScopeContext::Party),
		Some(Uuid::from_u128(1)),
		&requester(1, &[]),
		TAVERN,
	);

	assert_eq!(
		decision,
		ScopeDecision::Scoped(Scope {
			group_id: Uuid::from_u128(1),
			kind: GroupKind::Party,
			visibility: Visibility::Private,
		})
	);
}

#[test]
fn foreign_party_is_denied() {
	let decision = scope::authorize(
		Some(ScopeContext::Party),
		Some(Uuid::from_u128(2)),
		&requester(1, &[]),
		TAVERN,
	);

	assert_eq!(decision, ScopeDecision::Denied);
}

#[test]
fn partyless_requester_cannot_scope_to_a_party() {
	let decision = scope::authorize(
		Some(ScopeContext::Party),
		Some(Uuid::from_u128(2)),
		&Requester::default(),
		TAVERN,
	);

	assert_eq!(decision, ScopeDecision::Denied);
}

#[test]
fn private_guild_requires_membership() {
	let member = requester(1, &[10, 11]);
	let allowed = scope::authorize(
		Some(ScopeContext::PrivateGuild),
		Some(Uuid::from_u128(11)),
		&member,
		TAVERN,
	);
	let denied = scope::authorize(
		Some(ScopeContext::PrivateGuild),
		Some(Uuid::from_u128(12)),
		&member,
		TAVERN,
	);

	assert!(matches!(allowed, ScopeDecision::Scoped(scope) if scope.is_private()));
	assert_eq!(denied, ScopeDecision::Denied);
}

#[test]
fn public_guild_does_not_check_membership() {
	let decision = scope::authorize(
		Some(ScopeContext::PublicGuild),
		Some(Uuid::from_u128(42)),
		&Requester::default(),
		TAVERN,
	);

	assert_eq!(
		decision,
		ScopeDecision::Scoped(Scope {
			group_id: Uuid::from_u128(42),
			kind: GroupKind::Guild,
			visibility: Visibility::Public,
		})
	);
}

#[test]
fn tavern_always_uses_the_fixed_group() {
	let decision = scope::authorize(
		Some(ScopeContext::Tavern),
		Some(Uuid::from_u128(77)),
		&Requester::default(),
		TAVERN,
	);

	assert_eq!(
		decision,
		ScopeDecision::Scoped(Scope {
			group_id: TAVERN,
			kind: GroupKind::Tavern,
			visibility: Visibility::Public,
		})
	);
}

#[test]
fn group_context_without_id_is_denied() {
	for context in [ScopeContext::Party, ScopeContext::PrivateGuild, ScopeContext::PublicGuild] {
		assert_eq!(
			scope::authorize(Some(context), None, &requester(1, &[1]), TAVERN),
			ScopeDecision::Denied,
			"context {} without an id must be denied",
			context.as_str()
		);
	}
}

#[test]
fn context_names_round_trip() {
	for context in [
		ScopeContext::Party,
		ScopeContext::PrivateGuild,
		ScopeContext::PublicGuild,
		ScopeContext::Tavern,
	] {
		assert_eq!(ScopeContext::parse(context.as_str()), Some(context));

		let json = serde_json::to_value(context).expect("Failed to serialize context.");

		assert_eq!(json, serde_json::Value::String(context.as_str().to_string()));
	}

	assert_eq!(ScopeContext::parse("guild"), None);
}
