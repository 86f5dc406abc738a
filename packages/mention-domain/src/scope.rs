use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Social context an autocomplete call asks to be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeContext {
	Party,
	PrivateGuild,
	PublicGuild,
	Tavern,
}
impl ScopeContext {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"party" => Some(Self::Party),
			"privateGuild" => Some(Self::PrivateGuild),
			"publicGuild" => Some(Self::PublicGuild),
			"tavern" => Some(Self::Tavern),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Party => "party",
			Self::PrivateGuild => "privateGuild",
			Self::PublicGuild => "publicGuild",
			Self::Tavern => "tavern",
		}
	}
}

/// Group memberships of the member issuing the search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requester {
	pub party_id: Option<Uuid>,
	pub guild_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
	Party,
	Guild,
	Tavern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	Private,
	Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
	pub group_id: Uuid,
	pub kind: GroupKind,
	pub visibility: Visibility,
}
impl Scope {
	pub fn is_private(&self) -> bool {
		self.visibility == Visibility::Private
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDecision {
	Unscoped,
	Scoped(Scope),
	/// The requester may not search this group. Callers must answer exactly as they would for a
	/// search with no matches.
	Denied,
}

/// Decides which group, if any, a search is restricted to.
///
/// Private groups (party, private guild) require membership. Public guilds and the tavern are
/// open to every requester. A context that needs a group id but has none is denied.
pub fn authorize(
	context: Option<ScopeContext>,
	group_id: Option<Uuid>,
	requester: &Requester,
	tavern_id: Uuid,
) -> ScopeDecision {
	let Some(context) = context else {
		return ScopeDecision::Unscoped;
	};

	match (context, group_id) {
		(ScopeContext::Tavern, _) => ScopeDecision::Scoped(Scope {
			group_id: tavern_id,
			kind: GroupKind::Tavern,
			visibility: Visibility::Public,
		}),
		(ScopeContext::Party, Some(group_id)) if requester.party_id == Some(group_id) =>
			ScopeDecision::Scoped(Scope {
				group_id,
				kind: GroupKind::Party,
				visibility: Visibility::Private,
			}),
		(ScopeContext::PrivateGuild, Some(group_id)) if requester.guild_ids.contains(&group_id) =>
			ScopeDecision::Scoped(Scope {
				group_id,
				kind: GroupKind::Guild,
				visibility: Visibility::Private,
			}),
		(ScopeContext::PublicGuild, Some(group_id)) => ScopeDecision::Scoped(Scope {
			group_id,
			kind: GroupKind::Guild,
			visibility: Visibility::Public,
		}),
		_ => ScopeDecision::Denied,
	}
}
