use mention_domain::scope::Scope;
use mention_storage::models::MemberProfile;

/// How strictly member privacy preferences apply to a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyMode {
	/// Members who opted out of username search are hidden.
	Strict,
	/// Opt-out is ignored. Only used inside a private group the requester belongs to.
	Relaxed,
}
impl PrivacyMode {
	pub fn for_scope(scope: Option<&Scope>) -> Self {
		match scope {
			Some(scope) if scope.is_private() => Self::Relaxed,
			_ => Self::Strict,
		}
	}

	pub fn enforces_searchable(self) -> bool {
		self == Self::Strict
	}
}

pub(crate) fn member_visible(member: &MemberProfile, mode: PrivacyMode) -> bool {
	if !member.verified_username || member.blocked || member.chat_revoked {
		return false;
	}

	!mode.enforces_searchable() || member.is_searchable()
}
