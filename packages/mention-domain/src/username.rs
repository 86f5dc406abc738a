/// Turns raw autocomplete input into the prefix matched against lower-cased usernames.
///
/// A single leading `@` is dropped and the rest is case-folded. Returns `None` when nothing is
/// left to match, so callers never issue a prefix query that would match every member.
pub fn normalize_prefix(raw: &str) -> Option<String> {
	let stripped = raw.strip_prefix('@').unwrap_or(raw);
	let prefix = stripped.to_lowercase();

	if prefix.is_empty() { None } else { Some(prefix) }
}
