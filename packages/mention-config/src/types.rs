use serde::Deserialize;
use uuid::Uuid;

/// Maximum number of members returned by one autocomplete call.
pub const DEFAULT_RESULT_LIMIT: u32 = 5;
/// Number of recent group messages scanned when collecting recent candidates.
pub const DEFAULT_ACTIVITY_SCAN_WINDOW: u32 = 200;
/// Fixed id of the global public tavern group.
pub const DEFAULT_TAVERN_ID: Uuid = Uuid::from_u128(0x00000000_0000_4000_a000_000000000000);
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 300;
pub const DEFAULT_REQUESTER_HEADER: &str = "X-Mention-Member-Id";

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub autocomplete: Autocomplete,
	#[serde(default)]
	pub http: Http,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Autocomplete {
	pub result_limit: u32,
	pub activity_scan_window: u32,
	pub tavern_id: Uuid,
}
impl Default for Autocomplete {
	fn default() -> Self {
		Self {
			result_limit: DEFAULT_RESULT_LIMIT,
			activity_scan_window: DEFAULT_ACTIVITY_SCAN_WINDOW,
			tavern_id: DEFAULT_TAVERN_ID,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Http {
	/// `max-age` of the `Cache-Control: private` header on autocomplete responses.
	pub cache_max_age_secs: u64,
	/// Header carrying the authenticated member id, set by the upstream auth layer.
	pub requester_header: String,
}
impl Default for Http {
	fn default() -> Self {
		Self {
			cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
			requester_header: DEFAULT_REQUESTER_HEADER.to_string(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}
