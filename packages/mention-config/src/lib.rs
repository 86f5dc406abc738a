mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Autocomplete, Config, DEFAULT_ACTIVITY_SCAN_WINDOW, DEFAULT_CACHE_MAX_AGE_SECS,
	DEFAULT_REQUESTER_HEADER, DEFAULT_RESULT_LIMIT, DEFAULT_TAVERN_ID, Http, Postgres, Security,
	Service, Storage,
};

use std::{fs, path::Path};

/// Upper bound for `autocomplete.result_limit`; autocomplete lists are meant to stay short.
pub const MAX_RESULT_LIMIT: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.autocomplete.result_limit == 0 {
		return Err(Error::Validation {
			message: "autocomplete.result_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.autocomplete.result_limit > MAX_RESULT_LIMIT {
		return Err(Error::Validation {
			message: format!("autocomplete.result_limit must be {MAX_RESULT_LIMIT} or less."),
		});
	}
	if cfg.autocomplete.activity_scan_window < cfg.autocomplete.result_limit {
		return Err(Error::Validation {
			message:
				"autocomplete.activity_scan_window must be greater than or equal to autocomplete.result_limit."
					.to_string(),
		});
	}
	if cfg.http.requester_header.trim().is_empty() {
		return Err(Error::Validation {
			message: "http.requester_header must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let header = cfg.http.requester_header.trim();

	if header.is_empty() {
		cfg.http.requester_header = DEFAULT_REQUESTER_HEADER.to_string();
	} else if header.len() != cfg.http.requester_header.len() {
		cfg.http.requester_header = header.to_string();
	}
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
