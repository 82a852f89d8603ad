mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Data, Search, Security, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg, path.parent());

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.mcp_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.mcp_bind must be non-empty.".to_string(),
		});
	}
	if cfg.data.tags_path.as_os_str().is_empty() {
		return Err(Error::Validation { message: "data.tags_path must be non-empty.".to_string() });
	}
	if cfg.data.destinations_path.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "data.destinations_path must be non-empty.".to_string(),
		});
	}

	validate_search(cfg)?;
	validate_security(cfg)?;

	Ok(())
}

fn validate_search(cfg: &Config) -> Result<()> {
	let search = &cfg.search;

	if !search.prefix_confidence.is_finite() {
		return Err(Error::Validation {
			message: "search.prefix_confidence must be a finite number.".to_string(),
		});
	}
	if search.prefix_confidence <= 0.0 || search.prefix_confidence >= 1.0 {
		return Err(Error::Validation {
			message: "search.prefix_confidence must be greater than 0.0 and less than 1.0."
				.to_string(),
		});
	}
	if search.default_top_k == 0 {
		return Err(Error::Validation {
			message: "search.default_top_k must be greater than zero.".to_string(),
		});
	}
	if search.max_top_k < search.default_top_k {
		return Err(Error::Validation {
			message: "search.max_top_k must be greater than or equal to search.default_top_k."
				.to_string(),
		});
	}
	if search.tag_search_limit == 0 {
		return Err(Error::Validation {
			message: "search.tag_search_limit must be greater than zero.".to_string(),
		});
	}
	if !is_language_code(&search.fallback_language) {
		return Err(Error::Validation {
			message: format!(
				"search.fallback_language must be a lowercase language code, got {:?}.",
				search.fallback_language
			),
		});
	}

	Ok(())
}

fn validate_security(cfg: &Config) -> Result<()> {
	match cfg.security.auth_mode.as_str() {
		"off" => Ok(()),
		"static_token" => {
			if cfg.security.auth_token.is_none() {
				return Err(Error::Validation {
					message: "security.auth_token must be non-empty when security.auth_mode=static_token."
						.to_string(),
				});
			}

			Ok(())
		},
		other => Err(Error::Validation {
			message: format!("security.auth_mode must be one of off or static_token, got {other}."),
		}),
	}
}

fn normalize(cfg: &mut Config, base_dir: Option<&Path>) {
	if let Some(base_dir) = base_dir {
		if is_relative_path(&cfg.data.tags_path) {
			cfg.data.tags_path = base_dir.join(&cfg.data.tags_path);
		}
		if is_relative_path(&cfg.data.destinations_path) {
			cfg.data.destinations_path = base_dir.join(&cfg.data.destinations_path);
		}
	}
	if cfg.security.auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
		cfg.security.auth_token = None;
	}

	cfg.search.fallback_language = cfg.search.fallback_language.trim().to_ascii_lowercase();
}

fn is_relative_path(path: &Path) -> bool {
	!path.as_os_str().is_empty() && path.is_relative()
}

// Accepts "en", "zh", "yue", "zh-hant", "pt-br".
fn is_language_code(code: &str) -> bool {
	let mut parts = code.split('-');
	let Some(primary) = parts.next() else { return false };

	if !(2..=3).contains(&primary.len()) || !primary.chars().all(|ch| ch.is_ascii_lowercase()) {
		return false;
	}

	parts.all(|part| {
		(2..=8).contains(&part.len())
			&& part.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
	})
}
