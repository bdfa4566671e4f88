//! Runtime configuration for the authorization core.

use std::sync::Arc;

use chrono::TimeDelta;

use authcore_core::{DomainError, DomainResult};

use crate::expiry::millis;
use crate::roles::RoleTable;

/// Default token lifetime in milliseconds (one hour).
pub const DEFAULT_TOKEN_LIFETIME_MS: u64 = 60 * 60 * 1000;

pub const TOKEN_LIFETIME_VAR: &str = "AUTHCORE_TOKEN_LIFETIME_MS";
pub const ROLES_VAR: &str = "AUTHCORE_ROLES";

/// Configuration consumed by [`crate::Auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub token_lifetime: TimeDelta,
    pub roles: Arc<RoleTable>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_lifetime: millis(DEFAULT_TOKEN_LIFETIME_MS),
            roles: RoleTable::standard(),
        }
    }
}

impl AuthConfig {
    /// Read `AUTHCORE_TOKEN_LIFETIME_MS` and `AUTHCORE_ROLES` from the
    /// process environment; unset variables keep their defaults.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(TOKEN_LIFETIME_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                DomainError::validation(format!(
                    "{TOKEN_LIFETIME_VAR} must be a non-negative integer, got '{raw}'"
                ))
            })?;
            config.token_lifetime = millis(ms);
        }

        if let Some(raw) = lookup(ROLES_VAR) {
            config.roles = Arc::new(parse_role_table(&raw)?);
        }

        tracing::debug!(
            token_lifetime_ms = config.token_lifetime.num_milliseconds(),
            roles = config.roles.len(),
            "loaded auth config"
        );
        Ok(config)
    }
}

/// Parse `name=value` pairs separated by `;` into a validated table.
///
/// `,` cannot serve as the separator because it is forbidden inside values;
/// a value containing one is reported as an invalid role value.
pub fn parse_role_table(raw: &str) -> DomainResult<RoleTable> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            DomainError::validation(format!("{ROLES_VAR} entry '{pair}' is not name=value"))
        })?;
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            return Err(DomainError::validation(format!(
                "{ROLES_VAR} entry '{pair}' has an empty name or value"
            )));
        }
        entries.push((name.to_string(), value.to_string()));
    }
    RoleTable::new(entries)
}
