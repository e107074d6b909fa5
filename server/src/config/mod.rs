use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_EMAIL_FROM: &str = "noreply@yourdomain.com";
const DEFAULT_ADMIN_EMAILS: &str = "admin@example.com";
const DEFAULT_CHAT_LINK: &str = "#";
const DEFAULT_SHEET_NAME: &str = "registrants";
const DEFAULT_SHEET_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the outbound admin notification.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Provider credential. Notifications are skipped when absent.
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: String,
    pub admin_recipients: Vec<String>,
    pub chat_link: String,
    pub dashboard_url: Option<String>,
}

/// Location of the spreadsheet-style tabular store.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub name: String,
    pub dir: PathBuf,
}

impl SheetConfig {
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.name))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub email: EmailConfig,
    pub sheet: SheetConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests do not
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let admin_raw = get("ADMIN_EMAILS").unwrap_or_else(|| DEFAULT_ADMIN_EMAILS.to_string());
        let admin_recipients = parse_recipients(&admin_raw);
        if admin_recipients.is_empty() {
            return Err(ConfigError::Invalid {
                key: "ADMIN_EMAILS",
                value: admin_raw,
                reason: "no recipients listed".to_string(),
            });
        }

        let api_key = get("RESEND_API_KEY");
        if api_key.is_none() {
            tracing::warn!("RESEND_API_KEY not set, admin notifications are disabled");
        }

        Ok(Self {
            database_url,
            bind_addr,
            email: EmailConfig {
                api_key,
                api_url: get("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_EMAIL_API_URL.to_string()),
                from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
                admin_recipients,
                chat_link: get("CHAT_LINK").unwrap_or_else(|| DEFAULT_CHAT_LINK.to_string()),
                dashboard_url: get("DASHBOARD_URL"),
            },
            sheet: SheetConfig {
                name: get("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
                dir: PathBuf::from(
                    get("SHEET_DIR").unwrap_or_else(|| DEFAULT_SHEET_DIR.to_string()),
                ),
            },
        })
    }
}

/// Splits a comma-separated recipient list, dropping blanks.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/intake")]))
            .expect("config");

        assert_eq!(config.bind_addr.port(), 3001);
        assert!(config.email.api_key.is_none());
        assert_eq!(config.email.api_url, DEFAULT_EMAIL_API_URL);
        assert_eq!(config.email.admin_recipients, vec!["admin@example.com"]);
        assert_eq!(config.sheet.path(), PathBuf::from("data/registrants.csv"));
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_blank_api_key_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/intake"),
            ("RESEND_API_KEY", "   "),
        ]))
        .expect("config");
        assert!(config.email.api_key.is_none());
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/intake"),
            ("BIND_ADDR", "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BIND_ADDR", .. }));
    }

    #[test]
    fn test_parse_recipients_trims_and_skips_blanks() {
        assert_eq!(
            parse_recipients(" a@example.com, ,b@example.com ,"),
            vec!["a@example.com", "b@example.com"]
        );
    }

    #[test]
    fn test_empty_recipient_list_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/intake"),
            ("ADMIN_EMAILS", " , "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ADMIN_EMAILS", .. }));
    }
}
