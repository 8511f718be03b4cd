use std::collections::HashMap;
use std::env;

use thiserror::Error;
use tracing::Level;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const MIN_TOKEN_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API_TOKENS entry `{0}` must have the form user_id:token")]
    MalformedTokenEntry(String),
    #[error("API token for `{0}` must be at least 32 characters of [A-Za-z0-9_-]")]
    InvalidToken(String),
    #[error("unknown LOG_LEVEL `{0}`")]
    InvalidLogLevel(String),
}

/// Runtime settings read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// JSON seed for the in-memory store
    pub seed_path: Option<String>,
    pub bind_addr: String,
    /// token -> user id
    pub api_tokens: HashMap<String, String>,
    /// Allowed report number systems; empty means any
    pub report_number_systems: Vec<String>,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            seed_path: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_tokens: HashMap::new(),
            report_number_systems: Vec::new(),
            log_level: Level::INFO,
        }
    }
}

/// Token format accepted by the bearer middleware
pub fn is_valid_token_format(token: &str) -> bool {
    token.len() >= MIN_TOKEN_LEN
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tokens = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (user, token) = entry
            .split_once(':')
            .map(|(u, t)| (u.trim(), t.trim()))
            .filter(|(u, _)| !u.is_empty())
            .ok_or_else(|| ConfigError::MalformedTokenEntry(entry.to_string()))?;
        if !is_valid_token_format(token) {
            return Err(ConfigError::InvalidToken(user.to_string()));
        }
        tokens.insert(token.to_string(), user.to_string());
    }
    Ok(tokens)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let log_level = match non_empty_var("LOG_LEVEL") {
            Some(raw) => raw
                .parse::<Level>()
                .map_err(|_| ConfigError::InvalidLogLevel(raw.clone()))?,
            None => Level::INFO,
        };

        Ok(Config {
            database_url: non_empty_var("DATABASE_URL"),
            seed_path: non_empty_var("SEED_PATH"),
            bind_addr: non_empty_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            api_tokens: parse_tokens(&non_empty_var("API_TOKENS").unwrap_or_default())?,
            report_number_systems: parse_list(&non_empty_var("REPORT_NUMBER_SYSTEMS").unwrap_or_default()),
            log_level,
        })
    }

    /// User id the bearer token was issued to
    pub fn user_for_token(&self, token: &str) -> Option<&str> {
        self.api_tokens.get(token).map(String::as_str)
    }

    pub fn with_token(mut self, user_id: &str, token: &str) -> Self {
        self.api_tokens.insert(token.to_string(), user_id.to_string());
        self
    }

    pub fn accepts_report_number_system(&self, system: &str) -> bool {
        self.report_number_systems.is_empty() || self.report_number_systems.iter().any(|s| s == system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "abcdefghijklmnopqrstuvwxyz012345";

    #[test]
    fn test_parse_tokens() {
        let tokens = parse_tokens(&format!(" u1:{} , ", TOKEN)).unwrap();
        assert_eq!(tokens.get(TOKEN).map(String::as_str), Some("u1"));
    }

    #[test]
    fn test_reject_bad_tokens() {
        assert_eq!(
            parse_tokens("justatoken"),
            Err(ConfigError::MalformedTokenEntry("justatoken".into()))
        );
        assert_eq!(parse_tokens("u1:short"), Err(ConfigError::InvalidToken("u1".into())));
        assert_eq!(
            parse_tokens(&format!("u1:{}!", &TOKEN[1..])),
            Err(ConfigError::InvalidToken("u1".into()))
        );
    }

    #[test]
    fn test_report_number_systems() {
        let mut config = Config::default();
        assert!(config.accepts_report_number_system("anything"));
        config.report_number_systems = parse_list("CDS, arXiv");
        assert!(config.accepts_report_number_system("arXiv"));
        assert!(!config.accepts_report_number_system("ISBN"));
    }
}
