use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use crate::meetings::ResponsePolicy;
use crate::meetings::models::MAX_DURATION_MINUTES;
use crate::scheduling::SlotOptions;

const MAX_RESPONSE_WINDOW_DAYS: i64 = 365;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub google_api_url: String,
    pub google_oauth_url: String,
    pub google_auth_url: String,
    pub calendar_id: String,
    pub provision_timeout: Duration,
    pub response_policy: ResponsePolicy,
    pub slot_step_minutes: i64,
    pub suggestion_limit: usize,
    pub response_window_days: i64,
    pub expiry_interval: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an env var, falling back to `default` when it is unset or
/// unparseable.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

/// Like [`env_parse`] but also falls back to `default` outside `range`.
fn env_parse_in_range<T>(key: &str, default: T, range: RangeInclusive<T>) -> T
where
    T: FromStr + PartialOrd + Display + Copy,
{
    let value = env_parse(key, default);
    if range.contains(&value) {
        return value;
    }
    tracing::warn!(
        "Ignoring out of range value for {}: {} (expected {}..={})",
        key,
        value,
        range.start(),
        range.end()
    );
    default
}

impl AppConfig {
    pub fn slot_options(&self) -> SlotOptions {
        let step = chrono::Duration::try_minutes(self.slot_step_minutes)
            .unwrap_or_else(|| SlotOptions::default().step);
        SlotOptions {
            step,
            limit: self.suggestion_limit,
        }
    }

    /// Whether OAuth client credentials are present for calendar
    /// provisioning.
    pub fn google_configured(&self) -> bool {
        !self.google_client_id.is_empty() && !self.google_client_secret.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env_or("MEETSYNC_STORAGE_PATH", "./");
        let db_path = format!("{}/db", storage_path);
        let google_client_id = env_or("MEETSYNC_GOOGLE_CLIENT_ID", "");
        let google_client_secret = env_or("MEETSYNC_GOOGLE_CLIENT_SECRET", "");
        let google_redirect_uri = env_or("MEETSYNC_GOOGLE_REDIRECT_URI", "urn:ietf:wg:oauth:2.0:oob");
        let google_api_url = env_or("MEETSYNC_GOOGLE_API_URL", "https://www.googleapis.com");
        let google_oauth_url = env_or("MEETSYNC_GOOGLE_OAUTH_URL", "https://oauth2.googleapis.com");
        let google_auth_url = env_or("MEETSYNC_GOOGLE_AUTH_URL", "https://accounts.google.com");
        let calendar_id = env_or("MEETSYNC_CALENDAR_ID", "primary");
        let provision_timeout =
            Duration::from_secs(env_parse("MEETSYNC_PROVISION_TIMEOUT_SECS", 10));
        let response_policy = env_parse("MEETSYNC_RESPONSE_POLICY", ResponsePolicy::AppendOnly);
        let slot_step_minutes =
            env_parse_in_range("MEETSYNC_SLOT_STEP_MINUTES", 5, 1..=MAX_DURATION_MINUTES);
        let suggestion_limit = env_parse_in_range("MEETSYNC_SUGGESTION_LIMIT", 3, 1..=100);
        let response_window_days =
            env_parse_in_range("MEETSYNC_RESPONSE_WINDOW_DAYS", 3, 1..=MAX_RESPONSE_WINDOW_DAYS);
        let expiry_interval = Duration::from_secs(env_parse_in_range(
            "MEETSYNC_EXPIRY_INTERVAL_SECS",
            60,
            1..=86_400,
        ));

        Self {
            storage_path,
            db_path,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            google_api_url,
            google_oauth_url,
            google_auth_url,
            calendar_id,
            provision_timeout,
            response_policy,
            slot_step_minutes,
            suggestion_limit,
            response_window_days,
            expiry_interval,
        }
    }
}
