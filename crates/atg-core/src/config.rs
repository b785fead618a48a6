use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, offset::GetUpdates, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Telegram caps `getUpdates` batches at 100.
const MAX_POLL_LIMIT: u32 = 100;

/// Typed runtime configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub api_base_url: String,
    pub request_timeout: Duration,

    // Polling
    pub poll_interval: Duration,
    pub offset_autoincrement: bool,
    pub poll_timeout: Option<u32>,
    pub poll_limit: Option<u32>,
    pub allowed_updates: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let api_base_url = env_str("BOT_API_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let poll_interval = match env_str("POLL_INTERVAL_SECS") {
            Some(raw) => parse_secs(&raw).ok_or_else(|| {
                Error::Config(format!("POLL_INTERVAL_SECS is not a valid duration: {raw}"))
            })?,
            None => Duration::ZERO,
        };
        let offset_autoincrement = env_bool("OFFSET_AUTOINCREMENT").unwrap_or(true);
        let poll_timeout = env_u32("POLL_TIMEOUT_SECS");
        let poll_limit = env_u32("POLL_LIMIT").map(|n| n.clamp(1, MAX_POLL_LIMIT));
        let allowed_updates = parse_csv(env_str("ALLOWED_UPDATES"));

        // The HTTP timeout must outlast a long poll, or every idle fetch fails.
        let long_poll = Duration::from_secs(u64::from(poll_timeout.unwrap_or(0)));
        let request_timeout = Duration::from_secs(env_u64("REQUEST_TIMEOUT_SECS").unwrap_or(30))
            .max(long_poll + Duration::from_secs(10));

        Ok(Self {
            bot_token,
            api_base_url,
            request_timeout,
            poll_interval,
            offset_autoincrement,
            poll_timeout,
            poll_limit,
            allowed_updates,
        })
    }

    /// Caller-side `getUpdates` parameters derived from this config.
    pub fn get_updates(&self) -> GetUpdates {
        GetUpdates {
            offset: None,
            limit: self.poll_limit,
            timeout: self.poll_timeout,
            allowed_updates: (!self.allowed_updates.is_empty())
                .then(|| self.allowed_updates.clone()),
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let Some((key, val)) = parse_dotenv_line(raw) else {
            continue;
        };
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv_line(raw: &str) -> Option<(String, String)> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);

    let (k, v) = line.split_once('=')?;
    let key = k.trim();
    if key.is_empty() {
        return None;
    }

    let mut val = v.trim();
    // Strip optional surrounding quotes.
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        val = &val[1..val.len() - 1];
    }

    Some((key.to_string(), val.to_string()))
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| parse_bool(&s))
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

/// Seconds, fractional allowed (`"0.5"`).
fn parse_secs(s: &str) -> Option<Duration> {
    let secs = s.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

fn parse_csv(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
