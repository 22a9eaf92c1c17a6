use std::env;

use crate::config::dto::{Config, DEFAULT_ERP_BASE_URL};
use crate::error::ConfigError;
use crate::notifier::telegram::recipient;

pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const USER_EMAIL: &str = "USER_EMAIL";
pub const USER_PASSWORD: &str = "USER_PASSWORD";
pub const ERP_BASE_URL: &str = "ERP_BASE_URL";

const REQUIRED: [&str; 4] = [TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID, USER_EMAIL, USER_PASSWORD];

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&'static str> = REQUIRED
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let telegram_chat_id = get(TELEGRAM_CHAT_ID).unwrap_or_default();
        recipient(&telegram_chat_id).map_err(|_| ConfigError::Invalid {
            var: TELEGRAM_CHAT_ID,
            reason: "expected a numeric chat id or an @channel username".to_string(),
        })?;

        let erp_base_url = get(ERP_BASE_URL)
            .unwrap_or_else(|| DEFAULT_ERP_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !erp_base_url.starts_with("http://") && !erp_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: ERP_BASE_URL,
                reason: format!("expected an http(s) URL, got {:?}", erp_base_url),
            });
        }

        Ok(Config {
            telegram_bot_token: get(TELEGRAM_BOT_TOKEN).unwrap_or_default(),
            telegram_chat_id,
            user_email: get(USER_EMAIL).unwrap_or_default(),
            user_password: get(USER_PASSWORD).unwrap_or_default(),
            erp_base_url,
        })
    }
}
