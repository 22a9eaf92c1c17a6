use std::fmt;

pub const DEFAULT_ERP_BASE_URL: &str = "https://student.bennetterp.camu.in";

/// Process configuration, validated once at startup.
#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub user_email: String,
    pub user_password: String,
    pub erp_base_url: String,
}

// Keep secrets out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("user_email", &self.user_email)
            .field("user_password", &"<redacted>")
            .field("erp_base_url", &self.erp_base_url)
            .finish()
    }
}
