use std::fmt;

use thiserror::Error;

/// Which part of the daily report a fetch belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Attendance,
    Timetable,
    Menu,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Attendance => write!(f, "attendance"),
            Section::Timetable => write!(f, "timetable"),
            Section::Menu => write!(f, "cafeteria menu"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variables are not set: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("target hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),
    #[error("target minute {0} is out of range (0-59)")]
    MinuteOutOfRange(u32),
    #[error("poll interval must be between 1 and 60 minutes, got {0}s")]
    PollInterval(u64),
    #[error("a {window} minute window starting at minute {minute} runs past the target hour")]
    WindowOverflow { minute: u32, window: u32 },
}

#[derive(Debug, Error)]
pub enum ErpError {
    #[error("login failed: {0}")]
    Auth(String),
    #[error("failed to fetch {section}: {reason}")]
    Fetch { section: Section, reason: String },
}

impl ErpError {
    pub fn fetch(section: Section, reason: impl ToString) -> Self {
        ErpError::Fetch {
            section,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("invalid chat id {0:?}")]
    InvalidChat(String),
}

pub type ErpResult<T> = Result<T, ErpError>;

/// Why a report run did not complete cleanly.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Login(ErpError),
    #[error("report delivery failed: {0}")]
    Notify(#[from] NotifyError),
}
