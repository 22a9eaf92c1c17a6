use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use crate::error::ScheduleError;

/// UTC+05:30
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).expect("IST offset is within a day")
}

/// When the daily report fires, and how often the loop checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    target_hour: u32,
    target_minute: u32,
    timezone: FixedOffset,
    poll_interval: Duration,
}

impl ScheduleConfig {
    pub fn new(
        target_hour: u32,
        target_minute: u32,
        timezone: FixedOffset,
        poll_interval: Duration,
    ) -> Result<Self, ScheduleError> {
        if target_hour > 23 {
            return Err(ScheduleError::HourOutOfRange(target_hour));
        }
        if target_minute > 59 {
            return Err(ScheduleError::MinuteOutOfRange(target_minute));
        }
        let secs = poll_interval.as_secs();
        if secs < 60 || secs > 3600 || secs % 60 != 0 {
            return Err(ScheduleError::PollInterval(secs));
        }
        // Every tick sequence must land inside the window, so it cannot cross into the next hour.
        let window = (secs / 60) as u32;
        if target_minute + window > 60 {
            return Err(ScheduleError::WindowOverflow {
                minute: target_minute,
                window,
            });
        }
        Ok(Self {
            target_hour,
            target_minute,
            timezone,
            poll_interval,
        })
    }

    /// Daily schedule in Indian Standard Time.
    pub fn ist_daily(
        target_hour: u32,
        target_minute: u32,
        poll_interval: Duration,
    ) -> Result<Self, ScheduleError> {
        Self::new(target_hour, target_minute, ist(), poll_interval)
    }

    pub fn target_hour(&self) -> u32 {
        self.target_hour
    }

    pub fn target_minute(&self) -> u32 {
        self.target_minute
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn window_minutes(&self) -> u32 {
        (self.poll_interval.as_secs() / 60) as u32
    }

    /// Converts any instant into the schedule's local time.
    pub fn localize<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.timezone)
    }
}

/// In-memory record of the last scheduled fire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunState {
    pub last_fired_date: Option<NaiveDate>,
}

impl RunState {
    /// Records a fire on `date`. Never moves the date backwards.
    pub fn mark_fired(self, date: NaiveDate) -> Self {
        match self.last_fired_date {
            Some(last) if last >= date => self,
            _ => RunState {
                last_fired_date: Some(date),
            },
        }
    }

    pub fn fired_on(&self, date: NaiveDate) -> bool {
        self.last_fired_date == Some(date)
    }
}
