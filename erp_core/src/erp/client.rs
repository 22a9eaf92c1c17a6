use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::erp::dto::{Attendance, ErpSession, Menu, Period};
use crate::error::ErpResult;

/// Read access to the student portal.
#[async_trait]
pub trait ErpClient: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> ErpResult<ErpSession>;

    async fn fetch_attendance(&self, session: &ErpSession) -> ErpResult<Attendance>;

    /// Periods for the local day of `at`, in timetable order.
    async fn fetch_timetable(
        &self,
        session: &ErpSession,
        at: DateTime<FixedOffset>,
    ) -> ErpResult<Vec<Period>>;

    /// Cafeteria menu for the weekday of `at`.
    async fn fetch_menu(&self, session: &ErpSession, at: DateTime<FixedOffset>) -> ErpResult<Menu>;
}
