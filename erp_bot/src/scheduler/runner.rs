use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use erp_core::config::Config;
use erp_core::erp::ErpClient;
use erp_core::error::ReportError;
use erp_core::notifier::Notifier;
use erp_core::report::run_report;
use erp_core::schedule::{should_run_now, RunState, ScheduleConfig};
use log::{debug, error, info, warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// 01:00 IST.
pub const REPORT_HOUR: u32 = 1;
pub const REPORT_MINUTE: u32 = 0;
/// Hourly keeps load on the portal low; the report window is the whole target hour.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3600);
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives the startup report and the once-a-day scheduled report.
pub struct DailyReporter<E, N> {
    erp: E,
    notifier: N,
    config: Config,
    schedule: ScheduleConfig,
    state: RunState,
    clock: fn() -> DateTime<Utc>,
}

impl<E, N> DailyReporter<E, N>
where
    E: ErpClient,
    N: Notifier,
{
    pub fn new(erp: E, notifier: N, config: Config, schedule: ScheduleConfig) -> Self {
        Self {
            erp,
            notifier,
            config,
            schedule,
            state: RunState::default(),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the report once. Failures are logged and swallowed.
    pub async fn run_now<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let at = self.schedule.localize(now);
        match run_report(&self.erp, &self.notifier, &self.config, at).await {
            Ok(outcome) if outcome.unavailable.is_empty() => true,
            Ok(outcome) => {
                warn!("Report sent without: {:?}", outcome.unavailable);
                true
            }
            Err(ReportError::Login(e)) => {
                error!("Report run aborted: {}", e);
                false
            }
            Err(e) => {
                error!("Report run failed: {}", e);
                false
            }
        }
    }

    /// One polling tick. Returns whether the scheduled report fired.
    pub async fn poll<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        let (fire, next) = should_run_now(now, &self.schedule, self.state);
        if !fire {
            return false;
        }
        // Recorded before the run so a failing run cannot fire twice in one day.
        self.state = next;
        info!("Scheduled run time reached. Running daily report...");
        self.run_now(now).await;
        true
    }

    /// Startup report, then poll forever until Ctrl-C.
    pub async fn run_forever(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Unable to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
    }

    /// Startup report, then one poll per interval until `shutdown` resolves.
    ///
    /// `shutdown` is polled for the whole lifetime of the loop, including while a
    /// report is in flight; an interrupted run is abandoned.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let started = (self.clock)();
        tokio::select! {
            _ = self.run_now(&started) => {}
            _ = &mut shutdown => {
                info!("Shutting down gracefully...");
                return;
            }
        }

        let period = self.schedule.poll_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Scheduler active: daily report at {:02}:{:02} (UTC{}), next check in {} min",
            self.schedule.target_hour(),
            self.schedule.target_minute(),
            self.schedule.timezone(),
            period.as_secs() / 60
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }
            let now = (self.clock)();
            tokio::select! {
                fired = self.poll(&now) => {
                    if !fired {
                        debug!("No scheduled run this tick");
                    }
                }
                _ = &mut shutdown => break,
            }
        }
        info!("Shutting down gracefully...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, FixedOffset, NaiveDate};
    use erp_core::erp::{Attendance, ErpSession, Menu, Period};
    use erp_core::error::{ErpError, NotifyError, Section};
    use erp_core::schedule::dto::ist;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FlakyErp {
        fail_login: bool,
        fail_attendance: bool,
        login_delay: Duration,
        logins: AtomicUsize,
    }

    #[async_trait]
    impl ErpClient for FlakyErp {
        async fn login(&self, _email: &str, _password: &str) -> Result<ErpSession, ErpError> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            if !self.login_delay.is_zero() {
                tokio::time::sleep(self.login_delay).await;
            }
            if self.fail_login {
                return Err(ErpError::Auth("portal unreachable: connection refused".into()));
            }
            Ok(ErpSession {
                client: reqwest::Client::new(),
                student_id: "STU42".into(),
                progression: Default::default(),
            })
        }

        async fn fetch_attendance(&self, _session: &ErpSession) -> Result<Attendance, ErpError> {
            if self.fail_attendance {
                return Err(ErpError::fetch(Section::Attendance, "timed out"));
            }
            Ok(Attendance::default())
        }

        async fn fetch_timetable(
            &self,
            _session: &ErpSession,
            _at: DateTime<FixedOffset>,
        ) -> Result<Vec<Period>, ErpError> {
            Ok(Vec::new())
        }

        async fn fetch_menu(
            &self,
            _session: &ErpSession,
            _at: DateTime<FixedOffset>,
        ) -> Result<Menu, ErpError> {
            Ok(Menu::default())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
        sent_at: Arc<Mutex<Vec<Instant>>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, _chat_id: &str, text: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(text.to_string());
            self.sent_at.lock().unwrap().push(Instant::now());
            Ok(())
        }
    }

    fn reporter(erp: FlakyErp) -> DailyReporter<FlakyErp, RecordingNotifier> {
        let config = Config {
            telegram_bot_token: "123:abc".into(),
            telegram_chat_id: "42".into(),
            user_email: "s@bu.edu".into(),
            user_password: "pw".into(),
            erp_base_url: "http://localhost".into(),
        };
        let schedule = ScheduleConfig::ist_daily(REPORT_HOUR, REPORT_MINUTE, POLL_INTERVAL).unwrap();
        DailyReporter::new(erp, RecordingNotifier::default(), config, schedule)
    }

    fn ist_at(d: u32, hh: u32, mm: u32) -> DateTime<FixedOffset> {
        ist().with_ymd_and_hms(2024, 5, d, hh, mm, 0).unwrap()
    }

    #[test]
    fn test_default_schedule_is_valid() {
        assert!(ScheduleConfig::ist_daily(REPORT_HOUR, REPORT_MINUTE, POLL_INTERVAL).is_ok());
    }

    #[tokio::test]
    async fn test_poll_outside_window_does_nothing() {
        let mut r = reporter(FlakyErp::default());
        assert!(!r.poll(&ist_at(6, 14, 0)).await);
        assert_eq!(r.erp.logins.load(Ordering::SeqCst), 0);
        assert_eq!(r.state(), RunState::default());
    }

    #[tokio::test]
    async fn test_hourly_ticks_fire_once_per_day() {
        let mut r = reporter(FlakyErp::default());
        let start = ist_at(6, 0, 17);
        let mut fired = 0;
        for hour in 0..48 {
            if r.poll(&(start + ChronoDuration::hours(hour))).await {
                fired += 1;
            }
        }
        assert_eq!(fired, 2);
        assert_eq!(r.erp.logins.load(Ordering::SeqCst), 2);
        assert_eq!(r.state().last_fired_date, NaiveDate::from_ymd_opt(2024, 5, 7));
        assert_eq!(r.notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_runs_do_not_stop_the_schedule() {
        let mut r = reporter(FlakyErp {
            fail_login: true,
            ..Default::default()
        });

        assert!(!r.run_now(&ist_at(6, 0, 5)).await);
        assert!(r.poll(&ist_at(6, 1, 5)).await);
        assert!(!r.poll(&ist_at(6, 1, 45)).await);
        assert!(r.poll(&ist_at(7, 1, 5)).await);

        assert_eq!(r.erp.logins.load(Ordering::SeqCst), 3);
        let sent = r.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|t| t.starts_with("Daily Report Failed")));
    }

    #[tokio::test]
    async fn test_partial_report_still_counts_as_sent() {
        let r = reporter(FlakyErp {
            fail_attendance: true,
            ..Default::default()
        });
        assert!(r.run_now(&ist_at(6, 1, 0)).await);
        let sent = r.notifier.sent.lock().unwrap();
        assert!(sent[0].contains("Attendance unavailable"));
    }

    #[tokio::test]
    async fn test_utc_clock_is_moved_to_ist() {
        let mut r = reporter(FlakyErp::default());
        // 19:30 UTC is 01:00 IST the next day.
        let utc = Utc.with_ymd_and_hms(2024, 5, 5, 19, 30, 0).unwrap();
        assert!(r.poll(&utc).await);
        assert_eq!(r.state().last_fired_date, NaiveDate::from_ymd_opt(2024, 5, 6));
    }

    // 19:30 UTC on the 5th is 01:00 IST on the 6th, inside the report window.
    fn in_window() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 5, 19, 30, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_report_precedes_first_tick() {
        let r = reporter(FlakyErp::default()).with_clock(in_window);
        let sent = r.notifier.sent.clone();
        let sent_at = r.notifier.sent_at.clone();
        let start = Instant::now();

        r.run_until(tokio::time::sleep(POLL_INTERVAL * 2 + Duration::from_secs(60)))
            .await;

        let sent_at = sent_at.lock().unwrap();
        // Startup run, then the first tick one full period later; the second tick
        // finds today already fired.
        assert_eq!(sent_at.len(), 2);
        assert_eq!(sent_at[0] - start, Duration::ZERO);
        assert_eq!(sent_at[1] - start, POLL_INTERVAL);
        assert_eq!(sent.lock().unwrap().len(), 2);
        assert_eq!(start.elapsed(), POLL_INTERVAL * 2 + Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_happens_before_first_interval() {
        let r = reporter(FlakyErp::default()).with_clock(in_window);
        let sent = r.notifier.sent.clone();
        let start = Instant::now();

        r.run_until(tokio::time::sleep(POLL_INTERVAL - Duration::from_secs(1)))
            .await;

        assert_eq!(sent.lock().unwrap().len(), 1);
        assert_eq!(start.elapsed(), POLL_INTERVAL - Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_scheduled_run_is_not_lost() {
        let r = reporter(FlakyErp {
            login_delay: Duration::from_secs(120),
            ..Default::default()
        })
        .with_clock(in_window);
        let sent = r.notifier.sent.clone();
        let start = Instant::now();

        // Startup run ends at +120s, so the first tick is at +3720s and the
        // scheduled run would end at +3840s. Shutdown lands in the middle of it.
        let stop = POLL_INTERVAL + Duration::from_secs(180);
        r.run_until(tokio::time::sleep(stop)).await;

        assert_eq!(start.elapsed(), stop);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_startup_run() {
        let r = reporter(FlakyErp {
            login_delay: Duration::from_secs(120),
            ..Default::default()
        })
        .with_clock(in_window);
        let sent = r.notifier.sent.clone();
        let start = Instant::now();

        r.run_until(tokio::time::sleep(Duration::from_secs(10))).await;

        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert!(sent.lock().unwrap().is_empty());
    }
}
