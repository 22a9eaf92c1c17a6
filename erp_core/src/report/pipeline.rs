use chrono::{DateTime, FixedOffset};
use log::{error, info, warn};

use crate::config::Config;
use crate::erp::client::ErpClient;
use crate::error::{ErpError, NotifyError, ReportError};
use crate::notifier::split::{split_message, MESSAGE_CHUNK_LIMIT};
use crate::notifier::Notifier;
use crate::report::dto::{ReportOutcome, ReportPayload};
use crate::report::formatter::{format_failure, format_report};

/// Logs in, fetches every section, and sends the formatted report.
///
/// A failed fetch only marks its section unavailable; the other two are still
/// fetched. A failed login sends a failure notice instead of a report. Either way
/// the user hears something unless Telegram itself is down.
pub async fn run_report<E, N>(
    erp: &E,
    notifier: &N,
    config: &Config,
    at: DateTime<FixedOffset>,
) -> Result<ReportOutcome, ReportError>
where
    E: ErpClient + ?Sized,
    N: Notifier + ?Sized,
{
    info!(
        "Running daily report for {} at {}",
        config.user_email,
        at.format("%d-%m-%Y %I:%M %p")
    );

    let session = match erp.login(&config.user_email, &config.user_password).await {
        Ok(session) => session,
        Err(e) => {
            error!("❌ Login failed for {}: {}", config.user_email, e);
            let notice = format_failure(at, &config.user_email, &e.to_string());
            if let Err(notify_err) = notifier.send(&config.telegram_chat_id, &notice).await {
                error!("Could not deliver failure notice: {}", notify_err);
            }
            return Err(ReportError::Login(e));
        }
    };

    let attendance = logged(erp.fetch_attendance(&session).await, "Attendance data");
    let timetable = logged(erp.fetch_timetable(&session, at).await, "Timetable data");
    let menu = logged(erp.fetch_menu(&session, at).await, "Cafeteria menu");

    let payload = ReportPayload {
        generated_at: at,
        email: config.user_email.clone(),
        timetable: timetable.into(),
        attendance: attendance.into(),
        menu: menu.into(),
    };
    let unavailable = payload.unavailable_sections();
    let text = format_report(&payload);

    let parts = split_message(&text, MESSAGE_CHUNK_LIMIT);
    let total = parts.len();
    let mut first_failure: Option<NotifyError> = None;
    let mut parts_sent = 0;
    for (i, part) in parts.iter().enumerate() {
        match notifier.send(&config.telegram_chat_id, part).await {
            Ok(()) => parts_sent += 1,
            Err(e) => {
                error!("Failed to send report part {}/{}: {}", i + 1, total, e);
                first_failure.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_failure {
        return Err(ReportError::Notify(e));
    }

    if unavailable.is_empty() {
        info!("✅ Daily report sent ({} part(s))", parts_sent);
    } else {
        warn!(
            "Daily report sent with unavailable sections: {:?}",
            unavailable
        );
    }
    Ok(ReportOutcome {
        parts_sent,
        unavailable,
    })
}

fn logged<T>(result: Result<T, ErpError>, what: &str) -> Result<T, ErpError> {
    match &result {
        Ok(_) => info!("  {} fetched", what),
        Err(e) => warn!("  {} unavailable: {}", what, e),
    }
    result
}
