use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::erp::dto::{Attendance, Menu, Period};
use crate::report::dto::{ReportPayload, SectionData};

const SEPARATOR_WIDTH: usize = 40;

/// Renders the daily message: header, timetable, attendance, menu.
pub fn format_report(payload: &ReportPayload) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let sections = [
        header(payload.generated_at, &payload.email),
        render(&payload.timetable, "Timetable", |p| format_timetable(p)),
        render(&payload.attendance, "Attendance", format_attendance),
        render(&payload.menu, "Cafeteria menu", format_menu),
    ];
    sections
        .iter()
        .map(|s| s.trim_end())
        .collect::<Vec<_>>()
        .join(&format!("\n\n{}\n\n", separator))
}

/// Sent instead of a report when the run could not log in.
pub fn format_failure(at: DateTime<FixedOffset>, email: &str, reason: &str) -> String {
    format!(
        "Daily Report Failed\n\nDate: {}\nTime: {}\nEmail: {}\nError: {}",
        at.format("%d-%m-%Y"),
        at.format("%I:%M %p"),
        email,
        reason
    )
}

fn header(at: DateTime<FixedOffset>, email: &str) -> String {
    format!(
        "Daily Report\nDate: {}\nTime: {}\nEmail: {}",
        at.format("%d-%m-%Y"),
        at.format("%I:%M %p"),
        email
    )
}

fn render<T>(section: &SectionData<T>, title: &str, format: fn(&T) -> String) -> String {
    match section {
        SectionData::Available(data) => format(data),
        SectionData::Unavailable(reason) => format!("{} unavailable: {}", title, reason),
    }
}

pub fn format_timetable(periods: &[Period]) -> String {
    if periods.is_empty() {
        return "No classes scheduled for today".to_string();
    }
    let mut out = String::from("Today's Timetable:\n\n");
    for p in periods {
        let _ = writeln!(out, "Period {}", p.period);
        let _ = writeln!(out, "{}", p.subject);
        let _ = writeln!(out, "Faculty: {}", p.faculty);
        let _ = writeln!(out, "Room: {}", p.room);
        if let Some(time) = &p.time {
            let _ = writeln!(out, "Time: {}", time);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub fn format_attendance(attendance: &Attendance) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Overall Attendance: {}% ({}/{})",
        percent(attendance.overall),
        attendance.overall_present,
        attendance.overall_total
    );
    let _ = writeln!(
        out,
        "This Month: {}% ({}/{})",
        percent(attendance.this_month),
        attendance.month_present,
        attendance.month_total
    );

    if !attendance.subjects.is_empty() {
        out.push_str("\nSubject Details:\n");
        for s in &attendance.subjects {
            let _ = write!(
                out,
                "\n{}\n{}\nAttendance: {}% ({}/{})\nPresent: {}, Absent: {}",
                s.code,
                s.name,
                percent(s.percentage),
                s.present,
                s.total,
                s.present,
                s.absent
            );
            if s.leave > 0 {
                let _ = write!(out, ", Leave: {}", s.leave);
            }
            if s.on_duty > 0 {
                let _ = write!(out, ", On Duty: {}", s.on_duty);
            }
            if s.medical_leave > 0 {
                let _ = write!(out, ", Medical Leave: {}", s.medical_leave);
            }
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

pub fn format_menu(menu: &Menu) -> String {
    if menu.items.is_empty() {
        return "No meals scheduled for today".to_string();
    }
    let mut out = String::from("Today's Cafeteria Menu:\n\n");
    let _ = writeln!(
        out,
        "Location: {}",
        menu.location.as_deref().unwrap_or("Cafeteria")
    );

    let mut category: Option<&str> = None;
    for item in &menu.items {
        if category != Some(item.category.as_str()) {
            out.push('\n');
            if !item.category.is_empty() {
                let _ = writeln!(out, "{}", item.category);
            }
            category = Some(item.category.as_str());
        }
        let _ = writeln!(out, "  {}", item.item_name);
    }
    out.trim_end().to_string()
}

/// 82.5 -> "82.5", 90.0 -> "90", 66.666 -> "66.67"
fn percent(value: f64) -> String {
    let s = format!("{:.2}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
