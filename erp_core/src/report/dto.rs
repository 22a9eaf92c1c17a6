use chrono::{DateTime, FixedOffset};

use crate::erp::dto::{Attendance, Menu, Period};
use crate::error::{ErpResult, Section};

/// One section of the report: the fetched data, or why it is missing.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionData<T> {
    Available(T),
    Unavailable(String),
}

impl<T> SectionData<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, SectionData::Available(_))
    }
}

impl<T> From<ErpResult<T>> for SectionData<T> {
    fn from(result: ErpResult<T>) -> Self {
        match result {
            Ok(data) => SectionData::Available(data),
            Err(e) => SectionData::Unavailable(e.to_string()),
        }
    }
}

/// Everything one daily message is built from.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportPayload {
    pub generated_at: DateTime<FixedOffset>,
    pub email: String,
    pub timetable: SectionData<Vec<Period>>,
    pub attendance: SectionData<Attendance>,
    pub menu: SectionData<Menu>,
}

impl ReportPayload {
    pub fn unavailable_sections(&self) -> Vec<Section> {
        let mut out = Vec::new();
        if !self.timetable.is_available() {
            out.push(Section::Timetable);
        }
        if !self.attendance.is_available() {
            out.push(Section::Attendance);
        }
        if !self.menu.is_available() {
            out.push(Section::Menu);
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOutcome {
    pub parts_sent: usize,
    pub unavailable: Vec<Section>,
}
