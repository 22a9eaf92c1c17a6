use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// An authenticated portal session.
///
/// `client` carries the login cookies. `progression` is the student's enrolment record
/// exactly as the portal returned it; later calls echo it back.
#[derive(Clone, Debug)]
pub struct ErpSession {
    pub client: reqwest::Client,
    pub student_id: String,
    pub progression: Map<String, Value>,
}

impl ErpSession {
    pub fn institution_id(&self) -> Option<&Value> {
        self.progression.get("InId")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubjectAttendance {
    pub code: String,
    pub name: String,
    pub percentage: f64,
    pub present: u32,
    pub absent: u32,
    pub leave: u32,
    pub on_duty: u32,
    pub medical_leave: u32,
    pub total: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attendance {
    pub overall: f64,
    pub overall_present: u32,
    pub overall_total: u32,
    pub this_month: f64,
    pub month_present: u32,
    pub month_total: u32,
    pub subjects: Vec<SubjectAttendance>,
}

impl Attendance {
    /// Subject name to overall percentage.
    pub fn per_subject(&self) -> BTreeMap<String, f64> {
        self.subjects
            .iter()
            .map(|s| (s.name.clone(), s.percentage))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Period {
    pub period: u32,
    pub subject: String,
    pub faculty: String,
    pub room: String,
    pub time: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub item_name: String,
    /// Meal slot, e.g. "Breakfast (7:30 AM - 9:30 AM)".
    pub category: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Menu {
    pub location: Option<String>,
    pub items: Vec<MenuItem>,
}
