//! CAMU JSON shapes and their conversion into report types.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::erp::dto::{Attendance, Menu, MenuItem, Period, SubjectAttendance};

pub const INVALID_CREDENTIAL_CODES: [&str; 2] = ["INCRT_CRD", "INVALID_CRED"];

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub output: Option<Output<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Output<T> {
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Option<T> {
        self.output.and_then(|o| o.data)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(rename = "progressionData", default)]
    pub progression_data: Vec<Map<String, Value>>,
    pub logindetails: Option<LoginDetails>,
}

#[derive(Debug, Deserialize)]
pub struct LoginDetails {
    #[serde(rename = "Student", default)]
    pub student: Vec<StudentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct StudentDetails {
    #[serde(rename = "StuID")]
    pub stu_id: Option<Value>,
}

impl LoginData {
    pub fn student_id(&self) -> Option<String> {
        self.logindetails
            .as_ref()?
            .student
            .first()?
            .stu_id
            .as_ref()
            .and_then(value_to_string)
    }
}

#[derive(Debug, Deserialize)]
pub struct AttendanceData {
    #[serde(rename = "OvrAllPrcntg", default, deserialize_with = "lenient_f64")]
    pub overall_percentage: f64,
    #[serde(rename = "OvrAllPCnt", default, deserialize_with = "lenient_u32")]
    pub overall_present: u32,
    #[serde(rename = "OvrAllCnt", default, deserialize_with = "lenient_u32")]
    pub overall_total: u32,
    #[serde(rename = "CurMnthPrcntg", default, deserialize_with = "lenient_f64")]
    pub month_percentage: f64,
    #[serde(rename = "CurMPCnt", default, deserialize_with = "lenient_u32")]
    pub month_present: u32,
    #[serde(rename = "CurMCnt", default, deserialize_with = "lenient_u32")]
    pub month_total: u32,
    #[serde(rename = "subjectList", default)]
    pub subjects: Vec<SubjectData>,
}

#[derive(Debug, Deserialize)]
pub struct SubjectData {
    #[serde(rename = "SubjCd", default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(rename = "SubjNm", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "OvrAllPrcntg", default, deserialize_with = "lenient_f64")]
    pub percentage: f64,
    #[serde(rename = "prsentCnt", default, deserialize_with = "lenient_u32")]
    pub present: u32,
    #[serde(rename = "absentCnt", default, deserialize_with = "lenient_u32")]
    pub absent: u32,
    #[serde(rename = "leaveCnt", default, deserialize_with = "lenient_u32")]
    pub leave: u32,
    #[serde(rename = "onDutyCnt", default, deserialize_with = "lenient_u32")]
    pub on_duty: u32,
    #[serde(rename = "medLeaveCnt", default, deserialize_with = "lenient_u32")]
    pub medical_leave: u32,
    #[serde(rename = "all", default, deserialize_with = "lenient_u32")]
    pub total: u32,
}

impl From<AttendanceData> for Attendance {
    fn from(data: AttendanceData) -> Self {
        let subjects = data
            .subjects
            .into_iter()
            .map(|s| SubjectAttendance {
                code: s.code.unwrap_or_else(|| "Unknown".to_string()),
                name: s.name.unwrap_or_else(|| "Unknown".to_string()),
                percentage: s.percentage,
                present: s.present,
                absent: s.absent,
                leave: s.leave,
                on_duty: s.on_duty,
                medical_leave: s.medical_leave,
                total: s.total,
            })
            .collect();

        Attendance {
            overall: data.overall_percentage,
            overall_present: data.overall_present,
            overall_total: data.overall_total,
            this_month: data.month_percentage,
            month_present: data.month_present,
            month_total: data.month_total,
            subjects,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TimetableDay {
    #[serde(rename = "Periods", default)]
    pub periods: Vec<PeriodData>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodData {
    #[serde(rename = "SubNa", default, deserialize_with = "lenient_string")]
    pub subject: Option<String>,
    #[serde(rename = "StaffNm", default, deserialize_with = "lenient_string")]
    pub faculty: Option<String>,
    #[serde(rename = "Location", default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end: Option<String>,
}

pub fn periods_from(days: Vec<TimetableDay>) -> Vec<Period> {
    days.into_iter()
        .flat_map(|day| day.periods)
        .zip(1u32..)
        .map(|(p, index)| Period {
            period: index,
            subject: p.subject.unwrap_or_else(|| "Unknown Subject".to_string()),
            faculty: p.faculty.unwrap_or_else(|| "Unknown Faculty".to_string()),
            room: p.location.unwrap_or_else(|| "TBA".to_string()),
            time: period_time(p.start.as_deref(), p.end.as_deref()),
        })
        .collect()
}

/// "09:00 AM - 09:55 AM". Portal timestamps are already local wall-clock time.
fn period_time(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if !s.is_empty() && !e.is_empty() => (s, e),
        _ => return None,
    };
    match (clock_time(start), clock_time(end)) {
        (Some(s), Some(e)) => Some(format!("{} - {}", s, e)),
        _ => Some(format!("{} - {}", start, end)),
    }
}

fn clock_time(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%I:%M %p").to_string());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.format("%I:%M %p").to_string())
}

#[derive(Debug, Deserialize)]
pub struct MenuData {
    #[serde(rename = "facNme", default, deserialize_with = "lenient_string")]
    pub facility: Option<String>,
    #[serde(rename = "oMealList", default)]
    pub meals: Vec<MealData>,
}

#[derive(Debug, Deserialize)]
pub struct MealData {
    #[serde(rename = "mealTm", default, deserialize_with = "lenient_string")]
    pub meal_time: Option<String>,
    #[serde(rename = "msNme", default, deserialize_with = "lenient_string")]
    pub items: Option<String>,
}

impl From<MenuData> for Menu {
    fn from(data: MenuData) -> Self {
        let mut items = Vec::new();
        for meal in data.meals {
            let category = meal.meal_time.unwrap_or_default().trim().to_string();
            let Some(names) = meal.items else { continue };
            for name in names.lines().map(str::trim) {
                if name.is_empty() || name == "-" {
                    continue;
                }
                items.push(MenuItem {
                    item_name: name.to_string(),
                    category: category.clone(),
                });
            }
        }
        Menu {
            location: data.facility.filter(|f| !f.trim().is_empty()),
            items,
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(&Value::deserialize(deserializer)?))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attendance_accepts_numbers_and_strings() {
        let envelope: Envelope<AttendanceData> = serde_json::from_value(json!({
            "output": { "data": {
                "OvrAllPrcntg": "82.5",
                "OvrAllPCnt": 33,
                "OvrAllCnt": "40",
                "CurMnthPrcntg": 90,
                "subjectList": [
                    { "SubjCd": "CSE101", "SubjNm": "Programming", "OvrAllPrcntg": 75.0,
                      "prsentCnt": 15, "absentCnt": 5, "all": 20, "leaveCnt": null }
                ]
            }}
        }))
        .unwrap();
        let attendance: Attendance = envelope.into_data().unwrap().into();
        assert_eq!(attendance.overall, 82.5);
        assert_eq!(attendance.overall_present, 33);
        assert_eq!(attendance.overall_total, 40);
        assert_eq!(attendance.this_month, 90.0);
        assert_eq!(attendance.month_total, 0);
        assert_eq!(attendance.subjects[0].code, "CSE101");
        assert_eq!(attendance.subjects[0].leave, 0);
        assert_eq!(attendance.per_subject().get("Programming"), Some(&75.0));
    }

    #[test]
    fn test_periods_are_numbered_and_timed() {
        let days: Vec<TimetableDay> = serde_json::from_value(json!([
            { "Periods": [
                { "SubNa": "Discrete Maths", "StaffNm": "Dr. Rao", "Location": "N-201",
                  "start": "2024-05-06T09:00:00.000Z", "end": "2024-05-06T09:55:00.000Z" },
                { "SubNa": "Physics", "start": "tba", "end": "later" },
                { "SubNa": "Lab" }
            ]}
        ]))
        .unwrap();
        let periods = periods_from(days);
        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].period, 1);
        assert_eq!(periods[0].time.as_deref(), Some("09:00 AM - 09:55 AM"));
        assert_eq!(periods[1].faculty, "Unknown Faculty");
        assert_eq!(periods[1].room, "TBA");
        assert_eq!(periods[1].time.as_deref(), Some("tba - later"));
        assert_eq!(periods[2].period, 3);
        assert_eq!(periods[2].time, None);
    }

    #[test]
    fn test_naive_timestamps_are_formatted() {
        assert_eq!(
            period_time(Some("2024-05-06T14:10:00"), Some("2024-05-06T15:05:00")).as_deref(),
            Some("02:10 PM - 03:05 PM")
        );
    }

    #[test]
    fn test_numeric_text_fields_do_not_fail_the_section() {
        let data: AttendanceData = serde_json::from_value(json!({
            "OvrAllPrcntg": 70,
            "subjectList": [ { "SubjCd": 101, "SubjNm": 2024, "OvrAllPrcntg": 70 } ]
        }))
        .unwrap();
        let attendance = Attendance::from(data);
        assert_eq!(attendance.subjects[0].code, "101");
        assert_eq!(attendance.subjects[0].name, "2024");

        let days: Vec<TimetableDay> = serde_json::from_value(json!([
            { "Periods": [ { "SubNa": 7, "StaffNm": null, "Location": 304 } ] }
        ]))
        .unwrap();
        let periods = periods_from(days);
        assert_eq!(periods[0].subject, "7");
        assert_eq!(periods[0].faculty, "Unknown Faculty");
        assert_eq!(periods[0].room, "304");

        let menu = Menu::from(
            serde_json::from_value::<MenuData>(json!({
                "facNme": 3,
                "oMealList": [ { "mealTm": 1, "msNme": "Idli" } ]
            }))
            .unwrap(),
        );
        assert_eq!(menu.location.as_deref(), Some("3"));
        assert_eq!(menu.items[0].category, "1");
    }

    #[test]
    fn test_menu_drops_blank_and_dash_lines() {
        let data: MenuData = serde_json::from_value(json!({
            "facNme": "Central Mess",
            "oMealList": [
                { "mealTm": "Breakfast", "msNme": "Poha\n -\n\nTea \n" },
                { "mealTm": "Lunch", "msNme": null },
                { "mealTm": "Dinner", "msNme": "Dal Makhani" }
            ]
        }))
        .unwrap();
        let menu = Menu::from(data);
        assert_eq!(menu.location.as_deref(), Some("Central Mess"));
        let names: Vec<_> = menu.items.iter().map(|i| (i.category.as_str(), i.item_name.as_str())).collect();
        assert_eq!(
            names,
            vec![("Breakfast", "Poha"), ("Breakfast", "Tea"), ("Dinner", "Dal Makhani")]
        );
    }

    #[test]
    fn test_student_id_from_number_or_string() {
        let login: LoginData = serde_json::from_value(json!({
            "logindetails": { "Student": [ { "StuID": 4411 } ] }
        }))
        .unwrap();
        assert_eq!(login.student_id().as_deref(), Some("4411"));

        let login: LoginData = serde_json::from_value(json!({ "code": "INCRT_CRD" })).unwrap();
        assert_eq!(login.student_id(), None);
        assert!(login.progression_data.is_empty());
    }
}
