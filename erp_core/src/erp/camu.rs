use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, Weekday};
use log::{debug, error, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::erp::client::ErpClient;
use crate::erp::dto::{Attendance, ErpSession, Menu, Period};
use crate::erp::wire::{
    periods_from, AttendanceData, Envelope, LoginData, MenuData, TimetableDay,
    INVALID_CREDENTIAL_CODES,
};
use crate::error::{ErpError, ErpResult, Section};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub enum Endpoints {
    Login,
    Attendance,
    Timetable,
    CafeteriaMenu,
}

impl Endpoints {
    fn path(&self) -> &'static str {
        match self {
            Endpoints::Login => "/login/validate",
            Endpoints::Attendance => "/api/Attendance/getDtaForStupage",
            Endpoints::Timetable => "/api/Timetable/get",
            Endpoints::CafeteriaMenu => "/api/mess-management/get-student-menu-list",
        }
    }
}

/// HTTP client for the CAMU student portal.
#[derive(Clone, Debug)]
pub struct CamuClient {
    base_url: String,
    timeout: Duration,
}

impl CamuClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, timeout }
    }

    fn url(&self, endpoint: Endpoints) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Each login gets its own cookie jar.
    fn session_client(&self) -> Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Ok(origin) = HeaderValue::from_str(&self.base_url) {
            headers.insert(ORIGIN, origin);
        }
        Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .timeout(self.timeout)
            .build()
    }

    async fn post<T: DeserializeOwned>(
        &self,
        client: &Client,
        endpoint: Endpoints,
        section: Section,
        payload: &Value,
    ) -> ErpResult<Option<T>> {
        let url = self.url(endpoint);
        debug!("🌐 Requesting {} from {}", section, url);

        let resp = match client.post(&url).json(payload).send().await {
            Ok(resp) => resp,
            Err(network_error) => {
                error!("❌ Network error fetching {}: {}", section, network_error);
                if network_error.is_timeout() {
                    error!("⏰ Request to {} timed out", url);
                }
                return Err(ErpError::fetch(section, network_error));
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            error!("❌ Portal responded {} for {}: {}", status, section, body);
            return Err(ErpError::fetch(section, format!("HTTP {}", status)));
        }

        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| ErpError::fetch(section, format!("malformed response: {}", e)))?;
        Ok(envelope.into_data())
    }
}

#[async_trait]
impl ErpClient for CamuClient {
    async fn login(&self, email: &str, password: &str) -> ErpResult<ErpSession> {
        let client = self
            .session_client()
            .map_err(|e| ErpError::Auth(format!("failed to build HTTP client: {}", e)))?;
        let url = self.url(Endpoints::Login);
        let payload = json!({ "dtype": "M", "Email": email, "pwd": password });

        let resp = client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ErpError::Auth(format!("portal unreachable: {}", e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ErpError::Auth(format!("portal responded {}", status)));
        }

        let data = resp
            .json::<Envelope<LoginData>>()
            .await
            .map_err(|e| ErpError::Auth(format!("malformed login response: {}", e)))?
            .into_data()
            .ok_or_else(|| ErpError::Auth("login response carried no data".to_string()))?;

        if let Some(code) = data.code.as_deref() {
            if INVALID_CREDENTIAL_CODES.contains(&code) {
                warn!("Login rejected for {}: {}", email, code);
                return Err(ErpError::Auth(format!("invalid credentials ({})", code)));
            }
        }

        let student_id = data
            .student_id()
            .ok_or_else(|| ErpError::Auth("no student record in login response".to_string()))?;
        let progression = data
            .progression_data
            .into_iter()
            .next()
            .ok_or_else(|| ErpError::Auth("no progression data in login response".to_string()))?;

        info!("✅ Logged in as {}", email);
        Ok(ErpSession {
            client,
            student_id,
            progression,
        })
    }

    async fn fetch_attendance(&self, session: &ErpSession) -> ErpResult<Attendance> {
        let field = |key: &str| session.progression.get(key).cloned().unwrap_or(Value::Null);
        let payload = json!({
            "InId": field("InId"),
            "PrID": field("PrID"),
            "CrID": field("CrID"),
            "DeptID": field("DeptID"),
            "SemID": field("SemID"),
            "AcYr": field("AcYr"),
            "CmProgID": field("CmProgID"),
            "StuID": session.student_id,
            "isFE": true,
            "isForWeb": true,
            "isFrAbLg": true,
        });

        self.post::<AttendanceData>(
            &session.client,
            Endpoints::Attendance,
            Section::Attendance,
            &payload,
        )
        .await?
        .map(Attendance::from)
        .ok_or_else(|| ErpError::fetch(Section::Attendance, "no attendance data returned"))
    }

    async fn fetch_timetable(
        &self,
        session: &ErpSession,
        at: DateTime<FixedOffset>,
    ) -> ErpResult<Vec<Period>> {
        let today = at.format("%Y-%m-%d").to_string();
        let mut payload = session.progression.clone();
        payload.insert("enableV2".into(), json!(true));
        payload.insert("start".into(), json!(today));
        payload.insert("end".into(), json!(today));
        payload.insert("usrTime".into(), json!(at.format("%d-%m-%Y, %I:%M %p").to_string()));
        payload.insert("schdlTyp".into(), json!("slctdSchdl"));
        payload.insert("isShowCancelledPeriod".into(), json!(true));
        payload.insert("isFromTt".into(), json!(true));

        let days = self
            .post::<Vec<TimetableDay>>(
                &session.client,
                Endpoints::Timetable,
                Section::Timetable,
                &Value::Object(payload),
            )
            .await?
            .unwrap_or_default();
        Ok(periods_from(days))
    }

    async fn fetch_menu(&self, session: &ErpSession, at: DateTime<FixedOffset>) -> ErpResult<Menu> {
        let institution_id = session
            .institution_id()
            .cloned()
            .ok_or_else(|| ErpError::fetch(Section::Menu, "no institution id in session"))?;
        let payload = json!({
            "stuId": session.student_id,
            "InId": institution_id,
            "day": day_code(at.weekday()),
        });

        Ok(self
            .post::<MenuData>(
                &session.client,
                Endpoints::CafeteriaMenu,
                Section::Menu,
                &payload,
            )
            .await?
            .map(Menu::from)
            .unwrap_or_default())
    }
}

fn day_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    }
}
