//! REST client for the practice backend.
//!
//! State containers talk to the network only through [`Backend`], so every
//! fallback path can be exercised without a browser.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::*;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[allow(async_fn_in_trait)]
pub trait Backend {
    // auth
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthSession>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;
    async fn sign_in_with_google(&self, credential: &str) -> Result<AuthSession>;
    async fn validate(&self, token: &str) -> Result<AuthUser>;
    async fn sign_out(&self, token: &str) -> Result<()>;

    // katas
    async fn fetch_katas(&self) -> Result<Vec<Kata>>;
    async fn fetch_kata(&self, id: u32) -> Result<Kata>;
    async fn fetch_kata_progress(&self, user_id: &str) -> Result<Vec<KataProgress>>;
    async fn record_kata_practice(&self, practice: &KataPractice) -> Result<KataProgress>;

    // user
    async fn fetch_progress(&self, user_id: &str) -> Result<UserProgress>;
    async fn fetch_practice_history(&self, user_id: &str) -> Result<Vec<PracticeHistoryEntry>>;
    async fn fetch_points_audit(&self, user_id: &str) -> Result<Vec<PointsAuditEntry>>;
    async fn fetch_calendar(&self, user_id: &str, month: &str) -> Result<Vec<CalendarDay>>;
    async fn fetch_dashboard_analytics(&self, user_id: &str) -> Result<DashboardAnalytics>;
    async fn fetch_recent_activity(&self, user_id: &str) -> Result<Vec<RecentActivity>>;

    // practice
    async fn record_practice(&self, practice: &QuickPractice) -> Result<()>;
    async fn submit_practice_session(&self, user_id: &str, record: &PracticeRecord) -> Result<()>;

    // movement
    async fn fetch_combinations(&self) -> Result<Vec<Combination>>;
    async fn create_combination(&self, draft: &NewCombination) -> Result<Combination>;
    async fn fetch_move_counters(&self) -> Result<Vec<MoveCounter>>;
    async fn create_movement_session(&self, combination_ids: &[String]) -> Result<MovementSession>;
    async fn end_movement_session(&self, session_id: &str, notes: &str, counters: &[MoveCounter]) -> Result<()>;
}

pub fn user_path(user_id: &str, rest: &str) -> String {
    format!("/api/users/{}/{}", user_id, rest)
}

// ============ HTTP ============

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ValidateResponse {
    user: AuthUser,
}

#[derive(Serialize, Debug)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize, Debug)]
struct GoogleCredential<'a> {
    credential: &'a str,
}

#[derive(Serialize, Debug)]
struct SessionSubmission<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    record: &'a PracticeRecord,
}

#[derive(Serialize, Debug)]
struct MovementSessionCreate<'a> {
    combination_ids: &'a [String],
}

#[derive(Serialize, Debug)]
struct MovementSessionEnd<'a> {
    notes: &'a str,
    move_counters: &'a [MoveCounter],
}

/// Backend reached through `window.fetch`.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    config: Config,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: Config) -> Self {
        Self { config, token: None }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn headers(&self) -> Result<Headers> {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        if let Some(token) = &self.token {
            headers.set("Authorization", &format!("Bearer {}", token))?;
        }
        Ok(headers)
    }

    async fn fetch(&self, method: &str, path: &str, body: Option<String>) -> Result<Response> {
        let window = web_sys::window().ok_or_else(|| Error::Network("no window".into()))?;

        let headers = self.headers()?;
        let opts = create_request_init(method, body.as_deref(), &headers);

        let url = self.config.url(path);
        let request = Request::new_with_str_and_init(&url, &opts)?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;

        if !resp.ok() {
            let err = http_error(&resp).await;
            tracing::debug!("{} {} failed: {}", method, path, err);
            return Err(err);
        }

        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.fetch("GET", path, None).await?;
        let json = JsFuture::from(resp.json()?).await?;
        Ok(serde_wasm_bindgen::from_value(json)?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(&self, method: &str, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_string(body)?;
        let resp = self.fetch(method, path, Some(body)).await?;
        let json = JsFuture::from(resp.json()?).await?;
        Ok(serde_wasm_bindgen::from_value(json)?)
    }

    async fn send_no_content<B: Serialize>(&self, method: &str, path: &str, body: &B) -> Result<()> {
        let body = serde_json::to_string(body)?;
        self.fetch(method, path, Some(body)).await?;
        Ok(())
    }
}

fn create_request_init(method: &str, body: Option<&str>, headers: &Headers) -> RequestInit {
    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(b) = body {
        opts.set_body(&JsValue::from_str(b));
    }
    opts.set_headers(&JsValue::from(headers));
    opts
}

async fn http_error(resp: &Response) -> Error {
    let status = resp.status();
    let mut message = None;
    if let Ok(promise) = resp.json() {
        if let Ok(json) = JsFuture::from(promise).await {
            if let Ok(body) = serde_wasm_bindgen::from_value::<ApiErrorBody>(json) {
                message = body.message.or(body.error);
            }
        }
    }
    Error::Http {
        status,
        message: message.unwrap_or_else(|| resp.status_text()),
    }
}

impl Backend for HttpBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthSession> {
        self.send_json("POST", "/api/auth/signup", request).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.send_json("POST", "/api/auth/signin", &Credentials { email, password }).await
    }

    async fn sign_in_with_google(&self, credential: &str) -> Result<AuthSession> {
        self.send_json("POST", "/api/auth/google", &GoogleCredential { credential }).await
    }

    async fn validate(&self, token: &str) -> Result<AuthUser> {
        let backend = self.clone().with_token(Some(token.to_string()));
        let resp: ValidateResponse = backend.get_json("/api/auth/validate").await?;
        Ok(resp.user)
    }

    async fn sign_out(&self, token: &str) -> Result<()> {
        let backend = self.clone().with_token(Some(token.to_string()));
        backend.send_no_content("POST", "/api/auth/signout", &serde_json::json!({})).await
    }

    async fn fetch_katas(&self) -> Result<Vec<Kata>> {
        self.get_json("/api/katas").await
    }

    async fn fetch_kata(&self, id: u32) -> Result<Kata> {
        self.get_json(&format!("/api/katas/{}", id)).await
    }

    async fn fetch_kata_progress(&self, user_id: &str) -> Result<Vec<KataProgress>> {
        self.get_json(&format!("/api/kata/progress?user_id={}", String::from(js_sys::encode_uri_component(user_id)))).await
    }

    async fn record_kata_practice(&self, practice: &KataPractice) -> Result<KataProgress> {
        self.send_json("POST", "/api/kata/practice", practice).await
    }

    async fn fetch_progress(&self, user_id: &str) -> Result<UserProgress> {
        self.get_json(&user_path(user_id, "progress")).await
    }

    async fn fetch_practice_history(&self, user_id: &str) -> Result<Vec<PracticeHistoryEntry>> {
        self.get_json(&user_path(user_id, "practice/history")).await
    }

    async fn fetch_points_audit(&self, user_id: &str) -> Result<Vec<PointsAuditEntry>> {
        self.get_json(&user_path(user_id, "points/audit")).await
    }

    async fn fetch_calendar(&self, user_id: &str, month: &str) -> Result<Vec<CalendarDay>> {
        self.get_json(&format!("{}?month={}", user_path(user_id, "calendar"), month)).await
    }

    async fn fetch_dashboard_analytics(&self, user_id: &str) -> Result<DashboardAnalytics> {
        self.get_json(&user_path(user_id, "dashboard/analytics")).await
    }

    async fn fetch_recent_activity(&self, user_id: &str) -> Result<Vec<RecentActivity>> {
        self.get_json(&user_path(user_id, "recent-activity")).await
    }

    async fn record_practice(&self, practice: &QuickPractice) -> Result<()> {
        self.send_no_content("POST", "/api/practice/record", practice).await
    }

    async fn submit_practice_session(&self, user_id: &str, record: &PracticeRecord) -> Result<()> {
        self.send_no_content("POST", "/api/practice/session", &SessionSubmission { user_id, record }).await
    }

    async fn fetch_combinations(&self) -> Result<Vec<Combination>> {
        self.get_json("/api/combinations").await
    }

    async fn create_combination(&self, draft: &NewCombination) -> Result<Combination> {
        self.send_json("POST", "/api/combinations", draft).await
    }

    async fn fetch_move_counters(&self) -> Result<Vec<MoveCounter>> {
        self.get_json("/api/move-counters").await
    }

    async fn create_movement_session(&self, combination_ids: &[String]) -> Result<MovementSession> {
        self.send_json("POST", "/api/movement-sessions", &MovementSessionCreate { combination_ids }).await
    }

    async fn end_movement_session(&self, session_id: &str, notes: &str, counters: &[MoveCounter]) -> Result<()> {
        let path = format!("/api/movement-sessions/{}", session_id);
        self.send_no_content("PUT", &path, &MovementSessionEnd { notes, move_counters: counters }).await
    }
}
