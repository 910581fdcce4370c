//! Hosted backend over HTTP.
//!
//! Talks to a PostgREST-style data API (`/rest/v1/<table>`) and a GoTrue
//! style auth API (`/auth/v1/...`). Row-level access control lives on the
//! server; every request still filters by the caller's user id.

use async_trait::async_trait;
use chrono::SecondsFormat;
use focusforge_core::{
    AuthUser, Badge, Distraction, NewBadge, NewDistraction, NewSession, Profile, ProfileUpdate,
    RecordQuery, Session, SessionId, SessionUpdate, SortOrder, Time,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{Backend, BackendError, Result};

const SESSIONS: &str = "focus_sessions";
const DISTRACTIONS: &str = "distractions";
const PROFILES: &str = "profiles";
const BADGES: &str = "badges";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestConfig {
    /// Project base URL, e.g. `https://xyz.example.co`
    pub url: String,

    /// Public (anon) API key sent as `apikey`
    pub api_key: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl RestConfig {
    /// Create a config with the default timeout.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Hosted implementation of [`Backend`].
pub struct RestBackend {
    client: reqwest::Client,
    config: RestConfig,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUserRow>,
    // Sign-up without auto-confirm answers with the bare user object
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUserRow {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl RestBackend {
    /// Build a client for the given project.
    pub fn new(config: RestConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Backend settings.
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn table_request(&self, method: Method, table: &str, user: &AuthUser) -> Result<RequestBuilder> {
        let token = user
            .access_token
            .as_deref()
            .ok_or(BackendError::Unauthorized)?;
        let url = format!("{}/rest/v1/{}", self.base(), table);
        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(token))
    }

    async fn insert_row<B, R>(&self, user: &AuthUser, table: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let resp = self
            .table_request(Method::POST, table, user)?
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let mut rows: Vec<R> = check(resp).await?.json().await?;
        if rows.is_empty() {
            return Err(BackendError::Other(format!("insert into {} returned no row", table)));
        }
        Ok(rows.swap_remove(0))
    }

    async fn select_rows<R: DeserializeOwned>(
        &self,
        user: &AuthUser,
        table: &str,
        params: &[(String, String)],
    ) -> Result<Vec<R>> {
        debug!(table, ?params, "select");
        let resp = self
            .table_request(Method::GET, table, user)?
            .query(params)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    async fn patch_rows<B: Serialize + Sync>(
        &self,
        user: &AuthUser,
        table: &str,
        params: &[(String, String)],
        body: &B,
    ) -> Result<()> {
        let resp = self
            .table_request(Method::PATCH, table, user)?
            .query(params)
            .json(body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    /// Create an account. The returned handle has no token when the
    /// project requires email confirmation.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/signup", self.base());
        self.auth_request(url, email, password).await
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base());
        self.auth_request(url, email, password).await
    }

    async fn auth_request(&self, url: String, email: &str, password: &str) -> Result<AuthUser> {
        let resp = self
            .client
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body: AuthResponse = check(resp).await?.json().await?;

        let (id, returned_email) = match body.user {
            Some(user) => (user.id, user.email),
            None => (
                body.id
                    .ok_or_else(|| BackendError::Other("auth response without user".to_string()))?,
                body.email,
            ),
        };

        let mut user = AuthUser::new(id).with_email(returned_email.unwrap_or_else(|| email.to_string()));
        user.access_token = body.access_token;
        info!(user = %user.id, "authenticated");
        Ok(user)
    }
}

/// Map non-2xx answers to errors.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

fn eq(column: &str, value: impl std::fmt::Display) -> (String, String) {
    (column.to_string(), format!("eq.{}", value))
}

fn timestamp(t: &Time) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// PostgREST parameters for a user-scoped listing ordered by `column`.
fn list_params(user: &AuthUser, column: &str, query: &RecordQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        eq("user_id", &user.id),
    ];
    if query.completed_only {
        params.push(eq("completed", true));
    }
    if let Some(since) = &query.since {
        params.push((column.to_string(), format!("gte.{}", timestamp(since))));
    }
    let direction = match query.order {
        SortOrder::Ascending => "asc",
        SortOrder::Descending => "desc",
    };
    params.push(("order".to_string(), format!("{}.{}", column, direction)));
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

#[async_trait]
impl Backend for RestBackend {
    async fn insert_session(&self, user: &AuthUser, session: &NewSession) -> Result<Session> {
        self.insert_row(user, SESSIONS, session).await
    }

    async fn update_session(
        &self,
        user: &AuthUser,
        id: &SessionId,
        update: &SessionUpdate,
    ) -> Result<()> {
        let params = [eq("id", id), eq("user_id", &user.id)];
        self.patch_rows(user, SESSIONS, &params, update).await
    }

    async fn delete_session(&self, user: &AuthUser, id: &SessionId) -> Result<()> {
        let params = [eq("id", id), eq("user_id", &user.id)];
        let resp = self
            .table_request(Method::DELETE, SESSIONS, user)?
            .query(&params)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn list_sessions(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Session>> {
        self.select_rows(user, SESSIONS, &list_params(user, "started_at", query))
            .await
    }

    async fn insert_distraction(
        &self,
        user: &AuthUser,
        distraction: &NewDistraction,
    ) -> Result<Distraction> {
        self.insert_row(user, DISTRACTIONS, distraction).await
    }

    async fn list_distractions(
        &self,
        user: &AuthUser,
        query: &RecordQuery,
    ) -> Result<Vec<Distraction>> {
        let query = RecordQuery { completed_only: false, ..query.clone() };
        self.select_rows(user, DISTRACTIONS, &list_params(user, "timestamp", &query))
            .await
    }

    async fn load_profile(&self, user: &AuthUser) -> Result<Option<Profile>> {
        let params = [
            ("select".to_string(), "id,xp,streak_count,last_session_date".to_string()),
            eq("id", &user.id),
        ];
        let mut rows: Vec<Profile> = self.select_rows(user, PROFILES, &params).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn update_profile(&self, user: &AuthUser, update: &ProfileUpdate) -> Result<()> {
        self.patch_rows(user, PROFILES, &[eq("id", &user.id)], update)
            .await
    }

    async fn insert_badge(&self, user: &AuthUser, badge: &NewBadge) -> Result<Badge> {
        self.insert_row(user, BADGES, badge).await
    }

    async fn list_badges(&self, user: &AuthUser, query: &RecordQuery) -> Result<Vec<Badge>> {
        let query = RecordQuery { completed_only: false, ..query.clone() };
        self.select_rows(user, BADGES, &list_params(user, "earned_at", &query))
            .await
    }

    async fn count_completed_sessions(&self, user: &AuthUser) -> Result<usize> {
        let params = [
            ("select".to_string(), "id".to_string()),
            eq("user_id", &user.id),
            eq("completed", true),
        ];
        let rows: Vec<serde_json::Value> = self.select_rows(user, SESSIONS, &params).await?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_list_params() {
        let user = AuthUser::new("u1");
        let since = chrono::Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let params = list_params(&user, "started_at", &RecordQuery::all().completed().since(since).limit(20));

        assert!(params.contains(&("user_id".to_string(), "eq.u1".to_string())));
        assert!(params.contains(&("completed".to_string(), "eq.true".to_string())));
        assert!(params.contains(&("started_at".to_string(), "gte.2025-03-03T00:00:00.000Z".to_string())));
        assert!(params.contains(&("order".to_string(), "started_at.desc".to_string())));
        assert!(params.contains(&("limit".to_string(), "20".to_string())));
    }

    #[test]
    fn test_base_url_trims_slash() {
        let backend = RestBackend::new(RestConfig::new("https://forge.example/", "anon")).unwrap();
        assert_eq!(backend.base(), "https://forge.example");
    }
}
