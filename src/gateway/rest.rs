//! Reqwest-backed gateway speaking the hosted backend's wire protocol:
//! table reads/writes through the REST query API, password auth through the
//! auth endpoints, and image uploads through the storage API.

use async_trait::async_trait;
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::GatewayError;
use crate::gateway::{FeedQuery, Gateway};
use crate::models::{NewPost, Post, PostPage, PostPatch, Session, SignUpOutcome};

pub struct RestGateway {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    bucket: String,
    /// Access token of the signed-in session, if any. Requests fall back to
    /// the anon key when no session is held.
    access_token: RwLock<Option<String>>,
}

impl RestGateway {
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            bucket: config.storage_bucket.clone(),
            access_token: RwLock::new(None),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    fn object_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }

    /// Public URL of an uploaded object.
    fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_name
        )
    }

    fn bearer(&self) -> String {
        self.access_token
            .read()
            .expect("access token lock poisoned")
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .expect("access token lock poisoned") = token;
    }

    /// The search term matches when it is a case-insensitive substring of
    /// the title or the blurb, or an exact element of the tag set. The term
    /// is interpolated the way the backend's query builder expects it;
    /// reserved-character escaping is deferred to the backend, matching the
    /// filter semantics this crate delegates outright.
    fn search_filter(term: &str) -> String {
        format!(
            "(title.ilike.*{term}*,blurb.ilike.*{term}*,tags.cs.{{{term}}})",
            term = term
        )
    }

    /// Total matching count from a `Content-Range` header like `0-2/7`.
    /// A `*` total means the backend did not count.
    fn parse_total(content_range: &str) -> Option<i64> {
        let total = content_range.rsplit('/').next()?;
        total.trim().parse().ok()
    }

    /// Map a non-success response to a backend error, preserving the
    /// backend's own message when the body carries one.
    async fn backend_error(resp: Response) -> GatewayError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                ["message", "msg", "error_description", "error"]
                    .iter()
                    .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body
                }
            });
        GatewayError::backend(status.as_u16(), message)
    }

    async fn check(resp: Response) -> Result<Response, GatewayError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(Self::backend_error(resp).await)
        }
    }

    /// Mutations return a representation array; we expect exactly one row.
    async fn single_row(resp: Response) -> Result<Post, GatewayError> {
        let rows: Vec<Post> = resp.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("empty representation".into()))
    }

    fn session_from(token: String, user: AuthUser) -> Session {
        let display_name = user
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("full_name"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Session {
            access_token: token,
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
    user_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

#[async_trait]
impl Gateway for RestGateway {
    async fn fetch_posts(&self, query: &FeedQuery) -> Result<PostPage, GatewayError> {
        let mut params: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("section_slug", format!("eq.{}", query.section_slug)),
            ("order", "created_at.desc".to_string()),
            ("limit", query.page_size.to_string()),
            ("offset", query.offset().to_string()),
        ];
        if !query.include_drafts {
            params.push(("is_published", "eq.true".to_string()));
        }
        if let Some(term) = query.search_term.as_deref() {
            params.push(("or", Self::search_filter(term)));
        }

        tracing::debug!(
            section = %query.section_slug,
            page = query.page,
            search = query.search_term.as_deref().unwrap_or(""),
            "Fetching posts"
        );

        let resp = self
            .client
            .get(self.rest_url("posts"))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await?;
        let resp = Self::check(resp).await?;

        let total = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse_total);

        let items: Vec<Post> = resp.json().await?;
        let total = total.unwrap_or(items.len() as i64);
        Ok(PostPage { items, total })
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError> {
        let resp = self
            .client
            .post(self.rest_url("posts"))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Prefer", "return=representation")
            .json(post)
            .send()
            .await?;
        Self::single_row(Self::check(resp).await?).await
    }

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Post, GatewayError> {
        let resp = self
            .client
            .patch(self.rest_url("posts"))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .json(patch)
            .send()
            .await?;
        Self::single_row(Self::check(resp).await?).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), GatewayError> {
        let resp = self
            .client
            .delete(self.rest_url("posts"))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn upload_image(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let resp = self
            .client
            .post(self.object_url(object_name))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(resp).await?;
        tracing::info!(object = %object_name, "Image uploaded");
        Ok(self.public_url(object_name))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let resp = self
            .client
            .post(self.auth_url("token"))
            .header("apikey", &self.anon_key)
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = Self::check(resp).await?.json().await?;
        self.set_access_token(Some(token.access_token.clone()));
        Ok(Self::session_from(token.access_token, token.user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, GatewayError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "full_name": display_name.unwrap_or_default() },
        });
        let resp = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;
        let outcome: SignUpResponse = Self::check(resp).await?.json().await?;

        // With email confirmation enabled the provider returns a user but no
        // token; a session only exists once the address is confirmed.
        let session = match (outcome.access_token, outcome.user) {
            (Some(token), Some(user)) => {
                self.set_access_token(Some(token.clone()));
                Some(Self::session_from(token, user))
            }
            _ => None,
        };
        Ok(SignUpOutcome { session })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), GatewayError> {
        let resp = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        // The provider answers 204 on success.
        if resp.status() == StatusCode::NO_CONTENT || resp.status().is_success() {
            self.set_access_token(None);
            Ok(())
        } else {
            Err(Self::backend_error(resp).await)
        }
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), GatewayError> {
        let resp = self
            .client
            .post(self.auth_url("recover"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
