//! Domain models - posts as stored in the backend table, plus auth-side types.
//! Field names stay snake_case to match the backend's column names on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post as the backend stores it. The feed holds read-only, possibly-stale
/// copies of these; mutation only ever happens through explicit authoring
/// actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub section_slug: String,
    pub blurb: String,
    /// Markdown body.
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub read_time_minutes: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// A post about to be created; the backend assigns id and created_at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub section_slug: String,
    pub blurb: String,
    pub content: String,
    pub image_url: String,
    pub alt_text: String,
    pub author: String,
    pub read_time_minutes: i32,
    pub tags: Vec<String>,
    pub is_published: bool,
}

/// Partial update of a post. Absent fields are left untouched by the backend;
/// id and created_at are never part of an update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

/// One page of feed results: the items in order plus the backend-reported
/// total matching count.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub total: i64,
}

/// An authenticated session handed back by the hosted auth provider. The
/// token is opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Result of a sign-up attempt. When the provider requires email
/// confirmation, the account exists but no session does yet.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub session: Option<Session>,
}

impl SignUpOutcome {
    pub fn confirmation_pending(&self) -> bool {
        self.session.is_none()
    }
}

/// Session lifecycle events observable by any component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    PasswordRecovery,
    UserUpdated,
}
