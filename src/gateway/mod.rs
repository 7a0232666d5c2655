/*!
 * Gateway Module
 * The crate's single seam to the hosted backend: table queries, post
 * mutations, object storage, and the auth provider.
 */

pub mod rest;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::models::{NewPost, Post, PostPage, PostPatch, Session, SignUpOutcome};

/// Parameters for one paginated feed read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub section_slug: String,
    /// Free-text term; `None` disables filtering.
    pub search_term: Option<String>,
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
    /// Privileged viewers see unpublished drafts; everyone else never does.
    pub include_drafts: bool,
}

impl FeedQuery {
    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u32 {
        (self.page.max(1) - 1) * self.page_size
    }
}

/// Remote backend boundary. One implementation speaks the hosted backend's
/// wire protocol; tests substitute an in-memory one.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch one page of posts, newest first, with the backend-reported
    /// total matching count.
    async fn fetch_posts(&self, query: &FeedQuery) -> Result<PostPage, GatewayError>;

    async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError>;

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Post, GatewayError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), GatewayError>;

    /// Upload an image to the object store and return its public URL.
    async fn upload_image(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, GatewayError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), GatewayError>;

    async fn request_password_reset(&self, email: &str) -> Result<(), GatewayError>;
}
