//! In-memory gateway for tests. Replicates the backend's observable query
//! semantics (section equality, draft exclusion, the OR-of-three search
//! match, newest-first ordering, offset/limit, exact totals) and adds
//! failure injection plus a gate for holding fetches open.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::gateway::{FeedQuery, Gateway};
use crate::models::{NewPost, Post, PostPage, PostPatch, Session, SignUpOutcome};

pub struct MockGateway {
    posts: Mutex<Vec<Post>>,
    accounts: Mutex<HashMap<String, String>>,
    fail_fetches: AtomicBool,
    fail_auth: AtomicBool,
    confirm_required: AtomicBool,
    fetch_calls: AtomicUsize,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::with_posts(Vec::new())
    }

    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
            accounts: Mutex::new(HashMap::new()),
            fail_fetches: AtomicBool::new(false),
            fail_auth: AtomicBool::new(false),
            confirm_required: AtomicBool::new(false),
            fetch_calls: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    pub fn add_account(&self, email: &str, password: &str) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), password.to_string());
    }

    pub fn set_fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_auth(&self, fail: bool) {
        self.fail_auth.store(fail, Ordering::SeqCst);
    }

    pub fn require_confirmation(&self, required: bool) {
        self.confirm_required.store(required, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn posts_len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    /// Install a zero-permit gate; every subsequent fetch blocks until the
    /// test adds a permit. Lets tests observe the in-flight state.
    pub fn gate_fetches(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn matches(post: &Post, query: &FeedQuery) -> bool {
        if post.section_slug != query.section_slug {
            return false;
        }
        if !query.include_drafts && !post.is_published {
            return false;
        }
        match query.search_term.as_deref() {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.blurb.to_lowercase().contains(&needle)
                    || post.tags.iter().any(|tag| tag == term)
            }
        }
    }
}

/// A published-by-default post whose age grows with `i`, so lower indices
/// sort first in a newest-first feed.
pub fn sample_post(i: usize, section: &str, published: bool) -> Post {
    Post {
        id: Uuid::new_v4(),
        title: format!("Post {}", i),
        slug: format!("post-{}", i),
        section_slug: section.to_string(),
        blurb: format!("Blurb for post {}", i),
        content: "# Body".to_string(),
        image_url: String::new(),
        alt_text: String::new(),
        author: "Author".to_string(),
        read_time_minutes: 4,
        tags: vec!["sample".to_string()],
        is_published: published,
        created_at: Utc::now() - Duration::seconds(i as i64),
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn fetch_posts(&self, query: &FeedQuery) -> Result<PostPage, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(GatewayError::backend(500, "mock fetch failure"));
        }

        let mut matching: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| Self::matches(p, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();
        Ok(PostPage { items, total })
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError> {
        let created = Post {
            id: Uuid::new_v4(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            section_slug: post.section_slug.clone(),
            blurb: post.blurb.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            alt_text: post.alt_text.clone(),
            author: post.author.clone(),
            read_time_minutes: post.read_time_minutes,
            tags: post.tags.clone(),
            is_published: post.is_published,
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Post, GatewayError> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::backend(404, "post not found"))?;

        if let Some(v) = &patch.title {
            post.title = v.clone();
        }
        if let Some(v) = &patch.slug {
            post.slug = v.clone();
        }
        if let Some(v) = &patch.section_slug {
            post.section_slug = v.clone();
        }
        if let Some(v) = &patch.blurb {
            post.blurb = v.clone();
        }
        if let Some(v) = &patch.content {
            post.content = v.clone();
        }
        if let Some(v) = &patch.image_url {
            post.image_url = v.clone();
        }
        if let Some(v) = &patch.alt_text {
            post.alt_text = v.clone();
        }
        if let Some(v) = &patch.author {
            post.author = v.clone();
        }
        if let Some(v) = patch.read_time_minutes {
            post.read_time_minutes = v;
        }
        if let Some(v) = &patch.tags {
            post.tags = v.clone();
        }
        if let Some(v) = patch.is_published {
            post.is_published = v;
        }
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), GatewayError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(GatewayError::backend(404, "post not found"));
        }
        Ok(())
    }

    async fn upload_image(
        &self,
        object_name: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, GatewayError> {
        Ok(format!("https://cdn.example.test/{}", object_name))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        if self.fail_auth.load(Ordering::SeqCst) {
            return Err(GatewayError::backend(500, "mock auth failure"));
        }
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some(stored) if stored == password => Ok(Session {
                access_token: "mock-token".to_string(),
                user_id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                display_name: None,
            }),
            _ => Err(GatewayError::backend(400, "Invalid login credentials")),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, GatewayError> {
        if self.fail_auth.load(Ordering::SeqCst) {
            return Err(GatewayError::backend(500, "mock auth failure"));
        }
        self.add_account(email, password);
        if self.confirm_required.load(Ordering::SeqCst) {
            return Ok(SignUpOutcome { session: None });
        }
        Ok(SignUpOutcome {
            session: Some(Session {
                access_token: "mock-token".to_string(),
                user_id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                display_name: display_name.map(str::to_string),
            }),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), GatewayError> {
        if self.fail_auth.load(Ordering::SeqCst) {
            return Err(GatewayError::backend(500, "mock auth failure"));
        }
        Ok(())
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), GatewayError> {
        if self.fail_auth.load(Ordering::SeqCst) {
            return Err(GatewayError::backend(500, "mock auth failure"));
        }
        Ok(())
    }
}
