/*!
 * Feed Controller
 * Owns the visible, ordered sequence of posts for the active section and
 * search term: incremental offset pagination, infinite-scroll appends, and
 * draft visibility for privileged viewers.
 */

use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::gateway::{FeedQuery, Gateway};
use crate::models::Post;
use crate::notify::Notices;
use crate::sections;

/// Items requested per page. Offsets are derived from this, so it is fixed
/// for the controller's lifetime.
pub const PAGE_SIZE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Fetching,
}

#[derive(Debug)]
struct FeedState {
    /// Active section slug, always a real section (never the home sentinel).
    section: String,
    search_term: String,
    posts: Vec<Post>,
    /// 1-based index of the last applied page.
    page: u32,
    has_more: bool,
    phase: Phase,
    /// Privileged viewers see unpublished drafts.
    privileged: bool,
    /// Request tag. A reset bumps this; a response whose tag no longer
    /// matches is discarded on arrival, so a slow fetch can never clobber
    /// the state of a newer query.
    generation: u64,
}

pub struct FeedController {
    gateway: Arc<dyn Gateway>,
    notices: Notices,
    // Never held across an await; gateway calls happen between lock scopes.
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(gateway: Arc<dyn Gateway>, notices: Notices) -> Self {
        Self {
            gateway,
            notices,
            state: Mutex::new(FeedState {
                section: sections::DEFAULT_SECTION_SLUG.to_string(),
                search_term: String::new(),
                posts: Vec::new(),
                page: 1,
                has_more: true,
                phase: Phase::Idle,
                privileged: false,
                generation: 0,
            }),
        }
    }

    /// Switch the active section. `home` aliases to the default section;
    /// unknown slugs are ignored (static views have no feed). A valid switch
    /// is a full reset followed by a fetch of page 1.
    pub async fn set_section(&self, slug: &str) {
        let Some(resolved) = sections::resolve(slug) else {
            tracing::warn!(slug, "Ignoring unknown section slug");
            return;
        };
        {
            self.state.lock().unwrap().section = resolved.to_string();
        }
        self.fetch(true).await;
    }

    /// Change the search term; resets exactly like a section change. An
    /// empty or blank term disables filtering.
    pub async fn set_search_term(&self, term: &str) {
        {
            self.state.lock().unwrap().search_term = term.to_string();
        }
        self.fetch(true).await;
    }

    /// Re-run the current query from page 1 (e.g. after a post is saved).
    pub async fn refresh(&self) {
        self.fetch(true).await;
    }

    /// Update draft visibility when the viewer's privilege changes; a
    /// change re-runs the current query from page 1.
    pub async fn set_privileged(&self, privileged: bool) {
        {
            let mut state = self.state.lock().unwrap();
            if state.privileged == privileged {
                return;
            }
            state.privileged = privileged;
        }
        self.fetch(true).await;
    }

    /// Advance to the next page and append its results. A no-op while a
    /// fetch is in flight or when no more pages are known to exist.
    pub async fn request_next_page(&self) {
        self.fetch(false).await;
    }

    /// Delete a post on behalf of a privileged viewer. Unprivileged
    /// attempts are short-circuited client-side without issuing the
    /// request; the caller should open the authentication prompt when this
    /// returns false.
    pub async fn delete_post(&self, id: Uuid) -> bool {
        if !self.state.lock().unwrap().privileged {
            self.notices
                .error("Unauthorized", "You must be an admin to delete posts.");
            return false;
        }
        match self.gateway.delete_post(id).await {
            Ok(()) => {
                self.notices
                    .info("Post Deleted", "The post has been successfully deleted.");
                self.refresh().await;
                true
            }
            Err(e) => {
                self.notices.error("Error Deleting Post", e.to_string());
                false
            }
        }
    }

    /// One fetch cycle. The reset path supersedes anything in flight: it
    /// advances the generation so the superseded response is discarded when
    /// it arrives. The next-page path is strictly rejected while Fetching,
    /// so at most one response is ever applied.
    async fn fetch(&self, reset: bool) {
        let (query, generation) = {
            let mut state = self.state.lock().unwrap();
            if reset {
                state.generation = state.generation.wrapping_add(1);
                state.posts.clear();
                state.page = 1;
                state.has_more = true;
            } else if state.phase == Phase::Fetching || !state.has_more {
                return;
            }
            state.phase = Phase::Fetching;

            let page = if reset { 1 } else { state.page + 1 };
            let term = state.search_term.trim();
            let query = FeedQuery {
                section_slug: state.section.clone(),
                search_term: if term.is_empty() {
                    None
                } else {
                    Some(term.to_string())
                },
                page,
                page_size: PAGE_SIZE,
                include_drafts: state.privileged,
            };
            (query, state.generation)
        };

        let result = self.gateway.fetch_posts(&query).await;

        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            // Superseded by a reset; the newer request owns the state now.
            tracing::debug!(page = query.page, "Discarding stale feed response");
            return;
        }
        match result {
            Ok(fetched) => {
                let count = fetched.items.len();
                if reset {
                    state.posts = fetched.items;
                } else {
                    state.posts.extend(fetched.items);
                }
                state.page = query.page;
                state.has_more = count > 0 && (state.posts.len() as i64) < fetched.total;
                state.phase = Phase::Idle;
                tracing::debug!(
                    section = %query.section_slug,
                    page = query.page,
                    accumulated = state.posts.len(),
                    total = fetched.total,
                    has_more = state.has_more,
                    "Feed page applied"
                );
            }
            Err(e) => {
                // Page, accumulated list, and has-more stay as they were;
                // the same call is safe to retry.
                state.phase = Phase::Idle;
                drop(state);
                tracing::error!("Error fetching posts: {}", e);
                self.notices.error("Error fetching posts", e.to_string());
            }
        }
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn page(&self) -> u32 {
        self.state.lock().unwrap().page
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().unwrap().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().phase == Phase::Fetching
    }

    pub fn section(&self) -> String {
        self.state.lock().unwrap().section.clone()
    }

    pub fn search_term(&self) -> String {
        self.state.lock().unwrap().search_term.clone()
    }
}
