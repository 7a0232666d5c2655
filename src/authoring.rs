/*!
 * Post Authoring Form
 * Field capture and create/update submission. Pure form-to-request mapping;
 * the feed never mutates posts, this module is the only write path.
 */

use chrono::Utc;
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::models::{NewPost, Post, PostPatch};
use crate::notify::Notices;
use crate::sections;

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, underscores, and
    /// hyphen-separated runs of them
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9_]+(?:-[a-z0-9_]+)*$").unwrap();
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

/// Derive a URL-safe slug from a title: lowercase, whitespace runs become
/// hyphens, everything outside `[a-z0-9_-]` is stripped.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Unique object name for an uploaded file: millisecond timestamp plus the
/// original name with whitespace hyphenated.
pub fn upload_object_name(original: &str) -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        original.split_whitespace().collect::<Vec<_>>().join("-")
    )
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Caught before any request is issued.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Editable state of one post, new or existing.
#[derive(Debug, Clone)]
pub struct PostForm {
    /// Id of the post being edited; `None` while creating.
    editing: Option<Uuid>,
    title: String,
    slug: String,
    /// Once the user touches the slug by hand, auto-derivation stops.
    slug_edited: bool,
    section_slug: String,
    tags: Vec<String>,
    pub blurb: String,
    pub content: String,
    pub image_url: String,
    pub alt_text: String,
    pub author: String,
    pub read_time_minutes: i32,
    pub is_published: bool,
}

impl PostForm {
    pub fn new(section_slug: &str) -> Self {
        Self {
            editing: None,
            title: String::new(),
            slug: String::new(),
            slug_edited: false,
            section_slug: section_slug.to_string(),
            tags: Vec::new(),
            blurb: String::new(),
            content: String::new(),
            image_url: String::new(),
            alt_text: String::new(),
            author: String::new(),
            read_time_minutes: 0,
            is_published: true,
        }
    }

    /// Form pre-filled from an existing post. Editing never auto-derives
    /// the slug; published URLs should not silently change.
    pub fn edit(post: &Post) -> Self {
        Self {
            editing: Some(post.id),
            title: post.title.clone(),
            slug: post.slug.clone(),
            slug_edited: true,
            section_slug: post.section_slug.clone(),
            tags: post.tags.clone(),
            blurb: post.blurb.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            alt_text: post.alt_text.clone(),
            author: post.author.clone(),
            read_time_minutes: post.read_time_minutes,
            is_published: post.is_published,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn section_slug(&self) -> &str {
        &self.section_slug
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Update the title, auto-deriving the slug while creating a new post
    /// and only until the slug has been manually edited.
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
        if self.editing.is_none() && !self.slug_edited {
            self.slug = slugify(title);
        }
    }

    pub fn set_slug(&mut self, slug: &str) {
        self.slug = slug.trim().to_string();
        self.slug_edited = true;
    }

    /// Returns false (and changes nothing) for a slug outside the section
    /// domain.
    pub fn set_section(&mut self, slug: &str) -> bool {
        if !sections::is_section(slug) {
            return false;
        }
        self.section_slug = slug.to_string();
        true
    }

    /// Append a trimmed tag unless it is empty or already present.
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Remove by exact match.
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Replace the tag set from a raw comma-separated string:
    /// split, trim, drop empties, deduplicate preserving order.
    pub fn set_tags_raw(&mut self, raw: &str) {
        self.tags.clear();
        for tag in raw.split(',') {
            self.add_tag(tag);
        }
    }

    /// Attach an image by literal URL entry.
    pub fn set_image_url(&mut self, url: &str) {
        self.image_url = url.trim().to_string();
    }

    /// Upload a file to the object store and adopt its public URL.
    pub async fn upload_image(
        &mut self,
        gateway: &dyn Gateway,
        notices: &Notices,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        let object_name = upload_object_name(filename);
        match gateway.upload_image(&object_name, bytes, content_type).await {
            Ok(url) => {
                self.image_url = url;
                notices.info("Image Uploaded", "Image successfully uploaded and URL set.");
                Ok(())
            }
            Err(e) => {
                notices.error("Image Upload Error", e.to_string());
                Err(e)
            }
        }
    }

    /// Create or update the post. On failure the form stays as entered so
    /// the user can correct and resubmit.
    pub async fn submit(
        &mut self,
        gateway: &dyn Gateway,
        notices: &Notices,
    ) -> Result<Post, SubmitError> {
        if self.title.trim().is_empty() {
            return Err(SubmitError::Validation("Title is required".to_string()));
        }
        if self.slug.trim().is_empty() {
            self.slug = slugify(&self.title);
        }
        if !is_valid_slug(&self.slug) {
            return Err(SubmitError::Validation(
                "Slug must contain only lowercase letters, numbers, hyphens, and underscores"
                    .to_string(),
            ));
        }

        let result = match self.editing {
            Some(id) => {
                let patch = PostPatch {
                    title: Some(self.title.clone()),
                    slug: Some(self.slug.clone()),
                    section_slug: Some(self.section_slug.clone()),
                    blurb: Some(self.blurb.clone()),
                    content: Some(self.content.clone()),
                    image_url: Some(self.image_url.clone()),
                    alt_text: Some(self.alt_text.clone()),
                    author: Some(self.author.clone()),
                    read_time_minutes: Some(self.read_time_minutes),
                    tags: Some(self.tags.clone()),
                    is_published: Some(self.is_published),
                };
                gateway.update_post(id, &patch).await
            }
            None => {
                let post = NewPost {
                    title: self.title.clone(),
                    slug: self.slug.clone(),
                    section_slug: self.section_slug.clone(),
                    blurb: self.blurb.clone(),
                    content: self.content.clone(),
                    image_url: self.image_url.clone(),
                    alt_text: self.alt_text.clone(),
                    author: self.author.clone(),
                    read_time_minutes: self.read_time_minutes,
                    tags: self.tags.clone(),
                    is_published: self.is_published,
                };
                gateway.create_post(&post).await
            }
        };

        let action = if self.is_editing() { "Updated" } else { "Created" };
        match result {
            Ok(post) => {
                notices.info(
                    format!("Post {}", action),
                    format!("\"{}\" has been successfully saved.", post.title),
                );
                Ok(post)
            }
            Err(e) => {
                let failed = if self.is_editing() { "Updating" } else { "Creating" };
                notices.error(format!("Error {} Post", failed), e.to_string());
                Err(e.into())
            }
        }
    }
}
