//! Portfolio Client - library for app logic and testing

pub mod authoring;
pub mod config;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod notify;
pub mod sections;
pub mod sentinel;
pub mod session;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::feed::FeedController;
use crate::gateway::rest::RestGateway;
use crate::notify::{NoticeKind, Notices};
use crate::session::SessionProvider;

/// Bootstrap the application core (used by main): configuration, backend
/// gateway, session provider and feed controller, followed by an initial
/// load of the home feed.
pub async fn run() {
    dotenvy::dotenv().ok();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init();

    let config = AppConfig::load();

    let gateway =
        Arc::new(RestGateway::new(&config).expect("Failed to construct backend gateway"));
    let (notices, mut notice_rx) = Notices::channel();

    let session = SessionProvider::new(
        gateway.clone(),
        notices.clone(),
        config.admin_email.clone(),
    );
    let feed = FeedController::new(gateway, notices);

    feed.set_section(sections::HOME_SLUG).await;
    tracing::info!(
        section = %feed.section(),
        loaded = feed.posts().len(),
        has_more = feed.has_more(),
        is_admin = session.is_admin(),
        "Initial feed loaded"
    );

    // Surface any notices produced during startup through the logs.
    while let Ok(notice) = notice_rx.try_recv() {
        match notice.kind {
            NoticeKind::Info => tracing::info!(title = %notice.title, "{}", notice.body),
            NoticeKind::Error => tracing::error!(title = %notice.title, "{}", notice.body),
        }
    }
}
