//! Application configuration - environment-driven with development fallbacks.

/// Connection and identity configuration for the hosted backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the hosted backend (auth, table API, and storage all hang
    /// off this root).
    pub backend_url: String,
    /// Public (anon) API key sent with every request.
    pub anon_key: String,
    /// Storage bucket holding post images.
    pub storage_bucket: String,
    /// The single address granted draft visibility and authoring rights.
    pub admin_email: String,
    /// Per-request timeout; expiry is treated as a transport failure.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
            anon_key: std::env::var("BACKEND_ANON_KEY").unwrap_or_else(|_| "dev-anon-key".to_string()),
            storage_bucket: std::env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "post-images".to_string()),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".to_string()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl AppConfig {
    /// Load configuration and log a redacted summary.
    pub fn load() -> Self {
        let config = Self::default();
        tracing::info!(
            backend_url = %config.backend_url,
            storage_bucket = %config.storage_bucket,
            timeout_secs = config.request_timeout_secs,
            "Configuration loaded"
        );
        if config.admin_email == "admin@example.com" {
            tracing::warn!(
                "ADMIN_EMAIL is using an insecure default. \
                 Set ADMIN_EMAIL to the real privileged address."
            );
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_uses_env_or_fallback() {
        let config = AppConfig::default();
        assert!(!config.backend_url.is_empty());
        assert!(!config.anon_key.is_empty());
        assert!(!config.storage_bucket.is_empty());
        assert!(config.request_timeout_secs >= 1);
    }
}
