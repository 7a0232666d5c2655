//! Session/identity state. One provider instance owns the process-wide
//! session for its lifetime: construct it at startup, drop it at teardown.
//! Components observe state through a watch channel and lifecycle events
//! through a broadcast channel.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::models::{AuthEvent, Session, SignUpOutcome};
use crate::notify::Notices;

/// Observable snapshot of the identity state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub session: Option<Session>,
    /// True when the session's email equals the configured admin address.
    /// This is a client-side placeholder, not a server-verified role claim.
    pub is_admin: bool,
    /// Whether an authentication prompt is currently being shown.
    pub prompt_open: bool,
}

pub struct SessionProvider {
    gateway: Arc<dyn Gateway>,
    notices: Notices,
    admin_email: String,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionProvider {
    pub fn new(gateway: Arc<dyn Gateway>, notices: Notices, admin_email: String) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let (events, _) = broadcast::channel(16);
        Self {
            gateway,
            notices,
            admin_email,
            state,
            events,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin
    }

    pub fn prompt_open(&self) -> bool {
        self.state.borrow().prompt_open
    }

    /// Show the authentication prompt (e.g. when an unprivileged viewer
    /// attempts a privileged action).
    pub fn open_prompt(&self) {
        self.state.send_modify(|s| s.prompt_open = true);
    }

    pub fn dismiss_prompt(&self) {
        self.state.send_modify(|s| s.prompt_open = false);
    }

    fn apply_session(&self, session: Option<Session>) {
        let is_admin = session
            .as_ref()
            .map(|s| s.email == self.admin_email)
            .unwrap_or(false);
        self.state.send_modify(|s| {
            s.session = session;
            s.is_admin = is_admin;
        });
    }

    fn emit(&self, event: AuthEvent) {
        // No receivers is fine; events are advisory.
        let _ = self.events.send(event);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), GatewayError> {
        match self.gateway.sign_in(email, password).await {
            Ok(session) => {
                tracing::info!(email = %session.email, "Signed in");
                self.apply_session(Some(session));
                self.dismiss_prompt();
                self.notices.info("Signed In", "Welcome back!");
                self.emit(AuthEvent::SignedIn);
                Ok(())
            }
            Err(e) => {
                self.notices.error("Sign In Error", e.to_string());
                Err(e)
            }
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignUpOutcome, GatewayError> {
        match self.gateway.sign_up(email, password, display_name).await {
            Ok(outcome) => {
                if let Some(session) = outcome.session.clone() {
                    tracing::info!(email = %session.email, "Signed up with immediate session");
                    self.apply_session(Some(session));
                    self.dismiss_prompt();
                    self.notices.info("Signed In", "Welcome!");
                    self.emit(AuthEvent::SignedIn);
                } else {
                    // Account exists, session pending email confirmation.
                    self.dismiss_prompt();
                    self.notices.info(
                        "Sign Up Successful!",
                        "Please check your email to confirm your account.",
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                self.notices.error("Sign Up Error", e.to_string());
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), GatewayError> {
        let token = self
            .state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.access_token.clone());
        let Some(token) = token else {
            return Ok(());
        };
        match self.gateway.sign_out(&token).await {
            Ok(()) => {
                tracing::info!("Signed out");
                self.apply_session(None);
                self.notices
                    .info("Signed Out", "You have been successfully signed out.");
                self.emit(AuthEvent::SignedOut);
                Ok(())
            }
            Err(e) => {
                self.notices.error("Sign Out Error", e.to_string());
                Err(e)
            }
        }
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), GatewayError> {
        match self.gateway.request_password_reset(email).await {
            Ok(()) => {
                self.dismiss_prompt();
                self.notices.info(
                    "Password Reset Email Sent",
                    "If an account exists for this email, a password reset link has been sent.",
                );
                self.emit(AuthEvent::PasswordRecovery);
                Ok(())
            }
            Err(e) => {
                self.notices.error("Password Reset Error", e.to_string());
                Err(e)
            }
        }
    }
}
