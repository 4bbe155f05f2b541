//! Application state management for the tokengate terminal UI.
//!
//! The `App` owns the auth client, the current screen and the form
//! controllers. The header's signed-in flag is fed only by the session
//! receiver, never set directly.

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use tokengate_core::auth::{open_store, SessionState, TokenStore};
use tokengate_core::forms::{LoginForm, Messages, Route, SignUpForm, Submission};
use tokengate_core::models::User;
use tokengate_core::{AuthClient, Config};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email input (RFC 5321 path limit)
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for display name input
const MAX_NAME_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// UI State Types
// ============================================================================

/// Which screen fills the main area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Login,
    SignUp,
}

impl From<Route> for Screen {
    fn from(route: Route) -> Self {
        match route {
            Route::Home => Screen::Home,
            Route::Login => Screen::Login,
            Route::SignUp => Screen::SignUp,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Signup form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignUpFocus {
    Email,
    Name,
    Password,
    PasswordConfirm,
    Button,
}

impl SignUpFocus {
    pub fn next(&self) -> Self {
        match self {
            SignUpFocus::Email => SignUpFocus::Name,
            SignUpFocus::Name => SignUpFocus::Password,
            SignUpFocus::Password => SignUpFocus::PasswordConfirm,
            SignUpFocus::PasswordConfirm => SignUpFocus::Button,
            SignUpFocus::Button => SignUpFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SignUpFocus::Email => SignUpFocus::Button,
            SignUpFocus::Name => SignUpFocus::Email,
            SignUpFocus::Password => SignUpFocus::Name,
            SignUpFocus::PasswordConfirm => SignUpFocus::Password,
            SignUpFocus::Button => SignUpFocus::PasswordConfirm,
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub auth: AuthClient,
    pub messages: Messages,
    session_rx: watch::Receiver<bool>,

    // Header display
    pub is_login: bool,

    // UI State
    pub state: AppState,
    pub screen: Screen,
    pub current_user: Option<User>,
    pub status_message: Option<String>,

    // Form state, recreated on every visit
    pub login_form: LoginForm,
    pub login_focus: LoginFocus,
    pub signup_form: SignUpForm,
    pub signup_focus: SignUpFocus,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let store = TokenStore::new(open_store(&config));
        let session = SessionState::from_store(&store);
        let auth = AuthClient::new(config.api_url(), store, session.clone())?;
        debug!(api_url = auth.base_url(), storage = ?config.storage, "Auth client configured");

        let mut session_rx = session.subscribe();
        let is_login = *session_rx.borrow_and_update();
        let login_form = LoginForm::with_email(config.last_email.clone().unwrap_or_default());

        Ok(Self {
            config,
            auth,
            messages: Messages::new(),
            session_rx,

            is_login,

            state: AppState::Normal,
            screen: Screen::Home,
            current_user: None,
            status_message: None,

            login_form,
            login_focus: LoginFocus::Email,
            signup_form: SignUpForm::new(),
            signup_focus: SignUpFocus::Email,
        })
    }

    pub fn title(&self) -> &str {
        self.config.app_title()
    }

    /// Pick up the latest session state for the header
    pub fn sync_session(&mut self) {
        if self.session_rx.has_changed().unwrap_or(false) {
            self.is_login = *self.session_rx.borrow_and_update();
            debug!(is_login = self.is_login, "Header session state updated");
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch screens. Forms start fresh on every visit.
    pub async fn navigate(&mut self, route: Route) {
        self.screen = Screen::from(route);
        match route {
            Route::Home => self.load_current_user().await,
            Route::Login => {
                let email = self
                    .config
                    .last_email
                    .clone()
                    .unwrap_or_default();
                self.login_focus = if email.is_empty() {
                    LoginFocus::Email
                } else {
                    LoginFocus::Password
                };
                self.login_form = LoginForm::with_email(email);
            }
            Route::SignUp => {
                self.signup_form = SignUpForm::new();
                self.signup_focus = SignUpFocus::Email;
            }
        }
    }

    /// Ask the server who is signed in. Stale credentials end up cleared.
    pub async fn load_current_user(&mut self) {
        let had_credentials = self.auth.is_logged_in();
        self.current_user = self.auth.current_user().await;

        if had_credentials && self.current_user.is_none() {
            self.status_message = Some("Session expired. Please log in again.".to_string());
        }
        self.sync_session();
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the login form
    pub async fn attempt_login(&mut self) {
        let outcome = self.login_form.submit(&self.auth, &self.messages).await;
        if let Submission::Navigate(route) = outcome {
            self.remember_email(self.login_form.email.clone());
            self.status_message = Some("Logged in".to_string());
            self.navigate(route).await;
        }
        self.sync_session();
    }

    /// Submit the signup form
    pub async fn attempt_sign_up(&mut self) {
        let outcome = self.signup_form.submit(&self.auth, &self.messages).await;
        if let Submission::Navigate(route) = outcome {
            self.remember_email(self.signup_form.info.email.clone());
            self.status_message = Some("Account created".to_string());
            self.navigate(route).await;
        }
        self.sync_session();
    }

    /// Header logout action
    pub async fn logout(&mut self) {
        self.auth.log_out();
        self.current_user = None;
        self.status_message = Some("Logged out".to_string());
        self.sync_session();
        self.navigate(Route::Login).await;
    }

    fn remember_email(&mut self, email: String) {
        if self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        } else {
            info!("Remembered last email");
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a name character should be accepted
pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_focus_cycle() {
        assert_eq!(LoginFocus::Email.next(), LoginFocus::Password);
        assert_eq!(LoginFocus::Button.next(), LoginFocus::Email); // Wraps around
        assert_eq!(LoginFocus::Email.prev(), LoginFocus::Button);
    }

    #[test]
    fn test_signup_focus_cycle() {
        let mut focus = SignUpFocus::Email;
        for _ in 0..5 {
            focus = focus.next();
        }
        assert_eq!(focus, SignUpFocus::Email);
        assert_eq!(SignUpFocus::Password.prev(), SignUpFocus::Name);
    }

    #[test]
    fn test_screen_from_route() {
        assert_eq!(Screen::from(Route::Home), Screen::Home);
        assert_eq!(Screen::from(Route::Login), Screen::Login);
        assert_eq!(Screen::from(Route::SignUp), Screen::SignUp);
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(253, '@'));
        assert!(!can_add_email_char(254, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(0, '\n'));
    }

    #[test]
    fn test_can_add_name_char() {
        assert!(can_add_name_char(0, ' '));
        assert!(can_add_name_char(63, 'z'));
        assert!(!can_add_name_char(64, 'a'));
        assert!(!can_add_name_char(0, '\x00'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
