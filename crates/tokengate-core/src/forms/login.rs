use std::collections::HashMap;

use tracing::{error, info};

use crate::api::{ApiError, AuthClient};
use crate::models::SignInRequest;

use super::messages::{MessageKey, Messages};
use super::validation::{check, Rule};
use super::{Route, Submission};

/// Minimum password length accepted by the login form
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginField {
    Email,
    Password,
}

impl LoginField {
    pub fn label(&self) -> &'static str {
        match self {
            LoginField::Email => "Email",
            LoginField::Password => "Password",
        }
    }
}

/// Login screen state: field values, per-field errors, last message.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    errors: HashMap<LoginField, String>,
    message: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the email filled in, e.g. the last one used
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn field_error(&self, field: LoginField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Re-run every field rule. Returns true when nothing failed.
    pub fn validate(&mut self, messages: &Messages) -> bool {
        self.errors.clear();
        let fields = [
            (LoginField::Email, self.email.as_str(), vec![Rule::Required, Rule::Email]),
            (
                LoginField::Password,
                self.password.as_str(),
                vec![Rule::Required, Rule::MinLength(MIN_PASSWORD_LENGTH)],
            ),
        ];
        for (field, value, rules) in fields {
            if let Some(violation) = check(value, &rules) {
                self.errors
                    .insert(field, violation.message(field.label(), messages));
            }
        }
        self.errors.is_empty()
    }

    /// Validate, then sign in. Nothing is sent when validation fails.
    pub async fn submit(&mut self, auth: &AuthClient, messages: &Messages) -> Submission {
        self.message = None;
        if !self.validate(messages) {
            return Submission::Invalid;
        }

        let request = SignInRequest::new(self.email.as_str(), self.password.as_str());
        match auth.sign_in(&request).await {
            Ok(user) => {
                info!(user_id = %user.id, "Login successful");
                self.password.clear();
                Submission::Navigate(Route::Home)
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.message = Some(Self::failure_message(&e, messages));
                Submission::Failed
            }
        }
    }

    fn failure_message(e: &ApiError, messages: &Messages) -> String {
        let key = match e {
            e if e.is_rejection() => MessageKey::LoginRejected,
            ApiError::NetworkError(_) => MessageKey::LoginUnreachable,
            _ => MessageKey::LoginFailed,
        };
        messages.get(key, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_email_format_reported() {
        let mut form = LoginForm {
            email: "not-an-email".to_string(),
            password: "whatever1".to_string(),
            ..LoginForm::default()
        };
        assert!(!form.validate(&Messages::new()));
        assert_eq!(
            form.field_error(LoginField::Email),
            Some("Email must be a valid email address.")
        );
        assert_eq!(form.field_error(LoginField::Password), None);
    }

    #[test]
    fn test_empty_form_reports_required() {
        let mut form = LoginForm::new();
        assert!(!form.validate(&Messages::new()));
        assert_eq!(form.field_error(LoginField::Email), Some("Email is required."));
        assert_eq!(form.field_error(LoginField::Password), Some("Password is required."));
    }

    #[test]
    fn test_short_password() {
        let mut form = LoginForm::with_email("alice@example.com");
        form.password = "short".to_string();
        assert!(!form.validate(&Messages::new()));
        assert_eq!(
            form.field_error(LoginField::Password),
            Some("Password must be at least 8 characters.")
        );
    }

    #[test]
    fn test_errors_cleared_on_revalidate() {
        let mut form = LoginForm::new();
        assert!(!form.validate(&Messages::new()));

        form.email = "alice@example.com".to_string();
        form.password = "abcdefgh".to_string();
        assert!(form.validate(&Messages::new()));
        assert_eq!(form.field_error(LoginField::Email), None);
    }

    #[test]
    fn test_failure_messages() {
        let messages = Messages::new();
        assert_eq!(
            LoginForm::failure_message(&ApiError::Unauthorized("bad".into()), &messages),
            "Invalid email or password."
        );
        assert_eq!(
            LoginForm::failure_message(&ApiError::ServerError("boom".into()), &messages),
            "Login failed. Please try again."
        );
    }
}
