use std::collections::HashMap;

use tracing::{error, info};

use crate::api::AuthClient;
use crate::models::SignUpInfo;

use super::login::MIN_PASSWORD_LENGTH;
use super::messages::{MessageKey, Messages};
use super::validation::{check, Rule, Violation};
use super::{Route, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignUpField {
    Email,
    Name,
    Password,
    PasswordConfirm,
}

impl SignUpField {
    pub fn label(&self) -> &'static str {
        match self {
            SignUpField::Email => "Email",
            SignUpField::Name => "Name",
            SignUpField::Password => "Password",
            SignUpField::PasswordConfirm => "Password confirmation",
        }
    }
}

/// Signup screen state.
#[derive(Clone, Default)]
pub struct SignUpForm {
    pub info: SignUpInfo,
    errors: HashMap<SignUpField, String>,
    message: Option<String>,
}

impl SignUpForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_error(&self, field: SignUpField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Re-run every field rule. A password mismatch is also reported as the
    /// form message.
    pub fn validate(&mut self, messages: &Messages) -> bool {
        self.errors.clear();
        self.message = None;

        let info = &self.info;
        let fields = [
            (SignUpField::Email, info.email.as_str(), vec![Rule::Required, Rule::Email]),
            (SignUpField::Name, info.name.as_str(), vec![]),
            (
                SignUpField::Password,
                info.password.as_str(),
                vec![Rule::Required, Rule::MinLength(MIN_PASSWORD_LENGTH)],
            ),
            (
                SignUpField::PasswordConfirm,
                info.password_confirm.as_str(),
                vec![Rule::Required, Rule::SameAs(info.password.as_str())],
            ),
        ];

        for (field, value, rules) in fields {
            if let Some(violation) = check(value, &rules) {
                let text = violation.message(field.label(), messages);
                if violation == Violation::Mismatch {
                    self.message = Some(text.clone());
                }
                self.errors.insert(field, text);
            }
        }
        self.errors.is_empty()
    }

    /// Validate, then register. Nothing is sent when validation fails.
    pub async fn submit(&mut self, auth: &AuthClient, messages: &Messages) -> Submission {
        if !self.validate(messages) {
            return Submission::Invalid;
        }

        let mut info = self.info.clone();
        info.name = info.name.trim().to_string();

        match auth.sign_up(&info).await {
            Ok(user) => {
                info!(user_id = %user.id, "Sign up successful");
                self.info.password.clear();
                self.info.password_confirm.clear();
                Submission::Navigate(Route::Home)
            }
            Err(e) => {
                error!(error = %e, "Sign up failed");
                self.message = Some(messages.get(MessageKey::SignUpFailed, &[]));
                Submission::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            info: SignUpInfo {
                email: email.to_string(),
                name: String::new(),
                password: password.to_string(),
                password_confirm: confirm.to_string(),
            },
            ..SignUpForm::default()
        }
    }

    #[test]
    fn test_mismatch_sets_form_message() {
        let mut f = form("alice@example.com", "abcdefgh", "different");
        assert!(!f.validate(&Messages::new()));
        assert_eq!(f.message(), Some("Passwords do not match."));
        assert_eq!(
            f.field_error(SignUpField::PasswordConfirm),
            Some("Passwords do not match.")
        );
    }

    #[test]
    fn test_matching_passwords_valid() {
        let mut f = form("alice@example.com", "abcdefgh", "abcdefgh");
        assert!(f.validate(&Messages::new()));
        assert_eq!(f.message(), None);
    }

    #[test]
    fn test_name_is_optional() {
        let mut f = form("alice@example.com", "abcdefgh", "abcdefgh");
        f.info.name.clear();
        assert!(f.validate(&Messages::new()));
        assert_eq!(f.field_error(SignUpField::Name), None);
    }

    #[test]
    fn test_missing_confirmation_is_required_not_mismatch() {
        let mut f = form("alice@example.com", "abcdefgh", "");
        assert!(!f.validate(&Messages::new()));
        assert_eq!(
            f.field_error(SignUpField::PasswordConfirm),
            Some("Password confirmation is required.")
        );
        assert_eq!(f.message(), None);
    }

    #[test]
    fn test_all_field_errors_collected() {
        let mut f = form("bad", "short", "shorter");
        assert!(!f.validate(&Messages::new()));
        assert!(f.field_error(SignUpField::Email).is_some());
        assert!(f.field_error(SignUpField::Password).is_some());
        assert!(f.field_error(SignUpField::PasswordConfirm).is_some());
    }
}
