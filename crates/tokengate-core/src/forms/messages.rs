use std::collections::HashMap;

/// Message catalog keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// `{0}` = field label
    Required,
    /// `{0}` = field label
    Email,
    /// `{0}` = field label, `{1}` = minimum length
    MinLength,
    PasswordMismatch,
    LoginRejected,
    LoginUnreachable,
    LoginFailed,
    SignUpFailed,
}

impl MessageKey {
    fn default_template(&self) -> &'static str {
        match self {
            MessageKey::Required => "{0} is required.",
            MessageKey::Email => "{0} must be a valid email address.",
            MessageKey::MinLength => "{0} must be at least {1} characters.",
            MessageKey::PasswordMismatch => "Passwords do not match.",
            MessageKey::LoginRejected => "Invalid email or password.",
            MessageKey::LoginUnreachable => {
                "Unable to connect to server. Check your internet connection."
            }
            MessageKey::LoginFailed => "Login failed. Please try again.",
            MessageKey::SignUpFailed => "Sign up failed.",
        }
    }
}

/// User-visible message templates with `{n}` positional parameters.
#[derive(Debug, Clone, Default)]
pub struct Messages {
    overrides: HashMap<MessageKey, String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the template for one key
    pub fn with(mut self, key: MessageKey, template: impl Into<String>) -> Self {
        self.overrides.insert(key, template.into());
        self
    }

    pub fn get(&self, key: MessageKey, params: &[&str]) -> String {
        let template = self
            .overrides
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_template());

        params
            .iter()
            .enumerate()
            .fold(template.to_string(), |text, (i, param)| {
                text.replace(&format!("{{{}}}", i), param)
            })
    }
}
