//! Account types exchanged with the auth API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account id as the server sends it: a number or a string (e.g. a UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        UserId::Number(n)
    }
}

/// A user record as returned by the API.
///
/// Only the fields the client reads are typed; everything else is kept in
/// `extra` and written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name if the account has one, otherwise the email
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }
}

/// `{"data": ...}` envelope around user payloads.
#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub data: User,
}

/// Sign-in request body.
#[derive(Clone, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration input. Lives for one signup attempt and is never persisted.
#[derive(Clone, Default, Serialize)]
pub struct SignUpInfo {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(rename = "password_confirmation")]
    pub password_confirm: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keeps_unknown_fields() {
        let json = r#"{
            "id": 7,
            "email": "alice@example.com",
            "provider": "email",
            "uid": "alice@example.com",
            "allow_password_change": false,
            "name": null
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::Number(7));
        assert_eq!(user.provider.as_deref(), Some("email"));
        assert_eq!(user.extra.get("allow_password_change"), Some(&Value::Bool(false)));

        let out = serde_json::to_value(&user).unwrap();
        assert_eq!(out["allow_password_change"], Value::Bool(false));
        assert_eq!(out["email"], "alice@example.com");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user: User =
            serde_json::from_str(r#"{"id":1,"email":"bob@example.com","name":""}"#).unwrap();
        assert_eq!(user.display_name(), "bob@example.com");

        user.name = Some("Bob".to_string());
        assert_eq!(user.display_name(), "Bob");
    }

    #[test]
    fn test_sign_up_body_field_names() {
        let info = SignUpInfo {
            email: "carol@example.com".to_string(),
            name: "Carol".to_string(),
            password: "abcdefgh".to_string(),
            password_confirm: "abcdefgh".to_string(),
        };
        let body = serde_json::to_value(&info).unwrap();
        assert_eq!(body["password_confirmation"], "abcdefgh");
        assert_eq!(body["name"], "Carol");
        assert!(body.get("password_confirm").is_none());
    }

    #[test]
    fn test_string_id_round_trips() {
        let user: User = serde_json::from_str(
            r#"{"id":"5f0c2a7e-3b1d-4c7a-9f6e-2d8b1a0c9e11","email":"carol@example.com"}"#,
        )
        .unwrap();
        assert_eq!(user.id.to_string(), "5f0c2a7e-3b1d-4c7a-9f6e-2d8b1a0c9e11");
        assert_eq!(
            serde_json::to_value(&user).unwrap()["id"],
            "5f0c2a7e-3b1d-4c7a-9f6e-2d8b1a0c9e11"
        );
    }
}
