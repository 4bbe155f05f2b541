//! Field rules and the email-shape check.

use super::messages::{MessageKey, Messages};

/// Maximum total length of an email address
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of the part before `@`
const MAX_EMAIL_LOCAL_LENGTH: usize = 64;

/// Maximum length of one domain label
const MAX_DOMAIN_LABEL_LENGTH: usize = 63;

/// Characters allowed in the local part besides ASCII alphanumerics
const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";

/// A declarative rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule<'a> {
    Required,
    Email,
    MinLength(usize),
    /// Must equal the given value (typically another field)
    SameAs(&'a str),
}

/// The first rule a field failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Required,
    Email,
    MinLength { min: usize },
    Mismatch,
}

impl Violation {
    /// Localized message for a field with the given label
    pub fn message(&self, label: &str, messages: &Messages) -> String {
        match self {
            Violation::Required => messages.get(MessageKey::Required, &[label]),
            Violation::Email => messages.get(MessageKey::Email, &[label]),
            Violation::MinLength { min } => {
                messages.get(MessageKey::MinLength, &[label, &min.to_string()])
            }
            Violation::Mismatch => messages.get(MessageKey::PasswordMismatch, &[]),
        }
    }
}

/// Apply `rules` in order and report the first one that fails.
///
/// `Email` and `MinLength` accept an empty value; pair them with `Required`.
pub fn check(value: &str, rules: &[Rule<'_>]) -> Option<Violation> {
    rules.iter().find_map(|rule| match *rule {
        Rule::Required if value.is_empty() => Some(Violation::Required),
        Rule::Email if !value.is_empty() && !is_valid_email(value) => Some(Violation::Email),
        Rule::MinLength(min) if !value.is_empty() && value.chars().count() < min => {
            Some(Violation::MinLength { min })
        }
        Rule::SameAs(other) if value != other => Some(Violation::Mismatch),
        _ => None,
    })
}

/// Check that a string looks like an email address.
/// `local@domain`, where the local part is dot-separated atoms and the domain
/// is dot-separated labels of alphanumerics with inner hyphens.
pub fn is_valid_email(s: &str) -> bool {
    if s.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > MAX_EMAIL_LOCAL_LENGTH {
        return false;
    }

    let local_ok = local.split('.').all(|atom| {
        !atom.is_empty()
            && atom
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(c))
    });

    let domain_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_DOMAIN_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    local_ok && domain_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.co.jp"));
        assert!(is_valid_email("user@localhost"));
        assert!(is_valid_email("o'brien@example.ie"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("alice@@example.com"));
        assert!(!is_valid_email("alice..b@example.com"));
        assert!(!is_valid_email("alice@-example.com"));
        assert!(!is_valid_email("alice@example..com"));
        assert!(!is_valid_email("al ice@example.com"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(65))));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let rules = [Rule::Required, Rule::Email];
        assert_eq!(check("", &rules), Some(Violation::Required));
        assert_eq!(check("nope", &rules), Some(Violation::Email));
        assert_eq!(check("a@b.c", &rules), None);
    }

    #[test]
    fn test_optional_rules_accept_empty() {
        assert_eq!(check("", &[Rule::Email, Rule::MinLength(8)]), None);
    }

    #[test]
    fn test_min_length_counts_chars() {
        assert_eq!(check("パスワード", &[Rule::MinLength(8)]), Some(Violation::MinLength { min: 8 }));
        assert_eq!(check("パスワードです!!", &[Rule::MinLength(8)]), None);
    }

    #[test]
    fn test_same_as() {
        assert_eq!(check("abcdefgh", &[Rule::SameAs("different")]), Some(Violation::Mismatch));
        assert_eq!(check("abcdefgh", &[Rule::SameAs("abcdefgh")]), None);
    }

    #[test]
    fn test_violation_messages() {
        let messages = Messages::new();
        assert_eq!(
            Violation::MinLength { min: 8 }.message("Password", &messages),
            "Password must be at least 8 characters."
        );
        assert_eq!(Violation::Mismatch.message("Confirm", &messages), "Passwords do not match.");
    }
}
