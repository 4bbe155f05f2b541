//! Login and signup form controllers.
//!
//! Forms validate locally before anything is sent. A submission ends in one
//! of three ways: field errors (no request made), a single failure message,
//! or a route to navigate to.

pub mod login;
pub mod messages;
pub mod signup;
pub mod validation;

pub use login::{LoginField, LoginForm};
pub use messages::{MessageKey, Messages};
pub use signup::{SignUpField, SignUpForm};
pub use validation::{check, is_valid_email, Rule, Violation};

/// Screens a form can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    SignUp,
}

/// Outcome of submitting a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Local validation failed; see the field errors
    Invalid,
    /// The server call failed; see the form message
    Failed,
    Navigate(Route),
}
