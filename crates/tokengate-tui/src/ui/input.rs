//! Keyboard input handling for the TUI.
//!
//! Header actions only fire when the header is showing them, so the
//! keys always match what is on screen.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use tokengate_core::forms::Route;

use crate::app::{
    can_add_email_char, can_add_name_char, can_add_password_char, App, AppState, LoginFocus,
    Screen, SignUpFocus,
};

/// Handle a key press. Returns true when the app should exit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match app.screen {
        Screen::Login => handle_login_input(app, key).await,
        Screen::SignUp => handle_signup_input(app, key).await,
        Screen::Home => handle_home_input(app, key).await,
    }
}

async fn handle_home_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    app.status_message = None;
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('l') if !app.is_login => {
            app.navigate(Route::Login).await;
        }
        KeyCode::Char('s') if !app.is_login => {
            app.navigate(Route::SignUp).await;
        }
        KeyCode::Char('o') if app.is_login => {
            app.logout().await;
        }
        KeyCode::Char('r') => {
            app.load_current_user().await;
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.navigate(Route::Home).await;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email | LoginFocus::Password => {
                app.login_focus = app.login_focus.next();
            }
            LoginFocus::Button => {
                app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_form.email.pop();
            }
            LoginFocus::Password => {
                app.login_form.password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_form.email.chars().count(), c) {
                    app.login_form.email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_form.password.chars().count(), c) {
                    app.login_form.password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_signup_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let info = &mut app.signup_form.info;
    let field = match app.signup_focus {
        SignUpFocus::Email => Some(&mut info.email),
        SignUpFocus::Name => Some(&mut info.name),
        SignUpFocus::Password => Some(&mut info.password),
        SignUpFocus::PasswordConfirm => Some(&mut info.password_confirm),
        SignUpFocus::Button => None,
    };

    match key.code {
        KeyCode::Esc => {
            app.navigate(Route::Home).await;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signup_focus = app.signup_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signup_focus = app.signup_focus.prev();
        }
        KeyCode::Enter => {
            if app.signup_focus == SignUpFocus::Button {
                app.attempt_sign_up().await;
            } else {
                app.signup_focus = app.signup_focus.next();
            }
        }
        KeyCode::Backspace => {
            if let Some(value) = field {
                value.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(value) = field {
                let len = value.chars().count();
                let accepted = match app.signup_focus {
                    SignUpFocus::Email => can_add_email_char(len, c),
                    SignUpFocus::Name => can_add_name_char(len, c),
                    _ => can_add_password_char(len, c),
                };
                if accepted {
                    value.push(c);
                }
            }
        }
        _ => {}
    }
    Ok(false)
}
