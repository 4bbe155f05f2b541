use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use tokengate_core::forms::{LoginField, SignUpField};

use crate::app::{App, AppState, LoginFocus, Screen, SignUpFocus};

use super::styles;

/// Visible width of a text field
const FIELD_WIDTH: usize = 24;

/// Width of form dialogs
const DIALOG_WIDTH: u16 = 56;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_home(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    match app.screen {
        Screen::Home => {}
        Screen::Login => render_login_overlay(frame, app),
        Screen::SignUp => render_signup_overlay(frame, app),
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

/// Title on the left, session state and its actions on the right
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  {}", app.title());

    let right: Vec<Span> = if app.is_login {
        vec![
            Span::styled("● Signed in", styles::success_style()),
            Span::raw("   "),
            Span::styled("[o]", styles::key_style()),
            Span::styled(" Logout ", styles::muted_style()),
        ]
    } else {
        vec![
            Span::styled("○ Signed out", styles::muted_style()),
            Span::raw("   "),
            Span::styled("[l]", styles::key_style()),
            Span::styled(" Login  ", styles::muted_style()),
            Span::styled("[s]", styles::key_style()),
            Span::styled(" Sign up ", styles::muted_style()),
        ]
    };
    let right_len: usize = right.iter().map(|s| s.content.chars().count()).sum();
    let padding = (area.width as usize).saturating_sub(title.chars().count() + right_len);

    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
    ];
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];

    match app.current_user {
        Some(ref user) => {
            lines.push(Line::from(vec![
                Span::styled("  Welcome, ", styles::muted_style()),
                Span::styled(user.display_name().to_string(), styles::highlight_style()),
            ]));
            lines.push(Line::from(""));
            lines.push(detail_line("Email", &user.email));
            lines.push(detail_line("ID", &user.id.to_string()));
            if let Some(ref uid) = user.uid {
                lines.push(detail_line("UID", uid));
            }
            if let Some(ref provider) = user.provider {
                lines.push(detail_line("Provider", provider));
            }
            if let Some(ref nickname) = user.nickname {
                lines.push(detail_line("Nickname", nickname));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "  Not signed in.",
                styles::muted_style(),
            )));
            lines.push(Line::from(vec![
                Span::styled("  Press ", styles::muted_style()),
                Span::styled("[l]", styles::key_style()),
                Span::styled(" to log in or ", styles::muted_style()),
                Span::styled("[s]", styles::key_style()),
                Span::styled(" to create an account.", styles::muted_style()),
            ]));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Home ")
        .border_style(styles::border_style(app.screen == Screen::Home));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn detail_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", label), styles::muted_style()),
        Span::styled(value.to_string(), styles::field_style()),
    ])
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} ", app.auth.base_url()),
    };

    let shortcuts = match app.screen {
        Screen::Home => "[r]efresh | [q]uit",
        Screen::Login | Screen::SignUp => "Tab next | Enter select | Esc back",
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

/// One labelled input box; `masked` hides the value.
fn field_line(label: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let shown: String = if masked {
        "*".repeat(value.chars().count().min(FIELD_WIDTH))
    } else {
        // Keep the tail visible while typing long values
        let skip = value.chars().count().saturating_sub(FIELD_WIDTH);
        value.chars().skip(skip).collect()
    };
    let cursor = if focused { "▌" } else { " " };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };

    Line::from(vec![
        Span::styled(format!("  {:>22}: [", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn error_line(error: Option<&str>) -> Option<Line<'static>> {
    error.map(|e| {
        Line::from(Span::styled(
            format!("  {:>22}  {}", "", e),
            styles::error_style(),
        ))
    })
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    Line::from(vec![
        Span::raw(" ".repeat(20)),
        Span::raw("["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_dialog(frame: &mut Frame, title: &str, mut lines: Vec<Line<'static>>, message: Option<&str>) {
    if let Some(msg) = message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", msg), styles::error_style())));
    }

    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(DIALOG_WIDTH, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {} ", title), styles::title_style()))
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let form = &app.login_form;
    let focus = app.login_focus;
    let mut lines = vec![Line::from("")];

    lines.push(field_line(
        LoginField::Email.label(),
        &form.email,
        focus == LoginFocus::Email,
        false,
    ));
    lines.extend(error_line(form.field_error(LoginField::Email)));
    lines.push(field_line(
        LoginField::Password.label(),
        &form.password,
        focus == LoginFocus::Password,
        true,
    ));
    lines.extend(error_line(form.field_error(LoginField::Password)));
    lines.push(Line::from(""));
    lines.push(button_line("Login", focus == LoginFocus::Button));

    render_dialog(frame, "Login", lines, form.message());
}

fn render_signup_overlay(frame: &mut Frame, app: &App) {
    let form = &app.signup_form;
    let focus = app.signup_focus;
    let fields = [
        (SignUpField::Email, form.info.email.as_str(), SignUpFocus::Email, false),
        (SignUpField::Name, form.info.name.as_str(), SignUpFocus::Name, false),
        (SignUpField::Password, form.info.password.as_str(), SignUpFocus::Password, true),
        (
            SignUpField::PasswordConfirm,
            form.info.password_confirm.as_str(),
            SignUpFocus::PasswordConfirm,
            true,
        ),
    ];

    let mut lines = vec![Line::from("")];
    for (field, value, field_focus, masked) in fields {
        lines.push(field_line(field.label(), value, focus == field_focus, masked));
        // The mismatch is shown once, as the form message
        if field != SignUpField::PasswordConfirm || form.message().is_none() {
            lines.extend(error_line(form.field_error(field)));
        }
    }
    lines.push(Line::from(""));
    lines.push(button_line("Sign up", focus == SignUpFocus::Button));

    render_dialog(frame, "Sign up", lines, form.message());
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default().bold());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
