use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::formatting::centered_rect;
use super::theme::get_theme_colors;
use crate::app::App;

pub fn render_login_screen(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors();
    let panel = centered_rect(70, 70, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // title
            Constraint::Min(5),    // status and URL
            Constraint::Length(2), // hints
        ])
        .margin(1)
        .split(panel);

    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(" InstaSuite ")
            .title_alignment(Alignment::Center),
        panel,
    );

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "InstaSuite",
            Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Your Instagram profile and media, in the terminal",
            Style::default().fg(theme.text_dim),
        )),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let mut lines = Vec::new();

    if let Some(notice) = &app.login.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    if app.login.waiting {
        lines.push(Line::from(Span::styled(
            "Waiting for the login redirect... finish signing in in your browser.",
            Style::default().fg(theme.accent),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Press Enter to log in with Instagram in your browser.",
            Style::default().fg(theme.text),
        )));
    }

    if !app.settings.has_client_id() {
        lines.push(Line::from(Span::styled(
            "No client id configured (INSTASUITE_CLIENT_ID or --client-id).",
            Style::default().fg(theme.warning),
        )));
    }

    if let Some(error) = &app.login.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(theme.error),
        )));
    }

    if let Some(url) = &app.login.authorization_url {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Authorization URL:", Style::default().fg(theme.text_dim))));
        lines.push(Line::from(Span::styled(url.clone(), Style::default().fg(theme.secondary))));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[1]);

    let hints = if app.login.waiting {
        "Esc: Cancel  |  q: Quit  |  ?: Help"
    } else {
        "Enter: Log in  |  q: Quit  |  ?: Help"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(theme.text_dim))).alignment(Alignment::Center),
        chunks[2],
    );
}
