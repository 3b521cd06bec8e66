use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::formatting::centered_rect;
use super::theme::get_theme_colors;
use crate::app::{App, Screen, Tab};

type ShortcutGroup = (&'static str, Vec<(&'static str, &'static str)>);

/// Render help modal
pub fn render_help_modal(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors();
    let modal_area = centered_rect(70, 80, area);

    frame.render_widget(Clear, modal_area);

    let mut lines = vec![Line::from("")];
    for (category, items) in get_shortcuts_for_context(app) {
        lines.push(Line::from(Span::styled(
            category,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )));
        for (key, description) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<15}", key), Style::default().fg(theme.success)),
                Span::styled(description, Style::default().fg(theme.text)),
            ]));
        }
        lines.push(Line::from(""));
    }

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
                .title(" Keyboard Shortcuts ")
                .title_alignment(Alignment::Center)
                .title_bottom(Line::from(" ? / Esc: Close ").centered())
                .style(Style::default().bg(theme.background)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, modal_area);
}

/// Shortcuts relevant to the current screen and tab
pub fn get_shortcuts_for_context(app: &App) -> Vec<ShortcutGroup> {
    let mut shortcuts = vec![(
        "Global",
        vec![("q / Ctrl+C", "Quit application"), ("?", "Toggle this help")],
    )];

    match app.current_screen {
        Screen::Login => shortcuts.push((
            "Login",
            vec![
                ("Enter", "Open the browser and wait for login"),
                ("Esc", "Stop waiting for login"),
            ],
        )),
        Screen::Main => {
            shortcuts.push((
                "Navigation",
                vec![
                    ("Tab / Shift+Tab", "Next / previous tab"),
                    ("1 / 2", "Profile / Gallery"),
                    ("Shift+L", "Logout"),
                ],
            ));
            match app.current_tab {
                Tab::Profile => shortcuts.push((
                    "Profile",
                    vec![("r", "Reload profile"), ("o", "Open website in browser")],
                )),
                Tab::Gallery => shortcuts.push((
                    "Gallery",
                    vec![
                        ("j / k", "Move down / up"),
                        ("Enter", "View post and comments"),
                        ("m", "Load more posts"),
                        ("r", "Retry after an error, or refresh"),
                    ],
                )),
            }
            shortcuts.push((
                "Post View",
                vec![
                    ("j / k", "Scroll"),
                    ("o", "Open post in browser"),
                    ("Esc / q", "Close"),
                ],
            ));
        }
    }

    shortcuts
}
