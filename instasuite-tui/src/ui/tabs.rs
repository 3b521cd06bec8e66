use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::detail::render_detail_overlay;
use super::gallery::render_gallery_tab;
use super::profile::render_profile_tab;
use super::theme::get_theme_colors;
use crate::app::{App, Tab};
use crate::feed::FeedStatus;

pub fn render_main_screen(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Page-specific actions
            Constraint::Length(1), // Global footer
        ])
        .split(area);

    render_tab_header(frame, app, chunks[0]);

    match app.current_tab {
        Tab::Profile => render_profile_tab(frame, app, chunks[1]),
        Tab::Gallery => render_gallery_tab(frame, app, chunks[1]),
    }

    render_page_actions(frame, app, chunks[2]);
    render_global_footer(frame, app, chunks[3]);

    if app.detail.is_open() {
        render_detail_overlay(frame, app, area);
    }
}

fn render_tab_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors();

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();
    let selected = Tab::ALL.iter().position(|t| *t == app.current_tab).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" InstaSuite ")
                .title_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)),
        )
        .style(Style::default().fg(theme.text_dim))
        .highlight_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

/// Key hints for the current tab. Load-more is only offered while the feed
/// has another page.
pub fn get_action_bar_text(app: &App) -> String {
    if app.detail.is_open() {
        return "j/k: Scroll  |  o: Open in browser  |  Esc: Close".to_string();
    }

    match app.current_tab {
        Tab::Profile => {
            let mut text = String::from("r: Refresh");
            if app.profile.profile().and_then(|p| p.website.as_ref()).is_some() {
                text.push_str("  |  o: Open website");
            }
            text
        }
        Tab::Gallery => {
            let mut parts = vec!["j/k: Navigate", "Enter: View"];
            match app.feed.status() {
                FeedStatus::LoadingMore => parts.push("Loading more..."),
                _ if app.feed.has_more() => parts.push("m: Load more"),
                _ => {}
            }
            if app.feed.error().is_some() {
                parts.push("r: Retry");
            } else {
                parts.push("r: Refresh");
            }
            parts.join("  |  ")
        }
    }
}

fn render_page_actions(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors();
    let text = get_action_bar_text(app);
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", text), Style::default().fg(theme.accent))),
        area,
    );
}

fn render_global_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors();

    let mut spans = vec![Span::styled(
        " Tab/1-2: Switch  |  L: Logout  |  ?: Help  |  q: Quit",
        Style::default().fg(theme.text_dim),
    )];

    if let Some(remaining) = app.session.remaining() {
        spans.push(Span::styled(
            format!("  |  Session: {}m left", remaining.num_minutes()),
            Style::default().fg(theme.text_dim),
        ));
    }

    if let Some((message, _)) = &app.status_message {
        spans.push(Span::styled(format!("  |  {}", message), Style::default().fg(theme.success)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Left), area);
}
