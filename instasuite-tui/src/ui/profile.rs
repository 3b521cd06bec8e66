use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::formatting::website_host;
use super::theme::{get_theme_colors, ThemeColors};
use crate::app::App;
use crate::loader::LoadError;
use crate::profile::ProfileStatus;
use instasuite_types::Profile;

pub fn render_profile_tab(frame: &mut Frame, app: &App, area: Rect) {
    let theme = get_theme_colors();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(" Profile ");

    match app.profile.status() {
        ProfileStatus::Idle | ProfileStatus::Loading => {
            render_message(frame, area, block, "Loading profile...", theme.text_dim);
        }
        ProfileStatus::Failed(err) => {
            let text = match err {
                LoadError::MissingToken => err.to_string(),
                LoadError::Transport(msg) => format!("{}\n\nPress r to try again.", msg),
            };
            render_message(frame, area, block, &text, theme.error);
        }
        ProfileStatus::NoData => {
            render_message(frame, area, block, "No profile data available.", theme.text_dim);
        }
        ProfileStatus::Ready(profile) => render_profile(frame, profile, area, block, &theme),
    }
}

fn render_message(frame: &mut Frame, area: Rect, block: Block, text: &str, color: ratatui::style::Color) {
    let mut lines = vec![Line::from("")];
    lines.extend(text.lines().map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(color)))));
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_profile(frame: &mut Frame, profile: &Profile, area: Rect, block: Block, theme: &ThemeColors) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // name and type
            Constraint::Length(3), // stats
            Constraint::Min(0),    // bio, website, avatar
        ])
        .margin(1)
        .split(inner);

    let mut header = vec![Line::from(Span::styled(
        format!("@{}", profile.username),
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    ))];
    if let Some(account_type) = &profile.account_type {
        header.push(Line::from(Span::styled(
            account_type.replace('_', " "),
            Style::default().fg(theme.secondary),
        )));
    }
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let mut stats = vec![
        Span::styled(profile.media_count.to_string(), Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Span::styled(" posts", Style::default().fg(theme.text_dim)),
    ];
    if let Some(followers) = profile.followers_count {
        stats.push(Span::raw("    "));
        stats.push(Span::styled(
            followers.to_string(),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ));
        stats.push(Span::styled(" followers", Style::default().fg(theme.text_dim)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(stats)).block(
            Block::default()
                .borders(Borders::TOP | Borders::BOTTOM)
                .border_style(Style::default().fg(theme.border)),
        ),
        chunks[1],
    );

    let mut details = Vec::new();
    if let Some(bio) = profile.biography.as_deref().filter(|b| !b.is_empty()) {
        details.extend(bio.lines().map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.text)))));
        details.push(Line::from(""));
    }
    if let Some(website) = profile.website.as_deref().filter(|w| !w.is_empty()) {
        details.push(Line::from(vec![
            Span::styled("Website: ", Style::default().fg(theme.text_dim)),
            Span::styled(website_host(website), Style::default().fg(theme.accent)),
        ]));
    }
    details.push(Line::from(vec![
        Span::styled("Picture: ", Style::default().fg(theme.text_dim)),
        Span::styled(profile.avatar_url(), Style::default().fg(theme.text_dim)),
    ]));

    frame.render_widget(Paragraph::new(details).wrap(Wrap { trim: false }), chunks[2]);
}
