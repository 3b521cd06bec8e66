use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::formatting::{centered_rect, format_short_date, format_timestamp, wrap_lines};
use super::theme::get_theme_colors;
use crate::app::App;

pub fn render_detail_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some(item) = app.detail.selected() else {
        return;
    };
    let theme = get_theme_colors();
    let modal_area = centered_rect(85, 85, area);
    let text_width = modal_area.width.saturating_sub(4) as usize;

    frame.render_widget(Clear, modal_area);

    let label = |name: &str| Span::styled(format!("{:<10}", name), Style::default().fg(theme.text_dim));

    let mut lines = vec![
        Line::from(vec![
            label("Type"),
            Span::styled(
                item.media_type.label().to_string(),
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            label("Posted"),
            Span::styled(format_timestamp(&item.timestamp), Style::default().fg(theme.text)),
        ]),
    ];

    if let Some(url) = &item.media_url {
        lines.push(Line::from(vec![
            label(if item.media_type.is_video() { "Video" } else { "Media" }),
            Span::styled(url.clone(), Style::default().fg(theme.secondary)),
        ]));
    }
    if item.media_type.is_video() {
        if let Some(poster) = &item.thumbnail_url {
            lines.push(Line::from(vec![
                label("Poster"),
                Span::styled(poster.clone(), Style::default().fg(theme.secondary)),
            ]));
        }
    }
    if !item.permalink.is_empty() {
        lines.push(Line::from(vec![
            label("Link"),
            Span::styled(item.permalink.clone(), Style::default().fg(theme.accent)),
        ]));
    }

    lines.push(Line::from(""));
    match item.caption.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(caption) => {
            for line in wrap_lines(caption, text_width) {
                lines.push(Line::from(Span::styled(line, Style::default().fg(theme.text))));
            }
        }
        None => lines.push(Line::from(Span::styled("No caption", Style::default().fg(theme.text_dim)))),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Comments ({})", item.comment_count()),
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    )));

    match item.comments.as_deref() {
        Some(comments) if !comments.is_empty() => {
            for comment in comments {
                lines.push(Line::from(vec![
                    Span::styled(
                        comment.username.clone(),
                        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  {}", format_short_date(&comment.timestamp)),
                        Style::default().fg(theme.text_dim),
                    ),
                ]));
                for line in wrap_lines(&comment.text, text_width.saturating_sub(2)) {
                    lines.push(Line::from(Span::styled(format!("  {}", line), Style::default().fg(theme.text))));
                }
            }
        }
        _ => lines.push(Line::from(Span::styled("No comments yet", Style::default().fg(theme.text_dim)))),
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.primary))
                .title(" Post ")
                .title_alignment(Alignment::Center)
                .title_bottom(Line::from(" o: Open in browser  |  j/k: Scroll  |  Esc: Close ").centered())
                .style(Style::default().bg(theme.background)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail.scroll, 0));

    frame.render_widget(paragraph, modal_area);
}
