use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::formatting::{format_timestamp, single_line, truncate_caption, CAPTION_PREVIEW_CHARS};
use super::theme::{get_theme_colors, ThemeColors};
use crate::app::App;
use crate::feed::FeedStatus;
use crate::loader::LoadError;
use instasuite_types::{MediaItem, MediaType};

pub fn render_gallery_tab(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = get_theme_colors();
    let title = format!(" Gallery ({}) ", app.gallery_items().len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(title);

    let placeholder = match app.feed.status() {
        FeedStatus::Idle | FeedStatus::Loading => Some(vec![Line::from(Span::styled(
            "Loading media...",
            Style::default().fg(theme.text_dim),
        ))]),
        FeedStatus::Failed(LoadError::MissingToken) => Some(vec![Line::from(Span::styled(
            LoadError::MissingToken.to_string(),
            Style::default().fg(theme.error),
        ))]),
        FeedStatus::Failed(err) => Some(vec![
            Line::from(Span::styled(err.to_string(), Style::default().fg(theme.error))),
            Line::from(""),
            Line::from(Span::styled("Press r to try again.", Style::default().fg(theme.text_dim))),
        ]),
        FeedStatus::Empty => Some(vec![
            Line::from(Span::styled(
                "No Posts Found",
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Nothing has been posted to this account yet.",
                Style::default().fg(theme.text_dim),
            )),
        ]),
        FeedStatus::LoadingMore | FeedStatus::Ready => None,
    };

    if let Some(mut lines) = placeholder {
        lines.insert(0, Line::from(""));
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(block).wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .gallery_items()
        .into_iter()
        .map(|item| gallery_row(item, &theme))
        .collect();

    let footer = if let Some(err) = app.feed.error() {
        Some((format!("Load more failed: {} (r to retry)", err), theme.error))
    } else if app.feed.is_in_flight() {
        Some(("Loading more...".to_string(), theme.accent))
    } else if app.feed.has_more() {
        Some(("More posts available (m)".to_string(), theme.accent))
    } else {
        None
    };

    let block = match footer {
        Some((text, color)) => block.title_bottom(Line::from(Span::styled(
            format!(" {} ", text),
            Style::default().fg(color),
        ))),
        None => block,
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.gallery.list_state);
}

fn gallery_row<'a>(item: &MediaItem, theme: &ThemeColors) -> ListItem<'a> {
    let badge_color = match item.media_type {
        MediaType::Video => theme.accent,
        MediaType::CarouselAlbum => theme.secondary,
        _ => theme.primary,
    };

    let caption = item
        .caption
        .as_deref()
        .map(|c| truncate_caption(&single_line(c), CAPTION_PREVIEW_CHARS))
        .unwrap_or_default();

    let header = Line::from(vec![
        Span::styled(
            format!("[{}]", item.media_type.label()),
            Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(format_timestamp(&item.timestamp), Style::default().fg(theme.text_dim)),
        Span::styled(
            format!("  {} comments", item.comment_count()),
            Style::default().fg(theme.text_dim),
        ),
    ]);

    ListItem::new(vec![
        header,
        Line::from(Span::styled(format!("  {}", caption), Style::default().fg(theme.text))),
        Line::from(""),
    ])
}
