use ratatui::layout::{Constraint, Direction, Layout, Rect};
use reqwest::Url;
use unicode_width::UnicodeWidthStr;

/// Captions longer than this are cut in list rows
pub const CAPTION_PREVIEW_CHARS: usize = 100;

/// Format timestamp for display
pub fn format_timestamp(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Short date used for comments, e.g. "Mar 5, 2024"
pub fn format_short_date(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

/// Cut `text` to `max_chars` characters, appending "..." when cut
pub fn truncate_caption(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// Host part of a website URL, for display. Falls back to the raw string.
pub fn website_host(website: &str) -> String {
    Url::parse(website)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| website.to_string())
}

/// Collapse a caption to one line for list rows
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wrap text to `width` columns
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    text.lines()
        .flat_map(|line| {
            if line.width() <= width {
                vec![line.to_string()]
            } else {
                textwrap::wrap(line, width).into_iter().map(|l| l.into_owned()).collect()
            }
        })
        .collect()
}

/// A rect of `percent_x` by `percent_y` centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
