pub mod theme;
mod detail;
mod formatting;
mod gallery;
mod help;
mod login;
mod profile;
mod tabs;

pub use self::render_main::render;

mod render_main {
    use ratatui::{
        layout::Alignment,
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph},
        Frame,
    };

    use super::help::render_help_modal;
    use super::login::render_login_screen;
    use super::tabs::render_main_screen;
    use super::theme::get_theme_colors;
    use crate::app::{App, Screen};
    use crate::log_rendering;

    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 20;

    /// Render the UI
    pub fn render(app: &mut App, frame: &mut Frame) {
        let area = frame.area();
        let theme = get_theme_colors();

        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let warning = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Terminal Too Small",
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Minimum size: {}x{}", MIN_WIDTH, MIN_HEIGHT),
                    Style::default().fg(theme.text),
                )),
                Line::from(Span::styled(
                    format!("Current size: {}x{}", area.width, area.height),
                    Style::default().fg(theme.warning),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.error)),
            );

            frame.render_widget(warning, area);
            return;
        }

        log_rendering!(app.log_config, "render screen={:?} size={}x{}", app.current_screen, area.width, area.height);

        match app.current_screen {
            Screen::Login => render_login_screen(frame, app, area),
            Screen::Main => render_main_screen(frame, app, area),
        }

        // Help sits above everything else
        if app.show_help {
            render_help_modal(frame, app, area);
        }
    }
}
