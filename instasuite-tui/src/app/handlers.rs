use crate::app::state::{App, PendingAction, Screen, Tab};
use crate::feed::FeedStatus;
use crate::loader::LoadError;
use crate::log_key_event;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    log_key_event!(
        app.log_config,
        "key={:?} screen={:?} tab={:?} detail_open={} help={}",
        key.code,
        app.current_screen,
        app.current_tab,
        app.detail.is_open(),
        app.show_help
    );

    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return Ok(());
    }

    // Every key on the main screen re-validates the token first
    if !app.ensure_session() {
        return Ok(());
    }

    // Priority 1: Help modal
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            app.toggle_help();
        }
        return Ok(());
    }

    match app.current_screen {
        Screen::Login => handle_login_keys(app, key),
        Screen::Main => handle_main_keys(app, key),
    }
}

pub fn handle_login_keys(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Enter if !app.login.waiting => app.request(PendingAction::StartLogin),
        KeyCode::Esc if app.login.waiting => app.login.cancel(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
    Ok(())
}

pub fn handle_main_keys(app: &mut App, key: KeyEvent) -> Result<()> {
    // Priority 2: Detail overlay
    if app.detail.is_open() {
        return handle_detail_keys(app, key);
    }

    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('L') => app.logout()?,
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Char('1') => app.select_tab(Tab::Profile),
        KeyCode::Char('2') => app.select_tab(Tab::Gallery),
        _ => match app.current_tab {
            Tab::Profile => handle_profile_keys(app, key),
            Tab::Gallery => handle_gallery_keys(app, key),
        },
    }
    Ok(())
}

fn handle_profile_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.queue_profile_load(),
        KeyCode::Char('o') => {
            if let Some(website) = app.profile.profile().and_then(|p| p.website.clone()) {
                app.request(PendingAction::OpenUrl(website));
            }
        }
        _ => {}
    }
}

fn handle_gallery_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Enter => app.open_selected_detail(),
        // No-op on the last page or while a page is loading
        KeyCode::Char('m') => app.queue_load_more(),
        KeyCode::Char('r') if app.feed.error().is_some_and(LoadError::is_retryable) => app.queue_feed_retry(),
        KeyCode::Char('r') if matches!(app.feed.status(), FeedStatus::Empty | FeedStatus::Ready) => {
            app.queue_feed_load()
        }
        _ => {}
    }
}

fn handle_detail_keys(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.detail.close(),
        KeyCode::Char('j') | KeyCode::Down => app.detail.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.detail.scroll_up(),
        KeyCode::Char('o') => {
            if let Some(permalink) = app.detail.selected().map(|item| item.permalink.clone()) {
                if !permalink.is_empty() {
                    app.request(PendingAction::OpenUrl(permalink));
                }
            }
        }
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
    Ok(())
}
