use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout, Write};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Enter raw mode on the alternate screen. The UI is keyboard-only, so mouse
/// reporting is switched off.
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;

    // X11, cell-motion, all-motion and SGR mouse modes
    print!("\x1b[?1000l\x1b[?1002l\x1b[?1003l\x1b[?1006l");
    io::stdout().flush()?;

    #[cfg(windows)]
    set_windows_mouse_input(false)?;

    install_panic_hook();

    Ok(Terminal::new(CrosstermBackend::new(io::stdout()))?)
}

/// Leave the alternate screen and give the terminal back
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    #[cfg(windows)]
    set_windows_mouse_input(true)?;

    Ok(())
}

/// Restore the terminal before the default hook prints, or the panic message
/// is lost on the alternate screen
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        log::error!("Panic: {}", info);
        previous(info);
    }));
}

#[cfg(windows)]
fn set_windows_mouse_input(enabled: bool) -> Result<()> {
    use windows::Win32::System::Console::{
        GetConsoleMode, GetStdHandle, SetConsoleMode, CONSOLE_MODE, ENABLE_MOUSE_INPUT,
        STD_INPUT_HANDLE,
    };

    unsafe {
        let handle = GetStdHandle(STD_INPUT_HANDLE)
            .map_err(|e| anyhow::anyhow!("Failed to get console handle: {}", e))?;

        let mut mode = CONSOLE_MODE(0);
        GetConsoleMode(handle, &mut mode)
            .map_err(|e| anyhow::anyhow!("Failed to get console mode: {}", e))?;

        if enabled {
            mode |= ENABLE_MOUSE_INPUT;
        } else {
            mode &= !ENABLE_MOUSE_INPUT;
        }

        SetConsoleMode(handle, mode)
            .map_err(|e| anyhow::anyhow!("Failed to set console mode: {}", e))?;
    }

    Ok(())
}
