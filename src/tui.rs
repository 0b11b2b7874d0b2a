use crate::app::AppState;
use crate::view;
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io::{self, Stdout};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub fn enter() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, cursor::Show)
}

/// Draws every published snapshot on a blocking thread, so a slow or paused
/// terminal only delays frames and never the controller. Only the latest
/// snapshot is kept. Hands the terminal back once the publisher is gone.
pub fn spawn_renderer<B>(mut terminal: Terminal<B>, mut frames: watch::Receiver<AppState>) -> JoinHandle<Terminal<B>>
where
    B: Backend + Send + 'static,
{
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        while handle.block_on(frames.changed()).is_ok() {
            let state = frames.borrow_and_update().clone();
            if let Err(e) = terminal.draw(|f| view::draw(f, &state)) {
                tracing::warn!("[tui] failed to draw dashboard: {e}");
            }
        }
        tracing::debug!("[tui] renderer stopped");
        terminal
    })
}
