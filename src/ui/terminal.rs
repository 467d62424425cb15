use {
    crate::{
        aggregator_core::Snapshot,
        ui::{
            layout::render_dashboard,
            renderer::{RenderError, RenderSignal, SnapshotRenderer},
        },
    },
    crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{
        io::Stdout,
        time::Duration,
    },
};

/// Full-screen terminal dashboard
///
/// Raw mode swallows SIGINT, so Ctrl-C is read as a key event here and turned
/// into `RenderSignal::Shutdown` like 'q' and Esc.
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    focus_cause: String,
    restored: bool,
}

impl Dashboard {
    pub fn start(focus_cause: impl Into<String>) -> Result<Self, RenderError> {
        let backend = CrosstermBackend::new(std::io::stdout());
        let mut terminal = Terminal::new(backend)?;

        crossterm::terminal::enable_raw_mode()?;

        // Stderr shares this terminal; the consumer binary keeps logging at
        // error level while the dashboard is up.
        let entered = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide
        )
        .map_err(RenderError::from)
        .and_then(|()| terminal.clear().map_err(RenderError::from));

        rollback_on_err(entered, crossterm::terminal::disable_raw_mode)?;

        Ok(Self {
            terminal,
            focus_cause: focus_cause.into(),
            restored: false,
        })
    }

    /// Leave the alternate screen and give the terminal back
    pub fn restore(&mut self) -> Result<(), RenderError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Drain pending key presses without blocking
    fn quit_requested(&self) -> Result<bool, RenderError> {
        while crossterm::event::poll(Duration::ZERO)? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
                    _ => {}
                }
            }
        }
        Ok(false)
    }
}

/// Run `rollback` when setup failed; the setup error is what gets reported
fn rollback_on_err<T>(
    result: Result<T, RenderError>,
    rollback: impl FnOnce() -> std::io::Result<()>,
) -> Result<T, RenderError> {
    if result.is_err() {
        if let Err(e) = rollback() {
            log::error!("Failed to disable raw mode: {}", e);
        }
    }
    result
}

impl SnapshotRenderer for Dashboard {
    fn render(&mut self, snapshot: &Snapshot) -> Result<RenderSignal, RenderError> {
        if self.quit_requested()? {
            return Ok(RenderSignal::Shutdown);
        }

        let area = self.terminal.size()?;
        let focus_cause = &self.focus_cause;
        self.terminal
            .draw(|f| render_dashboard(f, area, snapshot, focus_cause))?;

        Ok(RenderSignal::Continue)
    }

    fn name(&self) -> &'static str {
        "dashboard"
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_rollback_runs_only_on_error() {
        let rolled_back = Cell::new(false);
        let ok: Result<u8, RenderError> = Ok(1);
        let result = rollback_on_err(ok, || {
            rolled_back.set(true);
            Ok(())
        });
        assert_eq!(result.unwrap(), 1);
        assert!(!rolled_back.get());

        let failed: Result<u8, RenderError> = Err(Error::new(ErrorKind::Other, "no tty").into());
        let result = rollback_on_err(failed, || {
            rolled_back.set(true);
            Ok(())
        });
        assert!(matches!(result, Err(RenderError::Io(_))));
        assert!(rolled_back.get());
    }

    #[test]
    fn test_rollback_failure_keeps_setup_error() {
        let failed: Result<(), RenderError> = Err(Error::new(ErrorKind::Other, "no tty").into());
        let result = rollback_on_err(failed, || Err(Error::new(ErrorKind::Other, "still raw")));

        match result {
            Err(RenderError::Io(e)) => assert_eq!(e.to_string(), "no tty"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
