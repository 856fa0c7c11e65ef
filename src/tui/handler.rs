//! Event loop for the explorer.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;

use super::{app::App, ui::render_ui};

/// Browse the two result mappings until the user quits.
pub fn run_explorer(node_voltages: &BTreeMap<String, f64>, branches: &BTreeMap<String, f64>) -> Result<()> {
    if !io::stdout().is_terminal() {
        bail!("explorer requires a proper terminal environment");
    }
    if node_voltages.is_empty() && branches.is_empty() {
        bail!("nothing to explore: the module returned no node or branch mappings");
    }

    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut app = App::new(node_voltages, branches);
    event_loop(&mut terminal, &mut app)
}

/// Raw mode plus alternate screen, undone on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // From here on a failed step still restores the terminal.
        let guard = TerminalGuard;
        io::stdout().execute(EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore(&mut io::stdout());
    }
}

/// Leave raw mode and the alternate screen, show the cursor.
/// Every step runs; the first error is returned.
fn restore<W: Write>(out: &mut W) -> io::Result<()> {
    let steps = [
        disable_raw_mode(),
        out.execute(LeaveAlternateScreen).map(|_| ()),
        out.execute(Show).map(|_| ()),
    ];
    steps.into_iter().collect()
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| render_ui(frame, app))?;
        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }
    Ok(())
}
