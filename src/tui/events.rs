//! Key bindings for the explorer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions the explorer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerAction {
    /// Leave the explorer (or close help when it is open)
    Quit,
    NextTab,
    PrevTab,
    /// Move the row selection down
    Next,
    /// Move the row selection up
    Prev,
    First,
    Last,
    ToggleHelp,
}

pub fn action_for(key: KeyEvent) -> Option<ExplorerAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(ExplorerAction::Quit);
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => ExplorerAction::Quit,
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => ExplorerAction::NextTab,
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => ExplorerAction::PrevTab,
        KeyCode::Down | KeyCode::Char('j') => ExplorerAction::Next,
        KeyCode::Up | KeyCode::Char('k') => ExplorerAction::Prev,
        KeyCode::Home | KeyCode::Char('g') => ExplorerAction::First,
        KeyCode::End | KeyCode::Char('G') => ExplorerAction::Last,
        KeyCode::Char('?') | KeyCode::F(1) => ExplorerAction::ToggleHelp,
        _ => return None,
    };
    Some(action)
}
