//! Explorer state management.

use std::collections::BTreeMap;

use crossterm::event::KeyEvent;

use super::events::{action_for, ExplorerAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    NodeVoltages,
    BranchCurrents,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::NodeVoltages, Tab::BranchCurrents];

    pub fn title(self) -> &'static str {
        match self {
            Tab::NodeVoltages => "Node voltages",
            Tab::BranchCurrents => "Branch currents",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Tab::NodeVoltages => "V",
            Tab::BranchCurrents => "mA",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::NodeVoltages => 0,
            Tab::BranchCurrents => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Tab::NodeVoltages => Tab::BranchCurrents,
            Tab::BranchCurrents => Tab::NodeVoltages,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub value: f64,
}

/// Application state for the explorer
#[derive(Debug)]
pub struct App {
    pub tab: Tab,
    pub nodes: Vec<Entry>,
    pub branches: Vec<Entry>,
    /// Selected row per tab
    selected: [usize; 2],
    pub show_help: bool,
    pub should_quit: bool,
    pub status_message: String,
}

impl App {
    pub fn new(node_voltages: &BTreeMap<String, f64>, branches: &BTreeMap<String, f64>) -> Self {
        let collect = |m: &BTreeMap<String, f64>| {
            m.iter().map(|(id, &value)| Entry { id: id.clone(), value }).collect::<Vec<_>>()
        };
        let nodes = collect(node_voltages);
        let branches = collect(branches);
        // Open on whichever mapping has data
        let tab = if nodes.is_empty() && !branches.is_empty() { Tab::BranchCurrents } else { Tab::NodeVoltages };

        Self {
            tab,
            nodes,
            branches,
            selected: [0, 0],
            show_help: false,
            should_quit: false,
            status_message: "tab switch | ↑/↓ select | ? help | q quit".to_string(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        match self.tab {
            Tab::NodeVoltages => &self.nodes,
            Tab::BranchCurrents => &self.branches,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected[self.tab.index()]
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries().get(self.selected())
    }

    pub fn max_magnitude(&self) -> f64 {
        self.entries().iter().map(|e| e.value.abs()).fold(0.0, f64::max)
    }

    /// Magnitude of the selection relative to the largest in the tab, in `0..=1`.
    pub fn ratio(&self) -> f64 {
        let max = self.max_magnitude();
        match self.selected_entry() {
            Some(e) if max > 0.0 => (e.value.abs() / max).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    fn set_selected(&mut self, row: usize) {
        let last = self.entries().len().saturating_sub(1);
        self.selected[self.tab.index()] = row.min(last);
    }

    pub fn apply(&mut self, action: ExplorerAction) {
        match action {
            ExplorerAction::Quit if self.show_help => self.show_help = false,
            ExplorerAction::Quit => self.should_quit = true,
            ExplorerAction::NextTab | ExplorerAction::PrevTab => self.tab = self.tab.toggled(),
            ExplorerAction::Next => self.set_selected(self.selected() + 1),
            ExplorerAction::Prev => self.set_selected(self.selected().saturating_sub(1)),
            ExplorerAction::First => self.set_selected(0),
            ExplorerAction::Last => self.set_selected(usize::MAX),
            ExplorerAction::ToggleHelp => self.show_help = !self.show_help,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(action) = action_for(key) {
            self.apply(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn app() -> App {
        let nodes = BTreeMap::from([("1".to_string(), 0.0), ("2".to_string(), -4.0), ("3".to_string(), 2.0)]);
        let branches = BTreeMap::from([("1-2".to_string(), 1.5)]);
        App::new(&nodes, &branches)
    }

    #[test]
    fn selection_is_clamped_per_tab() {
        let mut app = app();
        app.apply(ExplorerAction::Last);
        assert_eq!(app.selected(), 2);
        app.apply(ExplorerAction::Next);
        assert_eq!(app.selected(), 2);

        app.apply(ExplorerAction::NextTab);
        assert_eq!(app.tab, Tab::BranchCurrents);
        assert_eq!(app.selected(), 0);
        app.apply(ExplorerAction::Next);
        assert_eq!(app.selected(), 0);

        app.apply(ExplorerAction::PrevTab);
        assert_eq!(app.selected(), 2);
    }

    #[test]
    fn ratio_is_relative_to_largest_magnitude() {
        let mut app = app();
        app.apply(ExplorerAction::Next);
        assert_eq!(app.selected_entry().unwrap().id, "2");
        assert_eq!(app.ratio(), 1.0);
        app.apply(ExplorerAction::Next);
        assert_eq!(app.ratio(), 0.5);
        app.apply(ExplorerAction::First);
        assert_eq!(app.ratio(), 0.0);
    }

    #[test]
    fn escape_closes_help_before_quitting() {
        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(app.show_help);
        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.show_help);
        assert!(!app.should_quit);
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
    }

    #[test]
    fn opens_on_branch_tab_when_nodes_are_empty() {
        let branches = BTreeMap::from([("2-7".to_string(), 3.0)]);
        let app = App::new(&BTreeMap::new(), &branches);
        assert_eq!(app.tab, Tab::BranchCurrents);
    }
}
