//! Navigator state: which list is shown, the selection, the search query and
//! the status line. Rendering lives in [`crate::ui`], key handling in
//! [`crate::event::navigator`].

use std::ops::Range;

use crate::history::Command;
use crate::storage::Storage;
use crate::templates::{self, Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    History,
    Templates,
}

/// How the history list is chosen when no search query is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    Recent,
    Frequency,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Status(String),
    Error(String),
}

/// Optional columns of a history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowFormat {
    pub show_timestamps: bool,
    pub show_frequency: bool,
}

impl Default for RowFormat {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            show_frequency: true,
        }
    }
}

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub label: String,
    pub text: String,
    pub failed: bool,
}

pub struct Navigator {
    mode: Mode,
    searching: bool,
    filter: HistoryFilter,
    query: String,

    commands: Vec<Command>,
    templates: Vec<Template>,
    visible_templates: Vec<Template>,

    cursor: usize,
    max_items: usize,
    format: RowFormat,

    show_help: bool,
    loading: bool,
    message: Option<Message>,
}

impl Navigator {
    pub fn new(templates: Vec<Template>, max_items: usize, format: RowFormat) -> Self {
        Self {
            mode: Mode::History,
            searching: false,
            filter: HistoryFilter::Recent,
            query: String::new(),
            commands: Vec::new(),
            visible_templates: templates.clone(),
            templates,
            cursor: 0,
            max_items,
            format,
            show_help: false,
            loading: false,
            message: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn filter(&self) -> HistoryFilter {
        self.filter
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn item_count(&self) -> usize {
        match self.mode {
            Mode::History => self.commands.len(),
            Mode::Templates => self.visible_templates.len(),
        }
    }

    /// Recompute the visible list from `storage` and the templates.
    pub fn reload(&mut self, storage: &dyn Storage) {
        self.commands = self.history_items(storage);
        self.visible_templates = if self.mode == Mode::Templates {
            templates::search(&self.templates, &self.query)
        } else {
            self.templates.clone()
        };

        if self.cursor >= self.item_count() {
            self.cursor = self.item_count().saturating_sub(1);
        }
    }

    fn history_items(&self, storage: &dyn Storage) -> Vec<Command> {
        let mut items = if !self.query.trim().is_empty() {
            storage.search(&self.query)
        } else if self.filter == HistoryFilter::Frequency {
            let mut by_count = storage.get_by_frequency();
            if self.max_items > 0 {
                by_count.truncate(self.max_items);
            }
            by_count
        } else {
            storage.get_recent(self.max_items)
        };

        match self.filter {
            HistoryFilter::Succeeded => items.retain(Command::succeeded),
            HistoryFilter::Failed => items.retain(Command::failed),
            HistoryFilter::Recent | HistoryFilter::Frequency => {}
        }
        items
    }

    pub fn set_templates(&mut self, templates: Vec<Template>, storage: &dyn Storage) {
        self.templates = templates;
        self.reload(storage);
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.item_count() {
            self.cursor += 1;
        }
    }

    /// The command text under the cursor.
    pub fn selected_text(&self) -> Option<&str> {
        match self.mode {
            Mode::History => self.commands.get(self.cursor).map(|c| c.text.as_str()),
            Mode::Templates => self.visible_templates.get(self.cursor).map(|t| t.command.as_str()),
        }
    }

    pub fn start_search(&mut self, storage: &dyn Storage) {
        self.searching = true;
        self.query.clear();
        self.cursor = 0;
        self.reload(storage);
        self.set_status("Search mode - type to search");
    }

    pub fn exit_search(&mut self, storage: &dyn Storage) {
        self.searching = false;
        self.query.clear();
        self.cursor = 0;
        self.reload(storage);
        self.set_status(match self.mode {
            Mode::History => "History mode",
            Mode::Templates => "Templates mode",
        });
    }

    pub fn push_char(&mut self, c: char, storage: &dyn Storage) {
        self.query.push(c);
        self.cursor = 0;
        self.reload(storage);
    }

    pub fn pop_char(&mut self, storage: &dyn Storage) {
        if self.query.pop().is_some() {
            self.cursor = 0;
            self.reload(storage);
        }
    }

    pub fn show_history(&mut self, storage: &dyn Storage) {
        self.mode = Mode::History;
        self.searching = false;
        self.filter = HistoryFilter::Recent;
        self.query.clear();
        self.cursor = 0;
        self.reload(storage);
        self.set_status("History mode");
    }

    pub fn toggle_templates(&mut self, storage: &dyn Storage) {
        if self.mode == Mode::Templates {
            self.show_history(storage);
            return;
        }
        self.mode = Mode::Templates;
        self.query.clear();
        self.cursor = 0;
        self.reload(storage);
        self.set_status("Templates mode");
    }

    /// Switch between newest-first and most-frequent-first.
    pub fn toggle_frequency(&mut self, storage: &dyn Storage) {
        if self.mode != Mode::History {
            return;
        }
        let (filter, status) = if self.filter == HistoryFilter::Frequency {
            (HistoryFilter::Recent, "Sorted chronologically (newest first)")
        } else {
            (HistoryFilter::Frequency, "Sorted by frequency")
        };
        self.apply_filter(filter, status, storage);
    }

    /// Show only successful or only failed commands; asking for the active
    /// filter again shows everything.
    pub fn toggle_outcome(&mut self, filter: HistoryFilter, storage: &dyn Storage) {
        if self.mode != Mode::History {
            return;
        }
        match filter {
            _ if filter == self.filter => {
                self.apply_filter(HistoryFilter::Recent, "Showing all commands", storage)
            }
            HistoryFilter::Succeeded => {
                self.apply_filter(filter, "Showing only successful commands", storage)
            }
            HistoryFilter::Failed => self.apply_filter(filter, "Showing only failed commands", storage),
            HistoryFilter::Recent | HistoryFilter::Frequency => {}
        }
    }

    fn apply_filter(&mut self, filter: HistoryFilter, status: &str, storage: &dyn Storage) {
        self.filter = filter;
        self.cursor = 0;
        self.reload(storage);
        self.set_status(status);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn hide_help(&mut self) {
        self.show_help = false;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.message = Some(Message::Status(msg.into()));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(Message::Error(msg.into()));
    }

    pub fn clear_messages(&mut self) {
        self.message = None;
    }

    /// Rows to draw in a list `height` lines tall, keeping the selection
    /// centred once the list no longer fits.
    pub fn visible_window(&self, height: usize) -> Range<usize> {
        let total = self.item_count();
        let height = height.max(1);
        if total <= height {
            return 0..total;
        }
        let start = self.cursor.saturating_sub(height / 2).min(total - height);
        start..start + height
    }

    pub fn rows(&self, range: Range<usize>) -> Vec<Row> {
        match self.mode {
            Mode::History => self
                .commands
                .get(range)
                .unwrap_or_default()
                .iter()
                .map(|c| self.history_row(c))
                .collect(),
            Mode::Templates => self
                .visible_templates
                .get(range)
                .unwrap_or_default()
                .iter()
                .map(template_row)
                .collect(),
        }
    }

    fn history_row(&self, cmd: &Command) -> Row {
        let mut label = String::new();
        if self.format.show_timestamps {
            label.push_str(&cmd.ordering_key.display());
        }
        if self.format.show_frequency && cmd.count > 1 {
            if !label.is_empty() {
                label.push(' ');
            }
            label.push_str(&format!("x{}", cmd.count));
        }
        Row {
            label,
            text: cmd.text.clone(),
            failed: cmd.failed(),
        }
    }

    pub fn mode_label(&self) -> String {
        if self.searching {
            return format!("Search: {}", self.query);
        }
        match (self.mode, self.filter) {
            (Mode::Templates, _) => "Templates".to_string(),
            (Mode::History, HistoryFilter::Recent) => "History".to_string(),
            (Mode::History, HistoryFilter::Frequency) => "History (by frequency)".to_string(),
            (Mode::History, HistoryFilter::Succeeded) => "History (successful)".to_string(),
            (Mode::History, HistoryFilter::Failed) => "History (failed)".to_string(),
        }
    }

    pub fn empty_message(&self) -> String {
        if self.loading {
            return "Loading history...".to_string();
        }
        if self.searching {
            return if self.query.is_empty() {
                "Start typing to search...".to_string()
            } else {
                format!("No results for '{}'", self.query)
            };
        }
        match self.mode {
            Mode::History => "No command history found".to_string(),
            Mode::Templates => "No templates available".to_string(),
        }
    }

    pub fn controls_hint(&self) -> &'static str {
        match (self.searching, self.mode) {
            (true, _) => "esc: exit search | enter: copy | ↑↓: navigate",
            (false, Mode::Templates) => "enter: copy | t: history | /: search | e: edit | ?: help | q: quit",
            (false, Mode::History) => "enter: copy | t: templates | /: search | f: frequency | ?: help | q: quit",
        }
    }

    /// `n/total`, or nothing for an empty list.
    pub fn position(&self) -> Option<String> {
        match self.item_count() {
            0 => None,
            total => Some(format!("{}/{}", self.cursor + 1, total)),
        }
    }
}

fn template_row(template: &Template) -> Row {
    let mut text = format!("{} - {}", template.name, template.command);
    if !template.description.is_empty() {
        text.push_str(&format!(" ({})", template.description));
    }
    Row {
        label: String::new(),
        text,
        failed: false,
    }
}
