//! Help screen.

use ratatui::prelude::{Buffer, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Widget};

use super::theme::Theme;

const KEY_COLUMN: usize = 14;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "NAVIGATION",
        &[
            ("↑/k", "Move up"),
            ("↓/j", "Move down"),
            ("enter", "Copy selected item to clipboard"),
        ],
    ),
    (
        "MODES",
        &[
            ("h", "Switch to history mode"),
            ("t", "Toggle templates mode"),
            ("/", "Start search"),
            ("f", "Toggle sorting by frequency (history mode)"),
            ("s", "Show only successful commands (history mode)"),
            ("x", "Show only failed commands (history mode)"),
            ("e", "Edit the templates file (templates mode)"),
            ("r", "Re-read history files"),
        ],
    ),
    (
        "SEARCH",
        &[
            ("esc", "Exit search mode"),
            ("backspace", "Delete search character"),
            ("ctrl+p/ctrl+n", "Move up / down"),
        ],
    ),
    (
        "OTHER",
        &[
            ("?", "Toggle this help"),
            ("esc", "Clear messages / close help"),
            ("q/ctrl+c", "Quit application"),
        ],
    ),
    (
        "CONFIGURATION",
        &[
            ("Config", "~/.config/history-nav/config.yaml"),
            ("Templates", "~/.config/history-nav/templates.yaml"),
        ],
    ),
];

/// Help text wrapped to `width` columns. Descriptions that do not fit wrap
/// under their own column.
pub fn help_lines(width: usize) -> Vec<String> {
    let indent = " ".repeat(KEY_COLUMN + 2);
    let mut lines = vec!["Terminal History Navigator - Help".to_string(), String::new()];

    for (title, entries) in SECTIONS {
        lines.push(format!("{}:", title));
        for (key, description) in *entries {
            let first = format!("  {:<width$}{}", key, description, width = KEY_COLUMN);
            let options = textwrap::Options::new(width.max(indent.len() + 10)).subsequent_indent(&indent);
            lines.extend(textwrap::wrap(&first, options).into_iter().map(|l| l.into_owned()));
        }
        lines.push(String::new());
    }

    lines.push("Press any key to close help...".to_string());
    lines
}

pub struct Help<'a> {
    pub theme: &'a Theme,
}

impl Widget for Help<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::new()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.dim())
            .padding(Padding::uniform(1));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = help_lines(inner.width as usize)
            .into_iter()
            .map(|l| Line::styled(l, self.theme.dim()))
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
