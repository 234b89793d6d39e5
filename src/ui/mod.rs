//! Terminal rendering.
//!
//! The screen is one bordered block: the title names the current mode, the
//! body is the item list and the last line is the footer (status, position
//! and key hints). `?` replaces all of it with the help screen.

pub mod help;
pub mod navigator;
pub mod text;
pub mod theme;

use ratatui::layout::{Constraint, Layout};
use ratatui::prelude::{Buffer, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use help::Help;
use navigator::{Message, Navigator};
use theme::Theme;

const SELECTED_MARKER: &str = "► ";
const UNSELECTED_MARKER: &str = "  ";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let nav = &self.navigator;
        let theme = &self.theme;

        if nav.show_help() {
            Help { theme }.render(area, buf);
            return;
        }

        let title = Line::from(vec![
            Span::styled(" Terminal History Navigator ", theme.header()),
            Span::raw("- "),
            Span::styled(format!("{} ", nav.mode_label()), theme.mode()),
        ]);
        let outer_block = Block::new().borders(Borders::ALL).title(title);
        let inner_area = outer_block.inner(area);
        outer_block.render(area, buf);

        let [list_area, footer_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner_area);
        render_list(nav, theme, list_area, buf);
        render_footer(nav, theme, footer_area, buf);
    }
}

fn render_list(nav: &Navigator, theme: &Theme, area: Rect, buf: &mut Buffer) {
    if nav.item_count() == 0 {
        Paragraph::new(nav.empty_message())
            .style(theme.dim())
            .render(area, buf);
        return;
    }

    let window = nav.visible_window(area.height as usize);
    let rows = nav.rows(window.clone());
    let lines: Vec<Line> = window
        .zip(rows)
        .map(|(index, row)| {
            let selected = index == nav.cursor();
            let label = if row.label.is_empty() {
                String::new()
            } else {
                format!("{}  ", row.label)
            };
            let room = (area.width as usize).saturating_sub(SELECTED_MARKER.width() + label.width());
            let text = text::truncate(&row.text, room).into_owned();

            if selected {
                let marker = format!("{}{}{}", SELECTED_MARKER, label, text);
                Line::styled(marker, theme.selected())
            } else {
                let text_style = if row.failed { theme.failed() } else { theme.item() };
                Line::from(vec![
                    Span::raw(UNSELECTED_MARKER),
                    Span::styled(label, theme.dim()),
                    Span::styled(text, text_style),
                ])
            }
        })
        .collect();

    Paragraph::new(lines).render(area, buf);
}

fn render_footer(nav: &Navigator, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let mut spans: Vec<Span> = Vec::new();
    match nav.message() {
        Some(Message::Error(msg)) => spans.push(Span::styled(format!("Error: {}", msg), theme.error())),
        Some(Message::Status(msg)) => spans.push(Span::styled(msg.clone(), theme.status())),
        None => {}
    }
    if let Some(position) = nav.position() {
        if !spans.is_empty() {
            spans.push(Span::raw(" | "));
        }
        spans.push(Span::styled(position, theme.dim()));
    }
    if !spans.is_empty() {
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(nav.controls_hint(), theme.hint()));

    Paragraph::new(Line::from(spans)).render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{Command, OrderingKey};
    use crate::storage::{MemoryStorage, Storage};
    use crate::ui::navigator::RowFormat;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn navigator_with(commands: Vec<Command>) -> Navigator {
        let mut storage = MemoryStorage::new();
        storage.store(commands);
        let mut nav = Navigator::new(
            Vec::new(),
            100,
            RowFormat {
                show_timestamps: false,
                show_frequency: true,
            },
        );
        nav.reload(&storage);
        nav
    }

    #[test]
    fn test_list_marks_selection_and_counts() {
        let mut busy = Command::new("git status", OrderingKey::Synthetic(2));
        busy.count = 3;
        let nav = navigator_with(vec![busy, Command::new("ls", OrderingKey::Synthetic(1))]);

        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        render_list(&nav, &Theme::dark(), area, &mut buf);

        let text = buffer_text(&buf);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("► x3  git status"));
        assert!(lines[1].starts_with("  ls"));
    }

    #[test]
    fn test_long_commands_are_truncated() {
        let nav = navigator_with(vec![Command::new("a".repeat(100), OrderingKey::Synthetic(0))]);

        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        render_list(&nav, &Theme::dark(), area, &mut buf);

        assert_eq!(buffer_text(&buf), format!("► {}...", "a".repeat(15)));
    }

    #[test]
    fn test_empty_list_shows_message() {
        let nav = navigator_with(Vec::new());
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        render_list(&nav, &Theme::dark(), area, &mut buf);
        assert!(buffer_text(&buf).starts_with("No command history found"));
    }

    #[test]
    fn test_footer_shows_status_and_position() {
        let mut nav = navigator_with(vec![Command::new("ls", OrderingKey::Synthetic(0))]);
        nav.set_status("Refreshed");

        let area = Rect::new(0, 0, 120, 1);
        let mut buf = Buffer::empty(area);
        render_footer(&nav, &Theme::dark(), area, &mut buf);
        assert!(buffer_text(&buf).starts_with("Refreshed | 1/1 | enter: copy"));
    }
}
