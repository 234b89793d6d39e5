//! Key bindings of the navigator.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::storage::Storage;
use crate::ui::navigator::{HistoryFilter, Mode, Navigator};

/// Work a key asks of the app beyond updating the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    Copy(String),
    Refresh,
    EditTemplates,
}

/// Apply a key press to the navigator.
pub fn handle_key_event(nav: &mut Navigator, storage: &dyn Storage, key_evt: KeyEvent) -> KeyAction {
    let ctrl = key_evt.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && matches!(key_evt.code, KeyCode::Char('c') | KeyCode::Char('C')) {
        return KeyAction::Quit;
    }

    if nav.show_help() {
        nav.hide_help();
        return KeyAction::None;
    }

    if nav.is_searching() {
        return handle_search_key(nav, storage, key_evt);
    }

    match key_evt.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Up | KeyCode::Char('k') => nav.move_up(),
        KeyCode::Down | KeyCode::Char('j') => nav.move_down(),
        KeyCode::Enter => return copy_selection(nav),
        KeyCode::Char('/') => nav.start_search(storage),
        KeyCode::Char('t') => nav.toggle_templates(storage),
        KeyCode::Char('h') => nav.show_history(storage),
        KeyCode::Char('r') => return KeyAction::Refresh,
        KeyCode::Char('f') => nav.toggle_frequency(storage),
        KeyCode::Char('s') => nav.toggle_outcome(HistoryFilter::Succeeded, storage),
        KeyCode::Char('x') => nav.toggle_outcome(HistoryFilter::Failed, storage),
        KeyCode::Char('?') => nav.toggle_help(),
        KeyCode::Char('e') if nav.mode() == Mode::Templates => return KeyAction::EditTemplates,
        KeyCode::Esc => {
            nav.clear_messages();
            nav.hide_help();
        }
        _ => {}
    }
    KeyAction::None
}

fn handle_search_key(nav: &mut Navigator, storage: &dyn Storage, key_evt: KeyEvent) -> KeyAction {
    let ctrl = key_evt.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key_evt.modifiers.contains(KeyModifiers::ALT);

    match key_evt.code {
        KeyCode::Esc => nav.exit_search(storage),
        KeyCode::Enter => return copy_selection(nav),
        KeyCode::Up => nav.move_up(),
        KeyCode::Down => nav.move_down(),
        KeyCode::Char('p') if ctrl => nav.move_up(),
        KeyCode::Char('n') if ctrl => nav.move_down(),
        KeyCode::Backspace => nav.pop_char(storage),
        KeyCode::Char(c) if !ctrl && !alt => nav.push_char(c, storage),
        _ => {}
    }
    KeyAction::None
}

fn copy_selection(nav: &mut Navigator) -> KeyAction {
    match nav.selected_text() {
        Some(text) => KeyAction::Copy(text.to_string()),
        None => {
            nav.set_error("No item selected");
            KeyAction::None
        }
    }
}
