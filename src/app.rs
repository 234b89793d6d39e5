//! Application state and the main loop.
//!
//! `App` owns the loaded history (behind [`Storage`]), the navigator state
//! and the event channels. History is re-read on a blocking worker; the
//! finished, fully indexed storage comes back as an [`AppEvent`] and replaces
//! the old one in a single assignment.

use std::io;
use std::path::Path;
use std::process::Command as Process;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::KeyEventKind;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::{Receiver, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::event::navigator::{self as navigator_event, KeyAction};
use crate::event::{AppEvent, InputGate, UserEvent, init_app_eventsource, init_user_event};
use crate::history::HistoryReader;
use crate::storage::{MemoryStorage, Storage};
use crate::templates::{Template, TemplateLoader};
use crate::ui::navigator::{Navigator, RowFormat};
use crate::ui::text::truncate;
use crate::ui::theme::Theme;
use crate::utils::clipboard::SystemClipboard;

const COPIED_PREVIEW_WIDTH: usize = 50;

/// Read every source and index the result.
pub fn load_storage(reader: &HistoryReader, max_items: usize) -> MemoryStorage {
    let mut storage = MemoryStorage::with_max_items(max_items);
    storage.store(reader.read_history());
    storage
}

/// Templates, or an empty list plus a message for the status line.
pub fn load_templates(loader: &TemplateLoader) -> (Vec<Template>, Option<String>) {
    match loader.load() {
        Ok(templates) => (templates, None),
        Err(e) => {
            warn!("{}", e);
            (Vec::new(), Some(format!("Failed to load templates: {}", e)))
        }
    }
}

pub struct App {
    config: Config,
    reader: HistoryReader,
    template_loader: TemplateLoader,
    storage: Box<dyn Storage>,
    clipboard: SystemClipboard,

    // read by the ui module
    pub(super) navigator: Navigator,
    pub(super) theme: Theme,

    exit: bool,
    // shown once the first load finishes, so it is not replaced by the load status
    startup_warning: Option<String>,

    event_sink: UnboundedSender<AppEvent>,
    user_events: Receiver<io::Result<UserEvent>>,
    input_gate: InputGate,
    app_events: UnboundedReceiver<AppEvent>,
}

impl App {
    /// Build the app and start the first history load in the background.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: Config) -> Self {
        let (reader, problems) = config.history_reader();
        let template_loader = TemplateLoader::new(config.templates_file());
        let (templates, template_warning) = load_templates(&template_loader);

        let warnings: Vec<String> = problems
            .iter()
            .map(ToString::to_string)
            .chain(template_warning)
            .collect();

        let navigator = Navigator::new(
            templates,
            config.ui.max_items,
            RowFormat {
                show_timestamps: config.ui.show_timestamps,
                show_frequency: config.ui.show_frequency,
            },
        );
        let (event_sink, app_events) = init_app_eventsource();
        let (user_events, input_gate) = init_user_event();

        let mut app = Self {
            theme: Theme::from_name(&config.ui.theme),
            storage: Box::new(MemoryStorage::with_max_items(config.ui.max_items)),
            clipboard: SystemClipboard::new(),
            navigator,
            reader,
            template_loader,
            config,
            exit: false,
            startup_warning: (!warnings.is_empty()).then(|| warnings.join("; ")),
            event_sink,
            user_events,
            input_gate,
            app_events,
        };
        app.request_refresh();
        app
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            if self.exit {
                break Ok(());
            }
            tokio::select! {
                res = self.user_events.recv() => {
                    let usr_evt = res.with_context(|| anyhow::anyhow!("User event stream is ended."))?;
                    self.handle_user_event(usr_evt?, terminal).await?;
                }
                res = self.app_events.recv() => {
                    let app_evt = res.with_context(|| anyhow::anyhow!("App event stream is ended"))?;
                    self.handle_app_event(app_evt);
                }
            }
            self.draw(terminal)?;
        }
    }

    pub fn draw(&self, terminal: &mut DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| {
            use ratatui::widgets::Widget;
            self.render(frame.area(), frame.buffer_mut());
        })?;
        Ok(())
    }

    /// Re-read history on a blocking worker. Ignored while a load is running.
    fn request_refresh(&mut self) {
        if self.navigator.is_loading() {
            return;
        }
        self.navigator.set_loading(true);

        let reader = self.reader.clone();
        let max_items = self.config.ui.max_items;
        let sink = self.event_sink.clone();
        tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let storage = load_storage(&reader, max_items);
            let loaded = AppEvent::HistoryLoaded {
                storage,
                elapsed: started.elapsed(),
            };
            if sink.send(loaded).is_err() {
                debug!("App closed before history finished loading");
            }
        });
    }

    async fn handle_user_event(&mut self, event: UserEvent, terminal: &mut DefaultTerminal) -> Result<()> {
        let UserEvent::Key(key_evt) = event else {
            // resize and focus changes only need the redraw that follows
            return Ok(());
        };
        if key_evt.kind != KeyEventKind::Press {
            return Ok(());
        }

        match navigator_event::handle_key_event(&mut self.navigator, self.storage.as_ref(), key_evt) {
            KeyAction::None => {}
            KeyAction::Quit => self.exit = true,
            KeyAction::Copy(text) => self.copy(&text),
            KeyAction::Refresh => {
                self.request_refresh();
                self.navigator.set_status("Refreshing...");
            }
            KeyAction::EditTemplates => self.edit_templates(terminal).await?,
        }
        Ok(())
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::HistoryLoaded { storage, elapsed } => {
                let stats = storage.stats();
                info!(
                    "History loaded: {} commands, {} index tokens in {:?}",
                    stats.total_commands, stats.unique_tokens, elapsed
                );
                self.storage = Box::new(storage);
                self.navigator.set_loading(false);
                self.navigator.reload(self.storage.as_ref());

                match self.startup_warning.take() {
                    Some(warning) => self.navigator.set_error(warning),
                    None => self
                        .navigator
                        .set_status(format!("Loaded {} commands", stats.total_commands)),
                }
            }
        }
    }

    fn copy(&mut self, text: &str) {
        match self.clipboard.copy(text) {
            Ok(()) => self
                .navigator
                .set_status(format!("Copied: {}", truncate(text, COPIED_PREVIEW_WIDTH))),
            Err(e) => self.navigator.set_error(format!("Failed to copy: {}", e)),
        }
    }

    /// Hand the terminal to an editor for the templates file, then reload
    /// the templates.
    async fn edit_templates(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let path = self.template_loader.path().to_path_buf();

        self.input_gate.pause();
        tokio::time::sleep(InputGate::settle_time()).await;
        ratatui::restore();

        let editor = run_editor(&path, std::env::var("EDITOR").ok());

        *terminal = ratatui::try_init().context("Failed to restore the terminal after editing")?;
        self.input_gate.resume();
        terminal.clear()?;

        match editor {
            Some(editor) => {
                let (templates, warning) = load_templates(&self.template_loader);
                let count = templates.len();
                self.navigator.set_templates(templates, self.storage.as_ref());
                match warning {
                    Some(warning) => self.navigator.set_error(warning),
                    None => self
                        .navigator
                        .set_status(format!("Edited in {}, {} templates loaded", editor, count)),
                }
            }
            None => self
                .navigator
                .set_status(format!("Edit templates: {}", path.display())),
        }
        Ok(())
    }
}

/// Editors to try, most preferred first. `$EDITOR` may carry arguments.
fn editor_candidates(env_editor: Option<String>) -> Vec<Vec<String>> {
    let from_env = env_editor
        .map(|e| e.split_whitespace().map(String::from).collect::<Vec<_>>())
        .filter(|argv| !argv.is_empty());

    from_env
        .into_iter()
        .chain(["nano", "vim", "vi"].map(|e| vec![e.to_string()]))
        .collect()
}

/// Run the first editor that exists on `path` and wait for it. Returns the
/// editor's name, or `None` if none could be started.
fn run_editor(path: &Path, env_editor: Option<String>) -> Option<String> {
    for argv in editor_candidates(env_editor) {
        let Some((program, args)) = argv.split_first() else {
            continue;
        };
        match Process::new(program).args(args).arg(path).status() {
            Ok(status) => {
                if !status.success() {
                    warn!("Editor {} exited with {}", program, status);
                }
                return Some(program.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => warn!("Failed to start editor {}: {}", program, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_candidates() {
        let candidates = editor_candidates(Some("code --wait".to_string()));
        assert_eq!(candidates[0], vec!["code", "--wait"]);
        assert_eq!(candidates[1], vec!["nano"]);

        let fallback = editor_candidates(Some("   ".to_string()));
        assert_eq!(fallback[0], vec!["nano"]);
        assert_eq!(editor_candidates(None).len(), 3);
    }

    #[test]
    fn test_env_editor_is_used() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("templates.yaml");
        // `true` accepts any arguments and exits 0
        let used = run_editor(&path, Some("true --ignored".to_string()));
        assert_eq!(used.as_deref(), Some("true"));
        Ok(())
    }

    #[test]
    fn test_load_storage_indexes_sources() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(".bash_history");
        std::fs::write(&path, "git status\nls\ngit status\n")?;

        let storage = load_storage(&HistoryReader::new([&path]), 10);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.search("git")[0].count, 2);
        Ok(())
    }

    #[test]
    fn test_broken_templates_degrade_to_empty() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("templates.yaml");
        std::fs::write(&path, "templates: [broken\n")?;

        let (templates, warning) = load_templates(&TemplateLoader::new(&path));
        assert!(templates.is_empty());
        assert!(warning.is_some_and(|w| w.starts_with("Failed to load templates")));
        Ok(())
    }
}
