//! Event sources for the application loop.
//!
//! Two channels feed [`App::run`](crate::app::App::run):
//!
//! - **User events**: terminal input read on a dedicated thread, so a slow
//!   history reload never delays a keypress.
//! - **App events**: results of background work (history reloads) sent back
//!   to the loop.

pub mod navigator;

use std::io::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver, UnboundedReceiver, UnboundedSender};

use crate::storage::MemoryStorage;

pub type UserEvent = crossterm::event::Event;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stops the input thread from reading the terminal while another program
/// (the template editor) owns it.
#[derive(Clone, Debug, Default)]
pub struct InputGate {
    paused: Arc<AtomicBool>,
}

impl InputGate {
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Longest time the input thread may still be inside a read after
    /// [`pause`](Self::pause) returns.
    pub fn settle_time() -> Duration {
        POLL_INTERVAL * 2
    }
}

/// Spawn the thread reading terminal input.
///
/// The thread polls with a short timeout instead of blocking in `read`, so it
/// can honor the gate and notice when the receiver is dropped.
pub fn init_user_event() -> (Receiver<Result<UserEvent>>, InputGate) {
    let (tx, rx) = mpsc::channel(64);
    let gate = InputGate::default();
    let thread_gate = gate.clone();

    thread::spawn(move || {
        loop {
            if tx.is_closed() {
                break;
            }
            if thread_gate.is_paused() {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            let event = match crossterm::event::poll(POLL_INTERVAL) {
                Ok(true) => crossterm::event::read(),
                Ok(false) => continue,
                Err(e) => Err(e),
            };
            if tx.blocking_send(event).is_err() {
                break;
            }
        }
    });

    (rx, gate)
}

/// Results of background work, handled by the app loop.
pub enum AppEvent {
    /// A reload finished; the storage is fully indexed and ready to swap in.
    HistoryLoaded {
        storage: MemoryStorage,
        elapsed: Duration,
    },
}

pub fn init_app_eventsource() -> (UnboundedSender<AppEvent>, UnboundedReceiver<AppEvent>) {
    mpsc::unbounded_channel()
}
