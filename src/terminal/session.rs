//! The terminal engine.
//!
//! A [`Terminal`] owns one transcript and the flags a front-end renders from.
//! Front-ends hand it raw input lines via [`Terminal::submit`] and re-render
//! whenever the revision published by [`Terminal::subscribe`] changes.
//!
//! At most one chat reply is in flight: while `is_loading` is set every
//! submission is dropped without touching the transcript.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_stream::StreamExt;

use crate::providers::ChatBackend;

use super::boot::{boot_messages, Timings};
use super::commands::{
    cowsay, no_such_directory, permission_denied, CdTarget, Command, ALREADY_ROOT,
    CONNECTION_LOST, HELP_TEXT, LS_TREE, SUDO_DENIED, WHOAMI_TEXT,
};
use super::history::Transcript;
use super::message::Message;
use super::navigation::{Navigator, Section};

/// Mutable session state, only reachable through [`Terminal`].
#[derive(Debug)]
struct SessionState {
    history: Transcript,
    is_booting: bool,
    is_loading: bool,
    show_matrix: bool,
}

/// What became of a submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank input, or a reply was still streaming.
    Ignored,
    /// Handled locally.
    Handled,
    /// Sent to the chat backend and the reply streamed to the end.
    Streamed,
    /// Sent to the chat backend, which failed; an error line was appended.
    Failed,
}

/// Work left after the synchronous part of a command.
enum Followup {
    Done,
    Deny(String),
    Navigate(Section),
    Chat(String),
}

struct Inner {
    state: Mutex<SessionState>,
    active: AtomicBool,
    booted: AtomicBool,
    backend: Arc<dyn ChatBackend>,
    navigator: Arc<dyn Navigator>,
    timings: Timings,
    revision: watch::Sender<u64>,
}

/// Handle to a terminal session. Clones share the same session.
#[derive(Clone)]
pub struct Terminal {
    inner: Arc<Inner>,
}

impl Terminal {
    /// Create a session. `active` gates the boot sequence for surfaces that
    /// only boot once the visitor opens them.
    pub fn new(active: bool, backend: Arc<dyn ChatBackend>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_timings(active, backend, navigator, Timings::default())
    }

    pub fn with_timings(
        active: bool,
        backend: Arc<dyn ChatBackend>,
        navigator: Arc<dyn Navigator>,
        timings: Timings,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState {
                    history: Transcript::new(),
                    is_booting: true,
                    is_loading: false,
                    show_matrix: false,
                }),
                active: AtomicBool::new(active),
                booted: AtomicBool::new(false),
                backend,
                navigator,
                timings,
                revision,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let result = f(&mut self.state());
        self.notify();
        result
    }

    /// Snapshot of the transcript.
    pub fn history(&self) -> Vec<Message> {
        self.state().history.messages().to_vec()
    }

    pub fn is_booting(&self) -> bool {
        self.state().is_booting
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn show_matrix(&self) -> bool {
        self.state().show_matrix
    }

    /// Front-ends call this with `false` when the matrix screen is dismissed.
    pub fn set_show_matrix(&self, show: bool) {
        self.update(|state| state.show_matrix = show);
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    pub fn set_active(&self, active: bool) {
        self.inner.active.store(active, Ordering::Release);
    }

    /// Revision counter bumped after every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn clear_history(&self) {
        self.update(|state| state.history.clear());
    }

    /// Play the boot sequence if the surface is active and it has not run
    /// yet. Returns whether this call ran it.
    pub async fn boot_if_needed(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        if self
            .inner
            .booted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        tracing::debug!("Booting terminal session");
        let timings = self.inner.timings;
        let lines = boot_messages();
        let last = lines.len() - 1;

        for (index, message) in lines.into_iter().enumerate() {
            sleep(timings.boot_delay(index)).await;
            self.update(|state| {
                state.history.push(message);
                if index == last {
                    state.is_booting = false;
                }
            });
        }

        sleep(timings.navigation_marker).await;
        self.update(|state| state.history.push(Message::navigation()));
        true
    }

    /// Handle one line of visitor input.
    pub async fn submit(&self, input: &str) -> Submission {
        let Some(command) = Command::parse(input) else {
            return Submission::Ignored;
        };
        let Some(followup) = self.begin(command, input.trim()) else {
            tracing::debug!("Ignoring input while a reply is streaming");
            return Submission::Ignored;
        };

        match followup {
            Followup::Done => Submission::Handled,
            Followup::Deny(message) => {
                sleep(self.inner.timings.denial).await;
                self.update(|state| state.history.push(Message::system(message)));
                Submission::Handled
            }
            Followup::Navigate(section) => {
                sleep(self.inner.timings.navigate).await;
                tracing::info!("Navigating to {}", section.path());
                self.inner.navigator.navigate_to(section.path());
                Submission::Handled
            }
            Followup::Chat(text) => self.stream_reply(&text).await,
        }
    }

    /// Synchronous part of a command, under a single lock so the loading
    /// gate and the echo cannot interleave with another submission.
    fn begin(&self, command: Command, input: &str) -> Option<Followup> {
        let mut guard = self.state();
        let state = &mut *guard;
        if state.is_loading {
            return None;
        }
        if command.echoes_input() {
            state.history.push(Message::user(input));
        }

        let history = &mut state.history;
        let followup = match command {
            Command::Clear => {
                history.clear();
                Followup::Done
            }
            Command::Help => {
                history.push(Message::system(HELP_TEXT));
                history.push(Message::navigation());
                Followup::Done
            }
            Command::Whoami => {
                history.push(Message::system(WHOAMI_TEXT));
                Followup::Done
            }
            Command::Cowsay(text) => {
                history.push(Message::system(cowsay(&text)));
                Followup::Done
            }
            Command::Matrix => {
                state.show_matrix = true;
                Followup::Done
            }
            Command::Restricted(name) => Followup::Deny(permission_denied(&name)),
            Command::Sudo => Followup::Deny(SUDO_DENIED.to_string()),
            Command::Ls => {
                history.push(Message::system(LS_TREE));
                Followup::Done
            }
            Command::Cd(CdTarget::Section(section)) => {
                history.push(Message::system(section.navigating_message()));
                Followup::Navigate(section)
            }
            Command::Cd(CdTarget::Root) => {
                history.push(Message::system(ALREADY_ROOT));
                Followup::Done
            }
            Command::Cd(CdTarget::Missing(target)) => {
                history.push(Message::system(no_such_directory(&target)));
                Followup::Done
            }
            Command::FreeText(text) => {
                state.is_loading = true;
                Followup::Chat(text)
            }
        };

        drop(guard);
        self.notify();
        Some(followup)
    }

    async fn stream_reply(&self, text: &str) -> Submission {
        let mut loading = LoadingGuard {
            terminal: self,
            completed: false,
        };
        let backend = &self.inner.backend;

        let mut stream = match backend.open_chat(text).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Chat request to {} backend failed: {}", backend.name(), e);
                self.update(|state| state.history.push(Message::system(CONNECTION_LOST)));
                return Submission::Failed;
            }
        };

        self.update(|state| state.history.push(Message::assistant("")));

        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(fragment) => {
                    self.update(|state| state.history.extend_tail(&fragment));
                }
                Err(e) => {
                    tracing::warn!("Chat stream from {} backend broke: {}", backend.name(), e);
                    self.update(|state| {
                        state.history.discard_empty_tail();
                        state.history.push(Message::system(CONNECTION_LOST));
                    });
                    return Submission::Failed;
                }
            }
        }

        tracing::debug!("Chat reply complete");
        loading.completed = true;
        Submission::Streamed
    }
}

/// Clears `is_loading` when the reply finishes, fails or is dropped. A reply
/// that never completed must not leave an empty placeholder behind.
struct LoadingGuard<'a> {
    terminal: &'a Terminal,
    completed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let completed = self.completed;
        self.terminal.update(|state| {
            state.is_loading = false;
            if !completed && state.history.discard_empty_tail() {
                tracing::debug!("Dropped placeholder of an abandoned reply");
            }
        });
    }
}
