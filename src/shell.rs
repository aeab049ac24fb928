//! Interactive terminal front-end on stdin/stdout.

use anyhow::Result;
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::terminal::{Message, Role, Terminal, QUICK_ACTIONS};

pub const PROMPT: &str = "guest@peterguan.dev:~$ ";
const ASSISTANT_PREFIX: &str = "neural> ";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Turns transcript snapshots into the text that still has to be written.
///
/// Keeps track of what it already emitted so a streaming reply is written
/// fragment by fragment instead of being reprinted.
#[derive(Debug)]
pub struct Renderer {
    /// Byte length of each emitted message.
    emitted: Vec<(Role, usize)>,
    /// Echo `user` entries. The interactive shell skips them because the
    /// visitor's own line is already on screen.
    echo_user: bool,
    /// A reply is on screen without its closing newline.
    open_line: bool,
}

impl Renderer {
    pub fn interactive() -> Self {
        Self {
            emitted: Vec::new(),
            echo_user: false,
            open_line: false,
        }
    }

    pub fn transcript() -> Self {
        Self {
            echo_user: true,
            ..Self::interactive()
        }
    }

    pub fn render(&mut self, history: &[Message]) -> String {
        let mut out = String::new();

        let rewound = history.len() < self.emitted.len()
            || self
                .emitted
                .iter()
                .zip(history)
                .any(|((role, len), message)| *role != message.role || message.content.len() < *len);
        if rewound {
            out.push_str(CLEAR_SCREEN);
            self.emitted.clear();
            self.open_line = false;
        }

        // The streaming reply only ever grows at the tail.
        if let Some(tail) = self.emitted.len().checked_sub(1) {
            let message = &history[tail];
            let (role, len) = &mut self.emitted[tail];
            if *role == Role::Assistant {
                if let Some(fresh) = message.content.get(*len..) {
                    out.push_str(fresh);
                }
                *len = message.content.len();
            }
        }

        for message in &history[self.emitted.len()..] {
            self.close_line(&mut out);
            match message.role {
                Role::System if message.is_logo => {
                    out.push_str(&message.content);
                    out.push_str("\n\n");
                }
                Role::System => {
                    out.push_str(&message.content);
                    out.push('\n');
                }
                Role::User if self.echo_user => {
                    out.push_str(PROMPT);
                    out.push_str(&message.content);
                    out.push('\n');
                }
                Role::User => {}
                Role::Assistant => {
                    out.push_str(ASSISTANT_PREFIX);
                    out.push_str(&message.content);
                    self.open_line = true;
                }
                Role::Navigation => {
                    out.push_str(&quick_actions_line());
                    out.push('\n');
                }
            }
            self.emitted.push((message.role, message.content.len()));
        }

        out
    }

    /// Terminate a reply left open by [`Renderer::render`].
    pub fn finish(&mut self) -> String {
        let mut out = String::new();
        self.close_line(&mut out);
        out
    }

    fn close_line(&mut self, out: &mut String) {
        if self.open_line {
            out.push('\n');
            self.open_line = false;
        }
    }
}

/// The quick-action buttons as one line of text.
pub fn quick_actions_line() -> String {
    QUICK_ACTIONS
        .iter()
        .map(|action| format!("[{}] {}", action.command, action.label))
        .collect::<Vec<_>>()
        .join("  ")
}

fn emit(text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Run `work` while re-rendering the transcript on every change.
async fn drive<F>(terminal: &Terminal, renderer: &mut Renderer, work: F) -> Result<F::Output>
where
    F: Future,
{
    let mut revisions = terminal.subscribe();
    tokio::pin!(work);

    loop {
        tokio::select! {
            output = &mut work => {
                emit(&renderer.render(&terminal.history()))?;
                emit(&renderer.finish())?;
                return Ok(output);
            }
            changed = revisions.changed() => {
                emit(&renderer.render(&terminal.history()))?;
                if changed.is_err() {
                    let output = (&mut work).await;
                    emit(&renderer.render(&terminal.history()))?;
                    emit(&renderer.finish())?;
                    return Ok(output);
                }
            }
        }
    }
}

/// Interactive loop: boot, then read lines until EOF or `exit`.
pub async fn run_shell(terminal: Terminal) -> Result<()> {
    let mut renderer = Renderer::interactive();
    terminal.set_active(true);
    drive(&terminal, &mut renderer, terminal.boot_if_needed()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        emit(PROMPT)?;
        let Some(line) = lines.next_line().await? else {
            emit("\n")?;
            break;
        };

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        let submission = drive(&terminal, &mut renderer, terminal.submit(&line)).await?;
        tracing::debug!("Shell input handled: {:?}", submission);

        if terminal.show_matrix() {
            emit(CLEAR_SCREEN)?;
            emit("Wake up, Neo...\nThe Matrix has you...\nFollow the white rabbit.\n\n(press Enter)\n")?;
            lines.next_line().await?;
            terminal.set_show_matrix(false);
            // Repaint what the matrix screen covered.
            renderer = Renderer::interactive();
            emit(CLEAR_SCREEN)?;
            emit(&renderer.render(&terminal.history()))?;
            emit(&renderer.finish())?;
        }
    }

    tracing::info!("Shell closed");
    Ok(())
}
