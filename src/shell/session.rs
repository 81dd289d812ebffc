//! Shell session management
//!
//! Spawns the privileged shell on a PTY and provides the synchronous
//! request/response primitive the rest of the application is built on:
//! write one command line, block until the shell's prompt reappears,
//! return the captured output with the echoed command stripped.
//!
//! The prompt marker is the only synchronization signal available from a
//! black-box interactive shell, so this is inherently best-effort: a
//! command whose own output contains the literal marker text will cause
//! the next call to skip ahead in the stream. Known limitation.

use crate::config::ShellConfig;
use crate::error::{ShellError, ShellResult};
use once_cell::sync::Lazy;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use regex::Regex;
use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Prompt marker the shell emits when ready for input
const PROMPT: &[u8] = b"$ ";

/// How long `close` waits for the shell to exit before killing it
const CLOSE_WAIT: Duration = Duration::from_secs(2);

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)")
        .expect("ANSI escape pattern")
});

/// Session connectivity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// The narrow seam between the session and its consumers.
///
/// Everything that talks to the device goes through this trait so it can
/// be exercised against a scripted shell in tests.
pub trait ShellExecutor {
    /// Submit one command line and return its captured output.
    fn execute(&mut self, command: &str) -> ShellResult<String>;
}

/// A live interactive shell session
pub struct ShellSession {
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
    output_rx: Receiver<Vec<u8>>,
    reader_thread: Option<JoinHandle<()>>,
    /// Bytes received but not yet consumed by a prompt wait
    pending: Vec<u8>,
    timeout: Duration,
    state: ConnectionState,
    // Keeps the PTY master alive for the lifetime of the session
    _master: Box<dyn MasterPty + Send>,
}

impl ShellSession {
    /// Spawn the shell and wait for its first prompt.
    ///
    /// The prompt wait is bounded by the connect timeout, which is
    /// independent of the per-command response timeout.
    pub fn connect(config: &ShellConfig) -> ShellResult<Self> {
        debug!(program = %config.program, "spawning shell");

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| ShellError::SpawnFailed {
                reason: e.to_string(),
            })?;

        let mut cmd = CommandBuilder::new(&config.program);
        for arg in &config.args {
            cmd.arg(arg);
        }
        cmd.env("TERM", "dumb");

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ShellError::SpawnFailed {
                reason: e.to_string(),
            })?;

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| ShellError::SpawnFailed {
                reason: e.to_string(),
            })?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| ShellError::SpawnFailed {
                reason: e.to_string(),
            })?;
        drop(pair.slave);

        let (output_tx, output_rx) = mpsc::channel();
        let reader_thread = thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if output_tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        let mut session = Self {
            child,
            writer,
            output_rx,
            reader_thread: Some(reader_thread),
            pending: Vec::with_capacity(4096),
            timeout: config.command_timeout(),
            state: ConnectionState::Disconnected,
            _master: pair.master,
        };

        // The banner before the first prompt is discarded.
        let connect_timeout = config.connect_timeout();
        if let Err(e) = session.read_until_prompt(connect_timeout) {
            session.teardown();
            return Err(match e {
                ShellError::Timeout { .. } => ShellError::ConnectTimeout {
                    waited_secs: connect_timeout.as_secs(),
                },
                other => other,
            });
        }

        session.state = ConnectionState::Connected;
        info!(program = %config.program, "shell session connected");
        Ok(session)
    }

    /// Current connectivity state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Request graceful termination and wait for the process to exit.
    ///
    /// Failures during teardown are swallowed; `close` never fails
    /// visibly.
    pub fn close(mut self) {
        debug!("closing shell session");
        let _ = self
            .writer
            .write_all(b"exit\n")
            .and_then(|_| self.writer.flush());

        let deadline = Instant::now() + CLOSE_WAIT;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = self.child.kill();
                    break;
                }
                Ok(None) => thread::sleep(Duration::from_millis(50)),
                Err(_) => break,
            }
        }

        self.state = ConnectionState::Disconnected;
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
        info!("shell session closed");
    }

    /// Kill the child and join the reader thread, discarding errors.
    fn teardown(&mut self) {
        let _ = self.child.kill();
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
    }

    /// Accumulate output until the prompt marker appears, bounded by
    /// `timeout`. Returns the bytes before the marker; bytes after it
    /// stay buffered for the next call.
    fn read_until_prompt(&mut self, timeout: Duration) -> ShellResult<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(pos) = find_prompt(&self.pending) {
                let mut before: Vec<u8> = self.pending.drain(..pos).collect();
                self.pending.drain(..PROMPT.len());
                trace!(bytes = before.len(), "prompt observed");
                // Shells emit CRLF on a PTY
                if before.ends_with(b"\r\n") {
                    before.truncate(before.len() - 2);
                }
                return Ok(before);
            }

            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(ShellError::Timeout {
                    timeout_secs: timeout.as_secs(),
                })?;

            match self.output_rx.recv_timeout(remaining) {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(ShellError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    })
                }
                Err(RecvTimeoutError::Disconnected) => return Err(ShellError::Disconnected),
            }
        }
    }
}

impl ShellExecutor for ShellSession {
    fn execute(&mut self, command: &str) -> ShellResult<String> {
        if self.state != ConnectionState::Connected {
            return Err(ShellError::NotConnected);
        }

        debug!(command, "executing");
        self.writer.write_all(command.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        let raw = match self.read_until_prompt(self.timeout) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(command, error = %e, "command failed");
                return Err(e);
            }
        };

        let text = String::from_utf8_lossy(&raw);
        Ok(clean_output(&text, command))
    }
}

impl Drop for ShellSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Find the first occurrence of the prompt marker in `buf`
fn find_prompt(buf: &[u8]) -> Option<usize> {
    buf.windows(PROMPT.len()).position(|w| w == PROMPT)
}

/// Strip ANSI escape sequences from shell output
fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Normalize captured output: drop ANSI noise and the echoed command line.
///
/// The first line is dropped iff it contains the submitted command text,
/// matching the echo the PTY produces. A first output line that merely
/// happens to contain the command text is also dropped; that imprecision
/// is deliberate and long-standing.
fn clean_output(raw: &str, command: &str) -> String {
    let stripped = strip_ansi(raw);
    let mut lines: Vec<&str> = stripped
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if let Some(first) = lines.first() {
        if first.contains(command) {
            lines.remove(0);
        }
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_prompt_at_end() {
        assert_eq!(find_prompt(b"output\r\n$ "), Some(8));
    }

    #[test]
    fn test_find_prompt_first_occurrence_wins() {
        assert_eq!(find_prompt(b"$ one\r\n$ two"), Some(0));
    }

    #[test]
    fn test_find_prompt_absent() {
        assert_eq!(find_prompt(b"still running..."), None);
        assert_eq!(find_prompt(b"dollar$without-space"), None);
    }

    #[test]
    fn test_clean_output_strips_echoed_command() {
        let raw = "pm list packages -3\r\npackage:com.example.app\r\npackage:org.demo";
        let cleaned = clean_output(raw, "pm list packages -3");
        assert_eq!(cleaned, "package:com.example.app\npackage:org.demo");
    }

    #[test]
    fn test_clean_output_without_echo_keeps_all_lines() {
        let raw = "package:com.example.app\r\npackage:org.demo";
        let cleaned = clean_output(raw, "pm list packages -3");
        assert_eq!(cleaned, "package:com.example.app\npackage:org.demo");
    }

    #[test]
    fn test_clean_output_trims_surrounding_whitespace() {
        let raw = "reboot\r\n\r\n  done  \r\n\r\n";
        assert_eq!(clean_output(raw, "reboot"), "done");
    }

    #[test]
    fn test_clean_output_empty_result() {
        assert_eq!(clean_output("ls\r\n", "ls"), "");
        assert_eq!(clean_output("", "ls"), "");
    }

    #[test]
    fn test_strip_ansi_removes_sgr_sequences() {
        let colored = "\x1b[1;32mSuccess\x1b[0m: compiled";
        assert_eq!(strip_ansi(colored), "Success: compiled");
    }

    #[test]
    fn test_strip_ansi_leaves_plain_text_alone() {
        let plain = "package:com.example.app [status=speed]";
        assert_eq!(strip_ansi(plain), plain);
    }
}
