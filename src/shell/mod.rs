//! Interactive privileged shell session
//!
//! One Shizuku subprocess on a PTY, driven with a line-oriented
//! send-command / wait-for-prompt protocol.

pub mod session;

pub use session::{ConnectionState, ShellExecutor, ShellSession};
