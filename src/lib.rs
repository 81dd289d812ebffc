//! dexterity
//!
//! Interactive terminal UI for ahead-of-time compiling Android apps over
//! a Shizuku shell. The library exposes:
//! - the interactive shell session driver
//! - the dexopt status classifier and display-ordering contract
//! - the device operations built on top of both

pub mod config;
pub mod device;
pub mod dexopt;
pub mod error;
pub mod logging;
pub mod presentation;
pub mod shell;
