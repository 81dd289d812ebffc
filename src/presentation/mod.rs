//! Presentation Layer (TUI)
//!
//! Terminal user interface components and widgets.

pub mod app;
pub mod theme;
pub mod tui;
pub mod widgets;

pub use app::App;
pub use tui::{init, install_panic_hook, restore, Tui};
