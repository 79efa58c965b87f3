// src/ports/mod.rs
pub mod terminal;

pub use terminal::{alert_message, TerminalPresenter};
