pub mod clipboard;
pub mod commands;
pub mod prompt;

pub use prompt::TerminalCaller;
