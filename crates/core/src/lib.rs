//! decomprove-core
//!
//! Core library for rewriting a single decompiled function for readability
//! through a chat-completion model.
//!
//! The pipeline picks a function from the host program, decompiles it, sends
//! the text to the model, strips the wrapper lines from the reply, and saves
//! the result under a collision-free name. Host tools and the dialog surface
//! are traits so the same pipeline runs behind a terminal prompt, a GUI, or
//! test doubles.

pub mod config;
pub mod model;
pub mod services;

pub use config::ImproveConfig;
pub use services::caller::InteractiveCaller;
pub use services::inference::{ChatCompletionClient, CodeImprover};
pub use services::naming::generate_unique_file_name;
pub use services::pipeline::{Orchestrator, PipelineError};
pub use services::sanitize::remove_markers;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
