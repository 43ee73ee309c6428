pub mod backends;
pub mod caller;
pub mod host;
pub mod inference;
pub mod naming;
pub mod pipeline;
pub mod sanitize;
