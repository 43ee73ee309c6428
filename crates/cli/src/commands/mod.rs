pub mod config;
pub mod functions;
pub mod host;
pub mod improve;

pub use config::*;
pub use functions::*;
pub use host::*;
pub use improve::*;
