use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::model::{Address, FunctionDescriptor};

/// Budget given to the decompiler for one function.
pub const DECOMPILE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Binary not found at {0}")]
    MissingBinary(PathBuf),
    #[error("Host tool error: {0}")]
    Tool(String),
    #[error("Invalid fixture: {0}")]
    Fixture(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolved function inside the loaded program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHandle {
    pub descriptor: FunctionDescriptor,
    /// Size in bytes when the host reports it.
    pub size: Option<u64>,
}

impl FunctionHandle {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn entry_address(&self) -> Address {
        self.descriptor.entry_address
    }
}

/// Outcome of one decompilation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompileResult {
    pub completed: bool,
    c_code: String,
    /// Reason reported by the decompiler when `completed` is false.
    pub error_message: Option<String>,
}

impl DecompileResult {
    pub fn completed(c_code: impl Into<String>) -> Self {
        Self { completed: true, c_code: c_code.into(), error_message: None }
    }

    pub fn incomplete(reason: impl Into<String>) -> Self {
        Self { completed: false, c_code: String::new(), error_message: Some(reason.into()) }
    }

    pub fn c_code(&self) -> &str {
        &self.c_code
    }

    pub fn into_c_code(self) -> String {
        self.c_code
    }
}

/// Progress sink handed to the decompiler while it runs.
pub trait ProgressMonitor {
    fn progress(&self, message: &str);
}

/// Monitor that forwards progress messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMonitor;

impl ProgressMonitor for LoggingMonitor {
    fn progress(&self, message: &str) {
        tracing::debug!(target: "decompiler", "{message}");
    }
}

/// Enumeration and lookup over the loaded program.
pub trait ProgramCollaborator {
    /// Every function in the program, in host order.
    fn functions(&self) -> Result<Vec<FunctionDescriptor>, HostError>;

    /// Map a name + entry address back to a function; `None` when absent.
    fn resolve(&self, name: &str, address: Address) -> Result<Option<FunctionHandle>, HostError>;
}

/// Converts one function into C-like text.
pub trait DecompilerCollaborator {
    fn decompile(
        &self,
        function: &FunctionHandle,
        timeout: Duration,
        monitor: &dyn ProgressMonitor,
    ) -> Result<DecompileResult, HostError>;

    fn name(&self) -> &'static str;
}
