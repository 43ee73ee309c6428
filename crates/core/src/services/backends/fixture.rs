use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{Address, FunctionDescriptor};
use crate::services::host::{
    DecompileResult, DecompilerCollaborator, FunctionHandle, HostError, ProgramCollaborator,
    ProgressMonitor,
};

/// One function in a fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureFunction {
    pub name: String,
    /// Hex entry address, with or without `0x`.
    pub address: String,
    /// Decompiled text returned for this function.
    #[serde(default)]
    pub code: String,
    /// Set to false to simulate a decompiler that gives up.
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Clone)]
struct Entry {
    descriptor: FunctionDescriptor,
    code: String,
    completed: bool,
}

/// Program + decompiler backed by a JSON list of functions and their
/// decompiled text. Used for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct FixtureHost {
    entries: Vec<Entry>,
}

impl FixtureHost {
    pub fn new(functions: Vec<FixtureFunction>) -> Result<Self, HostError> {
        let entries = functions
            .into_iter()
            .map(|f| -> Result<Entry, HostError> {
                let address: Address = f
                    .address
                    .parse()
                    .map_err(|e| HostError::Fixture(format!("function '{}': {e}", f.name)))?;
                Ok(Entry {
                    descriptor: FunctionDescriptor::new(f.name, address),
                    code: f.code,
                    completed: f.completed,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn from_json(body: &str) -> Result<Self, HostError> {
        let functions: Vec<FixtureFunction> =
            serde_json::from_str(body).map_err(|e| HostError::Fixture(e.to_string()))?;
        Self::new(functions)
    }

    pub fn load(path: &Path) -> Result<Self, HostError> {
        if !path.is_file() {
            return Err(HostError::MissingBinary(path.to_path_buf()));
        }
        Self::from_json(&fs::read_to_string(path)?)
    }

    fn entry_at(&self, address: Address) -> Option<&Entry> {
        self.entries.iter().find(|e| e.descriptor.entry_address == address)
    }
}

impl ProgramCollaborator for FixtureHost {
    fn functions(&self) -> Result<Vec<FunctionDescriptor>, HostError> {
        Ok(self.entries.iter().map(|e| e.descriptor.clone()).collect())
    }

    fn resolve(&self, _name: &str, address: Address) -> Result<Option<FunctionHandle>, HostError> {
        Ok(self
            .entry_at(address)
            .map(|e| FunctionHandle { descriptor: e.descriptor.clone(), size: None }))
    }
}

impl DecompilerCollaborator for FixtureHost {
    fn decompile(
        &self,
        function: &FunctionHandle,
        _timeout: Duration,
        monitor: &dyn ProgressMonitor,
    ) -> Result<DecompileResult, HostError> {
        monitor.progress(&format!("decompiling {} from fixture", function.name()));
        let Some(entry) = self.entry_at(function.entry_address()) else {
            return Ok(DecompileResult::incomplete(format!(
                "no fixture entry at {}",
                function.entry_address()
            )));
        };
        if entry.completed {
            Ok(DecompileResult::completed(entry.code.clone()))
        } else {
            Ok(DecompileResult::incomplete("fixture marks decompilation as incomplete"))
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
