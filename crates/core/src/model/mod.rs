//! Core data model for a single improvement run.
//!
//! Every value here lives for exactly one pipeline run:
//! - `FunctionDescriptor` identifies the function picked from the host program
//! - `ImprovementRequest` fully determines the prompt sent to the model
//! - `ImprovementResult` carries the raw reply until it is sanitized
//! - `OutputArtifact` describes the file written at the end of the run

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::sanitize::remove_markers;

/// Opaque entry-point token for a function in the loaded program.
///
/// Displayed as `0x`-prefixed lowercase hex so it round-trips through the
/// choice labels shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u64);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid address '{0}'")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        u64::from_str_radix(digits, 16)
            .map(Address)
            .map_err(|_| AddressParseError(s.to_string()))
    }
}

/// Name + entry address pair identifying one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub entry_address: Address,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, entry_address: Address) -> Self {
        Self { name: name.into(), entry_address }
    }

    /// Label presented to the caller when choosing a function.
    pub fn choice_label(&self) -> String {
        format!("{} @ {}", self.name, self.entry_address)
    }
}

/// Split a choice label back into its name and address parts.
///
/// Splits on the last `" @ "` so function names containing the separator
/// still resolve.
pub fn parse_choice_label(label: &str) -> Option<(String, Address)> {
    let (name, address) = label.rsplit_once(" @ ")?;
    let address = address.parse().ok()?;
    Some((name.to_string(), address))
}

/// Sort descriptors by name ascending (lexicographic, byte order).
pub fn sort_by_name(functions: &mut [FunctionDescriptor]) {
    functions.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Inputs for one model call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementRequest {
    pub source_code: String,
    pub add_comments: bool,
}

impl ImprovementRequest {
    pub fn new(source_code: impl Into<String>, add_comments: bool) -> Self {
        Self { source_code: source_code.into(), add_comments }
    }
}

/// Reply from the model before sanitization. Never persisted or shown as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImprovementResult {
    raw_text: String,
}

impl ImprovementResult {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self { raw_text: raw_text.into() }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Consume the raw reply and produce the clean code.
    pub fn into_clean_code(self) -> String {
        remove_markers(&self.raw_text)
    }
}

/// File written at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    pub folder_path: PathBuf,
    pub file_name: String,
    pub content: String,
}

impl OutputArtifact {
    pub fn path(&self) -> PathBuf {
        self.folder_path.join(&self.file_name)
    }
}

/// Summary of a completed run, logged once the file is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub function: FunctionDescriptor,
    pub add_comments: bool,
    pub output_path: PathBuf,
    /// SHA-256 of the decompiled text the model was given.
    pub source_sha256: String,
    pub started_at: String,
    pub finished_at: String,
}
