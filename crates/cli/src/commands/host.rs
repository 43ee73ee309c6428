use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use decomprove_core::services::backends::{FixtureHost, RizinHost};
use decomprove_core::services::host::{DecompilerCollaborator, ProgramCollaborator};

/// Where functions and decompiled text come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSource {
    /// Analyze a binary with rizin (optionally an explicit executable).
    Rizin { binary: PathBuf, rizin: Option<PathBuf> },
    /// Read functions and their decompiled text from a JSON fixture.
    Fixture(PathBuf),
}

impl HostSource {
    /// Build from the mutually exclusive `--binary` / `--fixture` flags.
    pub fn from_flags(
        binary: Option<PathBuf>,
        rizin: Option<PathBuf>,
        fixture: Option<PathBuf>,
    ) -> Result<Self> {
        match (binary, fixture) {
            (Some(binary), None) => Ok(HostSource::Rizin { binary, rizin }),
            (None, Some(fixture)) => Ok(HostSource::Fixture(fixture)),
            (Some(_), Some(_)) => Err(anyhow!("Use either --binary or --fixture, not both")),
            (None, None) => Err(anyhow!("Specify --binary <path> or --fixture <json>")),
        }
    }
}

/// An opened host, usable as both program and decompiler collaborator.
pub enum OpenedHost {
    Rizin(RizinHost),
    Fixture(FixtureHost),
}

impl OpenedHost {
    pub fn program(&self) -> &dyn ProgramCollaborator {
        match self {
            OpenedHost::Rizin(h) => h,
            OpenedHost::Fixture(h) => h,
        }
    }

    pub fn decompiler(&self) -> &dyn DecompilerCollaborator {
        match self {
            OpenedHost::Rizin(h) => h,
            OpenedHost::Fixture(h) => h,
        }
    }
}

pub fn open_host(source: &HostSource) -> Result<OpenedHost> {
    match source {
        HostSource::Rizin { binary, rizin } => {
            let host = RizinHost::new(binary, rizin.clone())
                .with_context(|| format!("Failed to open binary {}", binary.display()))?;
            match host.version() {
                Ok(v) => tracing::info!(version = %v, "using rizin"),
                Err(e) => tracing::warn!(error = %e, "could not determine rizin version"),
            }
            Ok(OpenedHost::Rizin(host))
        }
        HostSource::Fixture(path) => {
            let host = FixtureHost::load(path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            Ok(OpenedHost::Fixture(host))
        }
    }
}
