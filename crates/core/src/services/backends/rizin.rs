use std::cell::OnceCell;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::model::{Address, FunctionDescriptor};
use crate::services::host::{
    DecompileResult, DecompilerCollaborator, FunctionHandle, HostError, ProgramCollaborator,
    ProgressMonitor,
};

/// Files whose contents stand in for `aflj` / `pdg` output, so tests run
/// without rizin installed.
pub const FAKE_AFLJ_ENV: &str = "DECOMPROVE_RIZIN_FAKE_AFLJ";
pub const FAKE_PDG_ENV: &str = "DECOMPROVE_RIZIN_FAKE_PDG";
pub const FAKE_VERSION_ENV: &str = "DECOMPROVE_RIZIN_FAKE_VERSION";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Host backed by rizin: `aflj` for enumeration and the rz-ghidra `pdg`
/// command for decompilation.
///
/// The function listing is analysed once per host and reused for resolution.
#[derive(Debug, Clone)]
pub struct RizinHost {
    rizin_path: PathBuf,
    binary: PathBuf,
    functions: OnceCell<Vec<FunctionHandle>>,
}

impl RizinHost {
    /// Open `binary` with the given rizin executable (or `RIZIN_BIN` / `rizin`
    /// from PATH when omitted).
    pub fn new(binary: impl Into<PathBuf>, rizin_path: Option<PathBuf>) -> Result<Self, HostError> {
        let binary = binary.into();
        if !binary.is_file() {
            return Err(HostError::MissingBinary(binary));
        }
        Ok(Self {
            rizin_path: rizin_path.unwrap_or_else(resolve_rizin_path),
            binary,
            functions: OnceCell::new(),
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// First line of `rizin -v`.
    pub fn version(&self) -> Result<String, HostError> {
        if let Some(fake) = std::env::var_os(FAKE_VERSION_ENV) {
            return Ok(fake.to_string_lossy().to_string());
        }
        let output = Command::new(&self.rizin_path)
            .arg("-v")
            .output()
            .map_err(|e| HostError::Tool(format!("failed to spawn rizin: {e}")))?;
        if !output.status.success() {
            return Err(HostError::Tool(format!("rizin -v exited with {}", output.status)));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.lines().next().unwrap_or("").trim();
        if first.is_empty() {
            Err(HostError::Tool("rizin -v produced no output".to_string()))
        } else {
            Ok(first.to_string())
        }
    }

    fn list_functions(&self) -> Result<&[FunctionHandle], HostError> {
        if let Some(cached) = self.functions.get() {
            return Ok(cached.as_slice());
        }
        let parsed = self.analyse_functions()?;
        Ok(self.functions.get_or_init(|| parsed).as_slice())
    }

    fn analyse_functions(&self) -> Result<Vec<FunctionHandle>, HostError> {
        let body = match std::env::var_os(FAKE_AFLJ_ENV) {
            Some(fake) => fs::read_to_string(fake).map_err(|e| {
                HostError::Tool(format!("failed to read {FAKE_AFLJ_ENV}: {e}"))
            })?,
            None => {
                let output = self.run("aaa;aflj", None)?;
                match output {
                    ToolOutput::Finished { status, stdout } if status.success() => stdout,
                    ToolOutput::Finished { status, .. } => {
                        return Err(HostError::Tool(format!("rizin exited with {status}")))
                    }
                    ToolOutput::TimedOut => {
                        return Err(HostError::Tool("rizin timed out listing functions".into()))
                    }
                }
            }
        };
        parse_functions(&body)
    }

    fn run(&self, command: &str, timeout: Option<Duration>) -> Result<ToolOutput, HostError> {
        let mut child = Command::new(&self.rizin_path)
            .args(["-2", "-q0", "-c", command])
            .arg(&self.binary)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HostError::Tool(format!("failed to spawn rizin: {e}")))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| HostError::Tool("rizin stdout was not captured".to_string()))?;

        // Drain stdout on a separate thread so a large listing cannot fill the
        // pipe while we poll for exit.
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).map(|_| String::from_utf8_lossy(&buf).to_string())
        });

        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if let Some(status) = child.try_wait()? {
                let stdout = reader
                    .join()
                    .map_err(|_| HostError::Tool("rizin output reader panicked".to_string()))??;
                return Ok(ToolOutput::Finished { status, stdout });
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(ToolOutput::TimedOut);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

enum ToolOutput {
    Finished { status: ExitStatus, stdout: String },
    TimedOut,
}

impl ProgramCollaborator for RizinHost {
    fn functions(&self) -> Result<Vec<FunctionDescriptor>, HostError> {
        Ok(self.list_functions()?.iter().map(|f| f.descriptor.clone()).collect())
    }

    fn resolve(&self, _name: &str, address: Address) -> Result<Option<FunctionHandle>, HostError> {
        Ok(self.list_functions()?.iter().find(|f| f.entry_address() == address).cloned())
    }
}

impl DecompilerCollaborator for RizinHost {
    fn decompile(
        &self,
        function: &FunctionHandle,
        timeout: Duration,
        monitor: &dyn ProgressMonitor,
    ) -> Result<DecompileResult, HostError> {
        monitor.progress(&format!(
            "decompiling {} @ {} (budget {}s)",
            function.name(),
            function.entry_address(),
            timeout.as_secs()
        ));

        if let Some(fake) = std::env::var_os(FAKE_PDG_ENV) {
            let body = fs::read_to_string(fake)
                .map_err(|e| HostError::Tool(format!("failed to read {FAKE_PDG_ENV}: {e}")))?;
            return Ok(pdg_result(body));
        }

        let command = format!("aaa;s {};pdg", function.entry_address());
        match self.run(&command, Some(timeout))? {
            ToolOutput::TimedOut => {
                monitor.progress("decompiler timed out");
                Ok(DecompileResult::incomplete(format!(
                    "decompiler did not finish within {}s",
                    timeout.as_secs()
                )))
            }
            ToolOutput::Finished { status, .. } if !status.success() => {
                Ok(DecompileResult::incomplete(format!("rizin exited with {status}")))
            }
            ToolOutput::Finished { stdout, .. } => {
                monitor.progress("decompiler finished");
                Ok(pdg_result(stdout))
            }
        }
    }

    fn name(&self) -> &'static str {
        "rizin"
    }
}

fn pdg_result(body: String) -> DecompileResult {
    if body.trim().is_empty() {
        DecompileResult::incomplete("pdg produced no output (is rz-ghidra installed?)")
    } else {
        DecompileResult::completed(body)
    }
}

fn resolve_rizin_path() -> PathBuf {
    std::env::var_os("RIZIN_BIN").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("rizin"))
}

#[derive(Debug, Deserialize)]
struct RizinFunction {
    #[serde(default)]
    offset: Option<u64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    size: Option<u64>,
}

/// Parse `aflj` output. Entries without a name or offset are skipped.
pub fn parse_functions(body: &str) -> Result<Vec<FunctionHandle>, HostError> {
    let funcs: Vec<RizinFunction> = serde_json::from_str(body)
        .map_err(|e| HostError::Tool(format!("failed to parse rizin JSON: {e}")))?;
    Ok(funcs
        .into_iter()
        .filter_map(|f| match (f.name, f.offset) {
            (Some(name), Some(offset)) => Some(FunctionHandle {
                descriptor: FunctionDescriptor::new(name, Address(offset)),
                size: f.size,
            }),
            _ => None,
        })
        .collect())
}
