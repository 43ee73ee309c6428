use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::ImproveConfig;
use crate::model::{
    parse_choice_label, sort_by_name, FunctionDescriptor, ImprovementRequest, OutputArtifact,
    RunReport,
};
use crate::services::caller::InteractiveCaller;
use crate::services::host::{
    DecompilerCollaborator, HostError, LoggingMonitor, ProgramCollaborator, DECOMPILE_TIMEOUT,
};
use crate::services::inference::CodeImprover;
use crate::services::naming::generate_unique_file_name;

/// Reasons a run stops before presenting a result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No functions found in the current program. Please analyze the binary first.")]
    NoFunctions,
    #[error("No function selected.")]
    NoSelection,
    #[error("Function not found: {0}")]
    FunctionNotFound(String),
    #[error("Decompilation failed for function {name}: {reason}")]
    DecompileFailed { name: String, reason: String },
    #[error("Host error: {0}")]
    Host(#[from] HostError),
    #[error("Failed to choose a file name in {}: {source}", .folder.display())]
    Naming {
        folder: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to save improved code to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Drives one improvement run from folder prompt to presentation.
pub struct Orchestrator<'a> {
    pub config: &'a ImproveConfig,
    pub program: &'a dyn ProgramCollaborator,
    pub decompiler: &'a dyn DecompilerCollaborator,
    pub improver: &'a dyn CodeImprover,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a ImproveConfig,
        program: &'a dyn ProgramCollaborator,
        decompiler: &'a dyn DecompilerCollaborator,
        improver: &'a dyn CodeImprover,
    ) -> Self {
        Self { config, program, decompiler, improver }
    }

    /// Run the pipeline once. Any early stop is logged and reported to the
    /// caller before the error is returned.
    pub fn run(&self, caller: &mut dyn InteractiveCaller) -> Result<RunReport, PipelineError> {
        match self.run_steps(caller) {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::error!(error = %err, "improvement run aborted");
                caller.report_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Enumerate functions sorted by name.
    pub fn sorted_functions(&self) -> Result<Vec<FunctionDescriptor>, PipelineError> {
        let mut functions = self.program.functions()?;
        sort_by_name(&mut functions);
        Ok(functions)
    }

    fn run_steps(&self, caller: &mut dyn InteractiveCaller) -> Result<RunReport, PipelineError> {
        let started_at = Utc::now().to_rfc3339();

        let folder = caller
            .ask_output_folder(&self.config.default_output_folder)
            .filter(|f| !f.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.default_output_folder.clone());

        let functions = self.sorted_functions()?;
        if functions.is_empty() {
            return Err(PipelineError::NoFunctions);
        }

        let choices: Vec<String> = functions.iter().map(|f| f.choice_label()).collect();
        let selected = caller
            .choose_function(&choices)
            .filter(|c| !c.trim().is_empty())
            .ok_or(PipelineError::NoSelection)?;
        let (name, address) = parse_choice_label(&selected)
            .ok_or_else(|| PipelineError::FunctionNotFound(selected.clone()))?;

        let function = self
            .program
            .resolve(&name, address)?
            .ok_or_else(|| PipelineError::FunctionNotFound(format!("{name} @ {address}")))?;

        let decompiled =
            self.decompiler.decompile(&function, DECOMPILE_TIMEOUT, &LoggingMonitor).map_err(
                |e| PipelineError::DecompileFailed { name: name.clone(), reason: e.to_string() },
            )?;
        if !decompiled.completed {
            return Err(PipelineError::DecompileFailed {
                name,
                reason: decompiled.error_message.unwrap_or_else(|| "not completed".to_string()),
            });
        }
        let source_code = decompiled.into_c_code();
        if source_code.trim().is_empty() {
            return Err(PipelineError::DecompileFailed {
                name,
                reason: "decompiler returned no code".to_string(),
            });
        }
        tracing::debug!(function = %name, "original code:\n{source_code}");
        let source_sha256 = format!("{:x}", Sha256::digest(source_code.as_bytes()));

        let add_comments = caller.confirm_add_comments();
        let request = ImprovementRequest::new(source_code, add_comments);
        let result = self.improver.improve(&request);
        tracing::debug!(function = %name, "improved code:\n{}", result.raw_text());
        let clean_code = result.into_clean_code();

        let default_name = generate_unique_file_name(&folder, &name)
            .map_err(|source| PipelineError::Naming { folder: folder.clone(), source })?;
        let file_name = caller
            .ask_file_name(&default_name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or(default_name);

        let artifact = OutputArtifact { folder_path: folder, file_name, content: clean_code };
        let output_path = persist(&artifact)?;
        tracing::info!(path = %output_path.display(), "improved code saved");

        caller.present(&artifact.content);

        Ok(RunReport {
            function: function.descriptor,
            add_comments,
            output_path,
            source_sha256,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        })
    }
}

/// Create the folder if needed and write the artifact, replacing any file of
/// the same name.
pub fn persist(artifact: &OutputArtifact) -> Result<PathBuf, PipelineError> {
    create_folder(&artifact.folder_path)?;
    let path = artifact.path();
    fs::write(&path, &artifact.content)
        .map_err(|source| PipelineError::Persist { path: path.clone(), source })?;
    Ok(path)
}

fn create_folder(folder: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(folder)
        .map_err(|source| PipelineError::Persist { path: folder.to_path_buf(), source })
}
