use std::path::Path;

use anyhow::{Context, Result};
use decomprove_core::model::RunReport;
use decomprove_core::{ChatCompletionClient, InteractiveCaller, Orchestrator};

use crate::commands::{load_config, open_host, HostSource};

/// Run one interactive improvement against the selected host.
pub fn improve_command(
    source: &HostSource,
    config_path: Option<&Path>,
    caller: &mut dyn InteractiveCaller,
) -> Result<RunReport> {
    let config = load_config(config_path)?;
    if config.api_key.is_empty() {
        tracing::warn!("no API key configured; the endpoint will likely reject the request");
    }

    let host = match open_host(source) {
        Ok(host) => host,
        Err(e) => {
            caller.report_error(&format!("{e:#}"));
            return Err(e);
        }
    };
    let client = ChatCompletionClient::new(&config).context("Failed to build HTTP client")?;

    let orchestrator = Orchestrator::new(&config, host.program(), host.decompiler(), &client);
    let report = orchestrator.run(caller).context("Improvement run did not complete")?;
    tracing::info!(
        function = %report.function.name,
        path = %report.output_path.display(),
        source_sha256 = %report.source_sha256,
        "improvement run finished"
    );
    Ok(report)
}
