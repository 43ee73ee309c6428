use anyhow::{Context, Result};
use decomprove_core::model::sort_by_name;
use decomprove_core::services::host::ProgramCollaborator;

use crate::commands::{open_host, HostSource};

/// Print the sorted `"{name} @ {address}"` labels offered by `improve`.
pub fn list_functions_command(source: &HostSource, json: bool) -> Result<()> {
    let host = open_host(source)?;
    let mut functions = host.program().functions().context("Failed to enumerate functions")?;
    sort_by_name(&mut functions);

    if json {
        let serialized = serde_json::to_string_pretty(&functions)
            .context("Failed to serialize functions to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Functions ({}):", functions.len());
    if functions.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for func in functions {
        println!("  - {}", func.choice_label());
    }
    Ok(())
}
