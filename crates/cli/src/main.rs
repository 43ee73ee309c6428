use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use decomprove::commands::{
    improve_command, list_functions_command, show_config_command, HostSource,
};
use decomprove::TerminalCaller;

/// Rewrites one decompiled function for readability through a chat-completion model.
///
/// This CLI is a thin wrapper around `decomprove-core`; the pipeline, naming,
/// and model client all live in the library.
#[derive(Parser, Debug)]
#[command(
    name = "decomprove",
    version,
    about = "Improve decompiled code readability with a language model",
    long_about = None
)]
struct Cli {
    /// Log at info level (RUST_LOG still takes precedence per target).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
struct HostArgs {
    /// Binary to analyze with rizin.
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Explicit rizin executable (defaults to RIZIN_BIN or `rizin` on PATH).
    #[arg(long)]
    rizin: Option<PathBuf>,

    /// JSON fixture of functions and their decompiled text, used instead of rizin.
    #[arg(long)]
    fixture: Option<PathBuf>,
}

impl HostArgs {
    fn source(self) -> Result<HostSource> {
        HostSource::from_flags(self.binary, self.rizin, self.fixture)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick a function, send its decompiled code to the model, save and show the result.
    ///
    /// The run is dialog-driven: it prompts for the output folder, the function,
    /// whether to add comments, and the file name.
    Improve {
        #[command(flatten)]
        host: HostArgs,

        /// Config file (.json, .yaml or .yml). Environment variables override it.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the functions offered for improvement, sorted by name.
    Functions {
        #[command(flatten)]
        host: HostArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the effective configuration with the API key masked.
    Config {
        /// Config file (.json, .yaml or .yml).
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { tracing::Level::INFO } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        None => {
            println!("decomprove v{}", decomprove_core::version());
            println!("Run `decomprove improve --binary <path>` to improve a function.");
        }
        Some(Command::Improve { host, config }) => {
            let source = host.source()?;
            let stdin = io::stdin();
            let mut caller = TerminalCaller::new(stdin.lock(), io::stdout());
            let report = improve_command(&source, config.as_deref(), &mut caller)?;
            println!("Improved code saved to: {}", report.output_path.display());
        }
        Some(Command::Functions { host, json }) => list_functions_command(&host.source()?, json)?,
        Some(Command::Config { config }) => show_config_command(config.as_deref())?,
    }

    Ok(())
}
