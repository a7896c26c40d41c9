use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quota_optimiser::{EngineConfig, OptimizerEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod utils;

use commands::*;

#[derive(Parser)]
#[command(
    name = "qopt",
    version,
    about = "Workflow quota optimiser",
    long_about = "Analyse workflow descriptions and recommend quota optimisations\n\n\
                  Examples:\n  \
                  qopt analyze workflow.json --issues issues.json\n  \
                  qopt techniques intent.json --params params.json\n  \
                  qopt validate workflow.json\n\n\
                  For more help: qopt help",
    after_help = "Use 'qopt <command> --help' for more information about a command."
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    output: OutputFormat,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
    Compact,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every pass and selected technique over a workflow
    ///
    /// Examples:
    ///   qopt analyze workflow.json
    ///   qopt analyze workflow.json --issues issues.json --params params.json
    Analyze {
        /// Path to workflow JSON file (a bare workflow or a full request)
        workflow: String,

        /// Path to efficiency issues JSON file (array)
        #[arg(long)]
        issues: Option<String>,

        /// Path to optional parameters JSON file
        #[arg(long)]
        params: Option<String>,

        /// Path to parsed intent JSON file
        #[arg(long)]
        intent: Option<String>,
    },

    /// Score which analysis techniques apply to an intent
    Techniques {
        /// Path to parsed intent JSON file
        intent: String,

        /// Path to optional parameters JSON file
        #[arg(long)]
        params: Option<String>,
    },

    /// Validate a workflow file
    Validate {
        /// Path to workflow JSON file
        file: String,
    },

    /// List techniques and passes
    List,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stderr keeps stdout clean for --output json
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load and validate configuration
    let config = EngineConfig::load_from_env()
        .and_then(|c| c.validate())
        .context("Failed to load configuration")?;
    tracing::debug!(?config, "engine configuration loaded");

    let engine = OptimizerEngine::with_config(config);

    // Execute command
    match cli.command {
        Commands::Analyze {
            workflow,
            issues,
            params,
            intent,
        } => analyze::handle(&engine, workflow, issues, params, intent, &cli.output)?,
        Commands::Techniques { intent, params } => techniques::handle(intent, params, &cli.output)?,
        Commands::Validate { file } => validate::handle(file, &cli.output)?,
        Commands::List => list::handle(&engine, &cli.output)?,
    }

    Ok(())
}
