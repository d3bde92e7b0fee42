//! Bridge Runner
//!
//! Loads a JavaScript bundle into a QuickJS-backed bridge executor and drives
//! the batched bridge protocol from the command line. Every bridge result is
//! printed to stdout as one JSON line.

use anyhow::{Context, anyhow, bail};
use batched_bridge::tracing_setup::init_tracing;
use batched_bridge::{BridgeResult, EngineConfig, JsonExecutor, QuickJsHost, StatusCode};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bridge-runner")]
#[command(about = "Run a JavaScript bundle and drive its batched bridge", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EngineArgs {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source URL reported for the bundle (default: bundle path)
    #[arg(long, global = true)]
    source_url: Option<String>,

    /// Serialized-script cache file for the bundle
    #[arg(long, global = true)]
    cache: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a bundle, optionally seeding globals and flushing the queue
    Run {
        /// JavaScript bundle
        bundle: PathBuf,

        /// Global to set before the bundle runs, as NAME=JSON
        #[arg(short, long = "global", value_parser = parse_global)]
        globals: Vec<(String, String)>,

        /// Print the flushed queue after the bundle ran
        #[arg(long)]
        flush: bool,
    },

    /// Call a JavaScript module method through callFunctionReturnFlushedQueue
    Call {
        bundle: PathBuf,
        module: String,
        method: String,

        /// Arguments as a JSON array
        #[arg(default_value = "[]")]
        args: String,
    },

    /// Invoke a JavaScript callback through invokeCallbackAndReturnFlushedQueue
    Invoke {
        bundle: PathBuf,
        callback_id: i32,

        /// Arguments as a JSON array
        #[arg(default_value = "[]")]
        args: String,
    },

    /// Print a global variable as JSON after the bundle ran
    Get { bundle: PathBuf, name: String },

    /// Write the serialized form of a bundle
    Serialize { bundle: PathBuf, output: PathBuf },
}

fn parse_global(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, json)| (name.to_string(), json.to_string()))
        .ok_or_else(|| format!("expected NAME=JSON, got '{}'", raw))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let engine_config = match &cli.engine.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let executor = JsonExecutor::<QuickJsHost>::new(engine_config)?;
    let outcome = run_command(&executor, &cli.engine, cli.command);

    if let Err(e) = executor.dispose() {
        tracing::warn!(error = %e, "Engine dispose reported an error");
    }

    outcome
}

fn run_command(
    executor: &JsonExecutor<QuickJsHost>,
    engine: &EngineArgs,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            bundle,
            globals,
            flush,
        } => {
            for (name, json) in &globals {
                let status = executor.bridge().set_global_variable(name, json);
                if !status.is_success() {
                    bail!("Setting global '{}' failed with {}", name, status);
                }
            }
            load_bundle(executor, engine, &bundle)?;
            if flush {
                emit("flushed_queue", executor.bridge().flushed_queue())?;
            }
        }
        Commands::Call {
            bundle,
            module,
            method,
            args,
        } => {
            load_bundle(executor, engine, &bundle)?;
            emit(
                "call_function_and_return_flushed_queue",
                executor
                    .bridge()
                    .call_function_and_return_flushed_queue(&module, &method, &args),
            )?;
        }
        Commands::Invoke {
            bundle,
            callback_id,
            args,
        } => {
            load_bundle(executor, engine, &bundle)?;
            emit(
                "invoke_callback_and_return_flushed_queue",
                executor
                    .bridge()
                    .invoke_callback_and_return_flushed_queue(callback_id, &args),
            )?;
        }
        Commands::Get { bundle, name } => {
            load_bundle(executor, engine, &bundle)?;
            emit(
                "get_global_variable",
                executor.bridge().get_global_variable(&name),
            )?;
        }
        Commands::Serialize { bundle, output } => {
            let source = std::fs::read_to_string(&bundle)
                .with_context(|| format!("Failed to read bundle {}", bundle.display()))?;
            let serialized =
                executor.serialize_script(&source, &source_url_for(engine, &bundle))?;
            std::fs::write(&output, &serialized)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            tracing::info!(
                output = %output.display(),
                bytes = serialized.len(),
                "Serialized bundle"
            );
        }
    }

    Ok(())
}

fn load_bundle(
    executor: &JsonExecutor<QuickJsHost>,
    engine: &EngineArgs,
    bundle: &Path,
) -> anyhow::Result<()> {
    let source_url = source_url_for(engine, bundle);
    match &engine.cache {
        Some(cache) => executor.run_script_with_cache(bundle, cache, &source_url)?,
        None => executor.run_script_file(bundle, &source_url)?,
    }
    Ok(())
}

/// `--source-url`, or the bundle path when it is not given.
fn source_url_for(engine: &EngineArgs, bundle: &Path) -> String {
    engine
        .source_url
        .clone()
        .unwrap_or_else(|| bundle.display().to_string())
}

fn emit(operation: &str, result: BridgeResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&result)?);
    match result.status_code() {
        StatusCode::Success => Ok(()),
        code => Err(anyhow!("{} failed with {}", operation, code)),
    }
}
