use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kube_explain::{format_explain, resolve_field, FormattedExplain, SchemaDocument};

/// Explain API fields from a schema document or reformat raw explain output.
#[derive(Debug, Parser)]
#[command(name = "kube-explain", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit the structured result as JSON instead of markup text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a dotted field path (e.g. `Deployment.metadata.generation`).
    Resolve {
        /// Schema JSON document with a `definitions` map.
        schema: PathBuf,
        /// Field path; the first segment is the kind.
        field_path: String,
    },
    /// Reformat plain-text explain output read from FILE or stdin.
    Format {
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Resolve { schema, field_path } => run_resolve(&schema, &field_path, cli.json),
        Command::Format { file } => run_format(file.as_deref(), cli.json),
    }
}

fn run_resolve(schema_path: &Path, field_path: &str, json: bool) -> Result<(), String> {
    let schema = SchemaDocument::from_path(schema_path).map_err(|e| e.to_string())?;
    tracing::debug!(definitions = schema.len(), field_path, "resolving field");

    let explanation = resolve_field(&schema, field_path);
    let output = if json {
        explanation.to_json_string(true).map_err(|e| e.to_string())?
    } else {
        explanation.to_markdown()
    };

    println!("{output}");
    Ok(())
}

fn run_format(file: Option<&Path>, json: bool) -> Result<(), String> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buf
        }
    };

    let formatted = format_explain(raw.trim_end_matches(['\r', '\n']));
    if let FormattedExplain::Code { .. } = formatted {
        tracing::warn!("input has no recognized explain section header; passing through");
    }

    let output = if json {
        serde_json::to_string_pretty(&formatted).map_err(|e| e.to_string())?
    } else {
        formatted.as_str().to_string()
    };

    println!("{output}");
    Ok(())
}
