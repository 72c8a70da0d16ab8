use clap::Parser;
use honyaku::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Converts Alteryx workflows (.yxmd) into pandas scripts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow file
    workflow_path: String,

    /// Write the script here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Also write the graph view as JSON to this path
    #[arg(short, long)]
    graph: Option<String>,

    /// JSON file with converter options
    #[arg(long)]
    options: Option<String>,

    /// Stop scheduling after this many nodes
    #[arg(long, conflicts_with = "timeout_ms")]
    max_steps: Option<usize>,

    /// Stop scheduling after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log conversion details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut options = match &cli.options {
        Some(path) => ConverterOptions::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load options: {}", e))),
        None => ConverterOptions::default(),
    };
    if let Some(max_steps) = cli.max_steps {
        options.budget = BudgetConfig::Steps { max_steps };
    }
    if let Some(millis) = cli.timeout_ms {
        options.budget = BudgetConfig::Deadline { millis };
    }

    let source = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            &cli.workflow_path, e
        ))
    });

    let start = Instant::now();
    let result = convert_source(&source, options);
    tracing::debug!(elapsed = ?start.elapsed(), "converted workflow");

    match &cli.output {
        Some(path) => fs::write(path, &result.script).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write script to '{}': {}", path, e))
        }),
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(result.script.as_bytes()) {
                exit_with_error(&format!("Failed to write script: {}", e));
            }
        }
    }

    if let Some(path) = &cli.graph {
        let Some(graph) = &result.graph else {
            exit_with_error("No graph view available: the workflow could not be read");
        };
        let json = graph
            .to_json()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph view: {}", e)));
        fs::write(path, json).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write graph view to '{}': {}", path, e))
        });
    }

    for diagnostic in &result.diagnostics {
        eprintln!("{}", diagnostic);
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output with `-v`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
