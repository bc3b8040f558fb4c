use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use agent_config_validation::{BoundProvider, Bounds, ConfigValidator, HostBounds};

/// Exit status when the document has violations
const EXIT_INVALID: i32 = 1;
/// Exit status when the document or schema could not be loaded
const EXIT_FAILURE: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `path: message` line per violation
    Text,
    /// Structured records on stdout
    Json,
    /// Source snippets for each violation
    Pretty,
}

/// Validate an agent configuration file
#[derive(Parser, Debug)]
#[command(name = "validate-agent-config")]
#[command(about = "Validate agent configuration files against the agent schema", long_about = None)]
struct Args {
    /// Path to the configuration file (YAML or JSON)
    #[arg(value_name = "FILE", required_unless_present = "print_schema")]
    file: Option<PathBuf>,

    /// Largest accepted `kstream.min-buffers` (defaults to a value derived from the host)
    #[arg(long, value_name = "N")]
    min_buffers: Option<u64>,

    /// Largest accepted `kstream.max-buffers` (defaults to a value derived from the host)
    #[arg(long, value_name = "N")]
    max_buffers: Option<u64>,

    /// Largest accepted `kstream.buffer-size` in kilobytes
    #[arg(long, value_name = "KB")]
    max_buffer_size: Option<u64>,

    /// How violations are reported
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print the rendered schema and exit
    #[arg(long)]
    print_schema: bool,
}

impl Args {
    fn bounds(&self) -> Bounds {
        let host = HostBounds::probe().bounds();
        Bounds::new(
            self.min_buffers.unwrap_or(host.min_buffers_cap),
            self.max_buffers.unwrap_or(host.max_buffers_cap),
            self.max_buffer_size.unwrap_or(host.max_buffer_size_cap),
        )
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "validate_agent_config=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()) {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    let bounds = args.bounds();
    let validator = ConfigValidator::new(bounds).context("Failed to compile the agent schema")?;
    tracing::debug!(?bounds, "compiled agent schema");

    if args.print_schema {
        println!("{}", validator.schema().rendered());
        return Ok(0);
    }

    // `required_unless_present` guarantees a file here
    let Some(path) = args.file.as_ref() else {
        anyhow::bail!("no configuration file given");
    };
    let name = path.display().to_string();

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", name))?;
    let doc = agent_config_doc::parse_file(&content, &name)
        .with_context(|| format!("Failed to parse configuration file: {}", name))?;

    let outcome = validator.validate(&doc);
    if outcome.is_valid() {
        println!("{}: {}", name, outcome);
        return Ok(0);
    }

    let report = outcome.report();
    match args.format {
        OutputFormat::Text => {
            eprintln!("{}: {}", name, outcome);
            eprintln!("{}", report.to_text());
        }
        OutputFormat::Json => {
            let json = report
                .to_json()
                .context("Failed to serialize the validation report")?;
            println!("{}", json);
        }
        OutputFormat::Pretty => {
            eprint!("{}", report.render_with_source(&name, &content));
        }
    }
    Ok(EXIT_INVALID)
}
