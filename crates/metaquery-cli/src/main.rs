use clap::{Parser, Subcommand};
use metaquery_core::{LoggingConfig, MetaQueryConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

use commands::RunStatus;

#[derive(Parser, Debug)]
#[command(name = "metaquery", version, about = "MetaQuery - governed SQL from field selections")]
struct Cli {
    /// Project settings file (metaquery.yaml)
    #[arg(long, global = true, env = "METAQUERY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a governed SQL query (V1) from YAML inputs.
    /// Outputs: audit.json (always), query.sql and explain.txt (when allowed).
    Build {
        /// Path to selection.yml
        selection: PathBuf,

        /// Path to fields.yml (defaults to `fields_file` from the config)
        #[arg(long)]
        fields: Option<PathBuf>,

        /// Directory receiving the artifacts (defaults to `output_dir` from the config)
        #[arg(long = "output-dir")]
        output_dir: Option<PathBuf>,
    },

    /// Validate a selection and print the audit record. Writes no files.
    Validate {
        /// Path to selection.yml
        selection: PathBuf,

        /// Path to fields.yml (defaults to `fields_file` from the config)
        #[arg(long)]
        fields: Option<PathBuf>,

        /// Print the human-readable report instead of audit JSON
        #[arg(long, default_value_t = false)]
        explain: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match MetaQueryConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            console::print_panel("CONFIG ERROR", &e.to_string());
            return RunStatus::InputError.into();
        }
    };

    init_tracing(&config.logging);

    let result = match cli.cmd {
        Command::Build {
            selection,
            fields,
            output_dir,
        } => commands::build::run(&selection, fields.as_deref(), output_dir.as_deref(), &config),

        Command::Validate {
            selection,
            fields,
            explain,
        } => commands::validate::run(&selection, fields.as_deref(), explain, &config),
    };

    match result {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("✖ {:#}", e);
            RunStatus::Failed.into()
        }
    }
}

/// `METAQUERY_LOG` wins over `RUST_LOG`, which wins over the config file.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_env("METAQUERY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
