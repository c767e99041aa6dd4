mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dbdiff::config::{self, DialectKind, DiffArgs, OutputArgs, QuotingArgs};
use dbdiff::constants::CONFIG_FILENAME;
use dbdiff::report::ReportFormat;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config_file: PathBuf,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that generates SQL.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Target SQL dialect
    #[arg(long, value_enum)]
    pub dialect: Option<DialectKind>,

    /// Summary format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    #[command(flatten)]
    pub quoting_args: QuotingArgs,

    #[command(flatten)]
    pub diff_args: DiffArgs,

    #[command(flatten)]
    pub output_args: OutputArgs,
}

impl GenerateArgs {
    fn config_input(&self) -> config::ConfigInput {
        config::ConfigInput {
            dialect: self.dialect,
            quoting: Some(self.quoting_args.clone().into()),
            diff: Some(self.diff_args.clone().into()),
            output: Some(self.output_args.clone().into()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a full creation script for a schema document
    Build {
        /// Schema document to build
        document: PathBuf,

        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Generate staged upgrade scripts from one schema document to another
    Diff {
        /// Schema document describing the deployed state
        old: PathBuf,

        /// Schema document describing the desired state
        new: PathBuf,

        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Print the table dependency order of a schema document
    Order {
        /// Schema document to order
        document: PathBuf,

        /// List tables in document order instead of dependency order
        #[arg(long)]
        document_order: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<commands::config::ConfigCommands>,
    },
}

fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);
    run_main(cli)
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if cli.debug || cli.verbose || cli.quiet {
        EnvFilter::new(level)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_main(cli: Cli) -> Result<()> {
    let file_config = config::load_config(&cli.config_file)?;

    match cli.command {
        Commands::Build { document, args } => {
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(args.config_input())
                .resolve()?;

            info!("Building {}", document.display());
            commands::cmd_build(&config, &document, args.format)
        }
        Commands::Diff { old, new, args } => {
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(args.config_input())
                .resolve()?;

            info!("Diffing {} -> {}", old.display(), new.display());
            commands::cmd_diff(&config, &old, &new, args.format)
        }
        Commands::Order {
            document,
            document_order,
            format,
        } => commands::cmd_order(&document, !document_order, format),
        Commands::Config { command } => {
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .resolve()?;
            commands::cmd_config(&config, &cli.config_file, command)
        }
    }
}
