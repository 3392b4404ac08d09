//! Command-line front end for IAM policy document assembly

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use iam_policy_document::{ConfigFormat, DocumentConfig, HashAlgorithm, PolicyDocumentService};
use log::{debug, info};
use serde::Serialize;

/// Path value that reads the configuration from stdin
const STDIN_PATH: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "iam-policy-document")]
#[command(
    author,
    version,
    about = "Assemble canonical AWS IAM policy documents",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge source_json, statement declarations and override_json into one policy
    Build(BuildArgs),

    /// Print the JSON Schema of the configuration file
    Schema,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Configuration file (.json or .toml), or '-' to read JSON from stdin
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Format of the configuration, inferred from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// File holding the base policy document; replaces the config's source_json
    #[arg(long)]
    source_json: Option<PathBuf>,

    /// File holding the override policy document; replaces the config's override_json
    #[arg(long)]
    override_json: Option<PathBuf>,

    /// Policy Id; replaces the config's policy_id
    #[arg(long)]
    policy_id: Option<String>,

    /// Algorithm used for the document identifier
    #[arg(long, value_enum, default_value_t = HashArg::Crc32)]
    hash: HashArg,

    /// What to print on stdout
    #[arg(short, long, value_enum, default_value_t = OutputArg::Json)]
    output: OutputArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Json,
    Toml,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HashArg {
    Crc32,
    Sha256,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputArg {
    /// {"json": <policy text>, "id": <identifier>}
    Json,
    /// The policy text only
    Document,
}

impl From<FormatArg> for ConfigFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Toml => Self::Toml,
        }
    }
}

impl From<HashArg> for HashAlgorithm {
    fn from(value: HashArg) -> Self {
        match value {
            HashArg::Crc32 => Self::Crc32,
            HashArg::Sha256 => Self::Sha256,
        }
    }
}

#[derive(Serialize)]
struct BuildOutput<'a> {
    json: &'a str,
    id: &'a str,
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_config(args: &BuildArgs) -> Result<DocumentConfig> {
    let Some(path) = args.config.as_deref() else {
        return Ok(DocumentConfig::default());
    };

    let (text, format) = if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read configuration from stdin")?;
        (text, args.format.map_or(ConfigFormat::Json, Into::into))
    } else {
        let format = match args.format {
            Some(format) => format.into(),
            None => ConfigFormat::from_path(path)?,
        };
        (read_text(path)?, format)
    };

    debug!("Decoding {:?} configuration from {}", format, path.display());
    DocumentConfig::from_str_with_format(&text, format)
        .with_context(|| format!("Failed to load configuration {}", path.display()))
}

fn build(args: &BuildArgs) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(path) = args.source_json.as_deref() {
        config.source_json = Some(read_text(path)?);
    }
    if let Some(path) = args.override_json.as_deref() {
        config.override_json = Some(read_text(path)?);
    }
    if let Some(policy_id) = &args.policy_id {
        config.policy_id = Some(policy_id.clone());
    }

    info!(
        "Building policy document from {} statement declarations",
        config.statement.len()
    );
    let service = PolicyDocumentService::with_algorithm(args.hash.into());
    let policy = service
        .assemble(&config)
        .context("Failed to assemble policy document")?;

    match args.output {
        OutputArg::Json => {
            let output = BuildOutput {
                json: &policy.json,
                id: &policy.id,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputArg::Document => println!("{}", policy.json),
    }
    Ok(())
}

fn schema() -> Result<()> {
    let schema = DocumentConfig::json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &cli.command {
        Command::Build(args) => build(args),
        Command::Schema => schema(),
    }
}
