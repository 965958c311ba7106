//! Command-line interface definitions for `prefixdb`.

use camino::Utf8PathBuf;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::Overrides;

/// Rendering used by commands that print structured data.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Compact JSON on one line.
    Json,
    /// JSON indented by two spaces.
    #[default]
    JsonPretty,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Returns the CLI-friendly string for this output format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonPretty => "json-pretty",
            Self::Yaml => "yaml",
        }
    }
}

/// Parsed CLI arguments for `prefixdb`.
#[derive(Debug, Parser)]
#[command(name = "prefixdb")]
#[command(about = "Build, update and inspect prefix-keyed network databases")]
#[command(version)]
pub struct Cli {
    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct GlobalArgs {
    /// Configuration file; `prefixdb.toml` in the working directory is read
    /// when this is not given.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<Utf8PathBuf>,
    /// Log debug output to stderr.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub is_verbose: bool,
}

/// Subcommands of `prefixdb`.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a database from a dataset.
    Generate(GenerateArgs),
    /// Apply a dataset to an existing database.
    Update(UpdateArgs),
    /// Show the records matching addresses or networks.
    Inspect(InspectArgs),
    /// Show database metadata.
    Metadata(MetadataArgs),
    /// Export a database as a dataset that `generate` accepts.
    Dump(DumpArgs),
    /// Check a database for structural problems.
    Verify(VerifyArgs),
    /// Print version information.
    Version,
}

impl Command {
    /// Configuration overrides carried by this subcommand's flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        match self {
            Self::Generate(args) => args.processing.overrides(),
            Self::Update(args) => args.processing.overrides(),
            Self::Inspect(InspectArgs { format, .. }) | Self::Metadata(MetadataArgs { format, .. }) => {
                Overrides {
                    format: *format,
                    ..Overrides::default()
                }
            }
            Self::Dump(_) | Self::Verify(_) | Self::Version => Overrides::default(),
        }
    }
}

/// Flags controlling how a dataset is applied.
#[derive(Debug, Clone, Copy, Default, ClapArgs)]
pub struct ProcessingArgs {
    /// Fail on schema type mismatches instead of substituting zero values.
    #[arg(long = "strict")]
    pub is_strict: bool,
    /// Keep going after a failing entry and report every failure at the end.
    #[arg(long = "continue-on-error")]
    pub should_continue_on_error: bool,
    /// Maximum record nesting depth.
    #[arg(long, value_name = "levels")]
    pub max_depth: Option<usize>,
    /// Do not resolve IPv4-mapped and 6to4 addresses against IPv4 records.
    #[arg(long = "disable-ipv4-aliasing")]
    pub should_disable_ipv4_aliasing: bool,
    /// Accept networks inside reserved address ranges.
    #[arg(long = "include-reserved-networks")]
    pub should_include_reserved_networks: bool,
}

impl ProcessingArgs {
    /// Flags that were given, as configuration overrides.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            strict: self.is_strict.then_some(true),
            continue_on_error: self.should_continue_on_error.then_some(true),
            max_depth: self.max_depth,
            disable_ipv4_aliasing: self.should_disable_ipv4_aliasing.then_some(true),
            include_reserved_networks: self.should_include_reserved_networks.then_some(true),
            ..Overrides::default()
        }
    }
}

/// Arguments for `prefixdb generate`.
#[derive(Debug, ClapArgs)]
pub struct GenerateArgs {
    /// Dataset to read.
    #[arg(short, long, value_name = "dataset.json")]
    pub input: Utf8PathBuf,
    /// Database to write.
    #[arg(short, long, value_name = "out.prefixdb")]
    pub output: Utf8PathBuf,
    /// Processing flags.
    #[command(flatten)]
    pub processing: ProcessingArgs,
}

/// Arguments for `prefixdb update`.
#[derive(Debug, ClapArgs)]
pub struct UpdateArgs {
    /// Database to start from.
    #[arg(short, long, value_name = "in.prefixdb")]
    pub input: Utf8PathBuf,
    /// Dataset to apply.
    #[arg(short, long, value_name = "dataset.json")]
    pub dataset: Utf8PathBuf,
    /// Database to write; an existing file is overwritten.
    #[arg(short, long, value_name = "out.prefixdb")]
    pub output: Utf8PathBuf,
    /// Processing flags.
    #[command(flatten)]
    pub processing: ProcessingArgs,
}

/// Arguments for `prefixdb inspect`.
#[derive(Debug, ClapArgs)]
pub struct InspectArgs {
    /// Database to read.
    #[arg(short, long, value_name = "db.prefixdb")]
    pub input: Utf8PathBuf,
    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
    /// Addresses or CIDR networks to look up.
    #[arg(required = true, value_name = "query")]
    pub queries: Vec<String>,
}

/// Arguments for `prefixdb metadata`.
#[derive(Debug, ClapArgs)]
pub struct MetadataArgs {
    /// Database to read.
    #[arg(short, long, value_name = "db.prefixdb")]
    pub input: Utf8PathBuf,
    /// Output format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Arguments for `prefixdb dump`.
#[derive(Debug, ClapArgs)]
pub struct DumpArgs {
    /// Database to read.
    #[arg(short, long, value_name = "db.prefixdb")]
    pub input: Utf8PathBuf,
    /// Dataset to write.
    #[arg(short, long, value_name = "out.json")]
    pub output: Utf8PathBuf,
}

/// Arguments for `prefixdb verify`.
#[derive(Debug, ClapArgs)]
pub struct VerifyArgs {
    /// Database to check.
    #[arg(short, long, value_name = "db.prefixdb")]
    pub input: Utf8PathBuf,
}
