use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use payintensity_client::commands::publish::DEFAULT_DECLARATION;
use payintensity_client::reference::remote::{
    DEFAULT_API_BASE, DEFAULT_BULK_URL, RemoteStrategyKind,
};

/// Extended help shown after `payintensity normalize --help`.
pub const NORMALIZE_AFTER_HELP: &str = "\
Input table:
  One header row: Country,2018,...,2025,Latitude,Longitude
  Values are in billions of USD. Comma grouping (`1,234.5`) is accepted.
  Extra columns are ignored; Country must be unique.

Output table:
  Same columns, one row per input country, values rounded to 2 decimals.
  A cell is left empty when its reference value is missing or zero.

Script publishing:
  --host <document> replaces the body of `const <declaration> = {` ... `};`
  in the document. The declaration must appear exactly once.
  --snippet-out <path> writes the same block to a standalone file.
";

#[derive(Debug, Parser)]
#[command(
    name = "payintensity",
    version,
    about = "normalize payment transaction values by GDP or population",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log progress to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Derive a metric table from a transaction table
    #[command(arg_required_else_help = true)]
    Normalize {
        #[command(subcommand)]
        command: NormalizeCommand,
    },
    /// Publish an existing metric table into a host document
    #[command(arg_required_else_help = true)]
    Publish {
        #[command(subcommand)]
        command: PublishCommand,
    },
    /// Inspect the country-code table
    #[command(arg_required_else_help = true)]
    Codes {
        #[command(subcommand)]
        command: CodesCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum NormalizeCommand {
    /// Transaction value as a percentage of GDP
    #[command(after_help = NORMALIZE_AFTER_HELP)]
    Gdp {
        #[command(flatten)]
        io: TableArgs,
        /// TOML file with a `[gdp]` table replacing the embedded GDP values
        #[arg(long, value_name = "PATH")]
        gdp_table: Option<PathBuf>,
        #[command(flatten)]
        script: ScriptArgs,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
    /// Transaction value per person, using World Bank population
    #[command(after_help = NORMALIZE_AFTER_HELP)]
    PerCapita {
        #[command(flatten)]
        io: TableArgs,
        #[command(flatten)]
        remote: RemoteArgs,
        #[command(flatten)]
        script: ScriptArgs,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum PublishCommand {
    /// Render a metric table as a script block
    Script {
        /// Metric table written by `payintensity normalize`
        #[arg(long, value_name = "PATH")]
        metrics: PathBuf,
        #[command(flatten)]
        script: ScriptArgs,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CodesCommand {
    /// List input countries that have no World Bank country code
    Check {
        /// Transaction table to check
        input: PathBuf,
        /// Emit structured JSON object output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Transaction table (CSV)
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,
    /// Metric table to write (CSV)
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct RemoteArgs {
    /// How population is fetched
    #[arg(long, value_enum, default_value_t = StrategyArg::Bulk)]
    pub strategy: StrategyArg,
    /// World Bank API base URL
    #[arg(
        long,
        value_name = "URL",
        env = "PAYINTENSITY_WB_BASE_URL",
        default_value = DEFAULT_API_BASE
    )]
    pub api_base: String,
    /// Bulk population archive URL
    #[arg(
        long,
        value_name = "URL",
        env = "PAYINTENSITY_BULK_URL",
        default_value = DEFAULT_BULK_URL
    )]
    pub bulk_url: String,
    /// Pause between per-unit requests, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 200)]
    pub pace_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ScriptArgs {
    /// Host document to splice the script block into
    #[arg(long, value_name = "PATH")]
    pub host: Option<PathBuf>,
    /// Name of the `const` declaration to replace
    #[arg(long, default_value = DEFAULT_DECLARATION)]
    pub declaration: String,
    /// Years to publish, comma separated (default 2021-2025)
    #[arg(long, value_delimiter = ',', value_name = "YEARS")]
    pub years: Vec<i32>,
    /// Also write the script block to this file
    #[arg(long, value_name = "PATH")]
    pub snippet_out: Option<PathBuf>,
}

impl ScriptArgs {
    pub fn is_requested(&self) -> bool {
        self.host.is_some() || self.snippet_out.is_some()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    PerUnit,
    Batched,
    Bulk,
}

impl From<StrategyArg> for RemoteStrategyKind {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::PerUnit => Self::PerUnit,
            StrategyArg::Batched => Self::Batched,
            StrategyArg::Bulk => Self::Bulk,
        }
    }
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
