use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ddictl")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of Infoblox DDI resources", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Cloud Services Portal URL
    #[arg(long, env = "BLOXONE_CSP_URL", global = true)]
    pub csp_url: Option<String>,

    /// API key
    #[arg(long, env = "BLOXONE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Page size for list calls
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub page_limit: Option<u64>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge objects to the state described in a task file
    Apply(ApplyArgs),

    /// Look up objects by id or filters
    Info(InfoArgs),

    /// Query free addresses, subnets or address blocks
    #[command(name = "next-available")]
    NextAvailable(NextAvailableArgs),

    /// List supported resource types
    Resources(ResourcesArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

// ============================================================================
// Apply
// ============================================================================

#[derive(Args)]
pub struct ApplyArgs {
    /// Task file (.toml or .json)
    pub file: PathBuf,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// Show before/after of changed objects
    #[arg(long)]
    pub diff: bool,

    /// Number of parallel jobs
    #[arg(short, long, default_value = "4")]
    pub jobs: u16,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

// ============================================================================
// Info
// ============================================================================

#[derive(Args)]
pub struct InfoArgs {
    /// Resource type (see `ddictl resources`)
    pub resource: String,

    /// Object identifier
    #[arg(long)]
    pub id: Option<String>,

    /// Attribute filter as key=value (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Raw attribute filter expression
    #[arg(long, conflicts_with = "filters")]
    pub filter_query: Option<String>,

    /// Tag filter as key=value (repeatable)
    #[arg(long = "tag-filter", value_name = "KEY=VALUE")]
    pub tag_filters: Vec<String>,

    /// Raw tag filter expression
    #[arg(long, conflicts_with = "tag_filters")]
    pub tag_filter_query: Option<String>,

    /// Only return these fields (repeatable)
    #[arg(long = "field", value_name = "NAME")]
    pub fields: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

// ============================================================================
// Next available
// ============================================================================

#[derive(Args)]
pub struct NextAvailableArgs {
    /// What to allocate
    #[arg(value_enum)]
    pub kind: NextAvailableKind,

    /// Parent identifier (e.g. ipam/address_block/...)
    pub id: String,

    /// Prefix length of subnets or address blocks
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=128))]
    pub cidr: Option<u8>,

    /// Number of results
    #[arg(long)]
    pub count: Option<u32>,

    /// Only contiguous addresses (ip only)
    #[arg(long)]
    pub contiguous: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum NextAvailableKind {
    Ip,
    Subnet,
    AddressBlock,
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Args)]
pub struct ResourcesArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}
