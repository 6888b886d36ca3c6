//! CLI argument definitions for Stockscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Load metadata plus daily and weekly bars for a security |
//! | `statement` | Load the date-interval and quarter statement bundles |
//! | `types` | List statement types and the input they are keyed by |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--mock` | `false` | Serve deterministic fixture data instead of calling the backend |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--base-url` | env / `http://localhost:8080/api` | Analysis backend root |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `--log-level` | `warn` | Filter used when `RUST_LOG` is unset |
//! | `--log-format` | `pretty` | Log layout on stderr |
//!
//! # Examples
//!
//! ```bash
//! stockscope --mock quote sh.600000 --adjust pre --candle-begin 2024-04-01
//! stockscope --mock statement sz.000001 --year 2023 --quarter 4 --tab growth
//! stockscope types --pretty
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockscope_core::{parse_date, AdjustmentMode, Quarter, StatementType};
use time::Date;

/// Stockscope - quote and statement analysis for listed securities
#[derive(Debug, Parser)]
#[command(
    name = "stockscope",
    author,
    version,
    about = "Quote and financial statement analysis CLI",
    long_about = "Stockscope loads price history and financial statements for a listed \
security, validating every date range before the backend is called.\n\
\n\
Validation messages are written to stderr and make the process exit with code 2."
)]
pub struct Cli {
    /// Serve deterministic fixture data instead of calling the backend.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Analysis backend root URL; overrides STOCKSCOPE_API_BASE_URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log layout written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
    Compact,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load security metadata with daily and weekly bars.
    ///
    /// Range flags go through the same guards as the interactive view:
    /// dates on or after today are refused and the default is kept.
    ///
    /// # Examples
    ///
    ///   stockscope quote sh.600000
    ///   stockscope quote sh.600000 --adjust post --week-begin 2023-06-01
    Quote(QuoteArgs),

    /// Load the statement bundles for a date interval and fiscal quarter.
    ///
    /// # Examples
    ///
    ///   stockscope statement sz.000001
    ///   stockscope statement sz.000001 --begin 2024-01-01 --end 2024-03-31 --tab performance_express
    Statement(StatementArgs),

    /// List statement types with their title and input shape.
    Types,
}

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Security identifier (e.g., sh.600000).
    pub security: String,

    /// Price adjustment mode: none, pre or post.
    #[arg(long, default_value = "none", value_parser = str::parse::<AdjustmentMode>)]
    pub adjust: AdjustmentMode,

    /// First day of the daily candle range (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub candle_begin: Option<Date>,

    /// Last day of the daily candle range (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub candle_end: Option<Date>,

    /// First day of the weekly range (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub week_begin: Option<Date>,

    /// Last day of the weekly range (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub week_end: Option<Date>,
}

/// Arguments for the `statement` command.
#[derive(Debug, Args)]
pub struct StatementArgs {
    /// Security identifier (e.g., sz.000001).
    pub security: String,

    /// Statement tab whose figures are reported as `active_figures`.
    #[arg(long, value_parser = str::parse::<StatementType>)]
    pub tab: Option<StatementType>,

    /// First day of the statement interval (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub begin: Option<Date>,

    /// Last day of the statement interval (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub end: Option<Date>,

    /// Fiscal year of the quarterly bundle.
    #[arg(long)]
    pub year: Option<i32>,

    /// Fiscal quarter of the quarterly bundle (1-4).
    #[arg(long, value_parser = str::parse::<Quarter>)]
    pub quarter: Option<Quarter>,
}
