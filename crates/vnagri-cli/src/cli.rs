//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use vnagri_report::ReportFormat;

#[derive(Parser)]
#[command(
    name = "vnagri",
    version,
    about = "Agricultural market-price statistics and outlier diagnostics",
    long_about = "Load a market-price table export (UTF-16 HTML) and report\n\
                  per-item statistics, IQR outlier fences and column metadata."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Read analysis options from a TOML file.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Minimum plausible unit price (overrides the config file).
    #[arg(long = "price-floor", value_name = "PRICE", global = true)]
    pub price_floor: Option<f64>,

    /// IQR multiplier for outlier fences (overrides the config file).
    #[arg(long = "iqr-multiplier", value_name = "K", global = true)]
    pub iqr_multiplier: Option<f64>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the full dataset report (columns, items, outliers).
    Report(ReportArgs),

    /// Show per-item outlier fences and counts.
    Outliers(OutliersArgs),

    /// Show per-item price statistics.
    Items(InputArgs),

    /// Show one item's dated prices within the display window.
    Series(SeriesArgs),

    /// Rewrite one item's outlier prices and export the adjusted table.
    Substitute(SubstituteArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Path to the price table export.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report serialization format.
    #[arg(long = "format", value_enum, default_value = "yaml")]
    pub format: ReportFormatArg,

    /// Write the report to a file instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Summarize the table after one outlier-removal pass.
    #[arg(long = "clean")]
    pub clean: bool,

    /// With --clean, repeat removal passes until one removes nothing.
    /// Fences are recomputed on each pass, so items with many repeated
    /// prices can shrink to their most common price.
    #[arg(long = "until-stable", requires = "clean")]
    pub until_stable: bool,
}

#[derive(Args)]
pub struct OutliersArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Export every outlier row as CSV.
    #[arg(long = "export", value_name = "FILE")]
    pub export: Option<PathBuf>,
}

#[derive(Args)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Item name, exactly as it appears in the table.
    #[arg(long = "item", value_name = "NAME")]
    pub item: String,
}

#[derive(Args)]
#[command(group(ArgGroup::new("replacement").required(true).args(["value", "scale"])))]
pub struct SubstituteArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Item whose outlier prices are rewritten.
    #[arg(long = "item", value_name = "NAME")]
    pub item: String,

    /// Replace every outlier price with this value.
    #[arg(long = "value", value_name = "PRICE")]
    pub value: Option<f64>,

    /// Multiply every outlier price by this factor.
    #[arg(long = "scale", value_name = "FACTOR")]
    pub scale: Option<f64>,

    /// CSV file receiving the adjusted table.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormatArg {
    Yaml,
    Json,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(value: ReportFormatArg) -> Self {
        match value {
            ReportFormatArg::Yaml => Self::Yaml,
            ReportFormatArg::Json => Self::Json,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "vnagri",
            "report",
            "Rau, qua",
            "--format",
            "json",
            "--price-floor",
            "500",
            "--clean",
        ])
        .unwrap();
        assert_eq!(cli.price_floor, Some(500.0));
        match cli.command {
            Command::Report(args) => {
                assert!(args.clean);
                assert!(!args.until_stable);
                assert!(matches!(args.format, ReportFormatArg::Json));
                assert_eq!(args.input.path, PathBuf::from("Rau, qua"));
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn until_stable_requires_clean() {
        assert!(Cli::try_parse_from(["vnagri", "report", "in.html", "--until-stable"]).is_err());
        let cli =
            Cli::try_parse_from(["vnagri", "report", "in.html", "--clean", "--until-stable"])
                .unwrap();
        match cli.command {
            Command::Report(args) => assert!(args.clean && args.until_stable),
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn substitute_needs_exactly_one_replacement() {
        let base = vec!["vnagri", "substitute", "in.html", "--item", "Tỏi", "-o", "out.csv"];
        assert!(Cli::try_parse_from(&base).is_err());

        let mut both = base.clone();
        both.extend(["--value", "1", "--scale", "2"]);
        assert!(Cli::try_parse_from(&both).is_err());

        let mut scaled = base;
        scaled.extend(["--scale", "1000"]);
        assert!(Cli::try_parse_from(&scaled).is_ok());
    }
}
