//! Market-price analysis CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use vnagri_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use vnagri_cli::commands::{
    resolve_options, run_items, run_outliers, run_report, run_series, run_substitute,
};
use vnagri_cli::logging::{LogConfig, LogFormat, init_logging};
use vnagri_cli::summary::{item_table, outlier_table, series_table};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = resolve_options(cli)?;
    match &cli.command {
        Command::Report(args) => {
            let report = run_report(args, &options)?;
            if let Some(path) = &args.output {
                println!(
                    "Report: {} ({} rows, {} items, {} with outliers)",
                    path.display(),
                    report.row_count,
                    report.item_count(),
                    report.items_with_outliers().count()
                );
            }
        }
        Command::Outliers(args) => {
            let detection = run_outliers(args, &options)?;
            println!("{}", outlier_table(&detection));
            if let Some(path) = &args.export {
                println!(
                    "Exported {} outlier rows to {}",
                    detection.outlier_count(),
                    path.display()
                );
            }
        }
        Command::Items(args) => {
            let items = run_items(args, &options)?;
            println!("{}", item_table(&items));
        }
        Command::Series(args) => {
            let points = run_series(args, &options)?;
            println!(
                "{} ({} to {}): {} points",
                args.item,
                options.display_window.start,
                options.display_window.end,
                points.len()
            );
            println!("{}", series_table(&points));
        }
        Command::Substitute(args) => {
            let changed = run_substitute(args, &options)?;
            println!(
                "Rewrote {changed} prices of {}; table written to {}",
                args.item,
                args.output.display()
            );
        }
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
