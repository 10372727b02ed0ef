use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};
use vnagri_ingest::load_price_table;
use vnagri_model::{AnalysisOptions, DatasetReport, ItemMetadata, PriceTable};
use vnagri_report::{ReportFormat, export_rows_csv, write_report, write_report_file};
use vnagri_stats::{
    OutlierDetection, PricePoint, Replacement, adopt_substitution, detect_outliers, price_series,
    remove_outliers, remove_outliers_once, summarize_dataset, summarize_items,
};

use crate::cli::{Cli, InputArgs, OutliersArgs, ReportArgs, SeriesArgs, SubstituteArgs};

/// Options from `--config` (or defaults), with command-line overrides applied.
pub fn resolve_options(cli: &Cli) -> Result<AnalysisOptions> {
    let mut options = match &cli.config {
        Some(path) => AnalysisOptions::from_toml_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => AnalysisOptions::default(),
    };
    if let Some(floor) = cli.price_floor {
        options = options.with_price_floor(floor);
    }
    if let Some(multiplier) = cli.iqr_multiplier {
        options = options.with_iqr_multiplier(multiplier);
    }
    options.validate().context("validate options")?;
    Ok(options)
}

fn load(path: &Path, options: &AnalysisOptions) -> Result<PriceTable> {
    let span = info_span!("load", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();
    let table = load_price_table(path, options)
        .with_context(|| format!("load price table {}", path.display()))?;
    info!(
        rows = table.len(),
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(table)
}

/// Build the dataset report and write it to `--output` or stdout.
pub fn run_report(args: &ReportArgs, options: &AnalysisOptions) -> Result<DatasetReport> {
    let mut table = load(&args.input.path, options)?;
    let span = info_span!("report", clean = args.clean, until_stable = args.until_stable);
    let _guard = span.enter();
    let start = Instant::now();
    if args.clean {
        table = if args.until_stable {
            remove_outliers(&table, &options.outliers)
        } else {
            remove_outliers_once(&table, &options.outliers)
        }
        .context("remove outliers")?;
    }
    let report = summarize_dataset(&table, &options.outliers).context("summarize dataset")?;

    let format = ReportFormat::from(args.format);
    match &args.output {
        Some(path) => write_report_file(&report, format, path)
            .with_context(|| format!("write report {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_report(&report, format, &mut handle).context("write report")?;
            handle.flush().context("flush stdout")?;
        }
    }
    info!(
        items = report.item_count(),
        duration_ms = start.elapsed().as_millis(),
        "report complete"
    );
    Ok(report)
}

/// Detect outliers per item; optionally export the flagged rows.
pub fn run_outliers(args: &OutliersArgs, options: &AnalysisOptions) -> Result<OutlierDetection> {
    let table = load(&args.input.path, options)?;
    let detection = detect_outliers(&table, &options.outliers).context("detect outliers")?;
    if let Some(path) = &args.export {
        export_rows_csv(&table.columns, &detection.rows, path)
            .with_context(|| format!("export outliers {}", path.display()))?;
    }
    Ok(detection)
}

pub fn run_items(
    args: &InputArgs,
    options: &AnalysisOptions,
) -> Result<BTreeMap<usize, ItemMetadata>> {
    let table = load(&args.path, options)?;
    summarize_items(&table, &options.outliers).context("summarize items")
}

pub fn run_series(args: &SeriesArgs, options: &AnalysisOptions) -> Result<Vec<PricePoint>> {
    let table = load(&args.input.path, options)?;
    if !table.items().contains(&args.item.as_str()) {
        bail!("item {:?} not found in {}", args.item, table.source);
    }
    Ok(price_series(&table, &args.item, &options.display_window))
}

/// Rewrite one item's outlier prices with its own fence and export the
/// whole adjusted table. Returns the number of rewritten rows.
pub fn run_substitute(args: &SubstituteArgs, options: &AnalysisOptions) -> Result<usize> {
    let mut table = load(&args.input.path, options)?;
    let detection = detect_outliers(&table, &options.outliers).context("detect outliers")?;
    let Some(info) = detection.get(&args.item) else {
        bail!("item {:?} not found in {}", args.item, table.source);
    };
    let fence = info.thresholds();

    let scale = args.scale.map(|factor| move |price: f64| price * factor);
    let mapping = scale.as_ref().map(|f| f as &dyn Fn(f64) -> f64);
    let replacement = Replacement::from_parts(args.value, mapping).context("replacement")?;
    let changed = adopt_substitution(
        &mut table,
        &args.item,
        fence.lower,
        fence.upper,
        &replacement,
        options.outliers.price_floor,
    )
    .context("substitute outliers")?;

    export_rows_csv(&table.columns, &table.records, &args.output)
        .with_context(|| format!("export table {}", args.output.display()))?;
    info!(item = %args.item, changed, "substitution complete");
    Ok(changed)
}
