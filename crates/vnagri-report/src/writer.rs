//! YAML and JSON report writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{ReportError, Result};

/// Serialization format of a written report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Yaml,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

pub fn write_yaml<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_yaml::to_writer(writer, value)?;
    Ok(())
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json<T: Serialize, W: Write>(value: &T, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn write_report<T: Serialize, W: Write>(
    value: &T,
    format: ReportFormat,
    writer: W,
) -> Result<()> {
    match format {
        ReportFormat::Yaml => write_yaml(value, writer),
        ReportFormat::Json => write_json(value, writer),
    }
}

/// Write `value` to a new file at `path`, replacing any existing file.
pub fn write_report_file<T: Serialize>(value: &T, format: ReportFormat, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write_report(value, format, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), format = format.extension(), "wrote report");
    Ok(())
}
