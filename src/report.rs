use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::codes::LandcoverCode;
use crate::error::Result;
use crate::stats::ZoneStats;

pub const HEADER: &str = "raster_filename,lucode,min,max,mean,stdev";

/// `stats_table_<YYYY_MM_DD_HH_MM_SS_ffffff>.csv`
pub fn table_file_name(timestamp: NaiveDateTime) -> String {
    format!("stats_table_{}.csv", timestamp.format("%Y_%m_%d_%H_%M_%S_%6f"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    pub raster_filename: String,
    pub code: LandcoverCode,
    pub stats: ZoneStats,
}

impl StatsRow {
    pub fn to_csv_line(&self, precision: usize) -> String {
        let ZoneStats {
            min,
            max,
            mean,
            stdev,
        } = self.stats;
        format!(
            "{},{},{},{},{},{}",
            self.raster_filename,
            self.code.as_int(),
            format_stat(min, precision),
            format_stat(max, precision),
            format_stat(mean, precision),
            format_stat(stdev, precision)
        )
    }
}

/// Fixed precision, with lowercase `nan` for undefined values.
fn format_stat(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.p$}", value, p = precision)
    }
}

/// Append-only CSV report; the header is written on creation.
#[derive(Debug)]
pub struct StatsTable {
    path: PathBuf,
    writer: BufWriter<File>,
    precision: usize,
    rows: usize,
}

impl StatsTable {
    /// Creates a timestamped table in `dir`.
    pub fn create_in(dir: &Path, precision: usize) -> Result<Self> {
        let path = dir.join(table_file_name(Local::now().naive_local()));
        Self::create(path, precision)
    }

    pub fn create(path: PathBuf, precision: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", HEADER)?;
        writer.flush()?;

        Ok(Self {
            path,
            writer,
            precision,
            rows: 0,
        })
    }

    /// Appends one row and flushes it, so rows survive an aborted run.
    pub fn write_row(&mut self, row: &StatsRow) -> Result<()> {
        writeln!(self.writer, "{}", row.to_csv_line(self.precision))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn close(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
