//! CSV layout of the enriched table.
//!
//! Column names carry the window sizes, e.g. `High_Last_7_Days` or
//! `%_Diff_From_Low_Next_5_Days`. Absent values are written as empty fields;
//! on read, empty fields and `NaN` become `None`.

use std::{fs::File, io, path::Path};

use chrono::NaiveDate;
use crypto_data_ingestor::Bar;
use csv::StringRecord;
use thiserror::Error;
use tracing::info;

use crate::{derive::FeatureTable, enriched::EnrichedBar, window::WindowSpec};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("row {row}: cannot parse `{value}` in column `{column}`")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Every column of the enriched table, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Open,
    High,
    Low,
    Close,
    HighLast,
    LowLast,
    DaysSinceHighLast,
    DaysSinceLowLast,
    PctDiffFromHighLast,
    PctDiffFromLowLast,
    HighNext,
    LowNext,
    PctDiffFromHighNext,
    PctDiffFromLowNext,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Date,
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::HighLast,
        Column::LowLast,
        Column::DaysSinceHighLast,
        Column::DaysSinceLowLast,
        Column::PctDiffFromHighLast,
        Column::PctDiffFromLowLast,
        Column::HighNext,
        Column::LowNext,
        Column::PctDiffFromHighNext,
        Column::PctDiffFromLowNext,
    ];

    /// Header text for this column under the given windows.
    pub fn header(self, windows: &WindowSpec) -> String {
        let w = windows.lookback();
        let f = windows.lookahead();
        match self {
            Column::Date => "Date".to_string(),
            Column::Open => "Open".to_string(),
            Column::High => "High".to_string(),
            Column::Low => "Low".to_string(),
            Column::Close => "Close".to_string(),
            Column::HighLast => format!("High_Last_{w}_Days"),
            Column::LowLast => format!("Low_Last_{w}_Days"),
            Column::DaysSinceHighLast => format!("Days_Since_High_Last_{w}_Days"),
            Column::DaysSinceLowLast => format!("Days_Since_Low_Last_{w}_Days"),
            Column::PctDiffFromHighLast => format!("%_Diff_From_High_Last_{w}_Days"),
            Column::PctDiffFromLowLast => format!("%_Diff_From_Low_Last_{w}_Days"),
            Column::HighNext => format!("High_Next_{f}_Days"),
            Column::LowNext => format!("Low_Next_{f}_Days"),
            Column::PctDiffFromHighNext => format!("%_Diff_From_High_Next_{f}_Days"),
            Column::PctDiffFromLowNext => format!("%_Diff_From_Low_Next_{f}_Days"),
        }
    }
}

pub fn headers(windows: &WindowSpec) -> Vec<String> {
    Column::ALL.iter().map(|c| c.header(windows)).collect()
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn record_for(row: &EnrichedBar) -> [String; 15] {
    [
        row.bar.date.to_string(),
        row.bar.open.to_string(),
        row.bar.high.to_string(),
        row.bar.low.to_string(),
        row.bar.close.to_string(),
        row.high_last.to_string(),
        row.low_last.to_string(),
        row.days_since_high_last.to_string(),
        row.days_since_low_last.to_string(),
        format_optional(row.pct_diff_from_high_last),
        format_optional(row.pct_diff_from_low_last),
        format_optional(row.high_next),
        format_optional(row.low_next),
        format_optional(row.pct_diff_from_high_next),
        format_optional(row.pct_diff_from_low_next),
    ]
}

pub fn write_table<W: io::Write>(writer: W, table: &FeatureTable) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(headers(&table.windows))?;
    for row in &table.rows {
        writer.write_record(record_for(row))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_table_csv(path: impl AsRef<Path>, table: &FeatureTable) -> Result<(), TableError> {
    let file = File::create(path.as_ref())?;
    write_table(io::BufWriter::new(file), table)?;
    info!(rows = table.len(), path = %path.as_ref().display(), "wrote feature table");
    Ok(())
}

/// Column positions resolved against a file's header row.
struct Layout {
    positions: [usize; 15],
    names: [String; 15],
}

impl Layout {
    fn resolve(found: &StringRecord, windows: &WindowSpec) -> Result<Self, TableError> {
        let names: [String; 15] = Column::ALL.map(|c| c.header(windows));
        let mut positions = [0usize; 15];
        for (slot, name) in positions.iter_mut().zip(&names) {
            *slot = found
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| TableError::MissingColumn(name.clone()))?;
        }
        Ok(Self { positions, names })
    }
}

struct RowReader<'a> {
    layout: &'a Layout,
    record: &'a StringRecord,
    row: usize,
}

impl RowReader<'_> {
    fn raw(&self, column: Column) -> (&str, &str) {
        let slot = column as usize;
        let value = self
            .record
            .get(self.layout.positions[slot])
            .unwrap_or("")
            .trim();
        (value, self.layout.names[slot].as_str())
    }

    fn error(&self, column: &str, value: &str) -> TableError {
        TableError::Parse {
            row: self.row,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    fn date(&self) -> Result<NaiveDate, TableError> {
        let (value, name) = self.raw(Column::Date);
        // Also accepts timestamps such as `2024-01-01 00:00:00`.
        let day = value.split([' ', 'T']).next().unwrap_or(value);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| self.error(name, value))
    }

    fn optional(&self, column: Column) -> Result<Option<f64>, TableError> {
        let (value, name) = self.raw(column);
        if value.is_empty() || value.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| self.error(name, value))
    }

    fn required(&self, column: Column) -> Result<f64, TableError> {
        let (value, name) = self.raw(column);
        self.optional(column)?.ok_or_else(|| self.error(name, value))
    }

    fn days(&self, column: Column) -> Result<i64, TableError> {
        let (value, name) = self.raw(column);
        if let Ok(days) = value.parse::<i64>() {
            return Ok(days);
        }
        // pandas writes integer columns that once held NaN as floats ("3.0")
        match value.parse::<f64>() {
            Ok(days) if days.is_finite() && days.fract() == 0.0 => Ok(days as i64),
            _ => Err(self.error(name, value)),
        }
    }

    fn enriched(&self) -> Result<EnrichedBar, TableError> {
        Ok(EnrichedBar {
            bar: Bar::new(
                self.date()?,
                self.required(Column::Open)?,
                self.required(Column::High)?,
                self.required(Column::Low)?,
                self.required(Column::Close)?,
            ),
            high_last: self.required(Column::HighLast)?,
            low_last: self.required(Column::LowLast)?,
            days_since_high_last: self.days(Column::DaysSinceHighLast)?,
            days_since_low_last: self.days(Column::DaysSinceLowLast)?,
            pct_diff_from_high_last: self.optional(Column::PctDiffFromHighLast)?,
            pct_diff_from_low_last: self.optional(Column::PctDiffFromLowLast)?,
            high_next: self.optional(Column::HighNext)?,
            low_next: self.optional(Column::LowNext)?,
            pct_diff_from_high_next: self.optional(Column::PctDiffFromHighNext)?,
            pct_diff_from_low_next: self.optional(Column::PctDiffFromLowNext)?,
        })
    }
}

/// Reads an enriched table whose headers match `windows`.
///
/// Extra columns (such as a pandas index) are ignored.
pub fn read_table<R: io::Read>(reader: R, windows: WindowSpec) -> Result<FeatureTable, TableError> {
    let mut reader = csv::Reader::from_reader(reader);
    let layout = Layout::resolve(reader.headers()?, &windows)?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let row_reader = RowReader {
            layout: &layout,
            record: &record,
            row,
        };
        rows.push(row_reader.enriched()?);
    }

    Ok(FeatureTable { windows, rows })
}

pub fn read_table_csv(
    path: impl AsRef<Path>,
    windows: WindowSpec,
) -> Result<FeatureTable, TableError> {
    let file = File::open(path.as_ref())?;
    read_table(io::BufReader::new(file), windows)
}
