//! CSV persistence for daily bars (`Date,Open,High,Low,Close`).

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use snafu::{ResultExt, ensure};
use tracing::info;

use crate::{
    io::sink::{CsvSnafu, DataSink, InvalidDataSnafu, IoSnafu, SinkError, WriteSnafu},
    models::{
        bar::{Bar, BarSeries, first_unordered_index},
        pair::CurrencyPair,
    },
};

/// Writes bars with a header row to any writer.
pub fn write_bars<W: io::Write>(writer: W, bars: &[Bar]) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_writer(writer);
    for bar in bars {
        writer.serialize(bar).context(CsvSnafu)?;
    }
    writer.flush().context(IoSnafu)?;
    Ok(())
}

/// Reads bars written by [`write_bars`].
///
/// Rows must be strictly ascending by date.
pub fn read_bars<R: io::Read>(reader: R) -> Result<Vec<Bar>, SinkError> {
    let mut reader = csv::Reader::from_reader(reader);
    let bars = reader
        .deserialize::<Bar>()
        .collect::<Result<Vec<_>, _>>()
        .context(CsvSnafu)?;

    if let Some(index) = first_unordered_index(&bars) {
        return InvalidDataSnafu {
            message: format!(
                "row {index} ({}) is not after the previous row",
                bars[index].date
            ),
        }
        .fail();
    }
    Ok(bars)
}

pub fn read_bars_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, SinkError> {
    let file = File::open(path.as_ref()).context(IoSnafu)?;
    read_bars(io::BufReader::new(file))
}

/// Writes each series to `<dir>/<BASE>_<QUOTE>_bars.csv`.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, pair: &CurrencyPair) -> PathBuf {
        self.dir.join(format!("{}_bars.csv", pair.file_stem()))
    }
}

#[async_trait]
impl DataSink for CsvSink {
    type Output = PathBuf;

    async fn write(&self, data: &BarSeries) -> Result<PathBuf, SinkError> {
        ensure!(
            data.validate_ordering().is_ok(),
            WriteSnafu {
                message: format!("bars for {} are not in ascending date order", data.pair),
            }
        );

        fs::create_dir_all(&self.dir).context(IoSnafu)?;
        let path = self.path_for(&data.pair);
        let file = File::create(&path).context(IoSnafu)?;
        write_bars(io::BufWriter::new(file), &data.bars)?;

        info!(pair = %data.pair, rows = data.len(), path = %path.display(), "wrote bars");
        Ok(path)
    }
}
