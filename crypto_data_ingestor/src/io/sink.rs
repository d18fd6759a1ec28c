use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::bar::BarSeries;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// An error occurred while trying to write the data.
    #[snafu(display("Failed to write data: {message}"))]
    WriteError {
        message: String,
        backtrace: Backtrace,
    },

    /// Stored data violates an invariant of the bar model.
    #[snafu(display("Invalid data: {message}"))]
    InvalidData {
        message: String,
        backtrace: Backtrace,
    },

    /// A CSV record could not be encoded or decoded.
    #[snafu(display("CSV error: {source}"))]
    Csv {
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// A generic I/O error.
    #[snafu(display("I/O error: {source}"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the path it wrote; a database sink might return
    /// the number of rows inserted.
    type Output;

    /// Writes a `BarSeries` to the destination.
    async fn write(&self, data: &BarSeries) -> Result<Self::Output, SinkError>;
}
