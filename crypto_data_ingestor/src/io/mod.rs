pub mod csv_file;
pub mod sink;

pub use csv_file::{CsvSink, read_bars, read_bars_csv, write_bars};
pub use sink::{DataSink, SinkError};
