use serde::Deserialize;

/// One daily candle as returned by `histoday`.
///
/// Volume and conversion fields are present in the payload but unused.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HistodayBar {
    /// Start of the day, in UNIX seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Deserialize, Debug, Default)]
pub struct HistodayData {
    #[serde(rename = "Data", default)]
    pub bars: Vec<HistodayBar>,
}

/// Envelope of every `histoday` response.
///
/// On failure `Data` is an empty object, which deserializes to an empty
/// [`HistodayData`].
#[derive(Deserialize, Debug)]
pub struct HistodayResponse {
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Data", default)]
    pub data: HistodayData,
}

impl HistodayResponse {
    pub fn is_success(&self) -> bool {
        self.response == "Success"
    }
}
