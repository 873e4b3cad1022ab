use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// The common date index is too short for the requested lookback windows.
    /// Fatal: no partial result is produced.
    #[error(
        "Insufficient aligned history: {rows} rows, at least {required} required (limiting: {symbols:?})"
    )]
    InsufficientHistory {
        rows: usize,
        required: usize,
        symbols: Vec<String>,
    },

    /// Every requested symbol failed alignment.
    #[error("No requested symbol has usable data")]
    NoValidSymbols,

    #[error("Calculation error: {0}")]
    Calculation(String),
}
