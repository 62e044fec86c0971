//! Fatal report conditions

/// Failures that abort a report run. Recoverable problems (bad rows, unmapped
/// fleets or coordinates, fiat feed outages) never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("No valid SDU price: the market returned no qualifying sell order")]
    NoValidPrice,

    #[error("Scan log is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Scan log could not be read: {0}")]
    Source(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}
