#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request for {url} failed: {message}")]
    Http { url: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid dataset document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("pdf export failed: {0}")]
    Pdf(String),
    #[error("leaf `{key}` has no positive value")]
    InvalidValue { key: String },
    #[error("canvas {width}x{height} with padding {padding} cannot be laid out")]
    InvalidLayout { width: f64, height: f64, padding: f64 },
    #[error("unknown dataset `{0}`")]
    UnknownDataset(String),
    #[cfg(feature = "cache")]
    #[error(transparent)]
    Cache(#[from] sled::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
