use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GantryError {
    #[error("Failed to read definitions file: {path}")]
    ReadDefinitions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse definitions file: {path}")]
    ParseDefinitions {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Scanner invocation failed: {0}")]
    Scanner(String),

    #[error("Failed to read scanner output: {path}")]
    ScannerOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scanner output: {0}")]
    ScannerParse(#[source] serde_json::Error),

    #[error("docker {operation} failed: {message}")]
    Docker { operation: String, message: String },

    #[error("Failed to parse container inspection data: {0}")]
    InspectParse(#[source] serde_json::Error),

    #[error("Failed to parse container stats: {0}")]
    StatsParse(#[source] serde_json::Error),

    #[error("Invalid metric value: {0}")]
    InvalidMetric(String),

    #[error("Unsupported I/O unit in '{0}'")]
    UnsupportedUnit(String),

    #[error("Anomaly classifier failed: {0}")]
    Classifier(String),

    #[error("Failed to write report: {path}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GantryError>;
