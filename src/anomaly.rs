//! Metric normalization and delegated anomaly classification.

use crate::error::{GantryError, Result};
use regex::Regex;
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Normalized point-in-time metrics fed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_io_kb: f64,
    pub network_io_kb: f64,
}

/// Strip the `%` suffix and parse the remaining number.
pub fn clean_percent(value: &str) -> Result<f64> {
    value
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|_| GantryError::InvalidMetric(value.to_string()))
}

/// Convert a human-readable size string (e.g. "3.215MiB") into kilobytes.
///
/// The scale is intentionally mixed: plain bytes divide by 1000 while the
/// larger units use the 1024 scale. This mirrors the measurement tool's own
/// conventions and must not be made uniform. An unsupported unit is a hard
/// error; the value is never guessed.
pub fn convert_to_kilobytes(input: &str) -> Result<f64> {
    static SIZE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SIZE_RE.get_or_init(|| Regex::new(r"([0-9.]+)([a-zA-Z]+)").expect("valid pattern"));

    let caps = re
        .captures(input)
        .ok_or_else(|| GantryError::InvalidMetric(input.to_string()))?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|_| GantryError::InvalidMetric(input.to_string()))?;

    let multiplier = match &caps[2] {
        "B" => 1.0 / 1000.0,
        "kB" => 1.0,
        "MB" | "MiB" => 1024.0,
        "GB" | "GiB" => 1024.0 * 1024.0,
        "TB" | "TiB" => 1024.0 * 1024.0 * 1024.0,
        _ => return Err(GantryError::UnsupportedUnit(input.to_string())),
    };

    Ok(value * multiplier)
}

/// Black-box boundary for the anomaly decision. Implementations classify a
/// normalized sample as anomalous or not; the sampler never knows how.
pub trait AnomalyClassifier {
    fn classify(&self, sample: &MetricSample) -> Result<bool>;
}

/// Production classifier: shells out to an external script with the four
/// normalized metrics as `%.2f`-formatted arguments and reads a single
/// classification token from stdout.
pub struct ScriptClassifier {
    script: PathBuf,
}

impl ScriptClassifier {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl AnomalyClassifier for ScriptClassifier {
    fn classify(&self, sample: &MetricSample) -> Result<bool> {
        info!("Running anomaly detection");
        debug!(
            cpu = sample.cpu_percent,
            memory = sample.memory_percent,
            disk_kb = sample.disk_io_kb,
            net_kb = sample.network_io_kb,
            "Normalized metrics"
        );

        let output = Command::new("python3")
            .arg(&self.script)
            .arg(format!("{:.2}", sample.cpu_percent))
            .arg(format!("{:.2}", sample.memory_percent))
            .arg(format!("{:.2}", sample.disk_io_kb))
            .arg(format!("{:.2}", sample.network_io_kb))
            .output()
            .map_err(|e| GantryError::Classifier(e.to_string()))?;

        if !output.status.success() {
            return Err(GantryError::Classifier(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(result = %token, "Anomaly detection finished");
        Ok(token == "Anomaly Detected")
    }
}
