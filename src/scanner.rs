//! Static image vulnerability scan.
//!
//! Call-and-parse wrapper around `trivy`. The scanner owns the finding list
//! and the static image score; both are read-only downstream.

use crate::error::{GantryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::info;

const CRITICAL_WEIGHT: i32 = -10;
const HIGH_WEIGHT: i32 = -5;
const MEDIUM_WEIGHT: i32 = -2;
const LOW_WEIGHT: i32 = -1;

/// A single finding from the static analysis. Field names track the
/// scanner's own JSON schema and are part of the report surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(rename = "VulnerabilityID", default)]
    pub id: String,
    #[serde(rename = "PkgName", default)]
    pub package: String,
    #[serde(rename = "InstalledVersion", default)]
    pub installed_version: String,
    #[serde(rename = "Severity", default)]
    pub severity: String,
    #[serde(rename = "PrimaryURL", default)]
    pub primary_url: String,
}

#[derive(Debug, Deserialize)]
struct ScanReport {
    #[serde(rename = "Results", default)]
    results: Vec<ScanResultItem>,
}

#[derive(Debug, Deserialize)]
struct ScanResultItem {
    #[serde(rename = "Vulnerabilities", default)]
    vulnerabilities: Vec<Vulnerability>,
}

/// Flatten the scanner's nested result into a finding list and compute the
/// static image score: baseline 100, each finding subtracts its severity
/// weight, clamped at 0. Unrecognized severities subtract nothing.
pub fn score_findings(raw: &str) -> Result<(Vec<Vulnerability>, i32)> {
    let parsed: ScanReport = serde_json::from_str(raw).map_err(GantryError::ScannerParse)?;

    let vulnerabilities: Vec<Vulnerability> = parsed
        .results
        .into_iter()
        .flat_map(|item| item.vulnerabilities)
        .collect();

    let score = vulnerabilities
        .iter()
        .fold(100, |score, vuln| {
            score
                + match vuln.severity.as_str() {
                    "CRITICAL" => CRITICAL_WEIGHT,
                    "HIGH" => HIGH_WEIGHT,
                    "MEDIUM" => MEDIUM_WEIGHT,
                    "LOW" => LOW_WEIGHT,
                    _ => 0,
                }
        })
        .max(0);

    Ok((vulnerabilities, score))
}

/// Run the external scanner against `image` and return the flattened
/// finding list plus the static image score. Any failure here is fatal to
/// the run.
pub fn scan_image(image: &str) -> Result<(Vec<Vulnerability>, i32)> {
    info!(image, "Scanning image for vulnerabilities");

    let output_file = Path::new("trivy_result.json");
    let status = Command::new("trivy")
        .args([
            "image",
            "--scanners",
            "vuln",
            "--format",
            "json",
            "--output",
        ])
        .arg(output_file)
        .arg(image)
        .status()
        .map_err(|e| GantryError::Scanner(e.to_string()))?;

    if !status.success() {
        return Err(GantryError::Scanner(format!(
            "trivy exited with {status}"
        )));
    }

    let raw = fs::read_to_string(output_file).map_err(|e| GantryError::ScannerOutput {
        path: output_file.to_path_buf(),
        source: e,
    })?;

    let (vulnerabilities, score) = score_findings(&raw)?;
    info!(
        findings = vulnerabilities.len(),
        score, "Image security score computed"
    );
    Ok((vulnerabilities, score))
}
