use serde::{Deserialize, Serialize};

/// Severity tiers shared by findings, attacks, and policies.
///
/// Upstream sources label severities inconsistently (the image scanner emits
/// `CRITICAL`, definition files use `Critical`), so data structs keep the
/// producer's verbatim string and weighting goes through [`Severity::parse`].
/// An unrecognized label parses to `None` and contributes zero weight rather
/// than failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Per-severity counts over a list of labeled items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    /// Tally labels, skipping anything outside the recognized set.
    pub fn from_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Self {
        labels.fold(Self::default(), |mut counts, label| {
            match Severity::parse(label) {
                Some(Severity::Critical) => counts.critical += 1,
                Some(Severity::High) => counts.high += 1,
                Some(Severity::Medium) => counts.medium += 1,
                Some(Severity::Low) => counts.low += 1,
                None => {}
            }
            counts
        })
    }
}
