//! Report emission: a machine-readable JSON summary and a plain-text
//! human-readable report, plus a short colored terminal summary.
//!
//! The field names and layout of the two persisted documents are a
//! compatibility surface for downstream tooling; change them deliberately.

use crate::error::{GantryError, Result};
use crate::scoring::{AssessmentReport, Grade};
use crate::severity::SeverityCounts;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub trait Reporter {
    fn report(&self, result: &AssessmentReport) -> Result<String>;
}

fn vulnerability_counts(report: &AssessmentReport) -> SeverityCounts {
    SeverityCounts::from_labels(report.vulnerabilities.iter().map(|v| v.severity.as_str()))
}

fn violated_policy_count(report: &AssessmentReport) -> usize {
    report.policy_results.iter().filter(|p| p.violated).count()
}

/// Summarized JSON document for integration with other tools.
pub struct SummaryJsonReporter;

#[derive(Serialize)]
struct Summary {
    vulnerabilities: SeverityCounts,
    successful_attacks: usize,
    policy_violations: usize,
    anomaly_detected: bool,
}

impl Reporter for SummaryJsonReporter {
    fn report(&self, result: &AssessmentReport) -> Result<String> {
        let summary = Summary {
            vulnerabilities: vulnerability_counts(result),
            successful_attacks: result.successful_attacks,
            policy_violations: violated_policy_count(result),
            anomaly_detected: result.runtime_metrics.is_anomalous,
        };
        Ok(serde_json::to_string_pretty(&summary)?)
    }
}

/// Plain-text document for human readability.
pub struct TextReporter;

impl Reporter for TextReporter {
    fn report(&self, result: &AssessmentReport) -> Result<String> {
        let counts = vulnerability_counts(result);
        let mut content = format!(
            "\nContainer Security Report\n\
             ===================================\n\
             Vulnerabilities:\n\
             - Critical: {}\n\
             - High: {}\n\
             - Medium: {}\n\
             - Low: {}\n\
             \n\
             Policy Violations:\n\
             - Total Violated Policies: {}\n\
             \n\
             Attack Results:\n\
             - Successful Attacks: {} / {}\n\
             \n\
             Runtime Metrics:\n\
             - CPU Usage: {}\n\
             - Memory Usage: {}\n\
             - Disk I/O: {}\n\
             - Network I/O: {}\n\
             \n\
             Recommendations:\n",
            counts.critical,
            counts.high,
            counts.medium,
            counts.low,
            violated_policy_count(result),
            result.successful_attacks,
            result.total_attacks,
            result.runtime_metrics.cpu_usage,
            result.runtime_metrics.memory_usage,
            result.runtime_metrics.disk_io,
            result.runtime_metrics.network_io,
        );

        for recommendation in &result.recommendations {
            content.push_str(&format!("- {recommendation}\n"));
        }

        Ok(content)
    }
}

/// Persist both report documents into `output_dir`. Either both files are
/// written or the run fails; there is no partial emission.
pub fn save_reports(report: &AssessmentReport, output_dir: &Path) -> Result<()> {
    let summary = SummaryJsonReporter.report(report)?;
    let text = TextReporter.report(report)?;

    let summary_path = output_dir.join("summary_report.json");
    fs::write(&summary_path, summary + "\n").map_err(|e| GantryError::WriteReport {
        path: summary_path.clone(),
        source: e,
    })?;
    info!(path = %summary_path.display(), "Summary report saved");

    let text_path = output_dir.join("final_report.txt");
    fs::write(&text_path, text).map_err(|e| GantryError::WriteReport {
        path: text_path.clone(),
        source: e,
    })?;
    info!(path = %text_path.display(), "Plain text report saved");

    Ok(())
}

fn grade_label(grade: Grade) -> colored::ColoredString {
    let label = grade.as_str();
    match grade {
        Grade::Excellent => label.green().bold(),
        Grade::Good => label.cyan().bold(),
        Grade::NeedsImprovement => label.yellow().bold(),
        Grade::Poor => label.red().bold(),
    }
}

/// One-screen assessment summary printed at the end of a run.
pub fn print_terminal_summary(report: &AssessmentReport) {
    let counts = vulnerability_counts(report);

    println!();
    println!("{}", "Assessment Summary".bold());
    println!("{}", "==================".dimmed());
    println!(
        "  Final score:  {} ({})",
        report.final_score.to_string().bold(),
        grade_label(report.grade)
    );
    println!("  Image score:  {}", report.image_score);
    println!(
        "  Findings:     {} {} / {} {} / {} {} / {} {}",
        counts.critical,
        "critical".red(),
        counts.high,
        "high".yellow(),
        counts.medium,
        "medium".cyan(),
        counts.low,
        "low".white(),
    );
    println!(
        "  Attacks:      {} / {} succeeded",
        report.successful_attacks, report.total_attacks
    );
    println!(
        "  Policies:     {} violated",
        violated_policy_count(report)
    );
    if report.runtime_metrics.is_anomalous {
        println!("  Runtime:      {}", "anomaly detected".red().bold());
    } else {
        println!("  Runtime:      {}", "no anomaly".green());
    }
    println!();
}
