//! Scoring and aggregation engine.
//!
//! Reduces the four evidence streams (static findings, attack outcomes,
//! policy results, runtime snapshot) to one [`AssessmentReport`]. Every
//! function here is total over well-formed inputs: empty lists are valid and
//! malformed severity labels contribute nothing rather than erroring.

use crate::attack::AttackResult;
use crate::policy::PolicyResult;
use crate::scanner::Vulnerability;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// Penalty per violated policy, keyed by severity.
const POLICY_CRITICAL_PENALTY: i32 = 10;
const POLICY_HIGH_PENALTY: i32 = 5;
const POLICY_MEDIUM_PENALTY: i32 = 3;
const POLICY_LOW_PENALTY: i32 = 1;

/// Runtime resource usage of the container at sampling time, raw strings as
/// reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    pub cpu_usage: String,
    pub memory_usage: String,
    pub disk_io: String,
    pub network_io: String,
    #[serde(rename = "isAnomalous")]
    pub is_anomalous: bool,
}

/// Coarse human-facing tier derived from the numeric final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Poor,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Excellent => "Excellent",
            Grade::Good => "Good",
            Grade::NeedsImprovement => "Needs Improvement",
            Grade::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The aggregate of a full assessment run. Constructed exactly once by
/// [`generate_final_report`] and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub total_attacks: usize,
    pub successful_attacks: usize,
    pub failed_attacks: usize,
    pub final_score: i32,
    pub grade: Grade,
    pub image_score: i32,
    pub vulnerabilities: Vec<Vulnerability>,
    pub attack_results: Vec<AttackResult>,
    pub runtime_metrics: RuntimeSnapshot,
    pub policy_results: Vec<PolicyResult>,
    pub recommendations: Vec<String>,
    pub generated_at: String,
}

/// Compute the dynamic score: baseline 100, each successful attack adds its
/// signed impact (damaging attacks carry negative impact; the sign is
/// trusted, not enforced), each violated policy subtracts its severity
/// penalty. Clamped at 0, no upper clamp. Independent of the static image
/// score.
pub fn calculate_score(attack_results: &[AttackResult], policy_results: &[PolicyResult]) -> i32 {
    let mut score = 100;

    for result in attack_results {
        if result.success {
            score += result.impact;
        }
    }

    for policy in policy_results {
        if policy.violated {
            score -= match Severity::parse(&policy.severity) {
                Some(Severity::Critical) => POLICY_CRITICAL_PENALTY,
                Some(Severity::High) => POLICY_HIGH_PENALTY,
                Some(Severity::Medium) => POLICY_MEDIUM_PENALTY,
                Some(Severity::Low) => POLICY_LOW_PENALTY,
                None => 0,
            };
        }
    }

    score.max(0)
}

/// Map the final score to a grade. Pure step function, first match wins.
pub fn assign_grade(score: i32) -> Grade {
    match score {
        s if s >= 90 => Grade::Excellent,
        s if s >= 70 => Grade::Good,
        s if s >= 50 => Grade::NeedsImprovement,
        _ => Grade::Poor,
    }
}

/// Build the remediation list: one canned advisory per successful attack,
/// keyed by severity, then each violated policy's own description verbatim.
/// Order-preserving; duplicates are kept deliberately so call sites can
/// count per-incident occurrences.
pub fn generate_recommendations(
    attack_results: &[AttackResult],
    policy_results: &[PolicyResult],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    for result in attack_results {
        if !result.success {
            continue;
        }
        let advisory = match Severity::parse(&result.severity) {
            Some(Severity::Critical) => {
                "Mitigate privilege escalation vulnerabilities by restricting user permissions."
            }
            Some(Severity::High) => "Secure sensitive files and enforce strict access controls.",
            Some(Severity::Medium) => "Implement resource quotas to prevent abuse.",
            Some(Severity::Low) => "Consider reviewing minor vulnerabilities for best practices.",
            None => continue,
        };
        recommendations.push(advisory.to_string());
    }

    for policy in policy_results {
        if policy.violated {
            recommendations.push(policy.description.clone());
        }
    }

    recommendations
}

pub fn count_successful(results: &[AttackResult]) -> usize {
    results.iter().filter(|r| r.success).count()
}

/// Assemble the final report. Single pass for the counts, no I/O.
pub fn generate_final_report(
    attack_results: Vec<AttackResult>,
    vulnerabilities: Vec<Vulnerability>,
    image_score: i32,
    runtime_metrics: RuntimeSnapshot,
    policy_results: Vec<PolicyResult>,
) -> AssessmentReport {
    let final_score = calculate_score(&attack_results, &policy_results);
    let grade = assign_grade(final_score);
    let recommendations = generate_recommendations(&attack_results, &policy_results);
    let successful_attacks = count_successful(&attack_results);

    AssessmentReport {
        total_attacks: attack_results.len(),
        successful_attacks,
        failed_attacks: attack_results.len() - successful_attacks,
        final_score,
        grade,
        image_score,
        vulnerabilities,
        attack_results,
        runtime_metrics,
        policy_results,
        recommendations,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}
