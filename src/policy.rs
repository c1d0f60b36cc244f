//! Declarative policy definitions and their evaluation against live
//! container configuration.

use crate::docker::ContainerFacts;
use crate::error::{GantryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Policy {
    pub name: String,
    pub condition: String,
    pub severity: String,
    pub action: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResult {
    pub policy_name: String,
    pub severity: String,
    pub violated: bool,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policies: Vec<Policy>,
}

/// Load policy definitions from a YAML file. Unreadable or unparseable
/// files abort the run.
pub fn load_policies(path: &Path) -> Result<Vec<Policy>> {
    let content = fs::read_to_string(path).map_err(|e| GantryError::ReadDefinitions {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parsed: PolicyFile =
        serde_yaml::from_str(&content).map_err(|e| GantryError::ParseDefinitions {
            path: path.to_path_buf(),
            source: e,
        })?;
    info!(count = parsed.policies.len(), "Loaded policy definitions");
    Ok(parsed.policies)
}

/// Evaluate every policy against the container facts, in definition order.
///
/// Conditions form a closed set of known predicates. An unrecognized
/// condition yields "not violated" rather than failing the run, so a typo in
/// a policy file cannot abort an assessment; it is logged so the under-report
/// is at least visible.
pub fn evaluate_policies(facts: &ContainerFacts, policies: &[Policy]) -> Vec<PolicyResult> {
    policies
        .iter()
        .map(|policy| {
            let fact = |key: &str| facts.get(key).map(String::as_str).unwrap_or("");

            let violation = match policy.condition.as_str() {
                "container.User != 'root'" => {
                    (fact("User") == "root").then_some("Container runs as root user.")
                }
                "container.CPULimit > 0" => {
                    (fact("CPULimit") == "0").then_some("Container has no CPU limit set.")
                }
                "container.MemoryLimit > 0" => {
                    (fact("MemoryLimit") == "0").then_some("Container has no memory limit set.")
                }
                "container.ImageTag != 'latest'" => (fact("ImageTag") == "latest")
                    .then_some("Container uses an image with the 'latest' tag."),
                "container.Privileged == false" => {
                    (fact("Privileged") == "true").then_some("Container runs in privileged mode.")
                }
                other => {
                    warn!(policy = %policy.name, condition = other, "Unrecognized policy condition");
                    None
                }
            };

            PolicyResult {
                policy_name: policy.name.clone(),
                severity: policy.severity.clone(),
                violated: violation.is_some(),
                description: violation
                    .map(str::to_string)
                    .unwrap_or_else(|| "Policy condition satisfied".to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(entries: &[(&str, &str)]) -> ContainerFacts {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn policy(name: &str, condition: &str, severity: &str) -> Policy {
        Policy {
            name: name.to_string(),
            condition: condition.to_string(),
            severity: severity.to_string(),
            action: "alert".to_string(),
            description: format!("{name} must hold"),
        }
    }

    #[test]
    fn test_root_user_violation() {
        let results = evaluate_policies(
            &facts(&[("User", "root")]),
            &[policy("no-root", "container.User != 'root'", "Critical")],
        );
        assert!(results[0].violated);
        assert_eq!(results[0].description, "Container runs as root user.");
        assert_eq!(results[0].severity, "Critical");
    }

    #[test]
    fn test_non_root_user_satisfied() {
        let results = evaluate_policies(
            &facts(&[("User", "app")]),
            &[policy("no-root", "container.User != 'root'", "Critical")],
        );
        assert!(!results[0].violated);
        assert_eq!(results[0].description, "Policy condition satisfied");
    }

    #[test]
    fn test_cpu_and_memory_limits() {
        let results = evaluate_policies(
            &facts(&[("CPULimit", "0"), ("MemoryLimit", "268435456")]),
            &[
                policy("cpu-limit", "container.CPULimit > 0", "Medium"),
                policy("mem-limit", "container.MemoryLimit > 0", "Medium"),
            ],
        );
        assert!(results[0].violated);
        assert_eq!(results[0].description, "Container has no CPU limit set.");
        assert!(!results[1].violated);
    }

    #[test]
    fn test_latest_tag_violation() {
        let results = evaluate_policies(
            &facts(&[("ImageTag", "latest")]),
            &[policy("pinned-tag", "container.ImageTag != 'latest'", "Low")],
        );
        assert!(results[0].violated);
        assert_eq!(
            results[0].description,
            "Container uses an image with the 'latest' tag."
        );
    }

    #[test]
    fn test_privileged_violation_leaves_others_unaffected() {
        let results = evaluate_policies(
            &facts(&[("Privileged", "true"), ("User", "app")]),
            &[
                policy("no-priv", "container.Privileged == false", "Critical"),
                policy("no-root", "container.User != 'root'", "Critical"),
            ],
        );
        assert!(results[0].violated);
        assert_eq!(
            results[0].description,
            "Container runs in privileged mode."
        );
        assert!(!results[1].violated);
    }

    #[test]
    fn test_unrecognized_condition_is_not_violated() {
        let results = evaluate_policies(
            &facts(&[]),
            &[policy("typo", "container.Usr != 'root'", "High")],
        );
        assert_eq!(results.len(), 1);
        assert!(!results[0].violated);
        assert_eq!(results[0].description, "Policy condition satisfied");
    }

    #[test]
    fn test_results_preserve_definition_order() {
        let policies = vec![
            policy("b", "container.User != 'root'", "High"),
            policy("a", "container.CPULimit > 0", "Low"),
        ];
        let results = evaluate_policies(&facts(&[("User", "root"), ("CPULimit", "0")]), &policies);
        assert_eq!(results[0].policy_name, "b");
        assert_eq!(results[1].policy_name, "a");
    }

    #[test]
    fn test_empty_policy_list() {
        assert!(evaluate_policies(&facts(&[]), &[]).is_empty());
    }

    #[test]
    fn test_load_policies_missing_file() {
        let err = load_policies(Path::new("/nonexistent/policies.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read definitions file"));
    }
}
