//! Container runtime collaborator.
//!
//! The pipeline talks to the runtime through the narrow [`ContainerRuntime`]
//! trait so the policy evaluator and attack runner never see the backend's
//! native schema. [`DockerCli`] is the production implementation, shelling
//! out to the `docker` binary.

use crate::error::{GantryError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::process::Command;
use tracing::{debug, info, warn};

/// Flat string-keyed facts extracted from container inspection.
///
/// Keys: `User`, `Privileged`, `CPULimit`, `MemoryLimit`, `ImageTag`.
pub type ContainerFacts = BTreeMap<String, String>;

/// Raw resource sample as reported by the runtime, units and all.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsSample {
    #[serde(rename = "CPUPerc")]
    pub cpu_perc: String,
    #[serde(rename = "MemPerc")]
    pub mem_perc: String,
    #[serde(rename = "BlockIO")]
    pub block_io: String,
    #[serde(rename = "NetIO")]
    pub net_io: String,
}

/// Result of executing a command inside the container.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub success: bool,
    pub output: String,
}

pub trait ContainerRuntime {
    /// Deploy the image as a detached container, returning its ID.
    fn deploy(&self, image: &str) -> Result<String>;

    /// Inspect the container and extract the policy-relevant facts.
    fn inspect(&self, container_id: &str) -> Result<ContainerFacts>;

    /// Take a single point-in-time resource sample.
    fn stats(&self, container_id: &str) -> Result<StatsSample>;

    /// Run a shell command inside the container. A nonzero exit is a valid
    /// negative outcome, not an error.
    fn exec(&self, container_id: &str, command: &str) -> Result<ExecOutcome>;

    /// Stop and remove the container.
    fn remove(&self, container_id: &str) -> Result<()>;
}

/// Subset of `docker inspect` output the facts are extracted from.
#[derive(Debug, Deserialize)]
struct InspectEntry {
    #[serde(rename = "Config")]
    config: InspectConfig,
    #[serde(rename = "HostConfig")]
    host_config: InspectHostConfig,
    #[serde(rename = "RepoTags", default)]
    repo_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct InspectConfig {
    #[serde(rename = "User", default)]
    user: String,
    #[serde(rename = "Privileged", default)]
    privileged: bool,
}

#[derive(Debug, Deserialize)]
struct InspectHostConfig {
    #[serde(rename = "CpuShares", default)]
    cpu_shares: i64,
    #[serde(rename = "Memory", default)]
    memory: i64,
}

/// Flatten inspection JSON into the string-keyed facts map.
///
/// Absent values get explicit defaults so every policy condition always has
/// something to match against: empty user becomes "default", unset limits
/// become "0", a missing repo tag becomes "unknown".
pub fn parse_inspect_output(raw: &str) -> Result<ContainerFacts> {
    let entries: Vec<InspectEntry> =
        serde_json::from_str(raw).map_err(GantryError::InspectParse)?;
    let entry = entries.into_iter().next().ok_or_else(|| GantryError::Docker {
        operation: "inspect".to_string(),
        message: "no inspection data returned".to_string(),
    })?;

    let mut facts = ContainerFacts::new();
    facts.insert(
        "User".to_string(),
        if entry.config.user.is_empty() {
            "default".to_string()
        } else {
            entry.config.user
        },
    );
    facts.insert(
        "Privileged".to_string(),
        entry.config.privileged.to_string(),
    );
    facts.insert(
        "CPULimit".to_string(),
        entry.host_config.cpu_shares.to_string(),
    );
    facts.insert(
        "MemoryLimit".to_string(),
        entry.host_config.memory.to_string(),
    );
    facts.insert(
        "ImageTag".to_string(),
        entry
            .repo_tags
            .into_iter()
            .next()
            .unwrap_or_else(|| "unknown".to_string()),
    );
    Ok(facts)
}

pub fn parse_stats_output(raw: &str) -> Result<StatsSample> {
    serde_json::from_str(raw.trim()).map_err(GantryError::StatsParse)
}

/// Docker CLI wrapper. Each operation is a single subprocess invocation.
pub struct DockerCli {
    container_name: String,
}

impl DockerCli {
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
        }
    }

    fn run_docker(&self, operation: &str, args: &[&str]) -> Result<String> {
        debug!(operation, ?args, "Invoking docker");
        let output = Command::new("docker")
            .args(args)
            .output()
            .map_err(|e| GantryError::Docker {
                operation: operation.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(GantryError::Docker {
                operation: operation.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl ContainerRuntime for DockerCli {
    fn deploy(&self, image: &str) -> Result<String> {
        info!(image, "Deploying container");
        let stdout = self.run_docker(
            "run",
            &["run", "-d", "--name", &self.container_name, image],
        )?;
        let container_id = stdout.trim().to_string();
        info!(container_id, "Container deployed");
        Ok(container_id)
    }

    fn inspect(&self, container_id: &str) -> Result<ContainerFacts> {
        info!(container_id, "Fetching container configuration");
        let stdout = self.run_docker("inspect", &["inspect", container_id])?;
        parse_inspect_output(&stdout)
    }

    fn stats(&self, container_id: &str) -> Result<StatsSample> {
        let stdout = self.run_docker(
            "stats",
            &[
                "stats",
                container_id,
                "--no-stream",
                "--format",
                "{{json .}}",
            ],
        )?;
        parse_stats_output(&stdout)
    }

    fn exec(&self, container_id: &str, command: &str) -> Result<ExecOutcome> {
        let output = Command::new("docker")
            .args(["exec", container_id, "sh", "-c", command])
            .output()
            .map_err(|e| GantryError::Docker {
                operation: "exec".to_string(),
                message: e.to_string(),
            })?;

        Ok(ExecOutcome {
            success: output.status.success(),
            output: String::from_utf8_lossy(&output.stdout).to_string(),
        })
    }

    fn remove(&self, container_id: &str) -> Result<()> {
        info!(container_id, "Stopping and removing container");
        match self.run_docker("rm", &["rm", "-f", container_id]) {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(container_id, error = %e, "Cleanup failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSPECT_FIXTURE: &str = r#"[
        {
            "Config": {"User": "app", "Privileged": true},
            "HostConfig": {"CpuShares": 512, "Memory": 268435456},
            "RepoTags": ["nginx:1.25", "nginx:latest"]
        }
    ]"#;

    #[test]
    fn test_parse_inspect_full() {
        let facts = parse_inspect_output(INSPECT_FIXTURE).unwrap();
        assert_eq!(facts["User"], "app");
        assert_eq!(facts["Privileged"], "true");
        assert_eq!(facts["CPULimit"], "512");
        assert_eq!(facts["MemoryLimit"], "268435456");
        assert_eq!(facts["ImageTag"], "nginx:1.25");
    }

    #[test]
    fn test_parse_inspect_defaults() {
        let raw = r#"[{"Config": {}, "HostConfig": {}}]"#;
        let facts = parse_inspect_output(raw).unwrap();
        assert_eq!(facts["User"], "default");
        assert_eq!(facts["Privileged"], "false");
        assert_eq!(facts["CPULimit"], "0");
        assert_eq!(facts["MemoryLimit"], "0");
        assert_eq!(facts["ImageTag"], "unknown");
    }

    #[test]
    fn test_parse_inspect_empty_array() {
        let err = parse_inspect_output("[]").unwrap_err();
        assert!(err.to_string().contains("no inspection data"));
    }

    #[test]
    fn test_parse_inspect_malformed() {
        assert!(parse_inspect_output("not json").is_err());
    }

    #[test]
    fn test_parse_stats() {
        let raw = r#"{"CPUPerc":"0.15%","MemPerc":"1.20%","BlockIO":"3.215MiB / 0B","NetIO":"1.45kB / 0B"}"#;
        let sample = parse_stats_output(raw).unwrap();
        assert_eq!(sample.cpu_perc, "0.15%");
        assert_eq!(sample.mem_perc, "1.20%");
        assert_eq!(sample.block_io, "3.215MiB / 0B");
        assert_eq!(sample.net_io, "1.45kB / 0B");
    }

    #[test]
    fn test_parse_stats_malformed() {
        assert!(parse_stats_output("{").is_err());
    }
}
