//! Scripted intrusion attempts against the deployed container.

use crate::docker::ContainerRuntime;
use crate::error::{GantryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Attack {
    pub name: String,
    pub command: String,
    pub severity: String,
    pub impact: i32,
    pub description: String,
}

/// One outcome per definition per run. `success` means the attack command
/// exited zero inside the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackResult {
    pub name: String,
    pub severity: String,
    pub impact: i32,
    pub description: String,
    pub success: bool,
    pub output: String,
}

#[derive(Debug, Deserialize)]
struct AttackFile {
    #[serde(default)]
    attacks: Vec<Attack>,
}

/// Load attack definitions from a YAML file. Unreadable or unparseable
/// files abort the run.
pub fn load_attacks(path: &Path) -> Result<Vec<Attack>> {
    let content = fs::read_to_string(path).map_err(|e| GantryError::ReadDefinitions {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parsed: AttackFile =
        serde_yaml::from_str(&content).map_err(|e| GantryError::ParseDefinitions {
            path: path.to_path_buf(),
            source: e,
        })?;
    info!(count = parsed.attacks.len(), "Loaded attack definitions");
    Ok(parsed.attacks)
}

/// Execute every attack in definition order, sequentially.
///
/// Attacks may depend on the side effects of earlier ones, so they never run
/// concurrently. A failed command is a valid negative result; an
/// infrastructure failure to even launch the command is logged and recorded
/// the same way (success = false) so one broken attack cannot sink the batch.
pub fn run_attacks(
    runtime: &impl ContainerRuntime,
    container_id: &str,
    attacks: &[Attack],
) -> Vec<AttackResult> {
    attacks
        .iter()
        .enumerate()
        .map(|(i, attack)| {
            info!(number = i + 1, name = %attack.name, "Running attack");
            let (success, output) = match runtime.exec(container_id, &attack.command) {
                Ok(outcome) => (outcome.success, outcome.output),
                Err(e) => {
                    warn!(name = %attack.name, error = %e, "Attack execution failed");
                    (false, String::new())
                }
            };

            if success {
                info!(name = %attack.name, "Attack succeeded");
            } else {
                warn!(name = %attack.name, "Attack failed");
            }

            AttackResult {
                name: attack.name.clone(),
                severity: attack.severity.clone(),
                impact: attack.impact,
                description: attack.description.clone(),
                success,
                output,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::{ContainerFacts, ExecOutcome, StatsSample};
    use std::cell::RefCell;

    /// Scripted runtime: maps each command to an outcome, recording call
    /// order.
    struct ScriptedRuntime {
        outcomes: Vec<(&'static str, Result<ExecOutcome>)>,
        calls: RefCell<Vec<String>>,
    }

    impl ContainerRuntime for ScriptedRuntime {
        fn deploy(&self, _image: &str) -> Result<String> {
            unimplemented!()
        }

        fn inspect(&self, _container_id: &str) -> Result<ContainerFacts> {
            unimplemented!()
        }

        fn stats(&self, _container_id: &str) -> Result<StatsSample> {
            unimplemented!()
        }

        fn exec(&self, _container_id: &str, command: &str) -> Result<ExecOutcome> {
            self.calls.borrow_mut().push(command.to_string());
            for (cmd, outcome) in &self.outcomes {
                if *cmd == command {
                    return match outcome {
                        Ok(o) => Ok(o.clone()),
                        Err(_) => Err(GantryError::Docker {
                            operation: "exec".to_string(),
                            message: "runtime unavailable".to_string(),
                        }),
                    };
                }
            }
            Ok(ExecOutcome {
                success: false,
                output: String::new(),
            })
        }

        fn remove(&self, _container_id: &str) -> Result<()> {
            Ok(())
        }
    }

    fn attack(name: &str, command: &str, severity: &str, impact: i32) -> Attack {
        Attack {
            name: name.to_string(),
            command: command.to_string(),
            severity: severity.to_string(),
            impact,
            description: format!("{name} attempt"),
        }
    }

    #[test]
    fn test_outcomes_mirror_definitions_in_order() {
        let runtime = ScriptedRuntime {
            outcomes: vec![
                (
                    "whoami",
                    Ok(ExecOutcome {
                        success: true,
                        output: "root\n".to_string(),
                    }),
                ),
                (
                    "cat /etc/shadow",
                    Ok(ExecOutcome {
                        success: false,
                        output: String::new(),
                    }),
                ),
            ],
            calls: RefCell::new(vec![]),
        };
        let attacks = vec![
            attack("identity-probe", "whoami", "Critical", -15),
            attack("shadow-read", "cat /etc/shadow", "High", -10),
        ];

        let results = run_attacks(&runtime, "cid", &attacks);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "identity-probe");
        assert!(results[0].success);
        assert_eq!(results[0].output, "root\n");
        assert_eq!(results[0].impact, -15);
        assert_eq!(results[1].name, "shadow-read");
        assert!(!results[1].success);
        assert_eq!(
            *runtime.calls.borrow(),
            vec!["whoami".to_string(), "cat /etc/shadow".to_string()]
        );
    }

    #[test]
    fn test_infrastructure_failure_is_a_failed_attack() {
        let runtime = ScriptedRuntime {
            outcomes: vec![(
                "boom",
                Err(GantryError::Docker {
                    operation: "exec".to_string(),
                    message: "runtime unavailable".to_string(),
                }),
            )],
            calls: RefCell::new(vec![]),
        };
        let attacks = vec![
            attack("broken", "boom", "High", -10),
            attack("next", "true", "Low", -1),
        ];

        let results = run_attacks(&runtime, "cid", &attacks);

        // First attack degrades to failure; the batch continues.
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].output.is_empty());
        assert_eq!(results[1].name, "next");
    }

    #[test]
    fn test_empty_attack_list() {
        let runtime = ScriptedRuntime {
            outcomes: vec![],
            calls: RefCell::new(vec![]),
        };
        assert!(run_attacks(&runtime, "cid", &[]).is_empty());
    }

    #[test]
    fn test_load_attacks_missing_file() {
        let err = load_attacks(Path::new("/nonexistent/attacks.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read definitions file"));
    }
}
