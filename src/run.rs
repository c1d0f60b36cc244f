//! Pipeline orchestration.
//!
//! Strictly sequential: scan, deploy, evaluate policies, run attacks, sample
//! runtime, aggregate, emit. Each stage's output is the next stage's entire
//! input; the deployed container is the only shared resource and is owned by
//! the run from deployment to cleanup.

use crate::anomaly::ScriptClassifier;
use crate::attack;
use crate::cli::Cli;
use crate::docker::{ContainerRuntime, DockerCli};
use crate::error::Result;
use crate::monitor;
use crate::policy;
use crate::report;
use crate::scanner;
use crate::scoring::{self, AssessmentReport};
use tracing::{info, warn};

/// Run the full assessment for the image named on the command line.
pub fn execute(cli: &Cli) -> Result<AssessmentReport> {
    info!(image = %cli.image, "Starting container security assessment");

    // Stage 1: static scan, before anything is deployed.
    let (vulnerabilities, image_score) = scanner::scan_image(&cli.image)?;

    // Stage 2: deploy. From here on the container must be cleaned up even
    // if a later stage fails.
    let runtime = DockerCli::new(&cli.container_name);
    let container_id = runtime.deploy(&cli.image)?;

    let outcome = assess_deployed(cli, &runtime, &container_id, vulnerabilities, image_score);

    // Cleanup is best-effort; a failure here never masks the stage error.
    if let Err(e) = runtime.remove(&container_id) {
        warn!(error = %e, "Container cleanup failed, manual removal may be required");
    }

    let report = outcome?;
    info!(
        score = report.final_score,
        grade = %report.grade,
        "Assessment completed"
    );
    Ok(report)
}

/// Stages 3-7, run while the container is live.
fn assess_deployed(
    cli: &Cli,
    runtime: &impl ContainerRuntime,
    container_id: &str,
    vulnerabilities: Vec<crate::scanner::Vulnerability>,
    image_score: i32,
) -> Result<AssessmentReport> {
    // Stage 3: policy validation against the live configuration.
    let policies = policy::load_policies(&cli.policies)?;
    let facts = runtime.inspect(container_id)?;
    let policy_results = policy::evaluate_policies(&facts, &policies);

    // Stage 4: scripted attacks, sequential by contract.
    let attacks = attack::load_attacks(&cli.attacks)?;
    let attack_results = attack::run_attacks(runtime, container_id, &attacks);

    // Stage 5: one runtime sample plus delegated classification.
    let classifier = ScriptClassifier::new(&cli.classifier);
    let snapshot = monitor::sample_container(runtime, container_id, &classifier);

    // Stage 6: aggregate.
    let report = scoring::generate_final_report(
        attack_results,
        vulnerabilities,
        image_score,
        snapshot,
        policy_results,
    );

    // Stage 7: emit both documents, then the terminal summary.
    report::save_reports(&report, &cli.output_dir)?;
    report::print_terminal_summary(&report);

    Ok(report)
}
