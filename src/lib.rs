pub mod anomaly;
pub mod attack;
pub mod cli;
pub mod docker;
pub mod error;
pub mod monitor;
pub mod policy;
pub mod report;
pub mod run;
pub mod scanner;
pub mod scoring;
pub mod severity;

pub use cli::Cli;
pub use docker::{ContainerFacts, ContainerRuntime, DockerCli, ExecOutcome};
pub use error::{GantryError, Result};
pub use report::{Reporter, SummaryJsonReporter, TextReporter};
pub use scoring::{AssessmentReport, Grade, RuntimeSnapshot};
pub use severity::Severity;
