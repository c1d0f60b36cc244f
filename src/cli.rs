use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gantry",
    version,
    about = "Container-image security assessment pipeline",
    long_about = "gantry scans a container image for known vulnerabilities, deploys it, runs a \
                  battery of scripted attacks against the live container, validates its runtime \
                  configuration against declarative policies, samples resource usage, and \
                  aggregates everything into a weighted score and report."
)]
pub struct Cli {
    /// Image reference to assess (e.g. nginx:1.25)
    #[arg(required = true)]
    pub image: String,

    /// Attack definitions file
    #[arg(short, long, default_value = "configs/attacks.yaml")]
    pub attacks: PathBuf,

    /// Policy definitions file
    #[arg(short, long, default_value = "configs/policies.yaml")]
    pub policies: PathBuf,

    /// Name given to the deployed container
    #[arg(long, default_value = "gantry-target")]
    pub container_name: String,

    /// External anomaly classifier script
    #[arg(long, default_value = "python/detect_anomaly.py")]
    pub classifier: PathBuf,

    /// Directory for the emitted report files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_image_only() {
        let cli = Cli::try_parse_from(["gantry", "nginx:1.25"]).unwrap();
        assert_eq!(cli.image, "nginx:1.25");
        assert!(!cli.verbose);
    }

    #[test]
    fn test_missing_image_is_an_error() {
        assert!(Cli::try_parse_from(["gantry"]).is_err());
    }

    #[test]
    fn test_default_paths() {
        let cli = Cli::try_parse_from(["gantry", "alpine"]).unwrap();
        assert_eq!(cli.attacks, PathBuf::from("configs/attacks.yaml"));
        assert_eq!(cli.policies, PathBuf::from("configs/policies.yaml"));
        assert_eq!(cli.classifier, PathBuf::from("python/detect_anomaly.py"));
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert_eq!(cli.container_name, "gantry-target");
    }

    #[test]
    fn test_parse_all_options() {
        let cli = Cli::try_parse_from([
            "gantry",
            "--attacks",
            "custom/attacks.yaml",
            "--policies",
            "custom/policies.yaml",
            "--container-name",
            "probe",
            "--output-dir",
            "out",
            "--verbose",
            "redis:7",
        ])
        .unwrap();
        assert_eq!(cli.image, "redis:7");
        assert_eq!(cli.attacks, PathBuf::from("custom/attacks.yaml"));
        assert_eq!(cli.policies, PathBuf::from("custom/policies.yaml"));
        assert_eq!(cli.container_name, "probe");
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert!(cli.verbose);
    }
}
