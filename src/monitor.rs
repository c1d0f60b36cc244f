//! Runtime sampling: one point-in-time resource snapshot plus delegated
//! anomaly classification.

use crate::anomaly::{clean_percent, convert_to_kilobytes, AnomalyClassifier, MetricSample};
use crate::docker::{ContainerRuntime, StatsSample};
use crate::error::Result;
use crate::scoring::RuntimeSnapshot;
use tracing::{error, info, warn};

/// Normalize the raw sample into classifier inputs. Unit errors surface
/// here; nothing guessed ever reaches the classifier.
fn normalize(sample: &StatsSample) -> Result<MetricSample> {
    Ok(MetricSample {
        cpu_percent: clean_percent(&sample.cpu_perc)?,
        memory_percent: clean_percent(&sample.mem_perc)?,
        disk_io_kb: convert_to_kilobytes(&sample.block_io)?,
        network_io_kb: convert_to_kilobytes(&sample.net_io)?,
    })
}

/// Sample the container once and classify the result.
///
/// Sampling is best-effort: a stats failure yields an empty snapshot and the
/// run continues. A normalization failure aborts classification for the
/// cycle (the snapshot keeps the raw strings, unclassified), and a
/// classifier failure degrades to "not anomalous". None of these abort the
/// pipeline.
pub fn sample_container(
    runtime: &impl ContainerRuntime,
    container_id: &str,
    classifier: &impl AnomalyClassifier,
) -> RuntimeSnapshot {
    info!(container_id, "Monitoring container performance");

    let stats = match runtime.stats(container_id) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to sample container");
            return RuntimeSnapshot::default();
        }
    };

    let is_anomalous = match normalize(&stats) {
        Ok(metrics) => match classifier.classify(&metrics) {
            Ok(anomalous) => anomalous,
            Err(e) => {
                warn!(error = %e, "Anomaly classification failed");
                false
            }
        },
        Err(e) => {
            error!(error = %e, "Metric normalization failed, skipping classification");
            false
        }
    };

    if is_anomalous {
        warn!("Anomaly detected during runtime");
    }

    RuntimeSnapshot {
        cpu_usage: stats.cpu_perc,
        memory_usage: stats.mem_perc,
        disk_io: stats.block_io,
        network_io: stats.net_io,
        is_anomalous,
    }
}
