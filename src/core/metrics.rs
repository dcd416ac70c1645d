use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) const SESSIONS_STARTED: &str = "practice_sessions_started_total";
pub(crate) const EVALUATIONS: &str = "practice_evaluations_total";
pub(crate) const UPLOAD_BATCHES: &str = "upload_batches_total";

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }
    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);

    metrics::describe_counter!(SESSIONS_STARTED, "Practice sessions created by test selection");
    metrics::describe_counter!(EVALUATIONS, "Simulated practice evaluations by outcome");
    metrics::describe_counter!(UPLOAD_BATCHES, "Material upload batches by outcome");
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}
