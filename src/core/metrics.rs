use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_mark_write(operation: &'static str) {
    metrics::counter!("exam_marks_written_total", "operation" => operation).increment(1);
}

pub(crate) fn record_bulk_items(succeeded: usize, failed: usize) {
    metrics::counter!("exam_mark_bulk_items_total", "outcome" => "ok").increment(succeeded as u64);
    metrics::counter!("exam_mark_bulk_items_total", "outcome" => "error").increment(failed as u64);
}
