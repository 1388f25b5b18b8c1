use mongolens_core::{DocumentSource, Result, TelemetrySink};

/// Telemetry sink that records events as structured log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn track_command_run(&self, command_id: &str) -> Result<()> {
        tracing::info!(target: "mongolens::telemetry", command_id, "command run");
        Ok(())
    }

    fn track_document_opened_in_editor(&self, source: DocumentSource) -> Result<()> {
        tracing::info!(target: "mongolens::telemetry", source = %source, "document opened in editor");
        Ok(())
    }
}
