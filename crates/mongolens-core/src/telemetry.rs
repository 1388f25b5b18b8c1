//! Usage telemetry

use crate::{DocumentSource, Result};

/// Sink for usage events
///
/// Calls are fire-and-forget: implementations must not block, and callers
/// discard any error they return.
pub trait TelemetrySink: Send + Sync {
    fn track_command_run(&self, command_id: &str) -> Result<()>;

    fn track_document_opened_in_editor(&self, source: DocumentSource) -> Result<()>;
}

/// Telemetry sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn track_command_run(&self, _command_id: &str) -> Result<()> {
        Ok(())
    }

    fn track_document_opened_in_editor(&self, _source: DocumentSource) -> Result<()> {
        Ok(())
    }
}
