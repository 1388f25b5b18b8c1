//! Collaborators for hosts without an editor UI
//!
//! These are the defaults [`AppContextBuilder`](crate::AppContextBuilder)
//! falls back to. Surfaces that need an editor report that they are not
//! available and decline the action.

use async_trait::async_trait;
use mongolens_core::{
    Clipboard, ConnectionChoice, ConnectionId, DocumentSource, EditorController, Language,
    Namespace, Notifier, PlaygroundController, PlaygroundTemplate, Prompt, Result,
    SavedConnection, ShellLauncher, WebviewController,
};

/// Notifier that writes messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show_information(&self, message: &str) {
        tracing::info!(target: "mongolens::notify", "{message}");
    }

    fn show_warning(&self, message: &str) {
        tracing::warn!(target: "mongolens::notify", "{message}");
    }

    fn show_error(&self, message: &str) {
        tracing::error!(target: "mongolens::notify", "{message}");
    }
}

/// Prompt that dismisses every question
#[derive(Debug, Default, Clone, Copy)]
pub struct DismissPrompt;

#[async_trait]
impl Prompt for DismissPrompt {
    async fn input_box(&self, prompt: &str, _placeholder: Option<&str>) -> Option<String> {
        tracing::debug!(prompt, "input dismissed");
        None
    }

    async fn confirm(&self, message: &str) -> bool {
        tracing::debug!(message, "confirmation dismissed");
        false
    }

    async fn pick_connection(
        &self,
        _choices: &[SavedConnection],
        _active: Option<&ConnectionId>,
    ) -> Option<ConnectionChoice> {
        None
    }
}

/// Stand-in for editor surfaces that a headless host does not have
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessSurface;

impl HeadlessSurface {
    fn unavailable(surface: &str) -> Result<bool> {
        tracing::warn!(surface, "not available in headless mode");
        Ok(false)
    }
}

#[async_trait]
impl PlaygroundController for HeadlessSurface {
    async fn create_playground(&self) -> Result<bool> {
        Self::unavailable("playground")
    }

    async fn run_selected_blocks(&self) -> Result<bool> {
        Self::unavailable("playground")
    }

    async fn run_all_blocks(&self) -> Result<bool> {
        Self::unavailable("playground")
    }

    async fn open_template(&self, _template: PlaygroundTemplate) -> Result<bool> {
        Self::unavailable("playground")
    }

    async fn export_to_language(&self, _language: Language) -> Result<bool> {
        Self::unavailable("export to language")
    }
}

#[async_trait]
impl EditorController for HeadlessSurface {
    async fn open_collection_documents(
        &self,
        _connection_id: &ConnectionId,
        _namespace: &Namespace,
    ) -> Result<bool> {
        Self::unavailable("document editor")
    }

    async fn open_document(
        &self,
        _connection_id: &ConnectionId,
        _namespace: &Namespace,
        _document_id: &str,
        _source: DocumentSource,
    ) -> Result<bool> {
        Self::unavailable("document editor")
    }

    async fn save_active_document(&self) -> Result<bool> {
        Self::unavailable("document editor")
    }

    async fn insert_text_at_cursor(&self, _text: &str) -> Result<bool> {
        Self::unavailable("text editor")
    }
}

#[async_trait]
impl WebviewController for HeadlessSurface {
    async fn open_overview_page(&self) -> Result<bool> {
        Self::unavailable("overview page")
    }

    async fn open_connect_form(&self) -> Result<bool> {
        Self::unavailable("connection form")
    }

    async fn open_edit_connection_form(&self, _connection_id: &ConnectionId) -> Result<bool> {
        Self::unavailable("connection form")
    }
}

#[async_trait]
impl ShellLauncher for HeadlessSurface {
    async fn launch(&self, _connection_string: &str) -> Result<bool> {
        Self::unavailable("shell")
    }
}

#[async_trait]
impl Clipboard for HeadlessSurface {
    async fn write_text(&self, text: &str) -> Result<()> {
        tracing::info!(target: "mongolens::clipboard", "{text}");
        Ok(())
    }
}
