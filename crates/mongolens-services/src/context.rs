//! Application context
//!
//! Built once at startup and shared as `Arc<AppContext>` with every command
//! handler. Nothing in the services layer looks collaborators up globally.

use mongolens_connection::{ConnectionController, MemoryStorage, StorageController};
use mongolens_core::{
    Clipboard, ConnectionDriver, DataService, EditorController, Notifier, PlaygroundController,
    Prompt, ShellLauncher, TelemetrySink, WebviewController,
};
use mongolens_explorer::{ExplorerTree, TreeLimits};
use std::sync::Arc;

use crate::{
    CommandDispatcher, DismissPrompt, ExtensionSettings, HeadlessSurface, TracingNotifier,
    TracingTelemetry,
};

pub struct AppContext {
    pub settings: ExtensionSettings,
    pub storage: Arc<dyn StorageController>,
    pub connections: ConnectionController,
    pub data: Arc<dyn DataService>,
    pub tree: ExplorerTree,
    pub dispatcher: CommandDispatcher,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub notifier: Arc<dyn Notifier>,
    pub clipboard: Arc<dyn Clipboard>,
    pub prompt: Arc<dyn Prompt>,
    pub playground: Arc<dyn PlaygroundController>,
    pub editor: Arc<dyn EditorController>,
    pub webview: Arc<dyn WebviewController>,
    pub shell: Arc<dyn ShellLauncher>,
}

/// Assembles an [`AppContext`]; only the driver is mandatory
pub struct AppContextBuilder {
    driver: Arc<dyn ConnectionDriver>,
    data: Arc<dyn DataService>,
    settings: ExtensionSettings,
    storage: Option<Arc<dyn StorageController>>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
    notifier: Option<Arc<dyn Notifier>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    prompt: Option<Arc<dyn Prompt>>,
    playground: Option<Arc<dyn PlaygroundController>>,
    editor: Option<Arc<dyn EditorController>>,
    webview: Option<Arc<dyn WebviewController>>,
    shell: Option<Arc<dyn ShellLauncher>>,
}

impl AppContextBuilder {
    pub fn new(driver: Arc<dyn ConnectionDriver>, data: Arc<dyn DataService>) -> Self {
        Self {
            driver,
            data,
            settings: ExtensionSettings::default(),
            storage: None,
            telemetry: None,
            notifier: None,
            clipboard: None,
            prompt: None,
            playground: None,
            editor: None,
            webview: None,
            shell: None,
        }
    }

    pub fn settings(mut self, settings: ExtensionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn storage(mut self, storage: Arc<dyn StorageController>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn prompt(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn playground(mut self, playground: Arc<dyn PlaygroundController>) -> Self {
        self.playground = Some(playground);
        self
    }

    pub fn editor(mut self, editor: Arc<dyn EditorController>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn webview(mut self, webview: Arc<dyn WebviewController>) -> Self {
        self.webview = Some(webview);
        self
    }

    pub fn shell(mut self, shell: Arc<dyn ShellLauncher>) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn build(self) -> Arc<AppContext> {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let limits = TreeLimits {
            document_limit: self.settings.default_document_limit,
            schema_sample_size: self.settings.schema_sample_size,
        };

        Arc::new(AppContext {
            connections: ConnectionController::new(self.driver, storage.clone()),
            tree: ExplorerTree::new(self.data.clone(), limits),
            data: self.data,
            storage,
            settings: self.settings,
            dispatcher: CommandDispatcher::new(),
            telemetry: self.telemetry.unwrap_or_else(|| Arc::new(TracingTelemetry)),
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            clipboard: self.clipboard.unwrap_or_else(|| Arc::new(HeadlessSurface)),
            prompt: self.prompt.unwrap_or_else(|| Arc::new(DismissPrompt)),
            playground: self.playground.unwrap_or_else(|| Arc::new(HeadlessSurface)),
            editor: self.editor.unwrap_or_else(|| Arc::new(HeadlessSurface)),
            webview: self.webview.unwrap_or_else(|| Arc::new(HeadlessSurface)),
            shell: self.shell.unwrap_or_else(|| Arc::new(HeadlessSurface)),
        })
    }
}
