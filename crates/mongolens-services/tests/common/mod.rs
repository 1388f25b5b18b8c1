//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use mongolens_connection::MemoryStorage;
use mongolens_core::{
    Clipboard, CollectionInfo, ConnectionChoice, ConnectionDriver, ConnectionId, DataService,
    DocumentSource, DocumentSummary, EditorController, FieldInfo, IndexInfo, IndexKeys, Language,
    MongolensError, Namespace, Notifier, PlaygroundController, PlaygroundTemplate, Prompt, Result,
    SavedConnection, ShellLauncher, TelemetrySink, WebviewController,
};
use mongolens_services::{AppContext, AppContextBuilder, ExtensionSettings};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

pub const LOCAL_ID: &str = "local";

/// Ordered record of everything the mocks were asked to do
///
/// Telemetry and backend calls share one log so tests can assert ordering.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn local_connection() -> SavedConnection {
    SavedConnection::new("localhost:27017", "mongodb://localhost:27017").with_id(LOCAL_ID)
}

/// Mock driver and data service
pub struct MockBackend {
    log: EventLog,
    pub fail_mutations: bool,
    /// When set, `connect` waits on this before returning
    pub connect_gate: Option<Arc<Notify>>,
    pub connect_started: Arc<Notify>,
}

impl MockBackend {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_mutations: false,
            connect_gate: None,
            connect_started: Arc::new(Notify::new()),
        }
    }

    pub fn with_failing_mutations(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    pub fn with_connect_gate(mut self, gate: Arc<Notify>) -> Self {
        self.connect_gate = Some(gate);
        self
    }

    fn record(&self, event: String) {
        self.log.lock().push(event);
    }

    fn mutation(&self, event: String) -> Result<()> {
        self.record(event);
        if self.fail_mutations {
            Err(MongolensError::Driver("not authorized".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ConnectionDriver for MockBackend {
    async fn connect(&self, connection: &SavedConnection) -> Result<()> {
        self.record(format!("connect:{}", connection.id));
        self.connect_started.notify_one();
        if let Some(gate) = &self.connect_gate {
            gate.notified().await;
        }
        Ok(())
    }

    async fn disconnect(&self, connection_id: &ConnectionId) -> Result<()> {
        self.record(format!("disconnect:{connection_id}"));
        Ok(())
    }
}

#[async_trait]
impl DataService for MockBackend {
    async fn list_databases(&self, _connection_id: &ConnectionId) -> Result<Vec<String>> {
        Ok(vec!["shop".into()])
    }

    async fn list_collections(
        &self,
        _connection_id: &ConnectionId,
        _database: &str,
    ) -> Result<Vec<CollectionInfo>> {
        Ok(vec![CollectionInfo::collection("orders")])
    }

    async fn list_documents(
        &self,
        _connection_id: &ConnectionId,
        _namespace: &Namespace,
        _limit: usize,
    ) -> Result<Vec<DocumentSummary>> {
        Ok(vec![DocumentSummary { id: "1".into() }])
    }

    async fn find_document(
        &self,
        _connection_id: &ConnectionId,
        _namespace: &Namespace,
        document_id: &str,
    ) -> Result<Option<serde_json::Value>> {
        self.record(format!("find_document:{document_id}"));
        Ok(Some(serde_json::json!({ "_id": 1, "item": "pencil", "qty": 3 })))
    }

    async fn sample_fields(
        &self,
        _connection_id: &ConnectionId,
        _namespace: &Namespace,
        _sample_size: usize,
    ) -> Result<Vec<FieldInfo>> {
        Ok(vec![])
    }

    async fn list_indexes(
        &self,
        _connection_id: &ConnectionId,
        _namespace: &Namespace,
    ) -> Result<Vec<IndexInfo>> {
        Ok(vec![])
    }

    async fn create_collection(
        &self,
        _connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<()> {
        self.mutation(format!("create_collection:{namespace}"))
    }

    async fn drop_database(&self, _connection_id: &ConnectionId, database: &str) -> Result<()> {
        self.mutation(format!("drop_database:{database}"))
    }

    async fn drop_collection(
        &self,
        _connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<()> {
        self.mutation(format!("drop_collection:{namespace}"))
    }

    async fn delete_document(
        &self,
        _connection_id: &ConnectionId,
        namespace: &Namespace,
        document_id: &str,
    ) -> Result<bool> {
        self.mutation(format!("delete_document:{namespace}:{document_id}"))?;
        Ok(true)
    }

    async fn create_index(
        &self,
        _connection_id: &ConnectionId,
        namespace: &Namespace,
        keys: &IndexKeys,
    ) -> Result<String> {
        let name = keys
            .iter()
            .map(|(field, direction)| format!("{field}_{direction}"))
            .collect::<Vec<_>>()
            .join("_");
        self.mutation(format!("create_index:{namespace}:{name}"))?;
        Ok(name)
    }
}

pub struct RecordingTelemetry {
    log: EventLog,
}

impl TelemetrySink for RecordingTelemetry {
    fn track_command_run(&self, command_id: &str) -> Result<()> {
        self.log.lock().push(format!("telemetry:{command_id}"));
        Ok(())
    }

    fn track_document_opened_in_editor(&self, source: DocumentSource) -> Result<()> {
        self.log.lock().push(format!("telemetry:document_opened:{source}"));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub information: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn information(&self) -> Vec<String> {
        self.information.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_information(&self, message: &str) {
        self.information.lock().push(message.to_string());
    }

    fn show_warning(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    pub contents: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn last(&self) -> Option<String> {
        self.contents.lock().last().cloned()
    }
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        self.contents.lock().push(text.to_string());
        Ok(())
    }
}

/// Prompt that answers from scripted queues
#[derive(Default)]
pub struct ScriptedPrompt {
    pub inputs: Mutex<VecDeque<String>>,
    pub confirm_answer: Mutex<bool>,
    pub pick: Mutex<Option<ConnectionChoice>>,
}

impl ScriptedPrompt {
    pub fn push_input(&self, answer: impl Into<String>) {
        self.inputs.lock().push_back(answer.into());
    }

    pub fn set_confirm(&self, answer: bool) {
        *self.confirm_answer.lock() = answer;
    }

    pub fn set_pick(&self, choice: ConnectionChoice) {
        *self.pick.lock() = Some(choice);
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn input_box(&self, _prompt: &str, _placeholder: Option<&str>) -> Option<String> {
        self.inputs.lock().pop_front()
    }

    async fn confirm(&self, _message: &str) -> bool {
        *self.confirm_answer.lock()
    }

    async fn pick_connection(
        &self,
        _choices: &[SavedConnection],
        _active: Option<&ConnectionId>,
    ) -> Option<ConnectionChoice> {
        self.pick.lock().take()
    }
}

/// Playground, editor, webview and shell in one recorder
pub struct RecordingSurface {
    log: EventLog,
    pub templates: Mutex<Vec<PlaygroundTemplate>>,
}

impl RecordingSurface {
    fn record(&self, event: String) -> Result<bool> {
        self.log.lock().push(event);
        Ok(true)
    }
}

#[async_trait]
impl PlaygroundController for RecordingSurface {
    async fn create_playground(&self) -> Result<bool> {
        self.record("playground:create".into())
    }

    async fn run_selected_blocks(&self) -> Result<bool> {
        self.record("playground:run_selected".into())
    }

    async fn run_all_blocks(&self) -> Result<bool> {
        self.record("playground:run_all".into())
    }

    async fn open_template(&self, template: PlaygroundTemplate) -> Result<bool> {
        self.templates.lock().push(template);
        self.record("playground:template".into())
    }

    async fn export_to_language(&self, language: Language) -> Result<bool> {
        self.record(format!("playground:export:{language}"))
    }
}

#[async_trait]
impl EditorController for RecordingSurface {
    async fn open_collection_documents(
        &self,
        _connection_id: &ConnectionId,
        namespace: &Namespace,
    ) -> Result<bool> {
        self.record(format!("editor:collection:{namespace}"))
    }

    async fn open_document(
        &self,
        connection_id: &ConnectionId,
        namespace: &Namespace,
        document_id: &str,
        source: DocumentSource,
    ) -> Result<bool> {
        self.record(format!(
            "editor:document:{connection_id}:{namespace}:{document_id}:{source}"
        ))
    }

    async fn save_active_document(&self) -> Result<bool> {
        self.record("editor:save".into())
    }

    async fn insert_text_at_cursor(&self, text: &str) -> Result<bool> {
        self.record(format!("editor:insert:{text}"))
    }
}

#[async_trait]
impl WebviewController for RecordingSurface {
    async fn open_overview_page(&self) -> Result<bool> {
        self.record("webview:overview".into())
    }

    async fn open_connect_form(&self) -> Result<bool> {
        self.record("webview:connect_form".into())
    }

    async fn open_edit_connection_form(&self, connection_id: &ConnectionId) -> Result<bool> {
        self.record(format!("webview:edit_form:{connection_id}"))
    }
}

#[async_trait]
impl ShellLauncher for RecordingSurface {
    async fn launch(&self, connection_string: &str) -> Result<bool> {
        self.record(format!("shell:{connection_string}"))
    }
}

/// Every mock wired into an [`AppContext`]
pub struct Harness {
    pub log: EventLog,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub clipboard: Arc<RecordingClipboard>,
    pub prompt: Arc<ScriptedPrompt>,
    pub surface: Arc<RecordingSurface>,
    pub settings: ExtensionSettings,
}

impl Harness {
    /// A harness with one saved connection, [`LOCAL_ID`]
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::with_connections([local_connection()])))
    }

    /// A harness with no saved connections
    pub fn empty() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(storage: Arc<MemoryStorage>) -> Self {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        Self {
            surface: Arc::new(RecordingSurface {
                log: log.clone(),
                templates: Mutex::new(Vec::new()),
            }),
            log,
            storage,
            notifier: Arc::new(RecordingNotifier::default()),
            clipboard: Arc::new(RecordingClipboard::default()),
            prompt: Arc::new(ScriptedPrompt::default()),
            settings: ExtensionSettings::default(),
        }
    }

    pub fn backend(&self) -> MockBackend {
        MockBackend::new(self.log.clone())
    }

    pub fn context(&self) -> Arc<AppContext> {
        self.context_with(self.backend())
    }

    pub fn context_with(&self, backend: MockBackend) -> Arc<AppContext> {
        let backend = Arc::new(backend);
        AppContextBuilder::new(backend.clone(), backend)
            .settings(self.settings.clone())
            .storage(self.storage.clone())
            .telemetry(Arc::new(RecordingTelemetry {
                log: self.log.clone(),
            }))
            .notifier(self.notifier.clone())
            .clipboard(self.clipboard.clone())
            .prompt(self.prompt.clone())
            .playground(self.surface.clone())
            .editor(self.surface.clone())
            .webview(self.surface.clone())
            .shell(self.surface.clone())
            .build()
    }

    pub fn events(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Events recorded since `from`, to ignore activation noise
    pub fn events_since(&self, from: usize) -> Vec<String> {
        self.log.lock()[from..].to_vec()
    }

    pub fn event_count(&self) -> usize {
        self.log.lock().len()
    }
}
