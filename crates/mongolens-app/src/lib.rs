//! MongoLens headless host
//!
//! Runs the command surface without an editor: invocations arrive as JSON
//! lines on stdin, results and notifications leave as JSON lines on stdout,
//! and logs go to stderr and a rolling JSON file.

pub mod host;
pub mod logging;
pub mod runner;

use mongolens_connection::StorageController;
use mongolens_driver_mongodb::MongoDbDriver;
use mongolens_services::{AppContext, AppContextBuilder, ExtensionSettings};
use std::sync::Arc;

use crate::host::{ConsoleClipboard, ConsoleInput, ConsoleNotifier, ConsoleOutput, ConsolePrompt, ProcessShellLauncher};

/// Wire the MongoDB driver and the console collaborators into a context
pub fn build_context(
    settings: ExtensionSettings,
    storage: Arc<dyn StorageController>,
    input: Arc<ConsoleInput>,
    output: Arc<ConsoleOutput>,
) -> Arc<AppContext> {
    let driver = Arc::new(MongoDbDriver::new());
    let shell = Arc::new(ProcessShellLauncher::new(settings.shell_command.clone()));

    AppContextBuilder::new(driver.clone(), driver)
        .settings(settings)
        .storage(storage)
        .notifier(Arc::new(ConsoleNotifier::new(output.clone())))
        .clipboard(Arc::new(ConsoleClipboard::new(output.clone())))
        .prompt(Arc::new(ConsolePrompt::new(input, output)))
        .shell(shell)
        .build()
}
