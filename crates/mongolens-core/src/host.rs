//! The host's user-facing surface: messages, clipboard and prompts

use async_trait::async_trait;

use crate::{ConnectionId, Result, SavedConnection};

/// Non-blocking messages shown to the user
pub trait Notifier: Send + Sync {
    fn show_information(&self, message: &str);

    fn show_warning(&self, message: &str);

    fn show_error(&self, message: &str);
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// What the user picked when asked to change the active connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionChoice {
    Connection(ConnectionId),
    Disconnect,
}

/// Questions asked to the user; `None`/`false` means the user dismissed them
#[async_trait]
pub trait Prompt: Send + Sync {
    async fn input_box(&self, prompt: &str, placeholder: Option<&str>) -> Option<String>;

    async fn confirm(&self, message: &str) -> bool;

    async fn pick_connection(
        &self,
        choices: &[SavedConnection],
        active: Option<&ConnectionId>,
    ) -> Option<ConnectionChoice>;
}
