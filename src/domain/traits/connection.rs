use async_trait::async_trait;
use crate::domain::entities::Occurrence;

/// Outbound side of a chat connection - implemented by the protocol client
pub trait Outbound: Send + Sync {
    /// Send a message to a channel or a nick
    fn send_message(&self, target: &str, text: &str);

    /// Send a `/me` action
    fn send_action(&self, target: &str, text: &str);

    /// Append a line to the bot's activity log
    fn log_line(&self, text: &str);
}

/// Inbound side of a chat connection.
///
/// Yields occurrences in arrival order; `None` means the connection ended.
#[async_trait]
pub trait EventSource: Send {
    async fn next_occurrence(&mut self) -> Option<Occurrence>;
}
