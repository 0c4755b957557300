//! Outbound channel to one player

use duel_protocol::Message;
use tokio::sync::mpsc;

/// Cloneable handle for sending envelopes to one player's connection.
///
/// Sending never blocks. If the connection is already gone the message is
/// dropped and a warning is logged.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    pub fn send(&self, message: &Message) {
        if self.tx.send(message.to_wire_format()).is_err() {
            tracing::warn!(kind = %message.kind, "Outbound channel closed, dropping message");
        }
    }
}
