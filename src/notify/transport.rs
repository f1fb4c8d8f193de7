use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::presence::ConnectionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("connection {0} is not open")]
    UnknownConnection(ConnectionId),

    #[error("connection {0} was closed by the peer")]
    Closed(ConnectionId),
}

/// Pushes a serialized message to one live connection.
///
/// Called from event bus handlers, so implementations must not block.
pub trait Transport: Send + Sync {
    fn send(&self, connection_id: ConnectionId, message: &str) -> Result<(), DeliveryError>;
}

/// Transport backed by one unbounded channel per connection. The receiving
/// half is drained by whatever writes to the socket (see `api::live`).
#[derive(Default)]
pub struct ChannelTransport {
    senders: Mutex<HashMap<ConnectionId, UnboundedSender<String>>>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, connection_id: ConnectionId) -> UnboundedReceiver<String> {
        let (tx, rx) = unbounded_channel();
        self.senders().insert(connection_id, tx);
        rx
    }

    pub fn close(&self, connection_id: ConnectionId) {
        self.senders().remove(&connection_id);
    }

    pub fn open_count(&self) -> usize {
        self.senders().len()
    }

    fn senders(&self) -> MutexGuard<'_, HashMap<ConnectionId, UnboundedSender<String>>> {
        self.senders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, connection_id: ConnectionId, message: &str) -> Result<(), DeliveryError> {
        let mut senders = self.senders();
        let sender = senders
            .get(&connection_id)
            .ok_or(DeliveryError::UnknownConnection(connection_id))?;

        if sender.send(message.to_owned()).is_err() {
            senders.remove(&connection_id);
            return Err(DeliveryError::Closed(connection_id));
        }
        Ok(())
    }
}
