use std::sync::Arc;

use anyhow::Context;

use super::event_bus::EventBus;
use super::events::{DomainEvent, EventTag};
use super::presence::PresenceRegistry;
use super::transport::Transport;

/// Outcome of pushing one event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub failed: usize,
    /// Recipients with no live connection; their copy is dropped.
    pub offline: usize,
}

/// Delivers every bus event to all live connections of its recipients.
#[derive(Clone)]
pub struct NotificationFanout {
    registry: Arc<PresenceRegistry>,
    transport: Arc<dyn Transport>,
}

impl NotificationFanout {
    pub fn new(registry: Arc<PresenceRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Subscribes to every event tag.
    pub fn install(self, bus: &EventBus) {
        for tag in EventTag::ALL {
            let fanout = self.clone();
            bus.subscribe(tag, move |event| fanout.deliver(event).map(|_| ()));
        }
    }

    pub fn deliver(&self, event: &DomainEvent) -> anyhow::Result<FanoutReport> {
        let tag = event.tag().as_str();
        let message = serde_json::to_string(event)
            .with_context(|| format!("failed to serialize {tag} notification"))?;

        let mut report = FanoutReport::default();
        for user_id in event.recipients() {
            let connections = self.registry.connections_for(user_id);
            if connections.is_empty() {
                tracing::debug!(event = tag, user_id, "Recipient offline, dropping notification");
                report.offline += 1;
                continue;
            }

            for connection_id in connections {
                match self.transport.send(connection_id, &message) {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            event = tag,
                            user_id,
                            error = %e,
                            "Notification delivery failed"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        tracing::debug!(
            event = tag,
            delivered = report.delivered,
            failed = report.failed,
            offline = report.offline,
            "Notification fan-out done"
        );
        Ok(report)
    }
}
