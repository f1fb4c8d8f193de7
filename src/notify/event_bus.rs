use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use super::events::{DomainEvent, EventTag};

pub type Handler = Arc<dyn Fn(&DomainEvent) -> anyhow::Result<()> + Send + Sync>;

/// In-process publish/subscribe hub.
///
/// `publish` runs the handlers registered for the event's tag, in
/// registration order, on the caller's thread. A failing or panicking
/// handler is logged and skipped; the publisher never sees it.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<EventTag, Vec<Handler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, tag: EventTag, handler: F)
    where
        F: Fn(&DomainEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(tag)
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn publish(&self, event: &DomainEvent) {
        let tag = event.tag();
        // snapshot so handlers may subscribe or publish without deadlocking
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tag)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::debug!(event = tag.as_str(), "No subscribers");
            return;
        }

        for (index, handler) in handlers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(
                        event = tag.as_str(),
                        handler = index,
                        error = %e,
                        "Event handler failed"
                    );
                }
                Err(_) => {
                    tracing::error!(
                        event = tag.as_str(),
                        handler = index,
                        "Event handler panicked"
                    );
                }
            }
        }
    }

    pub fn subscriber_count(&self, tag: EventTag) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tag)
            .map_or(0, Vec::len)
    }
}
