//! Event bus, presence tracking and live notification delivery.

pub mod event_bus;
pub mod events;
pub mod fanout;
pub mod presence;
pub mod transport;

pub use event_bus::EventBus;
pub use events::{DomainEvent, EventTag, UserId};
pub use fanout::NotificationFanout;
pub use presence::{ConnectionId, PresenceRegistry};
pub use transport::{ChannelTransport, DeliveryError, Transport};
