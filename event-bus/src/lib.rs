//! Generic Event Bus
//!
//! A small, kind-keyed publish/subscribe registry. Publishing is synchronous:
//! every live handler registered for the event's kind runs on the publisher's
//! thread, in registration order.
//!
//! # Features
//!
//! - **Closed kinds**: Registrations are keyed by an `Event::Kind` tag, not by runtime type
//! - **Non-owning handlers**: The bus holds `Weak` references; consumers own their handlers
//! - **No deduplication**: Registering the same handler twice delivers twice
//! - **Re-entrant**: Handlers may subscribe or unsubscribe while being invoked
//! - **No hidden recovery**: A panicking handler unwinds into the publisher
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use event_bus::{Event, EventBus, Handler};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Kind { Ping }
//!
//! struct Ping;
//!
//! impl Event for Ping {
//!     type Kind = Kind;
//!     fn kind(&self) -> Kind { Kind::Ping }
//! }
//!
//! let bus = EventBus::<Ping>::new();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&hits);
//! let handler: Handler<Ping> = Arc::new(move |_: &Ping| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.subscribe(Kind::Ping, &handler);
//! bus.publish(&Ping);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! bus.unsubscribe(Kind::Ping, &handler);
//! bus.publish(&Ping);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```
//!
//! # Architecture
//!
//! ```text
//! EventBus<E>
//!     │
//!     └── registrations: RwLock<Vec<Registration<E>>>
//!             │
//!             └── (E::Kind, Weak<dyn Fn(&E)>)
//! ```

// Modules
pub mod bus;
pub mod event;

// Re-exports - Public API
pub use bus::{EventBus, Handler};
pub use event::Event;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bus::{EventBus, Handler};
    pub use crate::event::Event;
}
