//! Event trait for bus payloads
//!
//! Every payload published on an [`EventBus`](crate::EventBus) reports a
//! kind. Handlers register against kinds, never against concrete payload
//! values.

use std::fmt::Debug;
use std::hash::Hash;

/// A payload that can be published on an [`EventBus`](crate::EventBus)
///
/// The associated `Kind` is a closed, copyable tag (usually a fieldless
/// enum mirroring the payload enum).
///
/// # Example
///
/// ```rust
/// use event_bus::Event;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum DoorKind {
///     Opened,
///     Closed,
/// }
///
/// #[derive(Debug)]
/// enum DoorEvent {
///     Opened { by: String },
///     Closed,
/// }
///
/// impl Event for DoorEvent {
///     type Kind = DoorKind;
///
///     fn kind(&self) -> DoorKind {
///         match self {
///             DoorEvent::Opened { .. } => DoorKind::Opened,
///             DoorEvent::Closed => DoorKind::Closed,
///         }
///     }
/// }
///
/// assert_eq!(DoorEvent::Closed.kind(), DoorKind::Closed);
/// ```
pub trait Event: Send + Sync + 'static {
    /// Tag used to key registrations
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// The kind this payload is delivered under
    fn kind(&self) -> Self::Kind;
}
