//! Kind-keyed registration table and synchronous dispatch
//!
//! This module provides the core primitive of the crate:
//! - `EventBus<E>`: registry of non-owning handlers keyed by `E::Kind`

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::event::Event;

/// Callback invoked for every published event of a subscribed kind
///
/// The consumer keeps the `Arc`; the bus only ever holds a `Weak` to it.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registration<E: Event> {
    kind: E::Kind,
    handler: Weak<dyn Fn(&E) + Send + Sync>,
}

impl<E: Event> Registration<E> {
    fn matches(&self, kind: E::Kind, handler: &Handler<E>) -> bool {
        self.kind == kind && Weak::ptr_eq(&self.handler, &Arc::downgrade(handler))
    }

    fn is_live(&self) -> bool {
        self.handler.strong_count() > 0
    }
}

/// Publish/subscribe registry keyed by event kind
///
/// Clones share the same registration table.
///
/// # Delivery Guarantees
///
/// - Handlers run synchronously on the thread calling [`publish`](Self::publish)
/// - Handlers for one kind run in the order they were registered
/// - A handler registered twice for a kind runs twice per publish
/// - A handler whose `Arc` has been dropped is never invoked again
///
/// # Panics
///
/// A panicking handler is not caught. The panic unwinds out of `publish`
/// into the publisher, and handlers later in the snapshot are skipped.
/// Publishers that must survive subscriber failures have to decide that
/// for themselves.
pub struct EventBus<E: Event> {
    registrations: Arc<RwLock<Vec<Registration<E>>>>,
}

impl<E: Event> EventBus<E> {
    /// Create a bus with no registrations
    pub fn new() -> Self {
        Self {
            registrations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register `handler` for events of `kind`
    ///
    /// Does not deduplicate: the same pair registered twice fires twice.
    pub fn subscribe(&self, kind: E::Kind, handler: &Handler<E>) {
        let mut registrations = self.registrations.write();
        registrations.push(Registration {
            kind,
            handler: Arc::downgrade(handler),
        });

        tracing::trace!(
            "Subscribed handler for {:?} ({} registrations)",
            kind,
            registrations.len()
        );
    }

    /// Remove one registration of `handler` for `kind`
    ///
    /// Returns `false` if no such registration exists, which is not an error.
    pub fn unsubscribe(&self, kind: E::Kind, handler: &Handler<E>) -> bool {
        let mut registrations = self.registrations.write();
        match registrations.iter().position(|r| r.matches(kind, handler)) {
            Some(index) => {
                registrations.remove(index);
                tracing::trace!("Unsubscribed handler for {:?}", kind);
                true
            }
            None => false,
        }
    }

    /// Deliver `event` to every live handler registered for its kind
    ///
    /// The registration list is only locked while taking a snapshot, so
    /// handlers are free to subscribe or unsubscribe during delivery. Such
    /// changes take effect from the next publish.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event: &E) -> usize {
        let kind = event.kind();

        let (handlers, dead) = {
            let registrations = self.registrations.read();
            let mut handlers = Vec::new();
            let mut dead = 0usize;
            for registration in registrations.iter() {
                match registration.handler.upgrade() {
                    Some(handler) if registration.kind == kind => handlers.push(handler),
                    Some(_) => {}
                    None => dead += 1,
                }
            }
            (handlers, dead)
        };

        if dead > 0 {
            self.prune();
        }

        for handler in &handlers {
            handler(event);
        }

        handlers.len()
    }

    /// Number of live registrations for `kind`
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.registrations
            .read()
            .iter()
            .filter(|r| r.kind == kind && r.is_live())
            .count()
    }

    /// Total number of live registrations
    pub fn len(&self) -> usize {
        self.registrations
            .read()
            .iter()
            .filter(|r| r.is_live())
            .count()
    }

    /// Check if the bus has no live registrations
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration
    pub fn clear(&self) {
        self.registrations.write().clear();
    }

    /// Forget registrations whose handler has been dropped
    fn prune(&self) {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(Registration::is_live);
        tracing::trace!(
            "Pruned {} dropped handlers",
            before - registrations.len()
        );
    }
}

impl<E: Event> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registrations: Arc::clone(&self.registrations),
        }
    }
}

impl<E: Event> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("registrations", &self.registrations.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestKind {
        Alpha,
        Beta,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Alpha(u32),
        Beta,
    }

    impl Event for TestEvent {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            match self {
                TestEvent::Alpha(_) => TestKind::Alpha,
                TestEvent::Beta => TestKind::Beta,
            }
        }
    }

    fn counting_handler(counter: &Arc<AtomicUsize>) -> Handler<TestEvent> {
        let counter = Arc::clone(counter);
        Arc::new(move |_: &TestEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_publish_reaches_only_matching_kind() {
        let bus = EventBus::new();
        let alpha_hits = Arc::new(AtomicUsize::new(0));
        let beta_hits = Arc::new(AtomicUsize::new(0));
        let alpha = counting_handler(&alpha_hits);
        let beta = counting_handler(&beta_hits);

        bus.subscribe(TestKind::Alpha, &alpha);
        bus.subscribe(TestKind::Beta, &beta);

        assert_eq!(bus.publish(&TestEvent::Alpha(1)), 1);
        assert_eq!(alpha_hits.load(Ordering::SeqCst), 1);
        assert_eq!(beta_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let handlers: Vec<Handler<TestEvent>> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                Arc::new(move |_: &TestEvent| order.lock().push(i)) as Handler<TestEvent>
            })
            .collect();

        for handler in &handlers {
            bus.subscribe(TestKind::Beta, handler);
        }
        bus.publish(&TestEvent::Beta);

        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_registration_fires_twice() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&hits);

        bus.subscribe(TestKind::Alpha, &handler);
        bus.subscribe(TestKind::Alpha, &handler);
        bus.publish(&TestEvent::Alpha(7));

        assert_eq!(hits.load(Ordering::SeqCst), 2);

        // One unsubscribe removes exactly one registration
        assert!(bus.unsubscribe(TestKind::Alpha, &handler));
        bus.publish(&TestEvent::Alpha(8));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&hits);

        bus.subscribe(TestKind::Alpha, &handler);
        assert!(bus.unsubscribe(TestKind::Alpha, &handler));
        assert_eq!(bus.publish(&TestEvent::Alpha(1)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_missing_is_noop() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&hits);

        assert!(!bus.unsubscribe(TestKind::Alpha, &handler));

        // Registered for another kind only
        bus.subscribe(TestKind::Beta, &handler);
        assert!(!bus.unsubscribe(TestKind::Alpha, &handler));
        assert_eq!(bus.subscriber_count(TestKind::Beta), 1);
    }

    #[test]
    fn test_same_closure_body_is_distinct_handler() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let first = counting_handler(&hits);
        let second = counting_handler(&hits);

        bus.subscribe(TestKind::Alpha, &first);
        assert!(!bus.unsubscribe(TestKind::Alpha, &second));
        assert_eq!(bus.subscriber_count(TestKind::Alpha), 1);
    }

    #[test]
    fn test_dropped_handler_is_not_called_and_pruned() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&hits);

        bus.subscribe(TestKind::Alpha, &handler);
        assert_eq!(bus.len(), 1);

        // Consumer tears down without unsubscribing
        drop(handler);

        assert_eq!(bus.publish(&TestEvent::Alpha(1)), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(bus.is_empty());
        assert_eq!(bus.registrations.read().len(), 0);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself_during_publish() {
        let bus = EventBus::<TestEvent>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<Handler<TestEvent>>>> = Arc::new(Mutex::new(None));

        let handler: Handler<TestEvent> = {
            let bus = bus.clone();
            let hits = Arc::clone(&hits);
            let slot = Arc::clone(&slot);
            Arc::new(move |_: &TestEvent| {
                hits.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = slot.lock().as_ref() {
                    bus.unsubscribe(TestKind::Beta, me);
                }
            })
        };
        *slot.lock() = Some(Arc::clone(&handler));

        bus.subscribe(TestKind::Beta, &handler);
        bus.publish(&TestEvent::Beta);
        bus.publish(&TestEvent::Beta);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(TestKind::Beta), 0);
    }

    #[test]
    #[should_panic(expected = "subscriber failed")]
    fn test_handler_panic_propagates_to_publisher() {
        let bus = EventBus::new();
        let handler: Handler<TestEvent> = Arc::new(|_: &TestEvent| panic!("subscriber failed"));

        bus.subscribe(TestKind::Alpha, &handler);
        bus.publish(&TestEvent::Alpha(1));
    }

    #[test]
    fn test_event_payload_is_delivered() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler<TestEvent> = {
            let seen = Arc::clone(&seen);
            Arc::new(move |event: &TestEvent| seen.lock().push(event.clone()))
        };

        bus.subscribe(TestKind::Alpha, &handler);
        bus.publish(&TestEvent::Alpha(42));

        assert_eq!(*seen.lock(), vec![TestEvent::Alpha(42)]);
    }

    #[test]
    fn test_concurrent_subscribe() {
        let bus = EventBus::<TestEvent>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&hits);

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let bus = bus.clone();
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    for _ in 0..25 {
                        bus.subscribe(TestKind::Alpha, &handler);
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(bus.subscriber_count(TestKind::Alpha), 200);
        bus.publish(&TestEvent::Alpha(0));
        assert_eq!(hits.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let handler = counting_handler(&hits);

        bus.subscribe(TestKind::Alpha, &handler);
        bus.subscribe(TestKind::Beta, &handler);
        bus.clear();

        assert!(bus.is_empty());
        assert_eq!(bus.publish(&TestEvent::Beta), 0);
    }
}
