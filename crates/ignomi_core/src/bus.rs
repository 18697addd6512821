//! In-process change notification bus.
//!
//! # Responsibility
//! - Let stores and the coordinator broadcast typed change events.
//! - Deliver each event synchronously to every subscriber of its topic.
//!
//! # Invariants
//! - Delivery order equals registration order.
//! - A failing or panicking handler never blocks later handlers.
//! - Handlers registered during a publish only see later publishes.
//! - Handlers may subscribe, unsubscribe or publish re-entrantly.

use crate::model::item::ItemId;
use log::{debug, error, warn};
use std::cell::{Cell, RefCell};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Named channel an event is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    UsageChanged,
    BookmarkChanged,
    PanelsClosed,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UsageChanged => "usage-changed",
            Self::BookmarkChanged => "bookmark-changed",
            Self::PanelsClosed => "panels-closed",
        }
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral change message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// `item_id` is `None` when every record changed (clear-all).
    UsageChanged { item_id: Option<ItemId> },
    /// Bookmark list after the mutation, in display order.
    BookmarkChanged { bookmarks: Vec<ItemId> },
    /// Panels hidden by a global close.
    PanelsClosed { panels: Vec<String> },
}

impl ChangeEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::UsageChanged { .. } => Topic::UsageChanged,
            Self::BookmarkChanged { .. } => Topic::BookmarkChanged,
            Self::PanelsClosed { .. } => Topic::PanelsClosed,
        }
    }
}

/// Failure reported by one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for HandlerError {}

/// Registration token returned by [`ChangeBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Outcome of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

type Handler = Rc<dyn Fn(&ChangeEvent) -> Result<(), HandlerError>>;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

/// Single-threaded publish/subscribe register.
///
/// Shared by `Rc`; not `Send`, matching the host's single event loop.
#[derive(Default)]
pub struct ChangeBus {
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `topic`.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) -> Result<(), HandlerError> + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.subscribers.borrow_mut().push(Subscriber {
            id,
            topic,
            handler: Rc::new(handler),
        });
        debug!(
            "event=bus_subscribe module=bus status=ok topic={} subscription={}",
            topic, id.0
        );
        id
    }

    /// Removes one registration. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id);
        before != subscribers.len()
    }

    /// Number of handlers currently registered for `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.topic == topic)
            .count()
    }

    /// Delivers `event` to every current subscriber of its topic.
    pub fn publish(&self, event: &ChangeEvent) -> DeliveryReport {
        let topic = event.topic();
        // Snapshot so handlers can touch the bus without a borrow conflict.
        let targets: Vec<(SubscriptionId, Handler)> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.topic == topic)
            .map(|subscriber| (subscriber.id, Rc::clone(&subscriber.handler)))
            .collect();

        let mut report = DeliveryReport::default();
        for (id, handler) in targets {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    warn!(
                        "event=bus_deliver module=bus status=error topic={} subscription={} error={}",
                        topic, id.0, err
                    );
                }
                Err(_) => {
                    report.failed += 1;
                    error!(
                        "event=bus_deliver module=bus status=panic topic={} subscription={}",
                        topic, id.0
                    );
                }
            }
        }

        debug!(
            "event=bus_publish module=bus status=ok topic={} delivered={} failed={}",
            topic, report.delivered, report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeBus, ChangeEvent, DeliveryReport, HandlerError, Topic};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn usage_event() -> ChangeEvent {
        ChangeEvent::UsageChanged {
            item_id: Some("firefox.desktop".to_string()),
        }
    }

    #[test]
    fn delivers_in_registration_order() {
        let bus = ChangeBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(Topic::UsageChanged, move |_| {
                seen.borrow_mut().push(label);
                Ok(())
            });
        }

        let report = bus.publish(&usage_event());

        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
        assert_eq!(
            report,
            DeliveryReport {
                delivered: 3,
                failed: 0
            }
        );
    }

    #[test]
    fn only_matching_topic_receives_event() {
        let bus = ChangeBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        bus.subscribe(Topic::BookmarkChanged, move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.publish(&usage_event());

        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn failing_and_panicking_handlers_do_not_stop_delivery() {
        let bus = ChangeBus::new();
        let reached = Rc::new(RefCell::new(false));
        bus.subscribe(Topic::UsageChanged, |_| Err(HandlerError::new("refresh failed")));
        bus.subscribe(Topic::UsageChanged, |_| panic!("handler bug"));
        let flag = Rc::clone(&reached);
        bus.subscribe(Topic::UsageChanged, move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let report = bus.publish(&usage_event());

        assert!(*reached.borrow());
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = ChangeBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let id = bus.subscribe(Topic::UsageChanged, move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&usage_event());

        assert_eq!(*hits.borrow(), 0);
        assert_eq!(bus.subscriber_count(Topic::UsageChanged), 0);
    }

    #[test]
    fn handler_may_subscribe_during_publish() {
        let bus = Rc::new(ChangeBus::new());
        let late_hits = Rc::new(RefCell::new(0));
        let inner_bus = Rc::clone(&bus);
        let inner_hits = Rc::clone(&late_hits);
        bus.subscribe(Topic::UsageChanged, move |_| {
            let hits = Rc::clone(&inner_hits);
            inner_bus.subscribe(Topic::UsageChanged, move |_| {
                *hits.borrow_mut() += 1;
                Ok(())
            });
            Ok(())
        });

        let first = bus.publish(&usage_event());
        assert_eq!(first.delivered, 1);
        assert_eq!(*late_hits.borrow(), 0);

        bus.publish(&usage_event());
        assert_eq!(*late_hits.borrow(), 1);
    }
}
