//! Fan-out of ledger events to in-process listeners.

use bela_ledger::LedgerEvent;

type Listener = Box<dyn Fn(&LedgerEvent) + Send + Sync>;

/// Synchronous event bus.
///
/// Listeners run inline on the thread that completed the operation, while
/// the ledger lock is still held, so they observe events in ledger order.
/// Keep them fast.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&LedgerEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn publish(&self, events: &[LedgerEvent]) {
        for event in events {
            tracing::debug!(?event, "ledger event");
            for listener in &self.listeners {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bela_types::AccountAddress;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn registered(seed: u8) -> LedgerEvent {
        LedgerEvent::Registered {
            account: AccountAddress::from_bytes([seed; 20]),
            referrer: None,
        }
    }

    #[test]
    fn publish_reaches_every_listener() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        let c2 = Arc::clone(&counter);
        bus.subscribe(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        });

        bus.publish(&[registered(1), registered(2)]);
        assert_eq!(counter.load(Ordering::SeqCst), 22);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn publish_without_listeners_is_a_noop() {
        EventBus::new().publish(&[registered(1)]);
    }
}
