use std::fmt;

/// Token returned by [`EventBus::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subscription(pub u64);

type Handler<T> = Box<dyn FnMut(&T)>;

/// Synchronous fan-out of events to registered handlers.
///
/// Handlers run in subscription order. Single-threaded by construction: the
/// handlers are not `Send`.
pub struct EventBus<T> {
    next_id: u64,
    handlers: Vec<(Subscription, Handler<T>)>,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&T) + 'static) -> Subscription {
        let sub = Subscription(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.handlers.push((sub, Box::new(handler)));
        sub
    }

    /// Returns `true` if the subscription was still registered.
    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(s, _)| *s != sub);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: &T) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn delivers_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let a = Rc::clone(&seen);
        bus.subscribe(move |v: &u32| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        bus.subscribe(move |v: &u32| b.borrow_mut().push(("b", *v)));

        bus.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let c = Rc::clone(&count);
        let sub = bus.subscribe(move |_: &()| *c.borrow_mut() += 1);

        bus.emit(&());
        assert!(bus.unsubscribe(sub));
        assert!(!bus.unsubscribe(sub));
        bus.emit(&());
        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }
}
