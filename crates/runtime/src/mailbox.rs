use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Shared FIFO used to hand events from widget callbacks to the event loop.
///
/// Cloning yields another handle to the same queue. Callbacks only `post`;
/// the owner `drain`s on its next tick, so no callback ever re-enters the
/// owner's state.
#[derive(Debug)]
pub struct Mailbox<T> {
    inner: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, item: T) {
        self.inner.borrow_mut().push_back(item);
    }

    pub fn drain(&self) -> Vec<T> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
