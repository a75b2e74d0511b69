//! Change notification channel carrying no payload.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use futures::channel::mpsc;

/// Handle of a callback registered with [`Observers::subscribe`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubscriptionId(u64);

/// List of observers notified about an entity change.
///
/// Notifications carry nothing, subscribers are expected to read the current
/// state from the entity itself.
#[derive(Default)]
pub struct Observers {
    last_id: Cell<u64>,
    callbacks: RefCell<Vec<(SubscriptionId, Rc<dyn Fn()>)>>,
    streams: RefCell<Vec<mpsc::UnboundedSender<()>>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked synchronously on every [`emit`].
    ///
    /// [`emit`]: Observers::emit
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + 'static,
    {
        let id = SubscriptionId(self.last_id.get() + 1);
        self.last_id.set(id.0);
        self.callbacks.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Removes a callback, returns `false` if it wasn't registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(sub_id, _)| *sub_id != id);
        callbacks.len() != before
    }

    /// Returns a stream yielding one item per [`emit`].
    ///
    /// Dropping the stream unsubscribes it.
    ///
    /// [`emit`]: Observers::emit
    pub fn updates(&self) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded();
        self.streams.borrow_mut().push(tx);
        rx
    }

    /// Notifies callbacks in registration order, then every live stream.
    ///
    /// Callbacks may re-enter this [`Observers`] (subscribe or unsubscribe),
    /// a callback removed by an earlier one in the same round isn't called.
    pub fn emit(&self) {
        let snapshot: Vec<_> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();
        for (id, callback) in snapshot {
            let still_subscribed =
                self.callbacks.borrow().iter().any(|(sub_id, _)| *sub_id == id);
            if still_subscribed {
                callback();
            }
        }
        self.streams
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(()).is_ok());
    }

    /// Number of registered callbacks and streams.
    pub fn len(&self) -> usize {
        self.callbacks.borrow().len() + self.streams.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.borrow().len())
            .field("streams", &self.streams.borrow().len())
            .finish()
    }
}
