//! Value resolved at most once, awaitable before and after resolution.

use std::{cell::RefCell, fmt, mem};

use futures::{
    channel::oneshot,
    future::{self, FutureExt as _, LocalBoxFuture},
};

enum State<T> {
    Pending(Vec<oneshot::Sender<T>>),
    Resolved(T),
}

/// Single-writer, multiple-reader slot.
///
/// Only the first [`Deferred::resolve`] has an effect. Every future returned
/// by [`Deferred::get`] yields that first value: immediately if it is
/// already known, or once it arrives otherwise. Waiters are woken in the
/// order they called [`Deferred::get`].
pub struct Deferred<T> {
    state: RefCell<State<T>>,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self {
            state: RefCell::new(State::Pending(Vec::new())),
        }
    }
}

impl<T: Clone + 'static> Deferred<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` if nothing was stored yet and wakes all waiters.
    ///
    /// Returns `false` (leaving the stored value intact) if this slot was
    /// already resolved.
    pub fn resolve(&self, value: T) -> bool {
        let mut state = self.state.borrow_mut();
        if let State::Resolved(_) = *state {
            return false;
        }
        let previous =
            mem::replace(&mut *state, State::Resolved(value.clone()));
        drop(state);

        if let State::Pending(waiters) = previous {
            for waiter in waiters {
                // Receiver may be gone if its future was dropped.
                let _ = waiter.send(value.clone());
            }
        }
        true
    }

    /// Returns a future resolving to the first value ever stored.
    ///
    /// Never fails. If this slot is dropped unresolved the future stays
    /// pending forever, bounding that wait is up to the caller.
    pub fn get(&self) -> LocalBoxFuture<'static, T> {
        match &mut *self.state.borrow_mut() {
            State::Resolved(value) => future::ready(value.clone()).boxed_local(),
            State::Pending(waiters) => {
                waiters.retain(|waiter| !waiter.is_canceled());
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                async move {
                    match rx.await {
                        Ok(value) => value,
                        Err(oneshot::Canceled) => future::pending().await,
                    }
                }
                .boxed_local()
            }
        }
    }

    /// Returns the stored value without waiting.
    pub fn peek(&self) -> Option<T> {
        match &*self.state.borrow() {
            State::Resolved(value) => Some(value.clone()),
            State::Pending(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(&*self.state.borrow(), State::Resolved(_))
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            State::Pending(waiters) => format!("Pending({})", waiters.len()),
            State::Resolved(_) => "Resolved".to_string(),
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, time::Duration};

    use futures::{future, FutureExt as _};
    use tokio::{
        task::{spawn_local, LocalSet},
        time::sleep,
    };

    use super::*;

    #[test]
    fn get_after_resolve_is_ready() {
        let slot = Deferred::new();
        assert!(slot.resolve(1));

        assert_eq!(slot.get().now_or_never(), Some(1));
        assert_eq!(slot.peek(), Some(1));
    }

    #[test]
    fn second_resolve_is_ignored() {
        let slot = Deferred::new();
        assert!(slot.resolve("x"));
        assert!(!slot.resolve("y"));

        assert_eq!(slot.get().now_or_never(), Some("x"));
    }

    #[test]
    fn unresolved_get_is_pending() {
        let slot = Deferred::<u8>::new();

        assert!(slot.get().now_or_never().is_none());
        assert!(!slot.is_resolved());
    }

    #[test]
    fn dropped_slot_leaves_waiters_pending() {
        let slot = Deferred::<u8>::new();
        let mut waiter = slot.get();
        drop(slot);

        assert!((&mut waiter).now_or_never().is_none());
    }

    #[tokio::test]
    async fn waiters_resume_in_registration_order() {
        LocalSet::new()
            .run_until(async {
                let slot = Rc::new(Deferred::new());
                let order = Rc::new(RefCell::new(Vec::new()));

                let handles: Vec<_> = (0..3)
                    .map(|n| {
                        let waiter = slot.get();
                        let order = Rc::clone(&order);
                        spawn_local(async move {
                            let value = waiter.await;
                            order.borrow_mut().push((n, value));
                        })
                    })
                    .collect();
                sleep(Duration::from_millis(0)).await;

                assert!(slot.resolve("x"));
                assert!(!slot.resolve("y"));
                for handle in future::join_all(handles).await {
                    handle.unwrap();
                }

                assert_eq!(
                    *order.borrow(),
                    vec![(0, "x"), (1, "x"), (2, "x")],
                );
            })
            .await;
    }
}
