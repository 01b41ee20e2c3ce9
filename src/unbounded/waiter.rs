use std::{
    mem,
    task::{Context, Poll, Waker},
};

use parking_lot::Mutex;

use super::RecvError;

/// Outcome slot of one registered read.
pub(super) enum Slot<T> {
    /// Registered and still waiting; holds the waker of the last poll, if any.
    Waiting(Option<Waker>),
    /// A sender handed an item over that the reader has not observed yet.
    Ready(T),
    Closed,
    Cancelled,
    /// The outcome was observed by the reader.
    Taken,
}

/// Rendezvous point between a suspended read and the sender that completes it.
///
/// Lock order: the channel lock is always taken before a waiter lock. A poll only
/// ever takes the waiter lock.
pub(super) struct Waiter<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> Waiter<T> {
    pub(super) fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Waiting(None)),
        }
    }

    /// Hands `value` over and returns the waker to notify once the channel lock is released.
    pub(super) fn fulfil(&self, value: T) -> Option<Waker> {
        self.resolve(Slot::Ready(value))
    }

    pub(super) fn close(&self) -> Option<Waker> {
        self.resolve(Slot::Closed)
    }

    pub(super) fn cancel(&self) -> Option<Waker> {
        self.resolve(Slot::Cancelled)
    }

    fn resolve(&self, outcome: Slot<T>) -> Option<Waker> {
        let mut slot = self.slot.lock();
        debug_assert!(
            matches!(*slot, Slot::Waiting(_)),
            "only waiting reads are queued"
        );
        match mem::replace(&mut *slot, outcome) {
            Slot::Waiting(waker) => waker,
            _ => None,
        }
    }

    /// Swaps `value` for the item this read holds but has not observed yet.
    ///
    /// Gives `value` back untouched when there is no such item.
    pub(super) fn exchange(&self, value: T) -> T {
        match &mut *self.slot.lock() {
            Slot::Ready(held) => mem::replace(held, value),
            _ => value,
        }
    }

    /// Polls for the outcome, storing the task waker while still waiting.
    pub(super) fn poll(&self, cx: &mut Context<'_>) -> Poll<Result<T, RecvError>> {
        let mut slot = self.slot.lock();
        if let Slot::Waiting(waker) = &mut *slot {
            // skip the clone when the same task polls again
            match waker {
                Some(w) if w.will_wake(cx.waker()) => {}
                _ => *waker = Some(cx.waker().clone()),
            }
            return Poll::Pending;
        }
        match mem::replace(&mut *slot, Slot::Taken) {
            Slot::Ready(value) => Poll::Ready(Ok(value)),
            Slot::Closed => Poll::Ready(Err(RecvError::Closed)),
            Slot::Cancelled => Poll::Ready(Err(RecvError::Cancelled)),
            Slot::Taken => panic!("polled after completion"),
            Slot::Waiting(_) => unreachable!(),
        }
    }

    /// Empties the slot, returning whatever the reader never observed.
    pub(super) fn take(&self) -> Slot<T> {
        mem::replace(&mut *self.slot.lock(), Slot::Taken)
    }

    /// Makes a recycled waiter ready for the next registration.
    pub(super) fn reset(&self) {
        *self.slot.lock() = Slot::Waiting(None);
    }
}
