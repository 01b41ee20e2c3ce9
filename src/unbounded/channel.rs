use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::Waker,
};

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{
    RecvError, TryRecvError, TrySendError,
    receiver::Receiver,
    sender::Sender,
    waiter::{Slot, Waiter},
};
use crate::storage::Storage;

/// Everything guarded by the channel lock.
///
/// Invariant: `items` and `waiters` are never both non-empty. A write goes to the
/// oldest waiter when there is one, and a read only registers when no item is queued.
///
/// Outstanding reads, oldest first, are: at most one read that took its item on the
/// spot (tracked by `Channel::immediate`), then `handed`, then `waiters`. Items held by
/// them follow the same order, and every item in `items` is newer than all of them.
struct State<T, S> {
    items: S,
    waiters: VecDeque<Arc<Waiter<T>>>,
    /// Reads that were given an item and have not settled yet, in issue order.
    handed: VecDeque<Arc<Waiter<T>>>,
    /// Waiter kept from a finished read so the next suspension does not allocate.
    spare: Option<Arc<Waiter<T>>>,
    /// Largest storage capacity seen since the last reset.
    peak_capacity: usize,
    senders: usize,
    receiver_alive: bool,
    /// Terminal "no more writes" state.
    closed: bool,
}

impl<T, S: Storage<T>> State<T, S> {
    fn push_back(&mut self, value: T) {
        self.items.push_back(value);
        self.peak_capacity = self.peak_capacity.max(self.items.capacity());
    }

    fn push_front(&mut self, value: T) {
        self.items.push_front(value);
        self.peak_capacity = self.peak_capacity.max(self.items.capacity());
    }

    /// Gives `value` to the oldest waiting read, which joins the handed reads.
    fn hand_over(&mut self, value: T) -> Result<Option<Waker>, T> {
        match self.waiters.pop_front() {
            Some(waiter) => {
                let waker = waiter.fulfil(value);
                self.handed.push_back(waiter);
                Ok(waker)
            }
            None => Err(value),
        }
    }

    /// Re-inserts `value`, taken by an abandoned read, right after the reads issued
    /// before that one.
    ///
    /// `handed[from..]` were issued after the abandoned read. Each of them still
    /// holding its item swaps it for the older `value`, and the newest item left over
    /// goes to the oldest waiting read or back to the head of the queue.
    fn redeliver(&mut self, from: usize, mut value: T) -> Option<Waker> {
        for waiter in self.handed.iter().skip(from) {
            value = waiter.exchange(value);
        }
        match self.hand_over(value) {
            Ok(waker) => waker,
            Err(value) => {
                self.push_front(value);
                None
            }
        }
    }

    fn position(queue: &VecDeque<Arc<Waiter<T>>>, waiter: &Arc<Waiter<T>>) -> Option<usize> {
        queue.iter().position(|w| Arc::ptr_eq(w, waiter))
    }

    fn deregister(&mut self, waiter: &Arc<Waiter<T>>) -> bool {
        match Self::position(&self.waiters, waiter) {
            Some(position) => {
                self.waiters.remove(position);
                true
            }
            None => false,
        }
    }
}

/// How a freshly issued read starts out.
pub(super) enum Begin<T> {
    /// Resolved on the spot: an item was queued, or the channel is closed and drained.
    Ready(Result<T, RecvError>),
    /// Registered behind every earlier read. The waiter may already hold its item.
    Waiting(Arc<Waiter<T>>),
}

pub(super) struct Channel<T, S> {
    state: CachePadded<Mutex<State<T, S>>>,
    /// Set while a read that took its item on the spot has not observed it yet.
    /// Reads issued meanwhile go through a waiter.
    immediate: CachePadded<AtomicBool>,
}

impl<T, S: Storage<T>> Channel<T, S> {
    pub(super) fn new(items: S) -> Self {
        let state = State {
            peak_capacity: items.capacity(),
            items,
            waiters: VecDeque::new(),
            handed: VecDeque::new(),
            spare: None,
            senders: 1,
            receiver_alive: true,
            closed: false,
        };
        Self {
            state: CachePadded::new(Mutex::new(state)),
            immediate: CachePadded::new(AtomicBool::new(false)),
        }
    }

    pub(super) fn split(self) -> (Sender<T, S>, Receiver<T, S>) {
        let inner = Arc::new(self);
        let tx = Sender::new(inner.clone());
        let rx = Receiver::new(inner);
        (tx, rx)
    }

    /// Enqueues `value`, or hands it straight to the oldest suspended read.
    pub(super) fn send(&self, value: T) -> Result<(), TrySendError<T>> {
        let waker = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(TrySendError::Closed(value));
            }
            if !state.receiver_alive {
                return Err(TrySendError::Disconnected(value));
            }
            match state.hand_over(value) {
                Ok(waker) => waker,
                Err(value) => {
                    state.push_back(value);
                    return Ok(());
                }
            }
        };

        // wake outside of the lock so the reader does not contend on it
        if let Some(waker) = waker {
            waker.wake();
        }
        Ok(())
    }

    /// Issues a read: takes the head item if there is one, otherwise registers a waiter.
    pub(super) fn begin_recv(&self) -> Begin<T> {
        let mut state = self.state.lock();
        if state.items.is_empty() && state.closed {
            return Begin::Ready(Err(RecvError::Closed));
        }

        let alone = state.handed.is_empty() && !self.immediate.load(Ordering::Acquire);
        if alone {
            if let Some(value) = state.items.pop_front() {
                self.immediate.store(true, Ordering::Relaxed);
                return Begin::Ready(Ok(value));
            }
        }

        let waiter = state
            .spare
            .take()
            .unwrap_or_else(|| Arc::new(Waiter::new()));
        match state.items.pop_front() {
            Some(value) => {
                waiter.fulfil(value);
                state.handed.push_back(waiter.clone());
            }
            None => state.waiters.push_back(waiter.clone()),
        }
        Begin::Waiting(waiter)
    }

    /// Marks the read that took its item on the spot as done with it.
    #[inline]
    pub(super) fn finish_immediate(&self) {
        self.immediate.store(false, Ordering::Release);
    }

    pub(super) fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut state = self.state.lock();
        match state.items.pop_front() {
            Some(value) => Ok(value),
            None if state.closed => Err(TryRecvError::Closed),
            None => Err(TryRecvError::Empty),
        }
    }

    /// Settles a registered read that is going away, whether or not it observed its
    /// outcome.
    ///
    /// A still-queued waiter is deregistered. An item that was handed over but never
    /// observed is passed on to the reads issued after it, so it is neither lost nor
    /// reordered.
    pub(super) fn finish_recv(&self, waiter: Arc<Waiter<T>>) {
        let waker = {
            let mut state = self.state.lock();
            let handed = State::<T, S>::position(&state.handed, &waiter);
            if let Some(position) = handed {
                state.handed.remove(position);
            }

            let waker = match (waiter.take(), handed) {
                (Slot::Waiting(_), _) => {
                    state.deregister(&waiter);
                    None
                }
                (Slot::Ready(value), Some(position)) => state.redeliver(position, value),
                (Slot::Ready(_), None) => unreachable!("handed reads are tracked until settled"),
                (Slot::Closed | Slot::Cancelled | Slot::Taken, _) => None,
            };

            // nobody else can reach the waiter anymore, keep it for the next read
            if state.spare.is_none() && Arc::strong_count(&waiter) == 1 {
                waiter.reset();
                state.spare = Some(waiter);
            }
            waker
        };

        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Puts back the item of a read that took it on the spot and was dropped before
    /// observing it.
    pub(super) fn restore(&self, value: T) {
        let waker = {
            let mut state = self.state.lock();
            self.finish_immediate();
            // that read was the oldest outstanding one
            state.redeliver(0, value)
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Makes a still-waiting read resolve with [`RecvError::Cancelled`].
    pub(super) fn cancel(&self, waiter: &Arc<Waiter<T>>) -> bool {
        let waker = {
            let mut state = self.state.lock();
            if !state.deregister(waiter) {
                return false;
            }
            waiter.cancel()
        };

        trace!("pending read cancelled");
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }

    /// Moves the channel to its terminal state and fails every suspended read.
    ///
    /// Queued items and items already handed to reads stay readable. Returns `false`
    /// if the channel was already closed.
    pub(super) fn close(&self) -> bool {
        let mut wakers = Vec::new();
        {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;

            // waiters only exist while nothing is queued, so they can fail right away
            let waiters = std::mem::take(&mut state.waiters);
            wakers.extend(waiters.iter().filter_map(|waiter| waiter.close()));
            debug!(
                pending = state.items.len(),
                failed_reads = waiters.len(),
                "channel completed"
            );
        }

        for waker in wakers {
            waker.wake();
        }
        true
    }

    pub(super) fn add_sender(&self) {
        self.state.lock().senders += 1;
    }

    /// Completes the channel when the last sender goes away.
    pub(super) fn drop_sender(&self) {
        let last = {
            let mut state = self.state.lock();
            state.senders -= 1;
            state.senders == 0
        };
        if last {
            self.close();
        }
    }

    /// Disconnects the channel and releases the items nobody can read anymore.
    pub(super) fn drop_receiver(&self) {
        let mut unread = Vec::new();
        {
            let mut state = self.state.lock();
            state.receiver_alive = false;
            state.spare = None;
            unread.reserve(state.items.len());
            while let Some(value) = state.items.pop_front() {
                unread.push(value);
            }
        }
        if !unread.is_empty() {
            debug!(dropped = unread.len(), "receiver dropped with unread items");
        }
        // item destructors run outside of the lock
        drop(unread);
    }

    pub(super) fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub(super) fn capacity(&self) -> usize {
        self.state.lock().items.capacity()
    }

    pub(super) fn peak_capacity(&self) -> usize {
        self.state.lock().peak_capacity
    }

    /// Restarts peak tracking from the current capacity, returning the previous peak.
    pub(super) fn take_peak_capacity(&self) -> usize {
        let mut state = self.state.lock();
        let current = state.items.capacity();
        std::mem::replace(&mut state.peak_capacity, current)
    }

    pub(super) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(super) fn is_disconnected(&self) -> bool {
        !self.state.lock().receiver_alive
    }

    #[cfg(test)]
    pub(super) fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    #[cfg(test)]
    pub(super) fn has_spare(&self) -> bool {
        self.state.lock().spare.is_some()
    }
}
