//! Bounded single-producer/single-consumer queue with a one-time close.
//!
//! [`bounded`] splits the queue into a [`Sender`] and a [`Receiver`]. The
//! sender is the only writer: it pushes items and, once, closes the queue.
//! The receiver is the only reader: it pops items, and once the queue is
//! closed it still receives everything buffered before reporting the end.
//!
//! # Example
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (tx, mut rx) = drainpipe::queue::bounded::<u64>(1);
//!
//! tx.push(7).await;
//! tx.close();
//!
//! // Buffered items survive the close...
//! assert_eq!(rx.pop().await, Some(7));
//! // ...then the receiver sees the end instead of waiting forever.
//! assert_eq!(rx.pop().await, None);
//! # }
//! ```
//!
//! # Closing
//!
//! [`Sender::close`] consumes the sender, so a push after close or a second
//! close cannot be written. Dropping a sender without closing does **not**
//! close the queue: a receiver blocked in [`Receiver::pop`] keeps waiting.
//! That is the shutdown hazard this crate exists to demonstrate, so the
//! drop is logged as a warning rather than papered over.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Create a bounded queue holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn bounded<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    assert!(capacity > 0, "queue capacity must be at least 1");

    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            items: VecDeque::with_capacity(capacity),
            closed: false,
        }),
        capacity,
        has_item: Notify::new(),
        has_space: Notify::new(),
    });

    let sender = Sender {
        shared: Arc::clone(&shared),
        closed: false,
    };
    (sender, Receiver { shared })
}

struct Shared<T> {
    state: Mutex<State<T>>,
    capacity: usize,
    /// Wakes the receiver after a push or the close.
    has_item: Notify,
    /// Wakes the sender after a pop.
    has_space: Notify,
}

struct State<T> {
    items: VecDeque<T>,
    /// Sticky. Only ever goes from `false` to `true`.
    closed: bool,
}

impl<T> Shared<T> {
    fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

/// The writing half of a [`bounded`] queue.
pub struct Sender<T> {
    shared: Arc<Shared<T>>,
    closed: bool,
}

impl<T> Sender<T> {
    /// Append an item, waiting while the queue is full.
    ///
    /// Dropping the returned future before it completes drops the item.
    pub async fn push(&self, item: T) {
        loop {
            // Register interest before looking at the state so a pop that
            // lands in between still leaves a permit behind.
            let space = self.shared.has_space.notified();
            {
                let mut state = self.shared.state.lock();
                if state.items.len() < self.shared.capacity {
                    state.items.push_back(item);
                    drop(state);
                    self.shared.has_item.notify_one();
                    return;
                }
            }
            space.await;
        }
    }

    /// Append an item without waiting.
    ///
    /// Returns the item back inside [`Full`] if the queue has no space.
    pub fn try_push(&self, item: T) -> Result<(), Full<T>> {
        let mut state = self.shared.state.lock();
        if state.items.len() >= self.shared.capacity {
            return Err(Full(item));
        }
        state.items.push_back(item);
        drop(state);
        self.shared.has_item.notify_one();
        Ok(())
    }

    /// Close the queue.
    ///
    /// Items already buffered stay available to the receiver. Once they are
    /// consumed, [`Receiver::pop`] returns `None` instead of waiting.
    pub fn close(mut self) {
        self.closed = true;
        self.shared.state.lock().closed = true;
        self.shared.has_item.notify_one();
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of buffered items.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(
                buffered = self.shared.len(),
                "queue sender dropped without closing; the receiver will never see the end"
            );
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("len", &self.len())
            .field("capacity", &self.shared.capacity)
            .finish()
    }
}

/// The reading half of a [`bounded`] queue.
pub struct Receiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Receiver<T> {
    /// Take the next item, waiting while the queue is empty and open.
    ///
    /// Returns `None` once the queue is closed and every buffered item has
    /// been taken. Cancel-safe: an item leaves the queue only in the poll
    /// that returns it, so this can sit in a `select!` branch.
    pub async fn pop(&mut self) -> Option<T> {
        loop {
            let item = self.shared.has_item.notified();
            {
                let mut state = self.shared.state.lock();
                if let Some(next) = state.items.pop_front() {
                    drop(state);
                    self.shared.has_space.notify_one();
                    return Some(next);
                }
                if state.closed {
                    return None;
                }
            }
            item.await;
        }
    }

    /// Take the next item without waiting.
    pub fn try_pop(&mut self) -> Result<T, TryPopError> {
        let mut state = self.shared.state.lock();
        match state.items.pop_front() {
            Some(next) => {
                drop(state);
                self.shared.has_space.notify_one();
                Ok(next)
            }
            None if state.closed => Err(TryPopError::Closed),
            None => Err(TryPopError::Empty),
        }
    }

    /// Pop and discard items until the queue is closed and empty.
    ///
    /// Returns how many items were discarded. Never returns while the
    /// queue is still open.
    pub async fn drain(&mut self) -> u64 {
        let mut discarded = 0;
        while self.pop().await.is_some() {
            discarded += 1;
        }
        discarded
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the sender has closed the queue.
    ///
    /// Buffered items may still be waiting.
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Maximum number of buffered items.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Returned by [`Sender::try_push`] when the queue is full.
#[derive(PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Recover the item that could not be pushed.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is full")
    }
}

impl<T> std::error::Error for Full<T> {}

/// Why [`Receiver::try_pop`] returned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TryPopError {
    /// Nothing buffered, but the sender may still push.
    Empty,
    /// Nothing buffered and the queue is closed. Nothing will ever arrive.
    Closed,
}

impl fmt::Display for TryPopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "queue is empty"),
            Self::Closed => write!(f, "queue is closed"),
        }
    }
}

impl std::error::Error for TryPopError {}
