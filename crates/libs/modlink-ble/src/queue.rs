//! Receive-side message queue.
//!
//! The notification task decodes frames off the radio's delivery path and
//! pushes them here; the consumer polls [`RecvQueue::try_pop`] without ever
//! blocking.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use modlink_proto::Message;

/// Unbounded FIFO shared between the notification task and the consumer.
///
/// Clones share the same buffer. Delivery order is the order frames arrived
/// from the radio layer: no reordering, no deduplication, no coalescing.
#[derive(Debug, Clone, Default)]
pub struct RecvQueue {
    inner: Arc<Mutex<VecDeque<Message>>>,
}

impl RecvQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded message; never blocks, never fails.
    pub fn push(&self, message: Message) {
        self.lock().push_back(message);
    }

    /// Pop the oldest undelivered message, or `None` when the queue is empty.
    pub fn try_pop(&self) -> Option<Message> {
        self.lock().pop_front()
    }

    /// Number of undelivered messages.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        // push_back/pop_front cannot leave the deque mid-mutation, so a
        // poisoned lock is still safe to recover.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(instruction: u16) -> Message {
        Message::new(instruction, 0, 1, [])
    }

    #[test]
    fn pops_in_fifo_order() {
        let queue = RecvQueue::new();
        queue.push(msg(1));
        queue.push(msg(2));
        queue.push(msg(3));

        assert_eq!(queue.try_pop().map(|m| m.instruction), Some(1));
        assert_eq!(queue.try_pop().map(|m| m.instruction), Some(2));
        assert_eq!(queue.try_pop().map(|m| m.instruction), Some(3));
    }

    #[test]
    fn empty_pop_returns_none_immediately() {
        let queue = RecvQueue::new();
        assert!(queue.try_pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn clones_share_one_buffer() {
        let producer = RecvQueue::new();
        let consumer = producer.clone();

        producer.push(msg(7));
        assert_eq!(consumer.len(), 1);
        assert_eq!(consumer.try_pop().map(|m| m.instruction), Some(7));
        assert!(producer.is_empty());
    }
}
