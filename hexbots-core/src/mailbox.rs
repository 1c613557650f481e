//! Bounded per-piece inbox

use std::collections::VecDeque;

use crate::script::Value;

/// Messages a mailbox holds before refusing more
pub const MAILBOX_CAPACITY: usize = 6;

/// Inbox of (sender, message) pairs.
///
/// Ordering is FIFO per sender; messages from different senders may be read
/// in any interleaving.
#[derive(Clone, Debug, Default)]
pub struct Mailbox {
    messages: VecDeque<(usize, Value)>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.messages.len() >= MAILBOX_CAPACITY
    }

    /// Queue a message; returns false when full
    pub fn deliver(&mut self, sender: usize, message: Value) -> bool {
        if self.is_full() {
            return false;
        }
        self.messages.push_back((sender, message));
        true
    }

    /// Whether an unread message from `sender` is waiting
    pub fn has_from(&self, sender: usize) -> bool {
        self.messages.iter().any(|(s, _)| *s == sender)
    }

    /// Remove and return the oldest message from `sender`
    pub fn take_from(&mut self, sender: usize) -> Option<Value> {
        let pos = self.messages.iter().position(|(s, _)| *s == sender)?;
        self.messages.remove(pos).map(|(_, m)| m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        let mut mb = Mailbox::new();
        for i in 0..MAILBOX_CAPACITY {
            assert!(mb.deliver(0, Value::Int(i as i64)));
        }
        assert!(mb.is_full());
        assert!(!mb.deliver(1, Value::Int(99)));
        assert_eq!(mb.len(), MAILBOX_CAPACITY);
    }

    #[test]
    fn test_fifo_per_sender() {
        let mut mb = Mailbox::new();
        mb.deliver(1, Value::Str("a".into()));
        mb.deliver(2, Value::Str("x".into()));
        mb.deliver(1, Value::Str("b".into()));

        assert_eq!(mb.take_from(2), Some(Value::Str("x".into())));
        assert_eq!(mb.take_from(1), Some(Value::Str("a".into())));
        assert_eq!(mb.take_from(1), Some(Value::Str("b".into())));
        assert_eq!(mb.take_from(1), None);
        assert!(mb.is_empty());
    }

    #[test]
    fn test_has_from() {
        let mut mb = Mailbox::new();
        assert!(!mb.has_from(0));
        mb.deliver(0, Value::Bool(true));
        assert!(mb.has_from(0));
        assert!(!mb.has_from(3));
    }
}
