//! Engine input events
//!
//! The windowing layer pushes events as they arrive; [`Engine::update`]
//! drains the queue in arrival order and dispatches each one before the next
//! frame is rendered.
//!
//! [`Engine::update`]: crate::engine::Engine::update

use std::collections::VecDeque;

use crate::input::{ButtonState, MouseButton, SpecialKey};

/// An input event in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// Character key
    Key {
        /// Key character
        key: char,
        /// Cursor x
        x: i32,
        /// Cursor y
        y: i32,
    },
    /// Arrow, paging or function key
    Special {
        /// Which key
        key: SpecialKey,
        /// Cursor x
        x: i32,
        /// Cursor y
        y: i32,
    },
    /// Mouse button change
    Mouse {
        /// Which button
        button: MouseButton,
        /// Pressed or released
        state: ButtonState,
        /// Cursor x
        x: i32,
        /// Cursor y
        y: i32,
    },
    /// Window size change
    Resize {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
    /// Window close request
    Close,
}

/// FIFO of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<EngineEvent>,
}

impl EventQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: EngineEvent) {
        self.pending.push_back(event);
    }

    /// Take the oldest event
    pub fn pop(&mut self) -> Option<EngineEvent> {
        self.pending.pop_front()
    }

    /// Take every pending event
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.pending.drain(..).collect()
    }

    /// Number of pending events
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = EventQueue::new();
        queue.push(EngineEvent::Key { key: 'a', x: 0, y: 0 });
        queue.push(EngineEvent::Close);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(EngineEvent::Key { key: 'a', x: 0, y: 0 }));
        assert_eq!(queue.drain(), vec![EngineEvent::Close]);
        assert!(queue.is_empty());
    }
}
