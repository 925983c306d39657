// src/stream/channel.rs
//! Single-pass FIFO modelling one hardware stream interface

use std::collections::VecDeque;

/// Errors raised by stream channels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("read from empty channel '{channel}' after {reads} reads")]
    Underflow { channel: String, reads: usize },
}

/// Ordered queue of stream elements. Each write is one interface cycle;
/// every element is read at most once, in write order.
#[derive(Debug, Clone)]
pub struct Channel<T> {
    name: String,
    queue: VecDeque<T>,
    writes: usize,
    reads: usize,
}

impl<T> Channel<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: VecDeque::new(),
            writes: 0,
            reads: 0,
        }
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            queue: VecDeque::with_capacity(capacity),
            writes: 0,
            reads: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write(&mut self, value: T) {
        self.queue.push_back(value);
        self.writes += 1;
    }

    pub fn read(&mut self) -> Result<T, ChannelError> {
        match self.queue.pop_front() {
            Some(value) => {
                self.reads += 1;
                Ok(value)
            }
            None => Err(ChannelError::Underflow {
                channel: self.name.clone(),
                reads: self.reads,
            }),
        }
    }

    /// Number of elements written but not yet read
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn total_writes(&self) -> usize {
        self.writes
    }

    pub fn total_reads(&self) -> usize {
        self.reads
    }
}

impl<T> Extend<T> for Channel<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.write(value);
        }
    }
}
