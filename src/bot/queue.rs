use log::{debug, info};
use std::collections::VecDeque;

use crate::types::{QueueError, QueueResult};

/// Viewer waitlist. Entries are compared exactly as submitted, so "Alice" and
/// "alice" are two different entries.
#[derive(Debug, Default)]
pub struct QueueSystem {
    entries: VecDeque<String>,
    active: bool,
}

/// Where somebody stands in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePosition {
    /// 1-based
    pub position: usize,
    pub ahead: usize,
}

impl QueueSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current entries in queue order
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Open or close the queue. Idempotent in both directions.
    pub fn toggle(&mut self, activate: bool) {
        if self.active != activate {
            info!("Queue {}", if activate { "activated" } else { "deactivated" });
        }
        self.active = activate;
    }

    /// Append a new entry and return its position
    pub fn join(&mut self, name: &str) -> QueueResult<usize> {
        if self.contains(name) {
            return Err(QueueError::AlreadyQueued(name.to_string()));
        }
        self.entries.push_back(name.to_string());
        debug!("{} joined the queue at #{}", name, self.entries.len());
        Ok(self.entries.len())
    }

    pub fn leave(&mut self, name: &str) -> QueueResult<()> {
        let index = self
            .index_of(name)
            .ok_or_else(|| QueueError::NotQueued(name.to_string()))?;
        self.entries.remove(index);
        debug!("{} left the queue", name);
        Ok(())
    }

    /// Moderator version of [`join`](Self::join)
    pub fn add(&mut self, name: &str) -> QueueResult<usize> {
        self.join(name)
    }

    /// Moderator version of [`leave`](Self::leave)
    pub fn remove(&mut self, name: &str) -> QueueResult<()> {
        self.leave(name)
    }

    /// Render the queue as `#1 a | #2 b`, or `None` when empty
    pub fn view(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let rendered = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, name)| format!("#{} {}", i + 1, name))
            .collect::<Vec<_>>()
            .join(" | ");
        Some(rendered)
    }

    pub fn check(&self, name: &str) -> Option<QueuePosition> {
        self.index_of(name).map(|index| QueuePosition {
            position: index + 1,
            ahead: index,
        })
    }

    /// Pop up to `count` entries off the front, oldest first
    pub fn next(&mut self, count: usize) -> QueueResult<Vec<String>> {
        if self.entries.is_empty() {
            return Err(QueueError::Empty);
        }
        let take = count.min(self.entries.len());
        let picked: Vec<String> = self.entries.drain(..take).collect();
        info!("Pulled {} from the queue, {} remaining", picked.len(), self.entries.len());
        Ok(picked)
    }

    /// Empty the queue, returning how many entries were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        info!("Queue cleared ({} removed)", count);
        count
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry == name)
    }
}
