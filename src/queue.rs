//! FIFO queue of issues awaiting merge
//!
//! Issues are deduplicated by ID: enqueueing an issue that is already queued
//! replaces it in place instead of appending a second copy.

use crate::types::{Issue, IssueId};
use std::collections::{HashMap, VecDeque};

/// Ordered, deduplicated queue of issues
///
/// Keeps a `VecDeque` for order and a `HashMap` for O(1) membership. Every ID
/// in the deque appears exactly once in the map and vice versa.
#[derive(Debug, Clone, Default)]
pub struct IssueQueue {
    queue: VecDeque<Issue>,
    lookup: HashMap<IssueId, Issue>,
}

impl IssueQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the tail, or update in place if the ID is already queued
    pub fn enqueue(&mut self, issue: Issue) {
        if self.has_issue(&issue.id) {
            self.update(issue);
        } else {
            self.lookup.insert(issue.id.clone(), issue.clone());
            self.queue.push_back(issue);
        }
    }

    /// Remove and return the head
    pub fn dequeue(&mut self) -> Option<Issue> {
        let issue = self.queue.pop_front()?;
        self.lookup.remove(&issue.id);
        Some(issue)
    }

    /// Remove an issue by ID without dequeuing; no-op if absent
    pub fn remove(&mut self, id: &str) -> Option<Issue> {
        self.lookup.remove(id)?;
        let index = self.position(id)?;
        self.queue.remove(index)
    }

    /// Replace the queued issue with the same ID; no-op if absent
    pub fn update(&mut self, issue: Issue) {
        if let Some(index) = self.position(&issue.id) {
            self.lookup.insert(issue.id.clone(), issue.clone());
            self.queue[index] = issue;
        }
    }

    /// Drop every queued issue
    pub fn clear(&mut self) {
        self.queue.clear();
        self.lookup.clear();
    }

    /// Peek at the next issue to be dequeued
    pub fn head(&self) -> Option<&Issue> {
        self.queue.front()
    }

    /// Peek at the most recently enqueued issue
    pub fn tail(&self) -> Option<&Issue> {
        self.queue.back()
    }

    /// Whether an issue with this ID is queued
    pub fn has_issue(&self, id: &str) -> bool {
        self.lookup.contains_key(id)
    }

    /// Queued issue with this ID
    pub fn get_issue_by_id(&self, id: &str) -> Option<&Issue> {
        self.lookup.get(id)
    }

    /// Number of queued issues
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued issues, head first
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.queue.iter()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.queue.iter().position(|issue| issue.id == id)
    }
}

impl Extend<Issue> for IssueQueue {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        for issue in iter {
            self.enqueue(issue);
        }
    }
}

impl FromIterator<Issue> for IssueQueue {
    fn from_iter<T: IntoIterator<Item = Issue>>(iter: T) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}
