// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ordering of due profiles within one dispatch pass.
//!
//! When more profiles are due than there are free permits, the ones that have
//! waited longest go first. Ties on due time fall back to the profile name so
//! the dispatch order of a pass is deterministic. Profiles left in the queue
//! when permits run out are not rescheduled; they keep their original due time
//! and are picked up by the next pass.
//!
//! ```rust
//! use tokio::time::{Duration, Instant};
//! use workload_scheduler::engine::due_queue::{DueProfile, DueQueue};
//!
//! let now = Instant::now();
//! let mut queue = DueQueue::new();
//! queue.push(DueProfile::new("SHM_07".to_string(), now));
//! queue.push(DueProfile::new("PM_38".to_string(), now));
//! queue.push(DueProfile::new("FM_01".to_string(), now + Duration::from_secs(1)));
//!
//! let order: Vec<String> = std::iter::from_fn(|| queue.pop()).map(|p| p.name).collect();
//! assert_eq!(order, vec!["PM_38", "SHM_07", "FM_01"]);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tokio::time::Instant;

/// A profile whose due time has passed, waiting for a permit.
#[derive(Debug, Clone)]
pub struct DueProfile {
    pub name: String,
    pub due_at: Instant,
}

impl DueProfile {
    pub fn new(name: String, due_at: Instant) -> Self {
        Self { name, due_at }
    }
}

impl PartialEq for DueProfile {
    fn eq(&self, other: &Self) -> bool {
        self.due_at == other.due_at && self.name == other.name
    }
}

impl Eq for DueProfile {}

impl PartialOrd for DueProfile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DueProfile {
    /// `BinaryHeap` is a max-heap, so both keys are reversed to pop the
    /// earliest due time, then the smallest name, first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_at
            .cmp(&self.due_at)
            .then_with(|| other.name.cmp(&self.name))
    }
}

/// Min-ordered queue of due profiles.
#[derive(Debug, Default)]
pub struct DueQueue {
    heap: BinaryHeap<DueProfile>,
}

impl DueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, profile: DueProfile) {
        self.heap.push(profile);
    }

    pub fn pop(&mut self) -> Option<DueProfile> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&DueProfile> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_earliest_due_first() {
        let now = Instant::now();
        let mut queue = DueQueue::new();
        queue.push(DueProfile::new("A".to_string(), now + Duration::from_secs(3)));
        queue.push(DueProfile::new("B".to_string(), now + Duration::from_secs(1)));
        queue.push(DueProfile::new("C".to_string(), now + Duration::from_secs(2)));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.peek().map(|p| p.name.as_str()), Some("B"));
        assert_eq!(queue.pop().unwrap().name, "B");
        assert_eq!(queue.pop().unwrap().name, "C");
        assert_eq!(queue.pop().unwrap().name, "A");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_name_breaks_ties() {
        let now = Instant::now();
        let mut queue = DueQueue::new();
        for name in ["NHM_03", "AP_01", "CMSYNC_01"] {
            queue.push(DueProfile::new(name.to_string(), now));
        }

        let order: Vec<String> = std::iter::from_fn(|| queue.pop()).map(|p| p.name).collect();
        assert_eq!(order, vec!["AP_01", "CMSYNC_01", "NHM_03"]);
    }
}
