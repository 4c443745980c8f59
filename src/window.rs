//! Sliding window average
//!
//! Maintains a fixed-capacity rolling window of readings and calculates the
//! mean over that window. The capacity is fixed at construction; once full,
//! each new reading evicts the oldest one.

use std::collections::VecDeque;

/// Fixed-capacity rolling mean over accepted readings
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl SlidingWindow {
    /// Create a new window holding at most `capacity` readings.
    ///
    /// A capacity of 0 is clamped to 1 so the window always accepts a
    /// reading (the newest value simply overwrites the previous one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a reading, evicting the oldest one if the window is full
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Mean of the current contents
    ///
    /// Returns None if no readings have been accepted yet.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }

        let sum: f64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Number of readings currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no readings have been accepted yet
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of readings the window holds
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
