//! Fixed-capacity history buffer.
//!
//! Every filter keeps its lookback state in one or more `RollingWindow`s.
//! Index 0 is always the newest element and `len() - 1` the oldest retained.
//! Once full, each push evicts exactly the oldest element, which stays
//! observable through `most_recently_removed()` until the next eviction.

use crate::error::{check_lookback, IndicatorError};

/// Ring buffer of the `capacity` most recent items.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buf: Vec<T>,
    capacity: usize,
    /// Position in `buf` of the newest element.
    head: usize,
    samples: usize,
    removed: Option<T>,
}

impl<T: Copy> RollingWindow<T> {
    /// Storage grows with the pushes, up to `capacity`.
    pub fn new(capacity: usize) -> Result<Self, IndicatorError> {
        check_lookback("rolling_window", "capacity", capacity, 1)?;
        Ok(Self {
            buf: Vec::new(),
            capacity,
            head: 0,
            samples: 0,
            removed: None,
        })
    }

    /// Add `item` as the new index-0 element.
    ///
    /// Returns the evicted element when the window was already full.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.samples += 1;
        if self.buf.len() < self.capacity {
            self.buf.push(item);
            self.head = self.buf.len() - 1;
            return None;
        }
        self.head = (self.head + 1) % self.capacity;
        let evicted = std::mem::replace(&mut self.buf[self.head], item);
        self.removed = Some(evicted);
        Some(evicted)
    }

    /// Element at lookback `index` (0 = newest).
    pub fn item(&self, index: usize) -> Result<T, IndicatorError> {
        self.get(index).ok_or(IndicatorError::IndexOutOfRange {
            index,
            len: self.buf.len(),
        })
    }

    /// Element at lookback `index`, or `None` past the retained history.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.buf.len() {
            return None;
        }
        Some(self.buf[(self.head + self.capacity - index) % self.capacity])
    }

    /// The element evicted by the latest overflowing push.
    pub fn most_recently_removed(&self) -> Option<T> {
        self.removed
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    /// Number of items ever pushed since construction or the last reset.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Iterate newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.buf.len()).map(move |i| self.buf[(self.head + self.capacity - i) % self.capacity])
    }

    /// Empty the window. Capacity is kept.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.head = 0;
        self.samples = 0;
        self.removed = None;
    }
}

impl RollingWindow<f64> {
    /// Lookback value, reading 0.0 where history does not reach yet.
    ///
    /// Filter taps use this during warm-up so that a partially filled window
    /// behaves like a zero-initialised delay line.
    pub fn value_or_zero(&self, index: usize) -> f64 {
        self.get(index).unwrap_or(0.0)
    }

    pub fn sum(&self) -> f64 {
        self.buf.iter().sum()
    }

    /// Mean of the retained values, 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.buf.is_empty() {
            return 0.0;
        }
        self.sum() / self.buf.len() as f64
    }

    /// Maximum of the retained values, `None` when empty.
    pub fn max(&self) -> Option<f64> {
        self.buf.iter().copied().reduce(f64::max)
    }

    /// Median of the retained values, 0.0 when empty.
    pub fn median(&self) -> f64 {
        if self.buf.is_empty() {
            return 0.0;
        }
        let mut sorted = self.buf.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 1 {
            sorted[mid]
        } else {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        }
    }
}
