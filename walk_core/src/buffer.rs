//! Bounded history of accepted fixes.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use walk_traits::PositionSample;

/// FIFO of the most recent accepted fixes; the oldest is evicted on overflow.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<PositionSample>,
    capacity: usize,
}

impl SampleBuffer {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, sample: PositionSample) {
        if self.samples.len() == self.capacity {
            let _ = self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn oldest(&self) -> Option<&PositionSample> {
        self.samples.front()
    }

    /// Oldest first.
    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, PositionSample> {
        self.samples.iter()
    }

    /// Most accurate buffered fix that is recent enough and not `excluding`.
    ///
    /// A fix qualifies when it is at most `within` old at `now`, its accuracy
    /// is known and no worse than `max_accuracy_m`, and it is not equal to
    /// `excluding`. Ties on accuracy go to the fix that was buffered first.
    pub fn best_candidate(
        &self,
        excluding: Option<&PositionSample>,
        within: Duration,
        max_accuracy_m: f64,
        now: Instant,
    ) -> Option<PositionSample> {
        let mut best: Option<&PositionSample> = None;
        for s in &self.samples {
            if now.saturating_duration_since(s.timestamp) > within {
                continue;
            }
            if excluding.is_some_and(|x| x == s) {
                continue;
            }
            if !s.has_valid_accuracy() || s.horizontal_accuracy_m > max_accuracy_m {
                continue;
            }
            match best {
                Some(b) if b.horizontal_accuracy_m <= s.horizontal_accuracy_m => {}
                _ => best = Some(s),
            }
        }
        best.copied()
    }
}
