//! The raw position fix delivered by a location provider.

use std::time::Instant;

use crate::geo::Coordinate;

/// A single position fix as produced by a consumer-grade receiver.
///
/// Negative `horizontal_accuracy_m` means the accuracy is unknown; negative
/// `speed_mps` means speed is unavailable. Samples are never mutated once
/// produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub horizontal_accuracy_m: f64,
    pub timestamp: Instant,
    pub speed_mps: f64,
}

impl PositionSample {
    pub fn new(
        coordinate: Coordinate,
        horizontal_accuracy_m: f64,
        timestamp: Instant,
        speed_mps: f64,
    ) -> Self {
        Self {
            coordinate,
            horizontal_accuracy_m,
            timestamp,
            speed_mps,
        }
    }

    /// Accuracy is a finite, non-negative radius.
    #[inline]
    pub fn has_valid_accuracy(&self) -> bool {
        self.horizontal_accuracy_m.is_finite() && self.horizontal_accuracy_m >= 0.0
    }

    /// Speed was reported by the receiver.
    #[inline]
    pub fn has_speed(&self) -> bool {
        self.speed_mps.is_finite() && self.speed_mps >= 0.0
    }

    #[inline]
    pub fn distance_to(&self, other: &PositionSample) -> f64 {
        self.coordinate.distance_to(&other.coordinate)
    }
}
