use serde::{Deserialize, Serialize};

/// A span of time in seconds. Well-formed intervals have `end >= start`;
/// the overlap helpers tolerate degenerate inputs by clamping to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl TimeInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Duration in seconds, zero for degenerate intervals
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether `other` lies fully inside this interval
    pub fn contains(&self, other: &TimeInterval) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Duration of the intersection with `other`, zero when disjoint
    pub fn overlap_duration(&self, other: &TimeInterval) -> f64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).max(0.0)
    }

    /// Whether this interval, expanded by `tolerance` on both ends,
    /// intersects `other`. Touching endpoints count as intersecting.
    pub fn intersects_within(&self, other: &TimeInterval, tolerance: f64) -> bool {
        !((self.end + tolerance) < other.start || (self.start - tolerance) > other.end)
    }

    /// Whether both endpoints are finite numbers
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}
