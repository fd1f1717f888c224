use crate::model::segment::Segment;

/// Ordered caption segments with an "active at time `t`" lookup.
///
/// Lookup is a linear scan returning the first segment whose closed interval contains `t`, so
/// overlapping segments resolve to the earlier list entry. Segment counts are tens, not
/// thousands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentIndex {
    segments: Vec<Segment>,
}

impl SegmentIndex {
    /// Build an index over `segments`, preserving their order.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// First segment with `start <= t <= end`, if any.
    pub fn active_at(&self, t: f64) -> Option<&Segment> {
        self.segments.iter().find(|s| s.contains(t))
    }

    /// Borrow the segments in index order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Return `true` when no segments are indexed.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/index.rs"]
mod tests;
