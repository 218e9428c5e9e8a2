use std::slice::Iter;

/// Represent a range of time, from a start to an end, in seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    pub(crate) fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Returns the start time of the range
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the end time of the range
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns `true` if `pos` is inside that `[start, end)` range.
    pub fn contains(&self, pos: f64) -> bool {
        pos >= self.start && pos < self.end
    }
}

/// Snapshot of the non-contiguous time ranges currently buffered by the media element, in
/// seconds.
///
/// Such snapshot is only valid at the time it was obtained: it should be re-queried each time
/// buffered data is needed instead of being kept around.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeRanges {
    ranges: Vec<TimeRange>,
}

impl TimeRanges {
    /// Create a new empty `TimeRanges` object
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a `TimeRanges` object from a flat list of `[start, end, start, end...]` values, as
    /// communicated by the JavaScript-side.
    ///
    /// A trailing lone value is ignored.
    pub fn from_flat(flat: &[f64]) -> Self {
        let mut ranges = Self::new();
        for pair in flat.chunks_exact(2) {
            if let [start, end] = pair {
                ranges.add(*start, *end);
            }
        }
        ranges
    }

    /// Add a range of time to that `TimeRanges` object, merging it with the ranges that are
    /// already there.
    ///
    /// Empty or inverted ranges are ignored.
    pub fn add(&mut self, start: f64, end: f64) {
        if end <= start {
            return;
        }
        let mut new_range = TimeRange::new(start, end);
        let insert_idx = self
            .ranges
            .iter()
            .position(|r| r.end >= start)
            .unwrap_or(self.ranges.len());
        let mut merged_until = insert_idx;
        for range in self.ranges.iter().skip(insert_idx) {
            if range.start > new_range.end {
                break;
            }
            new_range.start = new_range.start.min(range.start);
            new_range.end = new_range.end.max(range.end);
            merged_until += 1;
        }
        self.ranges.drain(insert_idx..merged_until);
        self.ranges.insert(insert_idx, new_range);
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the range containing the given position.
    ///
    /// Returns `None` if no range in this `TimeRanges` object contains it.
    pub fn range_for(&self, pos: f64) -> Option<&TimeRange> {
        self.ranges.iter().find(|r| r.contains(pos))
    }

    /// Returns the first range starting strictly after the given position.
    pub fn next_range_after(&self, pos: f64) -> Option<&TimeRange> {
        self.ranges.iter().find(|r| r.start > pos)
    }
}

impl<'a> IntoIterator for &'a TimeRanges {
    type Item = &'a TimeRange;
    type IntoIter = Iter<'a, TimeRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}
