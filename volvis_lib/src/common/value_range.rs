use std::ops::Range;

/// Closed interval of observed values.
///
/// Used for raw sample ranges of volumes and for the coordinate and
/// function value ranges of landscape nodes.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ValueRange {
    /// Lower bound
    pub low: f32,
    /// Upper bound
    pub high: f32,
}

impl ValueRange {
    /// Constructs new, empty range.
    pub fn empty() -> ValueRange {
        ValueRange {
            low: f32::NAN,
            high: f32::NAN,
        }
    }

    /// Constructs new range with one element, `val`.
    pub fn seed(val: f32) -> ValueRange {
        ValueRange {
            low: val,
            high: val,
        }
    }

    /// Constructs minimal range containing all samples of an iterator.
    pub fn from_samples<I>(iter: I) -> ValueRange
    where
        I: IntoIterator,
        I::Item: Into<f32>,
    {
        let mut range = ValueRange::empty();
        for val in iter {
            range.extend(val.into());
        }
        range
    }

    /// Extend the range with new value.
    pub fn extend(&mut self, val: f32) {
        if self.is_empty() {
            self.low = val;
            self.high = val;
        }

        if val > self.high {
            self.high = val;
        }

        if val < self.low {
            self.low = val;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_nan() || self.high.is_nan()
    }

    /// Check if value is inside the range.
    pub fn contains(&self, val: f32) -> bool {
        self.low <= val && val <= self.high
    }

    /// `high - low`, zero for empty range
    pub fn span(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.high - self.low
        }
    }

    /// Span usable as a divisor.
    /// Degenerate ranges report 1 so that normalization never produces NaN.
    pub fn span_or_one(&self) -> f32 {
        let span = self.span();
        if span == 0.0 {
            1.0
        } else {
            span
        }
    }

    /// Map `val` into `[0,1]` relative to the range (unclamped).
    pub fn normalize(&self, val: f32) -> f32 {
        let low = if self.is_empty() { 0.0 } else { self.low };
        (val - low) / self.span_or_one()
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::empty()
    }
}

/// Conversion from standard library type.
/// Unlocks simple syntax:
/// ```
/// # use volvis_lib::common::ValueRange;
/// let range: ValueRange = (0.0..45.5).into();
/// ```
impl From<Range<f32>> for ValueRange {
    fn from(range: Range<f32>) -> Self {
        ValueRange {
            low: range.start,
            high: range.end,
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn value_range() {
        let values = [0.0, 5.0, 3.0, -2.5];

        let mut range = ValueRange::seed(1.0);

        assert!(range.contains(1.0));
        assert!(!range.contains(1.2));
        assert!(!range.contains(0.9));

        for val in values {
            range.extend(val);
        }

        assert_eq!(range.low, -2.5);
        assert_eq!(range.high, 5.0);

        assert!(range.contains(4.2));
        assert!(range.contains(-0.5));
        assert!(!range.contains(-12.5));
    }

    #[test]
    fn empty_value_range() {
        let mut range = ValueRange::empty();

        assert!(range.is_empty());
        assert!(!range.contains(2.0));
        assert_eq!(range.span(), 0.0);

        range.extend(2.0);

        assert!(range.contains(2.0));
        assert_eq!(range.low, 2.0);
        assert_eq!(range.high, 2.0);
    }

    #[test]
    fn from_samples() {
        // Samples do not have to be floating point
        let samples = [1u8, 2, 4, 10, 5, 0];

        let range = ValueRange::from_samples(samples);

        assert_eq!(
            range,
            ValueRange {
                low: 0.0,
                high: 10.0
            }
        )
    }

    #[test]
    fn degenerate_span_guard() {
        let range = ValueRange::seed(5.0);
        assert_eq!(range.span(), 0.0);
        assert_eq!(range.span_or_one(), 1.0);
        assert_eq!(range.normalize(5.0), 0.0);

        let range: ValueRange = (2.0..6.0).into();
        assert_eq!(range.normalize(4.0), 0.5);
    }
}
