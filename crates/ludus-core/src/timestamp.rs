use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::layout::{Field, FieldKind, Layout, LayoutError, LayoutValue, Record, Value};

/// A point in time (to the nanosecond) or a duration, matching
/// `includes/surena/util/timestamp.h`'s `timestamp` struct.
///
/// Grounded directly in the original as a two-field record
/// (`time: u64` seconds, `fraction: u32` nanoseconds); the original also
/// exports this type through its own `serialization_layout`
/// (`extern const serialization_layout sl_timestamp[];`), which is why
/// `Timestamp` implements [`crate::layout::LayoutValue`] below rather than
/// only deriving `serde`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub secs: u64,
    pub fraction_ns: u32,
}

/// Largest valid nanosecond fraction (`TIMESTAMP_MAX_FRACTION`).
pub const MAX_FRACTION_NS: u32 = 999_999_999;

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp {
        secs: 0,
        fraction_ns: 0,
    };

    pub fn new(secs: u64, fraction_ns: u32) -> Self {
        debug_assert!(fraction_ns <= MAX_FRACTION_NS);
        Self {
            secs,
            fraction_ns: fraction_ns.min(MAX_FRACTION_NS),
        }
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let dur = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::new(dur.as_secs(), dur.subsec_nanos())
    }

    /// Absolute difference between two timestamps, as a duration.
    pub fn diff(a: Timestamp, b: Timestamp) -> Timestamp {
        let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
        if hi.fraction_ns >= lo.fraction_ns {
            Timestamp::new(hi.secs - lo.secs, hi.fraction_ns - lo.fraction_ns)
        } else {
            Timestamp::new(
                hi.secs - lo.secs - 1,
                hi.fraction_ns + 1_000_000_000 - lo.fraction_ns,
            )
        }
    }

    /// `self + other`, treating `other` as a duration.
    pub fn add(self, other: Timestamp) -> Timestamp {
        let mut secs = self.secs + other.secs;
        let mut frac = self.fraction_ns + other.fraction_ns;
        if frac > MAX_FRACTION_NS {
            frac -= 1_000_000_000;
            secs += 1;
        }
        Timestamp::new(secs, frac)
    }
}

static TIMESTAMP_LAYOUT: Layout = Layout::new(&[
    Field::required(FieldKind::U64),
    Field::required(FieldKind::U32),
]);

impl LayoutValue for Timestamp {
    fn layout() -> &'static Layout {
        &TIMESTAMP_LAYOUT
    }

    fn to_record(&self) -> Record {
        vec![Value::U64(self.secs), Value::U32(self.fraction_ns)]
    }

    fn from_record(record: Record) -> Result<Self, LayoutError> {
        let mut fields = record.into_iter();
        let secs = match fields.next() {
            Some(Value::U64(v)) => v,
            _ => return Err(LayoutError::ShapeMismatch(0)),
        };
        let fraction_ns = match fields.next() {
            Some(Value::U32(v)) => v,
            _ => return Err(LayoutError::ShapeMismatch(1)),
        };
        Ok(Timestamp::new(secs, fraction_ns))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.secs, self.fraction_ns).cmp(&(other.secs, other.fraction_ns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_is_symmetric_and_absolute() {
        let a = Timestamp::new(10, 500);
        let b = Timestamp::new(7, 900_000_000);
        assert_eq!(Timestamp::diff(a, b), Timestamp::diff(b, a));
    }

    #[test]
    fn diff_borrows_a_second_on_fraction_underflow() {
        let a = Timestamp::new(10, 100);
        let b = Timestamp::new(9, 999_999_999);
        let d = Timestamp::diff(a, b);
        assert_eq!(d.secs, 0);
        assert_eq!(d.fraction_ns, 101);
    }

    #[test]
    fn add_carries_into_seconds() {
        let a = Timestamp::new(1, 900_000_000);
        let b = Timestamp::new(0, 200_000_000);
        let sum = a.add(b);
        assert_eq!(sum.secs, 2);
        assert_eq!(sum.fraction_ns, 100_000_000);
    }

    #[test]
    fn ordering_compares_seconds_then_fraction() {
        assert!(Timestamp::new(5, 0) < Timestamp::new(5, 1));
        assert!(Timestamp::new(4, 999_999_999) < Timestamp::new(5, 0));
    }

    #[test]
    fn layout_value_roundtrips_through_the_wire() {
        let original = Timestamp::new(1_700_000_000, 123_456_789);
        let bytes = crate::layout::serialize(Timestamp::layout(), &original.to_record()).unwrap();
        let (record, consumed) = crate::layout::deserialize(Timestamp::layout(), &bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(Timestamp::from_record(record).unwrap(), original);
    }
}
