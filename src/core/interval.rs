use std::fmt::{Debug, Display, Formatter};

use chrono::{DateTime, Local, TimeDelta};

use crate::{error::ReconcileError, quantity::time::Hours};

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Local>,

    /// Exclusive.
    pub end: DateTime<Local>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start.format("%F %R"), self.end.format("%F %R"))
    }
}

impl Interval {
    pub const fn new(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self { start, end }
    }

    /// Build the interval making sure it is not empty.
    pub fn try_new(start: DateTime<Local>, end: DateTime<Local>) -> Result<Self, ReconcileError> {
        let this = Self::new(start, end);
        if start < end { Ok(this) } else { Err(ReconcileError::InvertedInterval(this)) }
    }

    pub const fn with_start(mut self, start: DateTime<Local>) -> Self {
        self.start = start;
        self
    }

    pub const fn with_end(mut self, end: DateTime<Local>) -> Self {
        self.end = end;
        self
    }

    #[must_use]
    pub fn duration(self) -> TimeDelta {
        self.end - self.start
    }

    pub fn hours(self) -> Hours {
        Hours::from(self.duration())
    }

    #[must_use]
    pub fn contains(self, other: DateTime<Local>) -> bool {
        (self.start <= other) && (other < self.end)
    }

    /// Check whether the other interval lies entirely within this one.
    #[must_use]
    pub fn covers(self, other: Self) -> bool {
        (self.start <= other.start) && (other.end <= self.end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn try_new_rejects_empty() {
        assert!(Interval::try_new(at(1), at(2)).is_ok());
        assert!(matches!(
            Interval::try_new(at(2), at(2)),
            Err(ReconcileError::InvertedInterval(_))
        ));
        assert!(Interval::try_new(at(3), at(2)).is_err());
    }

    #[test]
    fn contains_is_half_open() {
        let interval = Interval::new(at(1), at(2));
        assert!(interval.contains(at(1)));
        assert!(!interval.contains(at(2)));
    }

    #[test]
    fn covers_ok() {
        let outer = Interval::new(at(1), at(4));
        assert!(outer.covers(Interval::new(at(1), at(4))));
        assert!(outer.covers(Interval::new(at(2), at(3))));
        assert!(!outer.covers(Interval::new(at(0), at(2))));
        assert!(!outer.covers(Interval::new(at(3), at(5))));
    }

    #[test]
    fn hours_ok() {
        assert_eq!(Interval::new(at(1), at(4)).hours(), Hours(3.0));
    }
}
