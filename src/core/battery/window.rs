use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Local, Timelike};

use crate::prelude::*;

/// Daily charging window in fractional local hours, for example: `23-4.5`.
///
/// The start is inclusive, and the end is exclusive. The window wraps past midnight when it ends
/// before it starts.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChargeWindow {
    pub start: f64,
    pub end: f64,
}

impl ChargeWindow {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        for hour in [start, end] {
            ensure!((0.0..24.0).contains(&hour), "`{hour}` is not an hour of the day");
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn contains(self, at: DateTime<Local>) -> bool {
        let hour = f64::from(at.hour())
            + f64::from(at.minute()) / 60.0
            + f64::from(at.second()) / 3600.0;
        if self.start <= self.end {
            (self.start..self.end).contains(&hour)
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

impl FromStr for ChargeWindow {
    type Err = Error;

    fn from_str(window: &str) -> Result<Self> {
        let (start, end) =
            window.split_once('-').with_context(|| format!("`{window}` is not `<start>-<end>`"))?;
        Self::new(
            start.trim().parse().with_context(|| format!("invalid start hour `{start}`"))?,
            end.trim().parse().with_context(|| format!("invalid end hour `{end}`"))?,
        )
    }
}

impl Display for ChargeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
    }

    #[test]
    fn parse_ok() -> Result {
        assert_eq!("0-5".parse::<ChargeWindow>()?, ChargeWindow { start: 0.0, end: 5.0 });
        assert_eq!("23.5-4".parse::<ChargeWindow>()?, ChargeWindow { start: 23.5, end: 4.0 });
        Ok(())
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert!("0-24".parse::<ChargeWindow>().is_err());
        assert!("-1-5".parse::<ChargeWindow>().is_err());
        assert!("5".parse::<ChargeWindow>().is_err());
        assert!("a-b".parse::<ChargeWindow>().is_err());
    }

    #[test]
    fn contains_ok() {
        let window = ChargeWindow { start: 0.0, end: 5.0 };
        assert!(window.contains(at(0, 0)));
        assert!(window.contains(at(4, 59)));
        assert!(!window.contains(at(5, 0)));
        assert!(!window.contains(at(12, 0)));
    }

    #[test]
    fn contains_fractional_ok() {
        let window = ChargeWindow { start: 0.5, end: 4.5 };
        assert!(!window.contains(at(0, 0)));
        assert!(window.contains(at(0, 30)));
        assert!(window.contains(at(4, 0)));
        assert!(!window.contains(at(4, 30)));
    }

    #[test]
    fn wraps_past_midnight() {
        let window = ChargeWindow { start: 23.0, end: 4.0 };
        assert!(window.contains(at(23, 30)));
        assert!(window.contains(at(0, 0)));
        assert!(window.contains(at(3, 30)));
        assert!(!window.contains(at(4, 0)));
        assert!(!window.contains(at(22, 59)));
    }
}
