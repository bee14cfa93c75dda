//! Time slot planning: decomposition of a date range into contiguous
//! equal-duration sub-intervals.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, MosaicResult};

/// One contiguous sub-interval of the requested date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeSlot {
    /// Create a slot; start must be strictly before end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> MosaicResult<Self> {
        if start >= end {
            return Err(MosaicError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

/// Divide `[start, end]` into `n` contiguous, equal-duration slots.
///
/// Slot boundaries are shared endpoints: slot i ends exactly where slot i+1
/// begins, with no gap and no overlap. Each boundary is truncated to
/// calendar-date granularity, so slot durations can differ by up to a day.
/// `n == 1` returns the single `(start, end)` slot verbatim.
pub fn split_interval(start: NaiveDate, end: NaiveDate, n: usize) -> MosaicResult<Vec<TimeSlot>> {
    if n < 1 {
        return Err(MosaicError::InvalidPeriods(n));
    }
    if start >= end {
        return Err(MosaicError::InvalidInterval {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    if n == 1 {
        return Ok(vec![TimeSlot { start, end }]);
    }

    // Divide at sub-day precision, then truncate each edge to its date, the
    // way the interval would fall apart under timedelta division.
    let start_dt: NaiveDateTime = start.and_time(NaiveTime::MIN);
    let end_dt: NaiveDateTime = end.and_time(NaiveTime::MIN);
    let total = end_dt - start_dt;

    let edges: Vec<NaiveDate> = (0..=n)
        .map(|i| (start_dt + total * i as i32 / n as i32).date())
        .collect();

    Ok(edges
        .windows(2)
        .map(|pair| TimeSlot {
            start: pair[0],
            end: pair[1],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_period_verbatim() {
        let slots = split_interval(date(2020, 10, 5), date(2021, 12, 7), 1).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, date(2020, 10, 5));
        assert_eq!(slots[0].end, date(2021, 12, 7));
    }

    #[test]
    fn test_slots_are_contiguous() {
        let slots = split_interval(date(2020, 10, 5), date(2021, 12, 7), 3).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start, date(2020, 10, 5));
        assert_eq!(slots[2].end, date(2021, 12, 7));
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_equal_duration_split() {
        let slots = split_interval(date(2020, 1, 1), date(2020, 1, 7), 3).unwrap();
        assert_eq!(slots[0], TimeSlot { start: date(2020, 1, 1), end: date(2020, 1, 3) });
        assert_eq!(slots[1], TimeSlot { start: date(2020, 1, 3), end: date(2020, 1, 5) });
        assert_eq!(slots[2], TimeSlot { start: date(2020, 1, 5), end: date(2020, 1, 7) });
    }

    #[test]
    fn test_reversed_interval_rejected() {
        assert!(split_interval(date(2021, 1, 1), date(2020, 1, 1), 2).is_err());
        assert!(split_interval(date(2020, 1, 1), date(2020, 1, 1), 2).is_err());
    }

    #[test]
    fn test_zero_periods_rejected() {
        assert!(split_interval(date(2020, 1, 1), date(2020, 2, 1), 0).is_err());
    }
}
