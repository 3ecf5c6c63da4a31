//! # Store Calendar
//!
//! Decides which calendar day "now" falls on for the pharmacy.
//!
//! ## Why Not Just UTC?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store at UTC+05:45, bill printed 00:30 local on 20 Oct                 │
//! │                                                                         │
//! │  UTC clock:   2026-10-19T18:45Z   → would number it INV20261019xxxx    │
//! │  Store clock: 2026-10-20 00:30    → numbers it INV20261020xxxx  ✓      │
//! │                                                                         │
//! │  Invoice prefixes, "today's sales" and expiry cut-offs all follow the  │
//! │  store clock. Stored timestamps stay UTC.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Largest offset accepted, in minutes (UTC±14:00).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// A fixed UTC offset used for store-local dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCalendar {
    utc_offset_minutes: i32,
}

impl StoreCalendar {
    /// Calendar that treats UTC as local time.
    pub const UTC: StoreCalendar = StoreCalendar {
        utc_offset_minutes: 0,
    };

    /// Creates a calendar from an offset in minutes east of UTC.
    ///
    /// ```rust
    /// use medora_core::StoreCalendar;
    ///
    /// assert!(StoreCalendar::from_offset_minutes(345).is_ok()); // UTC+05:45
    /// assert!(StoreCalendar::from_offset_minutes(20 * 60).is_err());
    /// ```
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, ValidationError> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(ValidationError::OutOfRange {
                field: "utc_offset_minutes".to_string(),
                min: -MAX_OFFSET_MINUTES as i64,
                max: MAX_OFFSET_MINUTES as i64,
            });
        }

        Ok(StoreCalendar {
            utc_offset_minutes: minutes,
        })
    }

    /// Offset in minutes east of UTC.
    pub fn offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// The store-local date of an instant.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset()).date_naive()
    }

    /// UTC bounds `[start, end)` of a store-local day.
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc_midnight = local_midnight - Duration::minutes(self.utc_offset_minutes as i64);
        let start = DateTime::<Utc>::from_naive_utc_and_offset(utc_midnight, Utc);
        (start, start + Duration::days(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_date_rolls_over_with_offset() {
        let calendar = StoreCalendar::from_offset_minutes(345).unwrap();
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 18, 45, 0).unwrap();

        assert_eq!(
            calendar.local_date(instant),
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
        );
        assert_eq!(
            StoreCalendar::UTC.local_date(instant),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
    }

    #[test]
    fn test_day_bounds() {
        let calendar = StoreCalendar::from_offset_minutes(345).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let (start, end) = calendar.day_bounds(date);

        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 19, 18, 15, 0).unwrap());
        assert_eq!(end - start, Duration::days(1));
        assert_eq!(calendar.local_date(start), date);
    }

    #[test]
    fn test_negative_offset() {
        let calendar = StoreCalendar::from_offset_minutes(-300).unwrap();
        let instant = Utc.with_ymd_and_hms(2026, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(
            calendar.local_date(instant),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }
}
