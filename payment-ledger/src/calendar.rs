//! Reporting calendar
//!
//! Converts timestamps into canonical `YYYY-MM-DD` day strings in one fixed
//! reporting timezone. Payments are tagged with their report-day at creation
//! and settlement defaults to "today" under the same rule, so both sides of
//! the system group by identical day boundaries.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Default reporting offset: UTC+05:30 (Indian Standard Time).
pub const DEFAULT_OFFSET_MINUTES: i32 = 330;

/// Fixed-offset reporting calendar.
///
/// Pure given a timestamp and offset; construction is the only place a
/// degraded path exists (invalid configured offset falls back to the local
/// system offset, logged at `warn`).
#[derive(Debug, Clone, Copy)]
pub struct ReportCalendar {
    offset: FixedOffset,
}

impl ReportCalendar {
    /// Build a calendar from a UTC offset in minutes.
    ///
    /// An out-of-range offset cannot be an error here (day derivation must
    /// not fail); it falls back to the local system offset and logs the
    /// degradation.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        match minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
        {
            Some(offset) => Self { offset },
            None => {
                let local = Local::now().offset().fix();
                tracing::warn!(
                    requested_minutes = minutes,
                    fallback_offset = %local,
                    "invalid reporting offset, falling back to local timezone"
                );
                Self { offset: local }
            }
        }
    }

    /// The offset this calendar reports in.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Canonical day string for a timestamp, `None` if the timestamp is
    /// outside the representable range. Pure: equal inputs give equal days.
    pub fn checked_day_string(&self, ts: i64) -> Option<String> {
        DateTime::from_timestamp(ts, 0).map(|dt| {
            dt.with_timezone(&self.offset)
                .date_naive()
                .format("%Y-%m-%d")
                .to_string()
        })
    }

    /// Canonical day string for a timestamp (unix seconds), or for the
    /// current time when absent or unrepresentable.
    pub fn day_string(&self, ts: Option<i64>) -> String {
        let ts = ts.unwrap_or_else(|| Utc::now().timestamp());
        let dt = DateTime::from_timestamp(ts, 0).unwrap_or_else(Utc::now);
        dt.with_timezone(&self.offset)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string()
    }
}

impl Default for ReportCalendar {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_OFFSET_MINUTES)
    }
}
