//! Time-of-day model.
//!
//! The vehicle operates on a 24-hour clock measured in whole-or-fractional
//! minutes since midnight.  Advancing past 23:59 wraps to the next day; the
//! number of wraps is tracked so elapsed time stays monotonic for reporting.

use std::fmt;

/// Minutes in one day; the clock wraps at this value.
pub const MINUTES_PER_DAY: f64 = 1_440.0;

/// Current time of day plus the number of completed days.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockTime {
    /// Minutes since midnight, always in `[0, 1440)`.
    minute: f64,
    /// Completed days since the clock was created.
    pub day: u32,
}

impl ClockTime {
    /// Clock at `minute` past midnight on day 0.  Out-of-range values wrap.
    pub fn new(minute: f64) -> Self {
        let mut clock = Self { minute: 0.0, day: 0 };
        clock.advance_minutes(minute);
        clock.day = 0;
        clock
    }

    #[inline]
    pub fn minute_of_day(&self) -> f64 {
        self.minute
    }

    /// Hour of day, `0..24`.
    #[inline]
    pub fn hour(&self) -> usize {
        ((self.minute / 60.0).floor() as usize).min(23)
    }

    /// Minutes elapsed inside the current hour.
    #[inline]
    pub fn minute_of_hour(&self) -> f64 {
        self.minute - self.hour() as f64 * 60.0
    }

    /// Advance by `minutes` (negative values are ignored).
    pub fn advance_minutes(&mut self, minutes: f64) {
        if minutes.is_nan() || minutes <= 0.0 {
            return;
        }
        let total = self.minute + minutes;
        let wraps = (total / MINUTES_PER_DAY).floor();
        self.minute = total - wraps * MINUTES_PER_DAY;
        self.day += wraps as u32;
    }

    #[inline]
    pub fn advance_hours(&mut self, hours: u32) {
        self.advance_minutes(hours as f64 * 60.0);
    }

    /// Total minutes since day 0 midnight.
    #[inline]
    pub fn elapsed_minutes(&self) -> f64 {
        self.day as f64 * MINUTES_PER_DAY + self.minute
    }
}

impl fmt::Display for ClockTime {
    /// Military time, e.g. `07:05`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.minute.floor() as u32;
        write!(f, "{:02}:{:02}", whole / 60, whole % 60)
    }
}
