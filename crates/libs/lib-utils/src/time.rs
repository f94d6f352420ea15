//! # Time Utilities
//!
//! Calendar arithmetic on `chrono` dates.

use chrono::{Datelike, NaiveDate};

/// Whole calendar years elapsed from `from` to `to` (negative if `to` is earlier).
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}
