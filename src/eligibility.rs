//! The date-based rule that decides which assignments are old enough to import.
//!
//! School feeds retroactively edit near-term entries (due dates get rescheduled, assignments get
//! renamed), so importing an event as soon as it appears would mean importing data that is still
//! in flux. Instead, an event only becomes eligible once its start date has fallen behind the
//! first day of the previous month, i.e. roughly one to two months behind "now". By then the
//! entry has stabilized in the source feed.
//!
//! These functions are pure: they never consult the import ledger, which is the separate
//! responsibility of the dedupe stage (see [`crate::Syncer`]).

use chrono::{Datelike, NaiveDate};

use crate::Event;

/// The first day of the month preceding the month containing `today`.
///
/// Events starting strictly before this date are eligible for import.
pub fn cutoff(today: NaiveDate) -> NaiveDate {
    let (year, month) = match today.month() {
        1 => (today.year() - 1, 12),
        m => (today.year(), m - 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap(/* the first of a month always exists */)
}

/// Whether `event` is due for import, given a cutoff computed once per run.
///
/// The inequality is strict: an event starting exactly on the cutoff day is not eligible yet.
pub fn is_eligible(cutoff: NaiveDate, event: &Event) -> bool {
    event.start_date() < cutoff
}
