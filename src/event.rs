//! Assignments extracted from the calendar feed (iCal `VEVENT` items)

use chrono::NaiveDate;

/// An assignment entry from the calendar feed.
///
/// Events are immutable once parsed from a given feed snapshot: a `Syncer` run never edits them,
/// it only decides whether to turn them into remote tasks.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Persistent, globally unique identifier for the calendar component (iCal `UID`).
    /// This is the key the import ledger deduplicates on.
    uid: String,

    /// The display name of the assignment (iCal `SUMMARY`)
    title: String,
    /// The assignment description (iCal `DESCRIPTION`), possibly empty
    description: String,

    /// The date the assignment appeared in the feed (iCal `DTSTART`, coerced to a date)
    start_date: NaiveDate,
    /// The due date (iCal `DUE` or `DTEND`), when the feed provides one
    due_date: Option<NaiveDate>,

    /// A link back to the assignment in the source service (iCal `URL`)
    url: Option<String>,
}

impl Event {
    pub fn new(
        uid: String,
        title: String,
        description: String,
        start_date: NaiveDate,
        due_date: Option<NaiveDate>,
        url: Option<String>,
    ) -> Self {
        Self {
            uid,
            title,
            description,
            start_date,
            due_date,
            url,
        }
    }

    pub fn uid(&self) -> &str { &self.uid }
    pub fn title(&self) -> &str { &self.title }
    pub fn description(&self) -> &str { &self.description }
    pub fn start_date(&self) -> NaiveDate { self.start_date }
    pub fn due_date(&self) -> Option<NaiveDate> { self.due_date }
    pub fn url(&self) -> Option<&str> { self.url.as_deref() }
}
