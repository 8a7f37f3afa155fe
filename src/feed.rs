//! A module to parse the iCal calendar feed into [`Event`]s

use chrono::NaiveDate;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;

use crate::error::FeedError;
use crate::Event;

/// Parse a raw calendar payload into the assignments it contains.
///
/// Every `VEVENT` yields exactly one [`Event`]. Entries that lack a `UID` or a usable `DTSTART`
/// are dropped with a warning, since they can neither be deduplicated nor filtered by date.
/// A payload that cannot be parsed as iCalendar at all is a fatal [`FeedError::Format`].
pub fn parse(payload: &str) -> Result<Vec<Event>, FeedError> {
    let reader = ical::IcalParser::new(payload.as_bytes());

    let mut events = Vec::new();
    let mut found_calendar = false;
    for calendar in reader {
        let calendar = match calendar {
            Err(err) => return Err(FeedError::Format(err.to_string())),
            Ok(cal) => cal,
        };
        found_calendar = true;

        for component in calendar.events {
            if let Some(event) = event_from_component(component) {
                events.push(event);
            }
        }
    }

    if found_calendar == false {
        return Err(FeedError::Format("payload contains no calendar".to_string()));
    }

    Ok(events)
}

fn event_from_component(component: IcalEvent) -> Option<Event> {
    let uid = match property_value(&component.properties, "UID") {
        Some(uid) => uid.to_string(),
        None => {
            log::warn!("Ignoring a feed entry that has no UID");
            return None;
        }
    };

    let start_date = match property_value(&component.properties, "DTSTART").and_then(parse_date) {
        Some(date) => date,
        None => {
            log::warn!("Ignoring feed entry {}: it has no usable start date", uid);
            return None;
        }
    };

    let title = property_value(&component.properties, "SUMMARY")
        .unwrap_or("(no title)")
        .to_string();
    let description = property_value(&component.properties, "DESCRIPTION")
        .unwrap_or_default()
        .to_string();

    let due_date = property_value(&component.properties, "DUE")
        .or_else(|| property_value(&component.properties, "DTEND"))
        .and_then(parse_date);

    let url = property_value(&component.properties, "URL").map(|u| u.to_string());

    Some(Event::new(uid, title, description, start_date, due_date, url))
}

fn property_value<'p>(properties: &'p [Property], name: &str) -> Option<&'p str> {
    properties
        .iter()
        .find(|prop| prop.name == name)
        .and_then(|prop| prop.value.as_deref())
}

/// Parse an iCal date or date-time value (`YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]`) into a date.
/// Feeds export assignments with either form; the time part is irrelevant to eligibility.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().get(..8)?;
    NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
}
