//! Keyword filtering and location enrichment.
//!
//! A location's feed usually mixes every class it offers. Only events whose
//! summary or description mentions the keyword are kept, and each kept event
//! is tagged with the location it came from.

use std::sync::Arc;

use crate::event::{CalendarEvent, DESCRIPTION, SUMMARY};
use crate::location::Location;

/// Keyword used when none is configured.
pub const DEFAULT_KEYWORD: &str = "yoga";

/// Case-insensitive substring filter over summary and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    keyword: String,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD)
    }
}

impl EventFilter {
    /// Creates a filter for the given keyword.
    pub fn new(keyword: impl AsRef<str>) -> Self {
        Self {
            keyword: keyword.as_ref().to_lowercase(),
        }
    }

    /// Returns the lower-cased keyword.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns true if the summary or description contains the keyword.
    ///
    /// Missing properties count as empty text.
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        let summary = event.text(SUMMARY).unwrap_or_default().to_lowercase();
        let description = event.text(DESCRIPTION).unwrap_or_default().to_lowercase();
        summary.contains(&self.keyword) || description.contains(&self.keyword)
    }

    /// Keeps matching events, preserving their relative order.
    pub fn filter(&self, events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
        events.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// Tags an event with its source location.
///
/// Appends the location name as a category, then overwrites the event
/// location with the address.
pub fn enrich_event(event: CalendarEvent, location: &Location) -> CalendarEvent {
    event
        .with_category(&location.name)
        .with_location(&location.address)
}

/// Filters one location's events and enriches the survivors.
///
/// The result is shared read-only by every merged calendar that includes
/// this location.
pub fn filter_and_enrich(
    events: Vec<CalendarEvent>,
    filter: &EventFilter,
    location: &Location,
) -> Vec<Arc<CalendarEvent>> {
    filter
        .filter(events)
        .into_iter()
        .map(|event| Arc::new(enrich_event(event, location)))
        .collect()
}
