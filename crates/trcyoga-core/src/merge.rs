//! Merged calendars and their output names.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::event::CalendarEvent;

/// Display name of every merged calendar unless configured otherwise.
pub const DEFAULT_CALENDAR_NAME: &str = "Triangle Rock Club Yoga";

/// File extension of output objects.
pub const OUTPUT_EXTENSION: &str = "ical";

/// Joins member short names in an output file name.
pub const SUBSET_SEPARATOR: char = '_';

/// Filtered, enriched events keyed by location short name.
///
/// Keys iterate in lexicographic order.
pub type EventsByLocation = BTreeMap<String, Vec<Arc<CalendarEvent>>>;

/// The events of one subset of locations, ready to be serialized.
#[derive(Debug, Clone)]
pub struct MergedCalendar {
    name: String,
    members: Vec<String>,
    events: Vec<Arc<CalendarEvent>>,
}

impl MergedCalendar {
    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the member short names in merge order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns the events in merge order.
    pub fn events(&self) -> &[Arc<CalendarEvent>] {
        &self.events
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no member contributed an event.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Builds the merged calendar for one subset.
///
/// Events are concatenated in subset order (all of the first location's
/// events, then the second's, ...) without re-sorting. A key with no entry in
/// `events` contributes nothing. Events are shared, not copied.
pub fn build_calendar(
    events: &EventsByLocation,
    subset: &[String],
    name: impl Into<String>,
) -> MergedCalendar {
    let merged = subset
        .iter()
        .filter_map(|key| events.get(key))
        .flat_map(|list| list.iter().cloned())
        .collect();

    MergedCalendar {
        name: name.into(),
        members: subset.to_vec(),
        events: merged,
    }
}

/// Returns `<sorted keys joined with _>.ical` for a subset.
///
/// The name depends only on the member set, not on member order.
pub fn subset_file_name<S: AsRef<str>>(subset: &[S]) -> String {
    let mut keys: Vec<&str> = subset.iter().map(AsRef::as_ref).collect();
    keys.sort_unstable();
    let separator = SUBSET_SEPARATOR.to_string();
    format!("{}.{}", keys.join(separator.as_str()), OUTPUT_EXTENSION)
}

/// Returns the object key `<folder>/<file name>` for a subset.
///
/// Trailing slashes on `folder` are ignored; an empty folder yields the bare
/// file name.
pub fn output_key<S: AsRef<str>>(folder: &str, subset: &[S]) -> String {
    let folder = folder.trim_end_matches('/');
    let file_name = subset_file_name(subset);
    if folder.is_empty() {
        file_name
    } else {
        format!("{}/{}", folder, file_name)
    }
}
