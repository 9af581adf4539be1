//! In-memory codec for tests.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::{CalendarCodec, CodecError};
use crate::event::CalendarEvent;
use crate::merge::MergedCalendar;
use crate::normalize::normalize_line_endings;

/// A codec that knows a fixed set of feeds.
///
/// Each registered feed text parses to the events it was registered with;
/// any other text is a parse error. Feed texts are matched after line-ending
/// normalization, the same form the pipeline hands to a codec.
///
/// Serialization writes one content line per property, wrapped in
/// `BEGIN:VEVENT`/`END:VEVENT`, after an `X-WR-CALNAME` header line.
#[derive(Debug, Clone, Default)]
pub struct FixtureCodec {
    feeds: HashMap<String, Vec<CalendarEvent>>,
}

impl FixtureCodec {
    /// Creates a codec with no known feeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a feed.
    #[must_use]
    pub fn with_feed(mut self, text: &str, events: Vec<CalendarEvent>) -> Self {
        self.feeds.insert(normalize_line_endings(text), events);
        self
    }
}

impl CalendarCodec for FixtureCodec {
    fn name(&self) -> &str {
        "fixture"
    }

    fn parse(&self, text: &str) -> Result<Vec<CalendarEvent>, CodecError> {
        self.feeds
            .get(text)
            .cloned()
            .ok_or_else(|| CodecError::parse(format!("unknown fixture feed ({} bytes)", text.len())))
    }

    fn serialize(&self, calendar: &MergedCalendar) -> Result<Vec<u8>, CodecError> {
        let mut out = String::new();
        writeln!(out, "X-WR-CALNAME:{}", calendar.name())
            .map_err(|e| CodecError::serialize(e.to_string()))?;
        for event in calendar.events() {
            out.push_str("BEGIN:VEVENT\n");
            for property in event.properties() {
                writeln!(out, "{}", property).map_err(|e| CodecError::serialize(e.to_string()))?;
            }
            out.push_str("END:VEVENT\n");
        }
        Ok(out.into_bytes())
    }
}
