//! Calendar format boundary.
//!
//! The pipeline talks to the calendar format through [`CalendarCodec`] only:
//! parse a normalized feed into [`CalendarEvent`]s, and serialize a
//! [`MergedCalendar`] into bytes.
//!
//! - [`IcalendarCodec`] - production codec, parsing with the `icalendar` crate
//! - [`FixtureCodec`] - in-memory codec for tests

mod fixture;
mod ical;

pub use fixture::FixtureCodec;
pub use ical::IcalendarCodec;

use thiserror::Error;

use crate::event::CalendarEvent;
use crate::merge::MergedCalendar;

/// Errors raised by a codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The feed is not valid calendar text.
    #[error("invalid calendar data: {0}")]
    Parse(String),

    /// The calendar could not be written.
    #[error("failed to serialize calendar: {0}")]
    Serialize(String),
}

impl CodecError {
    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a serialization error.
    pub fn serialize(message: impl Into<String>) -> Self {
        Self::Serialize(message.into())
    }
}

/// Reads and writes calendar documents.
pub trait CalendarCodec: Send + Sync {
    /// Returns the codec name (e.g. "icalendar").
    fn name(&self) -> &str;

    /// Parses a normalized feed into its events, in document order.
    fn parse(&self, text: &str) -> Result<Vec<CalendarEvent>, CodecError>;

    /// Serializes a merged calendar.
    fn serialize(&self, calendar: &MergedCalendar) -> Result<Vec<u8>, CodecError>;
}
