//! iCalendar (RFC 5545) codec.
//!
//! Feeds are unfolded and parsed with the `icalendar` crate's parser.
//! Output is written line by line: every property value goes out exactly
//! as it is stored on the event, so feed text is never escaped a second time
//! and nothing is added to an event (no generated `UID` or `DTSTAMP`).
//! Serializing the same calendar twice yields the same bytes.

use icalendar::parser::{Component as ParsedComponent, read_calendar, unfold};
use tracing::debug;

use super::{CalendarCodec, CodecError};
use crate::event::{CalendarEvent, EventProperty, Subcomponent, escape_text};
use crate::merge::MergedCalendar;

/// `PRODID` of every written calendar.
pub const PRODUCT_ID: &str = "-//trc.yoga//trcyoga//EN";

/// Content lines longer than this many octets are folded.
const MAX_LINE_OCTETS: usize = 75;

/// Codec for standard `.ics` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct IcalendarCodec;

impl IcalendarCodec {
    /// Creates a new codec.
    pub fn new() -> Self {
        Self
    }
}

impl CalendarCodec for IcalendarCodec {
    fn name(&self) -> &str {
        "icalendar"
    }

    fn parse(&self, text: &str) -> Result<Vec<CalendarEvent>, CodecError> {
        let starts_calendar = text
            .lines()
            .find(|line| !line.trim().is_empty())
            .is_some_and(|line| line.trim().eq_ignore_ascii_case("BEGIN:VCALENDAR"));
        if !starts_calendar {
            return Err(CodecError::parse("document does not begin with BEGIN:VCALENDAR"));
        }

        let unfolded = unfold(text);
        let calendar = read_calendar(&unfolded).map_err(CodecError::parse)?;

        let events: Vec<CalendarEvent> = calendar
            .components
            .iter()
            .filter(|component| is_named(component, "VEVENT"))
            .map(|component| {
                CalendarEvent::from_parts(
                    convert_properties(component),
                    component.components.iter().map(convert_component).collect(),
                )
            })
            .collect();

        debug!(count = events.len(), "Parsed events from ICS");
        Ok(events)
    }

    fn serialize(&self, merged: &MergedCalendar) -> Result<Vec<u8>, CodecError> {
        let mut out = String::new();
        push_line(&mut out, "BEGIN:VCALENDAR");
        push_line(&mut out, "VERSION:2.0");
        push_line(&mut out, &format!("PRODID:{}", PRODUCT_ID));
        push_line(&mut out, &format!("X-WR-CALNAME:{}", escape_text(merged.name())));

        for event in merged.events() {
            push_component(&mut out, "VEVENT", event.properties(), event.components());
        }

        push_line(&mut out, "END:VCALENDAR");
        Ok(out.into_bytes())
    }
}

fn is_named(component: &ParsedComponent<'_>, name: &str) -> bool {
    component.name.to_string().eq_ignore_ascii_case(name)
}

fn convert_properties(component: &ParsedComponent<'_>) -> Vec<EventProperty> {
    component
        .properties
        .iter()
        .map(|prop| EventProperty {
            name: prop.name.to_string().to_ascii_uppercase(),
            params: prop
                .params
                .iter()
                .map(|param| {
                    (
                        param.key.to_string().to_ascii_uppercase(),
                        param.val.as_ref().map(|v| v.to_string()),
                    )
                })
                .collect(),
            value: prop.val.to_string(),
        })
        .collect()
}

fn convert_component(component: &ParsedComponent<'_>) -> Subcomponent {
    Subcomponent {
        name: component.name.to_string().to_ascii_uppercase(),
        properties: convert_properties(component),
        components: component.components.iter().map(convert_component).collect(),
    }
}

fn push_component(
    out: &mut String,
    name: &str,
    properties: &[EventProperty],
    components: &[Subcomponent],
) {
    push_line(out, &format!("BEGIN:{}", name));
    for property in properties {
        push_line(out, &property.to_string());
    }
    for component in components {
        push_component(out, &component.name, &component.properties, &component.components);
    }
    push_line(out, &format!("END:{}", name));
}

/// Appends `line` with CRLF, folding it so no physical line exceeds
/// [`MAX_LINE_OCTETS`]. Folds never split a UTF-8 sequence.
fn push_line(out: &mut String, line: &str) {
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out.push_str("\r\n");
}
