//! Calendar event values.
//!
//! A [`CalendarEvent`] keeps the content lines of one `VEVENT` exactly as the
//! feed delivered them, nested components such as `VALARM` included, so an
//! event written back out keeps its original identity (UID, times,
//! recurrence rules, ...).
//!
//! Values are stored in wire form and written out unchanged. The text
//! builders ([`CalendarEvent::with_location`], [`CalendarEvent::with_category`],
//! ...) escape their argument when they store it, and [`CalendarEvent::text`]
//! unescapes on read.
//!
//! Events are values: enrichment produces a new event instead of mutating
//! the parsed one, and merged calendars share enriched events behind an
//! [`Arc`](std::sync::Arc).

use std::fmt;

/// The `CATEGORIES` property name.
pub const CATEGORIES: &str = "CATEGORIES";
/// The `DESCRIPTION` property name.
pub const DESCRIPTION: &str = "DESCRIPTION";
/// The `LOCATION` property name.
pub const LOCATION: &str = "LOCATION";
/// The `SUMMARY` property name.
pub const SUMMARY: &str = "SUMMARY";
/// The `UID` property name.
pub const UID: &str = "UID";

/// One content line of an event, e.g. `DTSTART;TZID=America/New_York:20250205T100000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventProperty {
    /// Property name, upper-cased.
    pub name: String,
    /// Parameters in source order. A parameter without `=` has no value.
    pub params: Vec<(String, Option<String>)>,
    /// Raw (escaped) value.
    pub value: String,
}

impl EventProperty {
    /// Creates a property without parameters. The value is stored as given.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: value.into(),
        }
    }

    /// Builder method to append a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.params.push((key.into().to_ascii_uppercase(), value));
        self
    }

    /// Returns true if this property has the given name (case-insensitive).
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for EventProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.params {
            match value {
                // Parameter values holding a delimiter must be quoted.
                Some(value) if needs_quotes(value) => write!(f, ";{}=\"{}\"", key, value)?,
                Some(value) => write!(f, ";{}={}", key, value)?,
                None => write!(f, ";{}", key)?,
            }
        }
        write!(f, ":{}", self.value)
    }
}

fn needs_quotes(value: &str) -> bool {
    !value.starts_with('"') && value.contains([':', ';', ','])
}

/// A component nested inside an event, e.g. a `VALARM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcomponent {
    /// Component name, upper-cased.
    pub name: String,
    pub properties: Vec<EventProperty>,
    pub components: Vec<Subcomponent>,
}

impl Subcomponent {
    /// Creates an empty component.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: EventProperty) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn with_component(mut self, component: Subcomponent) -> Self {
        self.components.push(component);
        self
    }
}

/// A single calendar event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarEvent {
    properties: Vec<EventProperty>,
    components: Vec<Subcomponent>,
}

impl CalendarEvent {
    /// Creates an event without properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an event from parsed content lines and nested components.
    pub fn from_parts(properties: Vec<EventProperty>, components: Vec<Subcomponent>) -> Self {
        Self {
            properties,
            components,
        }
    }

    /// Returns all content lines in order.
    pub fn properties(&self) -> &[EventProperty] {
        &self.properties
    }

    /// Returns the nested components in order.
    pub fn components(&self) -> &[Subcomponent] {
        &self.components
    }

    /// Returns true if at least one property with this name is present.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.is(name))
    }

    /// Returns the first property with this name.
    pub fn property(&self, name: &str) -> Option<&EventProperty> {
        self.properties.iter().find(|p| p.is(name))
    }

    /// Returns the raw value of the first property with this name.
    pub fn property_value(&self, name: &str) -> Option<&str> {
        self.property(name).map(|p| p.value.as_str())
    }

    /// Returns the unescaped text of the first property with this name.
    pub fn text(&self, name: &str) -> Option<String> {
        self.property_value(name).map(unescape_text)
    }

    /// Returns the number of properties with this name.
    pub fn property_count(&self, name: &str) -> usize {
        self.properties.iter().filter(|p| p.is(name)).count()
    }

    /// Returns the UID, if present.
    pub fn uid(&self) -> Option<&str> {
        self.property_value(UID)
    }

    /// Returns the summary (title), if present.
    pub fn summary(&self) -> Option<&str> {
        self.property_value(SUMMARY)
    }

    /// Returns the description, if present.
    pub fn description(&self) -> Option<&str> {
        self.property_value(DESCRIPTION)
    }

    /// Returns the location text, if present.
    pub fn location(&self) -> Option<&str> {
        self.property_value(LOCATION)
    }

    /// Returns every category across all `CATEGORIES` lines, unescaped.
    pub fn categories(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|p| p.is(CATEGORIES))
            .flat_map(|p| split_list(&p.value))
            .collect()
    }

    /// Builder method to append a content line.
    #[must_use]
    pub fn with_property(mut self, property: EventProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Builder method to set the UID.
    #[must_use]
    pub fn with_uid(self, uid: &str) -> Self {
        self.with_replaced(UID, uid.to_string())
    }

    /// Builder method to set the summary.
    #[must_use]
    pub fn with_summary(self, summary: &str) -> Self {
        self.with_replaced(SUMMARY, escape_text(summary))
    }

    /// Builder method to set the description.
    #[must_use]
    pub fn with_description(self, description: &str) -> Self {
        self.with_replaced(DESCRIPTION, escape_text(description))
    }

    /// Builder method to set the location, replacing every existing `LOCATION` line.
    #[must_use]
    pub fn with_location(self, location: &str) -> Self {
        self.with_replaced(LOCATION, escape_text(location))
    }

    /// Builder method to add a category.
    ///
    /// Always appends a new `CATEGORIES` line; existing lines are untouched.
    #[must_use]
    pub fn with_category(self, category: &str) -> Self {
        self.with_property(EventProperty::new(CATEGORIES, escape_text(category)))
    }

    /// Builder method to append a nested component.
    #[must_use]
    pub fn with_component(mut self, component: Subcomponent) -> Self {
        self.components.push(component);
        self
    }

    /// Replaces all lines named `name` with a single line holding `value`.
    ///
    /// The new line takes the position of the first replaced one, or goes to
    /// the end when the property was absent.
    fn with_replaced(mut self, name: &str, value: String) -> Self {
        let replacement = EventProperty::new(name, value);
        match self.properties.iter().position(|p| p.is(name)) {
            Some(index) => {
                self.properties[index] = replacement;
                let mut position = 0;
                self.properties.retain(|p| {
                    let keep = position == index || !p.is(name);
                    position += 1;
                    keep
                });
            }
            None => self.properties.push(replacement),
        }
        self
    }
}

/// Escapes a TEXT value for use in a content line.
pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Reverses [`escape_text`].
pub fn unescape_text(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => unescaped.push('\n'),
            Some(other) => unescaped.push(other),
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

/// Splits a comma-separated TEXT list, honouring `\,` escapes.
fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(unescape_text(current.trim()));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    items.push(unescape_text(current.trim()));

    items.into_iter().filter(|item| !item.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CalendarEvent {
        CalendarEvent::new()
            .with_uid("evt-1@example.com")
            .with_property(EventProperty::new("DTSTART", "20250205T100000Z"))
            .with_summary("Morning Yoga")
            .with_property(EventProperty::new("LOCATION", "Studio A"))
            .with_property(EventProperty::new("location", "Studio B"))
    }

    #[test]
    fn property_lookup_is_case_insensitive() {
        let event = sample();
        assert!(event.has_property("summary"));
        assert!(event.has_property("SUMMARY"));
        assert_eq!(event.property_value("Dtstart"), Some("20250205T100000Z"));
        assert!(!event.has_property("DESCRIPTION"));
        assert_eq!(event.description(), None);
    }

    #[test]
    fn with_location_replaces_all_lines_in_place() {
        let event = sample().with_location("123 Main St, Durham");

        assert_eq!(event.property_count(LOCATION), 1);
        assert_eq!(event.location(), Some("123 Main St\\, Durham"));
        // Takes the slot of the first LOCATION line.
        assert!(event.properties()[3].is(LOCATION));
        assert_eq!(event.properties().len(), 4);
    }

    #[test]
    fn with_category_appends_new_line() {
        let event = sample()
            .with_property(EventProperty::new(CATEGORIES, "Fitness,Classes"))
            .with_category("Durham");

        assert_eq!(event.property_count(CATEGORIES), 2);
        assert_eq!(event.categories(), vec!["Fitness", "Classes", "Durham"]);
    }

    #[test]
    fn categories_honour_escaped_commas() {
        let event = CalendarEvent::new().with_category("Raleigh, NC");
        assert_eq!(event.property_value(CATEGORIES), Some("Raleigh\\, NC"));
        assert_eq!(event.categories(), vec!["Raleigh, NC"]);
    }

    #[test]
    fn text_unescapes_wire_values() {
        let event = CalendarEvent::new()
            .with_property(EventProperty::new(DESCRIPTION, "a\\, b\\nc"))
            .with_location("1010 Martin Luther King Jr Pkwy, Durham, NC");

        assert_eq!(event.description(), Some("a\\, b\\nc"));
        assert_eq!(event.text(DESCRIPTION).as_deref(), Some("a, b\nc"));
        assert_eq!(
            event.text(LOCATION).as_deref(),
            Some("1010 Martin Luther King Jr Pkwy, Durham, NC")
        );
        assert_eq!(event.text(SUMMARY), None);
    }

    #[test]
    fn nested_components_are_kept() {
        let alarm = Subcomponent::new("valarm")
            .with_property(EventProperty::new("ACTION", "DISPLAY"))
            .with_property(EventProperty::new("TRIGGER", "-PT15M"));
        let event = sample().with_component(alarm).with_location("Elsewhere");

        assert_eq!(event.components().len(), 1);
        assert_eq!(event.components()[0].name, "VALARM");
        assert_eq!(event.components()[0].properties.len(), 2);
    }

    #[test]
    fn escape_roundtrip() {
        let text = "a;b,c\\d\nnext";
        assert_eq!(escape_text(text), "a\\;b\\,c\\\\d\\nnext");
        assert_eq!(unescape_text(&escape_text(text)), text);
    }

    #[test]
    fn property_display() {
        let prop = EventProperty::new("dtstart", "20250210")
            .with_param("value", Some("DATE".to_string()))
            .with_param("X-FLAG", None);
        assert_eq!(prop.to_string(), "DTSTART;VALUE=DATE;X-FLAG:20250210");

        let prop = EventProperty::new("ORGANIZER", "mailto:desk@example.com")
            .with_param("CN", Some("Front Desk: Durham".to_string()));
        assert_eq!(
            prop.to_string(),
            "ORGANIZER;CN=\"Front Desk: Durham\":mailto:desk@example.com"
        );
    }
}
