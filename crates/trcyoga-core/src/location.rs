//! Location metadata.
//!
//! Locations are loaded once per run from a JSON array such as:
//!
//! ```json
//! [
//!   {
//!     "name": "Triangle Rock Club - Durham",
//!     "shortName": "DUR",
//!     "address": "1010 Martin Luther King Jr Pkwy, Durham, NC",
//!     "calendarUrl": "https://example.com/durham.ics"
//!   }
//! ]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::merge::SUBSET_SEPARATOR;

/// Errors raised while reading location metadata.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The document is not a JSON array of location records.
    #[error("malformed location data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A location has an empty short name.
    #[error("location {name:?} has an empty short name")]
    EmptyShortName { name: String },

    /// A short name cannot be used as part of an output key: it contains
    /// the folder separator or the subset separator.
    #[error("short name {short_name:?} contains '/' or '_'")]
    InvalidShortName { short_name: String },

    /// Two locations share a short name.
    #[error("duplicate short name {short_name:?}")]
    DuplicateShortName { short_name: String },

    /// The feed URL does not parse.
    #[error("invalid calendar URL for {short_name}: {source}")]
    InvalidUrl {
        short_name: String,
        #[source]
        source: url::ParseError,
    },
}

/// One calendar source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Human-readable name, added to events as a category.
    pub name: String,
    /// Short key used in output file names.
    pub short_name: String,
    /// Physical address, written to each event's `LOCATION`.
    pub address: String,
    /// Feed URL.
    #[serde(alias = "iCalendarUrl")]
    pub calendar_url: String,
}

impl Location {
    /// Creates a new location.
    pub fn new(
        name: impl Into<String>,
        short_name: impl Into<String>,
        address: impl Into<String>,
        calendar_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            address: address.into(),
            calendar_url: calendar_url.into(),
        }
    }
}

/// Parses and validates a JSON array of locations.
///
/// Short names must be non-empty, free of `/`, and unique; feed URLs must parse.
pub fn parse_locations(data: &[u8]) -> Result<Vec<Location>, LocationError> {
    let locations: Vec<Location> = serde_json::from_slice(data)?;
    validate_locations(&locations)?;
    Ok(locations)
}

/// Checks the invariants the output naming relies on.
pub fn validate_locations(locations: &[Location]) -> Result<(), LocationError> {
    let mut seen = HashSet::with_capacity(locations.len());

    for location in locations {
        if location.short_name.is_empty() {
            return Err(LocationError::EmptyShortName {
                name: location.name.clone(),
            });
        }
        if location.short_name.contains(['/', SUBSET_SEPARATOR]) {
            return Err(LocationError::InvalidShortName {
                short_name: location.short_name.clone(),
            });
        }
        if !seen.insert(location.short_name.as_str()) {
            return Err(LocationError::DuplicateShortName {
                short_name: location.short_name.clone(),
            });
        }
        Url::parse(&location.calendar_url).map_err(|source| LocationError::InvalidUrl {
            short_name: location.short_name.clone(),
            source,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"name": "Durham", "shortName": "DUR", "address": "1 Main St", "calendarUrl": "https://example.com/dur.ics"},
        {"name": "Raleigh", "shortName": "RAL", "address": "2 Oak Ave", "iCalendarUrl": "https://example.com/ral.ics"}
    ]"#;

    #[test]
    fn parses_both_url_field_names() {
        let locations = parse_locations(SAMPLE.as_bytes()).unwrap();
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].short_name, "DUR");
        assert_eq!(locations[0].calendar_url, "https://example.com/dur.ics");
        assert_eq!(locations[1].name, "Raleigh");
        assert_eq!(locations[1].calendar_url, "https://example.com/ral.ics");
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_locations(b"[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array() {
        let err = parse_locations(br#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, LocationError::Malformed(_)));
    }

    #[test]
    fn rejects_duplicate_short_names() {
        let locations = vec![
            Location::new("A", "X", "a", "https://example.com/a.ics"),
            Location::new("B", "X", "b", "https://example.com/b.ics"),
        ];
        let err = validate_locations(&locations).unwrap_err();
        assert!(matches!(err, LocationError::DuplicateShortName { ref short_name } if short_name == "X"));
    }

    #[test]
    fn rejects_empty_and_slashed_short_names() {
        let empty = vec![Location::new("A", "", "a", "https://example.com/a.ics")];
        assert!(matches!(
            validate_locations(&empty),
            Err(LocationError::EmptyShortName { .. })
        ));

        let slashed = vec![Location::new("A", "a/b", "a", "https://example.com/a.ics")];
        assert!(matches!(
            validate_locations(&slashed),
            Err(LocationError::InvalidShortName { .. })
        ));
    }

    #[test]
    fn rejects_short_names_that_collide_when_joined() {
        // [A_B] alone and [A, B] together would both be written to A_B.ical.
        let locations = vec![
            Location::new("A", "A", "a", "https://example.com/a.ics"),
            Location::new("AB", "A_B", "ab", "https://example.com/ab.ics"),
            Location::new("B", "B", "b", "https://example.com/b.ics"),
        ];
        match validate_locations(&locations) {
            Err(LocationError::InvalidShortName { short_name }) => assert_eq!(short_name, "A_B"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_invalid_url() {
        let locations = vec![Location::new("A", "A", "a", "not a url")];
        let err = validate_locations(&locations).unwrap_err();
        assert!(err.to_string().contains("invalid calendar URL for A"));
    }

    #[test]
    fn serializes_camel_case() {
        let location = Location::new("A", "A", "addr", "https://example.com/a.ics");
        let json = serde_json::to_string(&location).unwrap();
        assert!(json.contains("\"shortName\":\"A\""));
        assert!(json.contains("\"calendarUrl\""));
    }
}
