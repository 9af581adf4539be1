//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use trcyoga_core::{DEFAULT_CALENDAR_NAME, DEFAULT_KEYWORD};

use crate::error::{PipelineError, PipelineResult};

/// Object key of the location list.
pub const DEFAULT_LOCATIONS_KEY: &str = "locations.json";

/// Folder that output calendars are written under.
pub const DEFAULT_CALENDAR_FOLDER: &str = "calendars";

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Object key of the JSON location list.
    pub locations_key: String,

    /// Folder (key prefix) for output calendars.
    pub calendar_folder: String,

    /// Events must mention this keyword to be kept.
    pub keyword: String,

    /// Display name of every output calendar.
    pub calendar_name: String,

    /// Number of feeds fetched at once. 1 fetches strictly in order.
    pub fetch_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locations_key: DEFAULT_LOCATIONS_KEY.to_string(),
            calendar_folder: DEFAULT_CALENDAR_FOLDER.to_string(),
            keyword: DEFAULT_KEYWORD.to_string(),
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            fetch_concurrency: 1,
        }
    }
}

impl PipelineConfig {
    /// Builder: set the location list key.
    #[must_use]
    pub fn with_locations_key(mut self, key: impl Into<String>) -> Self {
        self.locations_key = key.into();
        self
    }

    /// Builder: set the output folder.
    #[must_use]
    pub fn with_calendar_folder(mut self, folder: impl Into<String>) -> Self {
        self.calendar_folder = folder.into();
        self
    }

    /// Builder: set the filter keyword.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    /// Builder: set the calendar display name.
    #[must_use]
    pub fn with_calendar_name(mut self, name: impl Into<String>) -> Self {
        self.calendar_name = name.into();
        self
    }

    /// Builder: set the number of concurrent fetches.
    #[must_use]
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.locations_key.trim().is_empty() {
            return Err(PipelineError::config("locations key must not be empty"));
        }
        if self.keyword.trim().is_empty() {
            return Err(PipelineError::config("keyword must not be empty"));
        }
        if self.fetch_concurrency == 0 {
            return Err(PipelineError::config("fetch concurrency must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.locations_key, "locations.json");
        assert_eq!(config.calendar_folder, "calendars");
        assert_eq!(config.keyword, "yoga");
        assert_eq!(config.calendar_name, "Triangle Rock Club Yoga");
        assert_eq!(config.fetch_concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_config() {
        let config = PipelineConfig::default()
            .with_locations_key("data/locations.json")
            .with_calendar_folder("out")
            .with_keyword("climb")
            .with_calendar_name("Climbing")
            .with_fetch_concurrency(4);

        assert_eq!(config.locations_key, "data/locations.json");
        assert_eq!(config.calendar_folder, "out");
        assert_eq!(config.keyword, "climb");
        assert_eq!(config.calendar_name, "Climbing");
        assert_eq!(config.fetch_concurrency, 4);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let cases = [
            PipelineConfig::default().with_locations_key(" "),
            PipelineConfig::default().with_keyword(""),
            PipelineConfig::default().with_fetch_concurrency(0),
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(PipelineError::Config { .. })
            ));
        }
    }

    #[test]
    fn empty_folder_is_allowed() {
        let config = PipelineConfig::default().with_calendar_folder("");
        assert!(config.validate().is_ok());
    }
}
