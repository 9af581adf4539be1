//! The aggregation run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{Span, debug, info, warn};
use trcyoga_core::{
    CalendarCodec, CalendarEvent, EventFilter, EventsByLocation, Location, build_calendar,
    filter_and_enrich, generate_subsets, normalize_feed, output_key, parse_locations,
    subset_count,
};
use trcyoga_providers::{FeedSource, ObjectStore};

use crate::config::PipelineConfig;
use crate::error::{ConfigLoadError, PipelineError, PipelineResult};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of locations loaded.
    pub locations: usize,
    /// Number of events kept across all locations.
    pub events: usize,
    /// Number of calendars written.
    pub calendars_written: usize,
    /// Keys written, in write order.
    pub keys: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Returns the wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs the aggregation against injected collaborators.
///
/// Collaborators are shared so that a caller can keep a handle on them (for
/// example to inspect an in-memory store after a run).
pub struct Pipeline {
    config: PipelineConfig,
    store: Arc<dyn ObjectStore>,
    feeds: Arc<dyn FeedSource>,
    codec: Arc<dyn CalendarCodec>,
    filter: EventFilter,
}

impl Pipeline {
    /// Creates a pipeline.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ObjectStore>,
        feeds: Arc<dyn FeedSource>,
        codec: Arc<dyn CalendarCodec>,
    ) -> Self {
        let filter = EventFilter::new(&config.keyword);
        Self {
            config,
            store,
            feeds,
            codec,
            filter,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs all four phases.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Calendars written before a
    /// persist failure stay in the store.
    #[tracing::instrument(skip(self), fields(locations, calendars))]
    pub async fn run(&self) -> PipelineResult<RunSummary> {
        let started_at = Utc::now();
        self.config.validate()?;

        let locations = self.load_locations().await?;
        Span::current().record("locations", locations.len());

        let events = self.load_events(&locations).await?;
        let kept: usize = events.values().map(Vec::len).sum();

        let keys = self.write_calendars(&events).await?;
        Span::current().record("calendars", keys.len());

        let summary = RunSummary {
            locations: locations.len(),
            events: kept,
            calendars_written: keys.len(),
            keys,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            locations = summary.locations,
            events = summary.events,
            calendars = summary.calendars_written,
            duration_ms = summary.duration().num_milliseconds(),
            "Run completed"
        );
        Ok(summary)
    }

    /// Lists the keys a run would write, in write order, without fetching
    /// any feed.
    pub async fn plan(&self) -> PipelineResult<Vec<String>> {
        self.config.validate()?;
        let locations = self.load_locations().await?;

        let mut names: Vec<String> = locations.into_iter().map(|l| l.short_name).collect();
        names.sort();
        calendar_count(names.len())?;

        Ok(generate_subsets(&names)
            .iter()
            .map(|subset| output_key(&self.config.calendar_folder, subset))
            .collect())
    }

    /// Phase 1: reads and validates the location list.
    pub async fn load_locations(&self) -> PipelineResult<Vec<Location>> {
        let key = &self.config.locations_key;
        debug!(key = %key, store = self.store.name(), "Loading locations");

        let data = self.store.get(key).await.map_err(|e| config_load(key, e))?;
        let locations = parse_locations(&data).map_err(|e| config_load(key, e))?;

        info!(count = locations.len(), "Loaded locations");
        Ok(locations)
    }

    /// Fetches one location's feed and returns its kept, enriched events.
    pub async fn fetch_location_events(
        &self,
        location: &Location,
    ) -> PipelineResult<Vec<Arc<CalendarEvent>>> {
        info!(location = %location.short_name, "Getting events for {}", location.name);

        let raw = self
            .feeds
            .fetch(&location.calendar_url)
            .await
            .map_err(|source| {
                warn!(
                    location = %location.short_name,
                    retryable = source.is_retryable(),
                    error = %source,
                    "Fetch failed"
                );
                PipelineError::Fetch {
                    location: location.short_name.clone(),
                    source,
                }
            })?;

        let text = normalize_feed(&raw);
        let parsed = self
            .codec
            .parse(&text)
            .map_err(|source| PipelineError::Parse {
                location: location.short_name.clone(),
                source,
            })?;

        let total = parsed.len();
        let kept = filter_and_enrich(parsed, &self.filter, location);
        debug!(
            location = %location.short_name,
            total,
            kept = kept.len(),
            "Filtered events"
        );
        Ok(kept)
    }

    /// Phase 2: fetches every location, keyed by short name.
    ///
    /// Up to `fetch_concurrency` feeds are in flight at once. Results are
    /// collected in location order and the first failure aborts the phase.
    pub async fn load_events(&self, locations: &[Location]) -> PipelineResult<EventsByLocation> {
        let concurrency = self.config.fetch_concurrency.max(1);

        let fetched: Vec<(String, Vec<Arc<CalendarEvent>>)> = stream::iter(locations)
            .map(|location| async move {
                let events = self.fetch_location_events(location).await?;
                Ok::<_, PipelineError>((location.short_name.clone(), events))
            })
            .buffered(concurrency)
            .try_collect()
            .await?;

        Ok(fetched.into_iter().collect())
    }

    /// Phases 3 and 4: merges and writes one calendar per subset.
    ///
    /// Subsets are enumerated over the sorted short names. Returns the keys
    /// written, in write order.
    pub async fn write_calendars(&self, events: &EventsByLocation) -> PipelineResult<Vec<String>> {
        let names: Vec<String> = events.keys().cloned().collect();
        let expected = calendar_count(names.len())?;
        let subsets = generate_subsets(&names);
        debug!(locations = names.len(), subsets = subsets.len(), "Enumerated subsets");

        let mut written = Vec::with_capacity(expected);
        for subset in &subsets {
            let calendar = build_calendar(events, subset, self.config.calendar_name.as_str());
            let key = output_key(&self.config.calendar_folder, subset);

            let data = self
                .codec
                .serialize(&calendar)
                .map_err(|source| PipelineError::Serialize {
                    key: key.clone(),
                    source,
                })?;

            info!(key = %key, events = calendar.len(), "Writing calendar file: {}", key);
            if let Err(source) = self.store.put(&key, data).await {
                warn!(key = %key, retryable = source.is_retryable(), error = %source, "Write failed");
                return Err(PipelineError::Persist { key, source });
            }
            written.push(key);
        }

        Ok(written)
    }
}

/// Number of calendars a run over `locations` locations writes.
fn calendar_count(locations: usize) -> PipelineResult<usize> {
    subset_count(locations).ok_or_else(|| {
        PipelineError::config(format!(
            "{} locations produce more combined calendars than can be enumerated",
            locations
        ))
    })
}

fn config_load(key: &str, cause: impl Into<ConfigLoadError>) -> PipelineError {
    PipelineError::ConfigLoad {
        key: key.to_string(),
        source: cause.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trcyoga_core::FixtureCodec;
    use trcyoga_providers::{
        MemoryObjectStore, ProviderError, ProviderErrorCode, StaticFeedSource,
    };

    const A_FEED: &str = "BEGIN:VCALENDAR\r\nX-FEED:A\r\nEND:VCALENDAR\r\n";
    const B_FEED: &str = "BEGIN:VCALENDAR\r\nX-FEED:B\r\nEND:VCALENDAR\r\n";
    const C_FEED: &str = "BEGIN:VCALENDAR\r\nX-FEED:C\r\nEND:VCALENDAR\r\n";

    fn url(short_name: &str) -> String {
        format!("https://example.com/{}.ics", short_name.to_lowercase())
    }

    fn locations_json(short_names: &[&str]) -> Vec<u8> {
        let locations: Vec<Location> = short_names
            .iter()
            .map(|s| Location::new(format!("Gym {}", s), *s, format!("{} Main St", s), url(s)))
            .collect();
        serde_json::to_vec(&locations).unwrap()
    }

    fn codec() -> FixtureCodec {
        FixtureCodec::new()
            .with_feed(
                A_FEED,
                vec![
                    CalendarEvent::new().with_uid("a1").with_summary("Morning Yoga"),
                    CalendarEvent::new().with_uid("a2").with_summary("Spin Class"),
                ],
            )
            .with_feed(
                B_FEED,
                vec![
                    CalendarEvent::new()
                        .with_uid("b1")
                        .with_summary("Flow")
                        .with_description("Gentle yoga"),
                ],
            )
            .with_feed(
                C_FEED,
                vec![CalendarEvent::new().with_uid("c1").with_summary("Yoga Nidra")],
            )
    }

    fn feeds() -> StaticFeedSource {
        StaticFeedSource::new()
            .with_feed(url("A"), A_FEED)
            .with_feed(url("B"), B_FEED)
            .with_feed(url("C"), C_FEED)
    }

    fn pipeline(
        config: PipelineConfig,
        store: &Arc<MemoryObjectStore>,
        feeds: &Arc<StaticFeedSource>,
    ) -> Pipeline {
        Pipeline::new(
            config,
            store.clone(),
            feeds.clone(),
            Arc::new(codec()),
        )
    }

    async fn output(store: &MemoryObjectStore, key: &str) -> String {
        String::from_utf8(store.object(key).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn two_locations_produce_three_calendars() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", locations_json(&["A", "B"])),
        );
        let feeds = Arc::new(feeds());

        let summary = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.locations, 2);
        assert_eq!(summary.events, 2);
        assert_eq!(summary.calendars_written, 3);
        assert_eq!(
            summary.keys,
            vec!["calendars/A.ical", "calendars/B.ical", "calendars/A_B.ical"]
        );
        assert_eq!(
            store.keys().await,
            vec![
                "calendars/A.ical",
                "calendars/A_B.ical",
                "calendars/B.ical",
                "locations.json",
            ]
        );

        let merged = output(&store, "calendars/A_B.ical").await;
        assert_eq!(merged.matches("UID:a1").count(), 1);
        assert_eq!(merged.matches("UID:b1").count(), 1);
        assert!(!merged.contains("UID:a2"));
        assert!(merged.find("UID:a1") < merged.find("UID:b1"));
        assert!(merged.starts_with("X-WR-CALNAME:Triangle Rock Club Yoga\n"));

        let only_a = output(&store, "calendars/A.ical").await;
        assert!(only_a.contains("CATEGORIES:Gym A"));
        assert!(only_a.contains("LOCATION:A Main St"));
        assert!(!only_a.contains("UID:b1"));
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", locations_json(&["A", "B"])),
        );
        let feeds = Arc::new(
            StaticFeedSource::new()
                .with_feed(url("A"), A_FEED)
                .with_error(url("B"), ProviderError::server("503 Service Unavailable")),
        );

        let err = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap_err();

        match err {
            PipelineError::Fetch { location, source } => {
                assert_eq!(location, "B");
                assert_eq!(source.code(), ProviderErrorCode::ServerError);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.keys().await, vec!["locations.json"]);
    }

    #[tokio::test]
    async fn persist_failure_keeps_earlier_outputs() {
        let store = Arc::new(
            MemoryObjectStore::new()
                .with_object("locations.json", locations_json(&["A", "B"]))
                .fail_on_put("calendars/B.ical"),
        );
        let feeds = Arc::new(feeds());

        let err = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.key(), Some("calendars/B.ical"));
        assert!(matches!(err, PipelineError::Persist { .. }));
        assert_eq!(
            store.keys().await,
            vec!["calendars/A.ical", "locations.json"]
        );
    }

    #[tokio::test]
    async fn output_order_follows_sorted_short_names() {
        let store = Arc::new(
            MemoryObjectStore::new()
                .with_object("locations.json", locations_json(&["C", "A", "B"])),
        );
        let feeds = Arc::new(feeds());

        let summary = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap();

        assert_eq!(
            summary.keys,
            vec![
                "calendars/A.ical",
                "calendars/B.ical",
                "calendars/A_B.ical",
                "calendars/C.ical",
                "calendars/A_C.ical",
                "calendars/B_C.ical",
                "calendars/A_B_C.ical",
            ]
        );
        // Feeds are still fetched in load order.
        assert_eq!(feeds.requests(), vec![url("C"), url("A"), url("B")]);

        let all = output(&store, "calendars/A_B_C.ical").await;
        let a = all.find("UID:a1").unwrap();
        let b = all.find("UID:b1").unwrap();
        let c = all.find("UID:c1").unwrap();
        assert!(a < b && b < c);
    }

    #[tokio::test]
    async fn concurrent_fetch_matches_sequential_output() {
        let sequential_store = Arc::new(
            MemoryObjectStore::new()
                .with_object("locations.json", locations_json(&["C", "A", "B"])),
        );
        let concurrent_store = Arc::new(
            MemoryObjectStore::new()
                .with_object("locations.json", locations_json(&["C", "A", "B"])),
        );
        let feeds = Arc::new(feeds());

        let sequential = pipeline(PipelineConfig::default(), &sequential_store, &feeds)
            .run()
            .await
            .unwrap();
        let concurrent = pipeline(
            PipelineConfig::default().with_fetch_concurrency(3),
            &concurrent_store,
            &feeds,
        )
        .run()
        .await
        .unwrap();

        assert_eq!(sequential.keys, concurrent.keys);
        for key in &sequential.keys {
            assert_eq!(
                sequential_store.object(key).await,
                concurrent_store.object(key).await,
                "{key}"
            );
        }
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", locations_json(&["A", "B"])),
        );
        let feeds = Arc::new(feeds());
        let pipeline = pipeline(PipelineConfig::default(), &store, &feeds);

        pipeline.run().await.unwrap();
        let first = output(&store, "calendars/A_B.ical").await;
        pipeline.run().await.unwrap();
        let second = output(&store, "calendars/A_B.ical").await;

        assert_eq!(first, second);
        assert_eq!(store.keys().await.len(), 4);
    }

    #[tokio::test]
    async fn missing_locations_is_config_load_error() {
        let store = Arc::new(MemoryObjectStore::new());
        let feeds = Arc::new(feeds());

        let err = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap_err();

        match err {
            PipelineError::ConfigLoad {
                key,
                source: ConfigLoadError::Store(source),
            } => {
                assert_eq!(key, "locations.json");
                assert_eq!(source.code(), ProviderErrorCode::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(feeds.requests().is_empty());
    }

    #[tokio::test]
    async fn malformed_locations_is_config_load_error() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", r#"{"name": "not a list"}"#),
        );
        let feeds = Arc::new(feeds());

        let err = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::ConfigLoad {
                source: ConfigLoadError::Invalid(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn duplicate_short_names_are_rejected() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", locations_json(&["A", "A"])),
        );
        let feeds = Arc::new(feeds());

        let err = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ConfigLoad { .. }));
        assert!(feeds.requests().is_empty());
    }

    #[tokio::test]
    async fn unparseable_feed_is_parse_error() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", locations_json(&["A"])),
        );
        let feeds = Arc::new(StaticFeedSource::new().with_feed(url("A"), "<html>oops</html>"));

        let err = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Parse { .. }));
        assert_eq!(err.location(), Some("A"));
        assert_eq!(store.keys().await, vec!["locations.json"]);
    }

    #[tokio::test]
    async fn empty_location_list_writes_nothing() {
        let store =
            Arc::new(MemoryObjectStore::new().with_object("locations.json", "[]"));
        let feeds = Arc::new(feeds());

        let summary = pipeline(PipelineConfig::default(), &store, &feeds)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.locations, 0);
        assert_eq!(summary.calendars_written, 0);
        assert!(summary.keys.is_empty());
        assert!(summary.finished_at >= summary.started_at);
    }

    #[tokio::test]
    async fn location_without_matching_events_still_gets_calendars() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", locations_json(&["A", "B"])),
        );
        let feeds = Arc::new(feeds());
        let config = PipelineConfig::default().with_keyword("spin");

        let summary = pipeline(config, &store, &feeds).run().await.unwrap();

        assert_eq!(summary.events, 1);
        assert_eq!(summary.calendars_written, 3);
        let only_b = output(&store, "calendars/B.ical").await;
        assert!(!only_b.contains("BEGIN:VEVENT"));
        let merged = output(&store, "calendars/A_B.ical").await;
        assert!(merged.contains("UID:a2"));
    }

    #[tokio::test]
    async fn plan_lists_keys_without_fetching() {
        let store = Arc::new(
            MemoryObjectStore::new().with_object("locations.json", locations_json(&["B", "A"])),
        );
        let feeds = Arc::new(feeds());
        let config = PipelineConfig::default().with_calendar_folder("out/");

        let keys = pipeline(config, &store, &feeds).plan().await.unwrap();

        assert_eq!(keys, vec!["out/A.ical", "out/B.ical", "out/A_B.ical"]);
        assert!(feeds.requests().is_empty());
        assert_eq!(store.keys().await, vec!["locations.json"]);
    }

    #[tokio::test]
    async fn invalid_config_fails_before_loading() {
        let store = Arc::new(MemoryObjectStore::new());
        let feeds = Arc::new(feeds());
        let config = PipelineConfig::default().with_fetch_concurrency(0);

        let err = pipeline(config, &store, &feeds).run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }

    #[test]
    fn calendar_count_rejects_unenumerable_location_sets() {
        assert_eq!(calendar_count(3).unwrap(), 7);
        assert_eq!(calendar_count(0).unwrap(), 0);
        assert!(matches!(
            calendar_count(usize::BITS as usize),
            Err(PipelineError::Config { .. })
        ));
    }
}
