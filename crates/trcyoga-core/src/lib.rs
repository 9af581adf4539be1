//! Core types: locations, events, subsets, filtering, merging
//!
//! Everything in this crate is pure: no network or storage access. The
//! aggregation flow is
//!
//! ```text
//! raw feed ─▶ normalize_feed ─▶ CalendarCodec::parse ─▶ filter_and_enrich
//!                                                            │
//!                                                 EventsByLocation
//!                                                            │
//!                  generate_subsets(sorted keys) ─▶ build_calendar ─▶ CalendarCodec::serialize
//! ```

pub mod codec;
pub mod event;
pub mod filter;
pub mod location;
pub mod merge;
pub mod normalize;
pub mod subsets;
pub mod tracing;

pub use codec::{CalendarCodec, CodecError, FixtureCodec, IcalendarCodec};
pub use event::{CalendarEvent, EventProperty, Subcomponent};
pub use filter::{DEFAULT_KEYWORD, EventFilter, enrich_event, filter_and_enrich};
pub use location::{Location, LocationError, parse_locations, validate_locations};
pub use merge::{
    DEFAULT_CALENDAR_NAME, EventsByLocation, SUBSET_SEPARATOR, MergedCalendar, build_calendar, output_key,
    subset_file_name,
};
pub use normalize::{normalize_feed, normalize_line_endings};
pub use subsets::{generate_subsets, subset_count};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
