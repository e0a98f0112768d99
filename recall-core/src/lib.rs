//! Week-view layout engine for iCalendar feeds.
//!
//! The pipeline is: raw feed text → parsed VEVENTs → [`week::Week`] rows with
//! vertical metrics → [`overlap::resolve`] horizontal metrics → [`feed::WeekView`].
//!
//! - [`time`] normalizes dates and date-times into one target timezone
//! - [`recurrence`] expands an RRULE inside a window
//! - [`event`] parses a single VEVENT
//! - [`week`] buckets occurrences into seven days
//! - [`overlap`] lays out concurrent events side by side
//! - [`feed`] fetches and bounds the feed, then drives the rest

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod feed;
pub mod overlap;
pub mod recurrence;
pub mod ruler;
pub mod time;
pub mod week;

pub use error::{RecallError, RecallResult};
pub use event::Event;
pub use feed::{FeedLoader, FeedOptions, WeekView};
pub use ruler::Ruler;
pub use week::{Day, EventId, Row, Week};
