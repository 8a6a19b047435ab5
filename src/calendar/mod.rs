//! Family events calendar.
//!
//! Derives recurring events from the same person and couple snapshot the
//! layout uses:
//! - Birthdays for living persons with a birth date
//! - Remembrance days for persons with a death date
//! - Wedding anniversaries from couple records
//! - User-created custom events

mod dates;
mod events;

pub use dates::{format_date_dmy, next_occurrence, parse_date, years_since};
pub use events::{
    CalendarEvent, CategorizedEvents, CustomEvent, DEFAULT_UPCOMING_WINDOW_DAYS, EventKind,
    categorize_events, collect_events,
};
