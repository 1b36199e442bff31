//! Time-relative views over shows and venues.
//!
//! Everything here is pure: the reference "now" is always supplied by the
//! caller, so the same inputs always produce the same views.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// A show is upcoming only when it starts strictly after `now`.
/// A show starting exactly at `now` is already past.
pub fn is_upcoming<Tz: TimeZone>(start_time: &DateTime<Tz>, now: &DateTime<Utc>) -> bool {
    start_time.with_timezone(&Utc) > *now
}

/// Shows of one venue or artist, split around a reference time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<T> {
    pub past: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            past: Vec::new(),
            upcoming: Vec::new(),
        }
    }
}

impl<T> Timeline<T> {
    /// Split `items` into past and upcoming, preserving input order within each side.
    pub fn partition<I, F, Tz>(items: I, now: DateTime<Utc>, start_time: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> DateTime<Tz>,
        Tz: TimeZone,
    {
        let mut timeline = Self::default();
        for item in items {
            if is_upcoming(&start_time(&item), &now) {
                timeline.upcoming.push(item);
            } else {
                timeline.past.push(item);
            }
        }
        timeline
    }

    pub fn past_count(&self) -> usize {
        self.past.len()
    }

    pub fn upcoming_count(&self) -> usize {
        self.upcoming.len()
    }

    pub fn total(&self) -> usize {
        self.past.len() + self.upcoming.len()
    }

    pub fn map<U, F>(self, mut f: F) -> Timeline<U>
    where
        F: FnMut(T) -> U,
    {
        Timeline {
            past: self.past.into_iter().map(&mut f).collect(),
            upcoming: self.upcoming.into_iter().map(&mut f).collect(),
        }
    }
}

/// Venues sharing an exact (city, state) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationGroup<V> {
    pub city: String,
    pub state: String,
    pub venues: Vec<V>,
}

/// Group items by exact (city, state). Groups appear in order of first
/// occurrence and items keep their input order inside a group.
pub fn group_by_location<V, I, F>(items: I, location: F) -> Vec<LocationGroup<V>>
where
    I: IntoIterator<Item = V>,
    F: Fn(&V) -> (&str, &str),
{
    let mut groups: Vec<LocationGroup<V>> = Vec::new();
    for item in items {
        let (city, state) = location(&item);
        match groups
            .iter()
            .position(|g| g.city == city && g.state == state)
        {
            Some(idx) => groups[idx].venues.push(item),
            None => {
                let (city, state) = (city.to_string(), state.to_string());
                groups.push(LocationGroup {
                    city,
                    state,
                    venues: vec![item],
                });
            }
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `2019-05-21 21:30:00`
    Raw,
    /// `Tuesday May, 21, 2019 at 9:30PM`
    Full,
    /// `Tue 05, 21, 2019 9:30PM`
    Medium,
}

/// Render a show start time for display. Times are shown in UTC.
pub fn format_start_time<Tz: TimeZone>(start_time: &DateTime<Tz>, format: DateFormat) -> String {
    let utc = start_time.with_timezone(&Utc);
    let pattern = match format {
        DateFormat::Raw => "%Y-%m-%d %H:%M:%S",
        DateFormat::Full => "%A %B, %-d, %Y at %-I:%M%p",
        DateFormat::Medium => "%a %m, %d, %Y %-I:%M%p",
    };
    utc.format(pattern).to_string()
}
