//! Submitted form bodies and their validation.
//!
//! Forms are plain data as posted by the browser. `validate` either yields
//! a cleaned record ready to persist or the list of field errors to show
//! next to the inputs.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use fyyur_db::aggregation::{format_start_time, DateFormat};
use fyyur_db::entities::{artist, venue};

pub const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

pub const GENRES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

const SHORT_TEXT: usize = 120;
const LONG_TEXT: usize = 500;

const PHONE_PATTERN: &str = r"^\d{3}-\d{3}-\d{4}$";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

/// Checkbox inputs post a value only when ticked.
fn checked(value: &Option<String>) -> bool {
    matches!(
        value.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("y" | "on" | "true" | "1")
    )
}

fn checkbox(value: bool) -> Option<String> {
    value.then(|| "y".to_string())
}

#[derive(Default)]
struct Checker {
    errors: FormErrors,
}

impl Checker {
    fn length(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.errors
                .push(field, format!("Field cannot be longer than {max} characters."));
        }
    }

    fn required(&mut self, field: &'static str, value: &str, max: usize) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.errors.push(field, "This field is required.");
        } else {
            self.length(field, value, max);
        }
        value.to_string()
    }

    fn optional(&mut self, field: &'static str, value: &str, max: usize) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        self.length(field, value, max);
        Some(value.to_string())
    }

    fn state(&mut self, value: &str) -> String {
        let value = self.required("state", value, SHORT_TEXT);
        if !value.is_empty() && !STATES.contains(&value.as_str()) {
            self.errors.push("state", "Not a valid choice.");
        }
        value
    }

    fn phone(&mut self, value: &str) -> Option<String> {
        let value = self.optional("phone", value, SHORT_TEXT)?;
        if !PHONE_RE.is_match(&value) {
            self.errors
                .push("phone", "Phone number must look like 555-555-5555.");
        }
        Some(value)
    }

    fn link(&mut self, field: &'static str, value: &str, max: usize) -> Option<String> {
        let value = self.optional(field, value, max)?;
        let valid = url::Url::parse(&value)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
            .unwrap_or(false);
        if !valid {
            self.errors.push(field, "Invalid URL.");
        }
        Some(value)
    }

    fn genres(&mut self, values: &[String]) -> Vec<String> {
        let mut genres: Vec<String> = Vec::with_capacity(values.len());
        for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
            if !GENRES.contains(&value) {
                self.errors
                    .push("genres", format!("'{value}' is not a valid choice."));
            } else if !genres.iter().any(|g| g == value) {
                genres.push(value.to_string());
            }
        }
        if values.iter().all(|v| v.trim().is_empty()) {
            self.errors.push("genres", "This field is required.");
        }
        genres
    }

    fn finish<T>(self, record: T) -> Result<T, FormErrors> {
        if self.errors.is_empty() {
            Ok(record)
        } else {
            Err(self.errors)
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub genres: Vec<String>,
    pub facebook_link: String,
    #[serde(alias = "website")]
    pub website_link: String,
    pub seeking_talent: Option<String>,
    pub seeking_description: String,
}

/// A validated venue, every mutable column filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueRecord {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub genres: Vec<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl VenueForm {
    pub fn validate(&self) -> Result<VenueRecord, FormErrors> {
        let mut check = Checker::default();
        let record = VenueRecord {
            name: check.required("name", &self.name, SHORT_TEXT),
            city: check.required("city", &self.city, SHORT_TEXT),
            state: check.state(&self.state),
            address: check.required("address", &self.address, SHORT_TEXT),
            phone: check.phone(&self.phone),
            image_link: check.link("image_link", &self.image_link, LONG_TEXT),
            genres: check.genres(&self.genres),
            facebook_link: check.link("facebook_link", &self.facebook_link, SHORT_TEXT),
            website_link: check.link("website_link", &self.website_link, SHORT_TEXT),
            seeking_talent: checked(&self.seeking_talent),
            seeking_description: check.optional(
                "seeking_description",
                &self.seeking_description,
                LONG_TEXT,
            ),
        };
        check.finish(record)
    }
}

impl From<&venue::Model> for VenueForm {
    fn from(v: &venue::Model) -> Self {
        Self {
            name: v.name.clone(),
            city: v.city.clone(),
            state: v.state.clone(),
            address: v.address.clone(),
            phone: v.phone.clone().unwrap_or_default(),
            image_link: v.image_link.clone().unwrap_or_default(),
            genres: v.genre_list(),
            facebook_link: v.facebook_link.clone().unwrap_or_default(),
            website_link: v.website_link.clone().unwrap_or_default(),
            seeking_talent: checkbox(v.seeking_talent),
            seeking_description: v.seeking_description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub genres: Vec<String>,
    pub facebook_link: String,
    #[serde(alias = "website")]
    pub website_link: String,
    pub seeking_venue: Option<String>,
    pub seeking_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRecord {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub genres: Vec<String>,
    pub facebook_link: Option<String>,
    pub website_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn validate(&self) -> Result<ArtistRecord, FormErrors> {
        let mut check = Checker::default();
        let record = ArtistRecord {
            name: check.required("name", &self.name, SHORT_TEXT),
            city: check.required("city", &self.city, SHORT_TEXT),
            state: check.state(&self.state),
            phone: check.phone(&self.phone),
            image_link: check.link("image_link", &self.image_link, LONG_TEXT),
            genres: check.genres(&self.genres),
            facebook_link: check.link("facebook_link", &self.facebook_link, SHORT_TEXT),
            website_link: check.link("website_link", &self.website_link, SHORT_TEXT),
            seeking_venue: checked(&self.seeking_venue),
            seeking_description: check.optional(
                "seeking_description",
                &self.seeking_description,
                LONG_TEXT,
            ),
        };
        check.finish(record)
    }
}

impl From<&artist::Model> for ArtistForm {
    fn from(a: &artist::Model) -> Self {
        Self {
            name: a.name.clone(),
            city: a.city.clone(),
            state: a.state.clone(),
            phone: a.phone.clone().unwrap_or_default(),
            image_link: a.image_link.clone().unwrap_or_default(),
            genres: a.genre_list(),
            facebook_link: a.facebook_link.clone().unwrap_or_default(),
            website_link: a.website_link.clone().unwrap_or_default(),
            seeking_venue: checkbox(a.seeking_venue),
            seeking_description: a.seeking_description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRecord {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<Utc>,
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD HH:MM[:SS]` (space or `T`), read as UTC.
pub fn parse_start_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    .map(|naive| naive.and_utc())
}

fn parse_id(check: &mut Checker, field: &'static str, value: &str) -> i32 {
    let value = value.trim();
    if value.is_empty() {
        check.errors.push(field, "This field is required.");
        return 0;
    }
    match value.parse::<i32>() {
        Ok(id) if id > 0 => id,
        _ => {
            check.errors.push(field, "Not a valid id.");
            0
        }
    }
}

impl ShowForm {
    /// Blank form with the start time preset, as the create page shows it.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            start_time: format_start_time(&now, DateFormat::Raw),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<ShowRecord, FormErrors> {
        let mut check = Checker::default();
        let artist_id = parse_id(&mut check, "artist_id", &self.artist_id);
        let venue_id = parse_id(&mut check, "venue_id", &self.venue_id);
        let start_time = if self.start_time.trim().is_empty() {
            check.errors.push("start_time", "This field is required.");
            None
        } else {
            let parsed = parse_start_time(&self.start_time);
            if parsed.is_none() {
                check.errors.push("start_time", "Not a valid datetime value.");
            }
            parsed
        };
        match start_time {
            Some(start_time) => check.finish(ShowRecord {
                artist_id,
                venue_id,
                start_time,
            }),
            None => Err(check.errors),
        }
    }
}
