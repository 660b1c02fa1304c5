//! Typed rows of the star schema.
//!
//! Each row is built once from a source record and handed to the warehouse
//! right away; nothing here is kept past the file it came from.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};
use std::ops::AddAssign;

#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Calendar breakdown of a single play timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: i32,
    pub day: i32,
    /// ISO-8601 week number.
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// Monday is 0, Sunday is 6.
    pub weekday: i32,
}

impl TimeRow {
    /// Returns None when `ts` is outside the range chrono can represent.
    pub fn from_epoch_millis(ts: i64) -> Option<TimeRow> {
        let start_time = DateTime::from_timestamp_millis(ts)?.naive_utc();
        Some(TimeRow::from_start_time(start_time))
    }

    pub fn from_start_time(start_time: NaiveDateTime) -> TimeRow {
        TimeRow {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_monday() as i32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn from_code(code: Option<&str>) -> Gender {
        match code {
            Some("M") => Gender::Male,
            Some("F") => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    /// Column value, Unknown is stored as NULL.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Gender::Male => Some("M"),
            Gender::Female => Some("F"),
            Gender::Unknown => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Free,
    Paid,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Free => "free",
            Level::Paid => "paid",
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Level::Free),
            "paid" => Ok(Level::Paid),
            other => Err(format!("unknown level \"{}\"", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserRow {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub level: Level,
}

/// A resolved (song_id, artist_id) pair. Songplays carry either both ids or
/// neither, so the pair travels as one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongRef {
    pub song_id: String,
    pub artist_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Songplay {
    pub start_time: NaiveDateTime,
    pub user_id: String,
    pub level: Level,
    pub song: Option<SongRef>,
    pub session_id: i32,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl Songplay {
    pub fn song_id(&self) -> Option<&str> {
        self.song.as_ref().map(|s| s.song_id.as_str())
    }

    pub fn artist_id(&self) -> Option<&str> {
        self.song.as_ref().map(|s| s.artist_id.as_str())
    }
}

/// Number of rows per table, used both for insert statements issued and for
/// rows present in the warehouse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub songs: usize,
    pub artists: usize,
    pub time: usize,
    pub users: usize,
    pub songplays: usize,
}

impl AddAssign for RowCounts {
    fn add_assign(&mut self, other: Self) {
        self.songs += other.songs;
        self.artists += other.artists;
        self.time += other.time;
        self.users += other.users;
        self.songplays += other.songplays;
    }
}
