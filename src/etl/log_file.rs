//! Event log extraction.
//!
//! A log file holds one user interaction per line. Only `NextSong` events are
//! plays; they are turned into time rows, user rows and songplay facts, the
//! latter resolving their song through a [`SongLookup`].

use super::driver::Extractor;
use super::json_lines::JsonLines;
use super::models::{Gender, Level, RowCounts, Songplay, TimeRow, UserRow};
use crate::error::EtlError;
use crate::warehouse::{LoadBatch, SongLookup};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const NEXT_SONG_PAGE: &str = "NextSong";

/// A raw log line. Only `page` and `ts` are present on every kind of event.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub page: String,
    pub ts: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub session_id: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Integer(i)) => Some(i.to_string()),
        Some(Raw::Float(f)) => Some(float_user_id(f)),
        None => None,
    })
}

// Whole floats inside the i64 range print as integers; the rest keep their
// float text so distinct ids never collapse onto i64::MAX.
fn float_user_id(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

impl LogEvent {
    pub fn is_song_play(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }
}

/// A `NextSong` event with every field a play needs.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayEvent {
    pub time: TimeRow,
    pub user: UserRow,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: i32,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl PlayEvent {
    fn from_event(event: LogEvent, path: &Path, line: usize) -> Result<PlayEvent, EtlError> {
        let missing = |field: &str| EtlError::parse(path, line, format!("missing {}", field));

        let time = TimeRow::from_epoch_millis(event.ts)
            .ok_or_else(|| EtlError::parse(path, line, format!("ts {} out of range", event.ts)))?;
        let user_id = event
            .user_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| missing("userId"))?;
        let level = event
            .level
            .ok_or_else(|| missing("level"))?
            .parse::<Level>()
            .map_err(|reason| EtlError::parse(path, line, reason))?;

        Ok(PlayEvent {
            time,
            user: UserRow {
                user_id,
                first_name: event.first_name.ok_or_else(|| missing("firstName"))?,
                last_name: event.last_name.ok_or_else(|| missing("lastName"))?,
                gender: Gender::from_code(event.gender.as_deref()),
                level,
            },
            song: event.song.ok_or_else(|| missing("song"))?,
            artist: event.artist.ok_or_else(|| missing("artist"))?,
            length: event.length.ok_or_else(|| missing("length"))?,
            session_id: event.session_id.ok_or_else(|| missing("sessionId"))?,
            location: event.location,
            user_agent: event.user_agent,
        })
    }
}

/// Lazy sequence of the plays in one log file. Other page types are
/// skipped; open it again to start over.
pub struct PlayEvents {
    lines: JsonLines<LogEvent>,
    path: PathBuf,
}

impl PlayEvents {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EtlError> {
        let path = path.as_ref().to_path_buf();
        Ok(PlayEvents {
            lines: JsonLines::open(&path)?,
            path,
        })
    }
}

impl Iterator for PlayEvents {
    type Item = Result<PlayEvent, EtlError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(event) = self.lines.next() {
            match event {
                Ok(event) if event.is_song_play() => {
                    let line = self.lines.line_number();
                    return Some(PlayEvent::from_event(event, &self.path, line));
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Rows derived from one log file.
#[derive(Debug, Default)]
pub struct LogFileRows {
    /// One per play, duplicates included.
    pub times: Vec<TimeRow>,
    /// Distinct by full row value, in first-seen order.
    pub users: Vec<UserRow>,
    pub songplays: Vec<Songplay>,
}

/// Parses a whole log file and derives its rows. Every songplay's song is
/// resolved through `lookup`; an unmatched play gets neither id.
pub fn extract_log_file<P, L>(path: P, lookup: &mut L) -> Result<LogFileRows, EtlError>
where
    P: AsRef<Path>,
    L: SongLookup + ?Sized,
{
    let plays = PlayEvents::open(path)?.collect::<Result<Vec<_>, _>>()?;

    let mut rows = LogFileRows::default();
    let mut seen_users = HashSet::new();
    for play in plays {
        let song = lookup.find_song(&play.song, &play.artist, play.length)?;
        rows.songplays.push(Songplay {
            start_time: play.time.start_time,
            user_id: play.user.user_id.clone(),
            level: play.user.level,
            song,
            session_id: play.session_id,
            location: play.location,
            user_agent: play.user_agent,
        });
        rows.times.push(play.time);
        if seen_users.insert(play.user.clone()) {
            rows.users.push(play.user);
        }
    }
    Ok(rows)
}

pub struct LogFileExtractor;

impl Extractor for LogFileExtractor {
    fn name(&self) -> &'static str {
        "log"
    }

    fn load_file(&self, path: &Path, batch: &mut dyn LoadBatch) -> Result<RowCounts, EtlError> {
        let rows = extract_log_file(path, &mut *batch)?;
        debug!(
            "{}: {} plays, {} distinct user rows, {} resolved songs",
            path.display(),
            rows.songplays.len(),
            rows.users.len(),
            rows.songplays.iter().filter(|s| s.song.is_some()).count()
        );

        for time in &rows.times {
            batch.insert_time(time)?;
        }
        for user in &rows.users {
            batch.insert_user(user)?;
        }
        for songplay in &rows.songplays {
            batch.insert_songplay(songplay)?;
        }

        Ok(RowCounts {
            time: rows.times.len(),
            users: rows.users.len(),
            songplays: rows.songplays.len(),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::models::SongRef;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeLookup {
        songs: HashMap<(String, String), SongRef>,
        calls: usize,
    }

    impl SongLookup for FakeLookup {
        fn find_song(
            &mut self,
            title: &str,
            artist_name: &str,
            _duration: f64,
        ) -> Result<Option<SongRef>, EtlError> {
            self.calls += 1;
            Ok(self
                .songs
                .get(&(title.to_string(), artist_name.to_string()))
                .cloned())
        }
    }

    fn play_line(ts: i64, user_id: &str, level: &str, song: &str) -> String {
        format!(
            r#"{{"artist":"Des'ree","auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":1,"lastName":"Summers","length":246.30812,"level":"{}","location":"Phoenix-Mesa-Scottsdale, AZ","method":"PUT","page":"NextSong","registration":1540344794796.0,"sessionId":139,"song":"{}","status":200,"ts":{},"userAgent":"Mozilla/5.0","userId":"{}"}}"#,
            level, song, ts, user_id
        )
    }

    fn home_line(ts: i64) -> String {
        format!(
            r#"{{"artist":null,"auth":"Logged In","firstName":"Walter","gender":"M","itemInSession":0,"lastName":"Frye","length":null,"level":"free","location":"San Francisco","method":"GET","page":"Home","registration":1540919166796.0,"sessionId":38,"song":null,"status":200,"ts":{},"userAgent":"Mozilla","userId":"39"}}"#,
            ts
        )
    }

    fn write_log(temp_dir: &TempDir, lines: &[String]) -> PathBuf {
        let path = temp_dir.path().join("2018-11-01-events.json");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn keeps_only_next_song_events() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(
            &temp_dir,
            &[
                home_line(1541105830796),
                play_line(1541106106796, "8", "free", "You Gotta Be"),
                r#"{"page":"Logout","ts":1541106106800,"userId":""}"#.to_string(),
                play_line(1541106352796, "8", "free", "Flawless"),
            ],
        );

        let mut lookup = FakeLookup::default();
        let rows = extract_log_file(&path, &mut lookup).unwrap();

        assert_eq!(rows.songplays.len(), 2);
        assert_eq!(rows.times.len(), 2);
        assert_eq!(lookup.calls, 2);
        assert!(rows.songplays.iter().all(|s| s.user_id == "8"));
    }

    #[test]
    fn time_rows_forward_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(
            &temp_dir,
            &[
                play_line(1541206796796, "8", "free", "A"),
                play_line(1541206796796, "8", "free", "B"),
            ],
        );

        let rows = extract_log_file(&path, &mut FakeLookup::default()).unwrap();
        assert_eq!(rows.times.len(), 2);
        assert_eq!(rows.times[0], rows.times[1]);
        assert_eq!(rows.times[0], TimeRow::from_epoch_millis(1541206796796).unwrap());
    }

    #[test]
    fn users_are_deduplicated_by_full_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(
            &temp_dir,
            &[
                play_line(1541106106796, "8", "free", "A"),
                play_line(1541106352796, "8", "free", "B"),
                play_line(1541106496796, "8", "paid", "C"),
            ],
        );

        let rows = extract_log_file(&path, &mut FakeLookup::default()).unwrap();
        let levels: Vec<_> = rows.users.iter().map(|u| u.level).collect();
        assert_eq!(levels, vec![Level::Free, Level::Paid]);
        assert_eq!(rows.users[0].gender, Gender::Female);
    }

    #[test]
    fn lookup_resolves_both_ids_or_neither() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(
            &temp_dir,
            &[
                play_line(1541106106796, "8", "free", "You Gotta Be"),
                play_line(1541106352796, "8", "free", "Unknown Song"),
            ],
        );
        let mut lookup = FakeLookup::default();
        lookup.songs.insert(
            ("You Gotta Be".to_string(), "Des'ree".to_string()),
            SongRef {
                song_id: "SONGID".to_string(),
                artist_id: "ARTISTID".to_string(),
            },
        );

        let rows = extract_log_file(&path, &mut lookup).unwrap();
        assert_eq!(rows.songplays[0].song_id(), Some("SONGID"));
        assert_eq!(rows.songplays[0].artist_id(), Some("ARTISTID"));
        assert_eq!(rows.songplays[1].song_id(), None);
        assert_eq!(rows.songplays[1].artist_id(), None);
    }

    #[test]
    fn numeric_user_id_is_coerced() {
        let temp_dir = TempDir::new().unwrap();
        let line = play_line(1541106106796, "8", "free", "A").replace("\"userId\":\"8\"", "\"userId\":8");
        let path = write_log(&temp_dir, &[line]);

        let rows = extract_log_file(&path, &mut FakeLookup::default()).unwrap();
        assert_eq!(rows.users[0].user_id, "8");
    }

    #[test]
    fn float_user_ids_stay_distinct() {
        assert_eq!(float_user_id(26.0), "26");
        assert_eq!(float_user_id(-3.0), "-3");
        assert_eq!(float_user_id(2.5), "2.5");
        assert_ne!(float_user_id(1e20), float_user_id(2e20));
        assert_ne!(float_user_id(1e20), i64::MAX.to_string());

        let temp_dir = TempDir::new().unwrap();
        let lines: Vec<_> = [("\"userId\":1e20", 1541106106796), ("\"userId\":2e20", 1541106352796)]
            .iter()
            .map(|(id, ts)| play_line(*ts, "8", "free", "A").replace("\"userId\":\"8\"", id))
            .collect();
        let path = write_log(&temp_dir, &lines);

        let rows = extract_log_file(&path, &mut FakeLookup::default()).unwrap();
        assert_eq!(rows.users.len(), 2);
        assert_ne!(rows.users[0].user_id, rows.users[1].user_id);
    }

    #[test]
    fn bad_line_aborts_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(
            &temp_dir,
            &[
                play_line(1541106106796, "8", "free", "A"),
                "{not json".to_string(),
            ],
        );

        match extract_log_file(&path, &mut FakeLookup::default()) {
            Err(EtlError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn play_missing_song_fields_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let line = play_line(1541106106796, "8", "free", "A").replace("\"length\":246.30812,", "");
        let path = write_log(&temp_dir, &[home_line(1541105830796), line]);

        match extract_log_file(&path, &mut FakeLookup::default()) {
            Err(EtlError::Parse { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("length"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_level_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(&temp_dir, &[play_line(1541106106796, "8", "gold", "A")]);
        assert!(matches!(
            extract_log_file(&path, &mut FakeLookup::default()),
            Err(EtlError::Parse { .. })
        ));
    }
}
