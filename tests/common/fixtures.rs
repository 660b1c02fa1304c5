use rusqlite::Connection;
use sparkify_etl::warehouse::SqliteWarehouse;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn song_json(song_id: &str, title: &str, artist_id: &str, artist_name: &str, duration: f64) -> String {
    format!(
        r#"{{"num_songs": 1, "artist_id": "{}", "artist_latitude": 35.14968, "artist_longitude": -90.04892, "artist_location": "Memphis, TN", "artist_name": "{}", "song_id": "{}", "title": "{}", "duration": {}, "year": 1999}}"#,
        artist_id, artist_name, song_id, title, duration
    )
}

pub fn log_line(page: &str, ts: i64, user_id: &str, level: &str, song: Option<(&str, &str, f64)>) -> String {
    let (song, artist, length) = match song {
        Some((title, artist, length)) => (
            format!("\"{}\"", title),
            format!("\"{}\"", artist),
            length.to_string(),
        ),
        None => ("null".to_string(), "null".to_string(), "null".to_string()),
    };
    format!(
        r#"{{"artist":{},"auth":"Logged In","firstName":"Ryan","gender":"M","itemInSession":0,"lastName":"Smith","length":{},"level":"{}","location":"San Jose-Sunnyvale-Santa Clara, CA","method":"PUT","page":"{}","registration":1541016707796.0,"sessionId":169,"song":{},"status":200,"ts":{},"userAgent":"Mozilla\/5.0 (X11; Linux x86_64)","userId":"{}"}}"#,
        artist, length, level, page, song, ts, user_id
    )
}

/// A temporary data tree plus a SQLite warehouse file.
pub struct TestData {
    pub dir: TempDir,
}

impl TestData {
    pub fn new() -> TestData {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("song_data")).unwrap();
        fs::create_dir_all(dir.path().join("log_data")).unwrap();
        TestData { dir }
    }

    pub fn song_data(&self) -> PathBuf {
        self.dir.path().join("song_data")
    }

    pub fn log_data(&self) -> PathBuf {
        self.dir.path().join("log_data")
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("sparkify.db")
    }

    pub fn write_song_file(&self, relative: &str, content: &str) -> PathBuf {
        write(&self.song_data().join(relative), content)
    }

    pub fn write_log_file(&self, relative: &str, lines: &[String]) -> PathBuf {
        write(&self.log_data().join(relative), &lines.join("\n"))
    }

    pub fn open_warehouse(&self) -> SqliteWarehouse {
        SqliteWarehouse::open(self.db_path()).unwrap()
    }

    /// A separate connection for inspecting loaded rows.
    pub fn inspect(&self) -> Connection {
        Connection::open(self.db_path()).unwrap()
    }
}

fn write(path: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
    path.to_path_buf()
}
