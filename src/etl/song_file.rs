use super::driver::Extractor;
use super::json_lines::JsonLines;
use super::models::{Artist, RowCounts, Song};
use crate::error::EtlError;
use crate::warehouse::LoadBatch;
use serde::Deserialize;
use std::path::Path;

/// One record of the song catalog, as found in `song_data`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    pub fn song(&self) -> Song {
        Song {
            song_id: self.song_id.clone(),
            title: self.title.clone(),
            artist_id: self.artist_id.clone(),
            year: self.year,
            duration: self.duration,
        }
    }

    pub fn artist(&self) -> Artist {
        Artist {
            artist_id: self.artist_id.clone(),
            name: self.artist_name.clone(),
            location: self.artist_location.clone(),
            latitude: self.artist_latitude,
            longitude: self.artist_longitude,
        }
    }
}

/// Reads the song and artist row of a song file. Only the first record is
/// used, which is the first row left after exact duplicates are dropped.
pub fn extract_song_file<P: AsRef<Path>>(path: P) -> Result<(Song, Artist), EtlError> {
    let path = path.as_ref();
    let record: SongRecord = JsonLines::open(path)?
        .next()
        .ok_or_else(|| EtlError::parse(path, 0, "no song record in file"))??;
    Ok((record.song(), record.artist()))
}

pub struct SongFileExtractor;

impl Extractor for SongFileExtractor {
    fn name(&self) -> &'static str {
        "song"
    }

    fn load_file(&self, path: &Path, batch: &mut dyn LoadBatch) -> Result<RowCounts, EtlError> {
        let (song, artist) = extract_song_file(path)?;
        batch.insert_song(&song)?;
        batch.insert_artist(&artist)?;
        Ok(RowCounts {
            songs: 1,
            artists: 1,
            ..Default::default()
        })
    }
}
