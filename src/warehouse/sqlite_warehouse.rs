use super::schema::{
    self, Dialect, ARTISTS_TABLE, ARTIST_TABLE_INSERT, SONGPLAYS_TABLE, SONGPLAY_TABLE_INSERT,
    SONGS_TABLE, SONG_SELECT, SONG_TABLE_INSERT, TABLES, TIME_TABLE, TIME_TABLE_INSERT,
    USERS_TABLE, USER_TABLE_INSERT,
};
use super::{LoadBatch, SongLookup, Warehouse};
use crate::error::EtlError;
use crate::etl::models::{Artist, RowCounts, Song, SongRef, Songplay, TimeRow, UserRow};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use tracing::info;

pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, EtlError> {
        let conn = Connection::open_with_flags(
            db_path.as_ref(),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| EtlError::Connection(e.into()))?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self, EtlError> {
        let conn = Connection::open_in_memory().map_err(|e| EtlError::Connection(e.into()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, EtlError> {
        let mut warehouse = SqliteWarehouse { conn };

        let table_count: i64 = warehouse
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |r| r.get(0),
            )
            .map_err(|e| EtlError::query("Failed to inspect database", e))?;

        if table_count == 0 {
            info!("Creating warehouse schema in new SQLite database");
            warehouse.create_tables()?;
        }
        Ok(warehouse)
    }

    fn create_tables(&mut self) -> Result<(), EtlError> {
        for query in schema::create_table_queries(Dialect::Sqlite) {
            self.conn
                .execute(&query, [])
                .map_err(|e| EtlError::query(format!("Failed to run \"{}\"", query), e))?;
        }
        Ok(())
    }

    fn drop_tables(&mut self) -> Result<(), EtlError> {
        for query in schema::drop_table_queries() {
            self.conn
                .execute(&query, [])
                .map_err(|e| EtlError::query(format!("Failed to run \"{}\"", query), e))?;
        }
        Ok(())
    }
}

impl Warehouse for SqliteWarehouse {
    fn reset_schema(&mut self) -> Result<(), EtlError> {
        self.drop_tables()?;
        self.create_tables()
    }

    fn begin_batch(&mut self) -> Result<Box<dyn LoadBatch + '_>, EtlError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| EtlError::query("Failed to begin transaction", e))?;
        Ok(Box::new(SqliteBatch { tx }))
    }

    fn row_counts(&mut self) -> Result<RowCounts, EtlError> {
        let mut counts = [0usize; 5];
        for (slot, table) in counts.iter_mut().zip(TABLES) {
            let count: i64 = self
                .conn
                .query_row(&table.count_sql(), [], |r| r.get(0))
                .map_err(|e| EtlError::query(format!("Failed to count {}", table.name), e))?;
            *slot = count as usize;
        }
        let [songplays, users, songs, artists, time] = counts;
        Ok(RowCounts {
            songs,
            artists,
            time,
            users,
            songplays,
        })
    }
}

struct SqliteBatch<'conn> {
    tx: Transaction<'conn>,
}

impl SongLookup for SqliteBatch<'_> {
    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongRef>, EtlError> {
        self.tx
            .query_row(SONG_SELECT, params![title, artist_name, duration], |row| {
                Ok(SongRef {
                    song_id: row.get(0)?,
                    artist_id: row.get(1)?,
                })
            })
            .optional()
            .map_err(|e| EtlError::query("Song lookup failed", e))
    }
}

impl LoadBatch for SqliteBatch<'_> {
    fn insert_song(&mut self, song: &Song) -> Result<(), EtlError> {
        self.tx
            .execute(
                SONG_TABLE_INSERT,
                params![
                    song.song_id,
                    song.title,
                    song.artist_id,
                    song.year,
                    song.duration
                ],
            )
            .map_err(|e| EtlError::insert(SONGS_TABLE.name, e))?;
        Ok(())
    }

    fn insert_artist(&mut self, artist: &Artist) -> Result<(), EtlError> {
        self.tx
            .execute(
                ARTIST_TABLE_INSERT,
                params![
                    artist.artist_id,
                    artist.name,
                    artist.location,
                    artist.latitude,
                    artist.longitude
                ],
            )
            .map_err(|e| EtlError::insert(ARTISTS_TABLE.name, e))?;
        Ok(())
    }

    fn insert_time(&mut self, time: &TimeRow) -> Result<(), EtlError> {
        self.tx
            .execute(
                TIME_TABLE_INSERT,
                params![
                    time.start_time,
                    time.hour,
                    time.day,
                    time.week,
                    time.month,
                    time.year,
                    time.weekday
                ],
            )
            .map_err(|e| EtlError::insert(TIME_TABLE.name, e))?;
        Ok(())
    }

    fn insert_user(&mut self, user: &UserRow) -> Result<(), EtlError> {
        self.tx
            .execute(
                USER_TABLE_INSERT,
                params![
                    user.user_id,
                    user.first_name,
                    user.last_name,
                    user.gender.code(),
                    user.level.as_str()
                ],
            )
            .map_err(|e| EtlError::insert(USERS_TABLE.name, e))?;
        Ok(())
    }

    fn insert_songplay(&mut self, songplay: &Songplay) -> Result<(), EtlError> {
        self.tx
            .execute(
                SONGPLAY_TABLE_INSERT,
                params![
                    songplay.start_time,
                    songplay.user_id,
                    songplay.level.as_str(),
                    songplay.song_id(),
                    songplay.artist_id(),
                    songplay.session_id,
                    songplay.location,
                    songplay.user_agent
                ],
            )
            .map_err(|e| EtlError::insert(SONGPLAYS_TABLE.name, e))?;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), EtlError> {
        self.tx
            .commit()
            .map_err(|e| EtlError::query("Failed to commit", e))
    }
}
