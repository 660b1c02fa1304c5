use super::schema::{
    self, Dialect, ARTISTS_TABLE, ARTIST_TABLE_INSERT, SONGPLAYS_TABLE, SONGPLAY_TABLE_INSERT,
    SONGS_TABLE, SONG_SELECT, SONG_TABLE_INSERT, TIME_TABLE, TIME_TABLE_INSERT, USERS_TABLE,
    USER_TABLE_INSERT,
};
use super::{LoadBatch, SongLookup, Warehouse};
use crate::config::PostgresConfig;
use crate::error::EtlError;
use crate::etl::models::{Artist, RowCounts, Song, SongRef, Songplay, TimeRow, UserRow};
use postgres::{Client, NoTls, Transaction};
use tracing::info;

pub struct PostgresWarehouse {
    client: Client,
}

impl PostgresWarehouse {
    pub fn connect(config: &PostgresConfig) -> Result<Self, EtlError> {
        info!(
            "Connecting to Postgres database {} at {}...",
            config.db_name, config.host
        );
        let client = Client::connect(&config.connection_string(), NoTls)
            .map_err(|e| EtlError::Connection(e.into()))?;
        Ok(PostgresWarehouse { client })
    }

    fn run_each(&mut self, queries: Vec<String>) -> Result<(), EtlError> {
        for query in queries {
            self.client
                .batch_execute(&query)
                .map_err(|e| EtlError::query(format!("Failed to run \"{}\"", query), e))?;
        }
        Ok(())
    }

    fn count(&mut self, table: &'static str, sql: String) -> Result<usize, EtlError> {
        let row = self
            .client
            .query_one(&sql, &[])
            .map_err(|e| EtlError::query(format!("Failed to count {}", table), e))?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }
}

impl Warehouse for PostgresWarehouse {
    fn reset_schema(&mut self) -> Result<(), EtlError> {
        self.run_each(schema::drop_table_queries())?;
        self.run_each(schema::create_table_queries(Dialect::Postgres))
    }

    fn begin_batch(&mut self) -> Result<Box<dyn LoadBatch + '_>, EtlError> {
        let tx = self
            .client
            .transaction()
            .map_err(|e| EtlError::query("Failed to begin transaction", e))?;
        Ok(Box::new(PostgresBatch { tx }))
    }

    fn row_counts(&mut self) -> Result<RowCounts, EtlError> {
        Ok(RowCounts {
            songs: self.count(SONGS_TABLE.name, SONGS_TABLE.count_sql())?,
            artists: self.count(ARTISTS_TABLE.name, ARTISTS_TABLE.count_sql())?,
            time: self.count(TIME_TABLE.name, TIME_TABLE.count_sql())?,
            users: self.count(USERS_TABLE.name, USERS_TABLE.count_sql())?,
            songplays: self.count(SONGPLAYS_TABLE.name, SONGPLAYS_TABLE.count_sql())?,
        })
    }
}

struct PostgresBatch<'client> {
    tx: Transaction<'client>,
}

impl SongLookup for PostgresBatch<'_> {
    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongRef>, EtlError> {
        let rows = self
            .tx
            .query(SONG_SELECT, &[&title, &artist_name, &duration])
            .map_err(|e| EtlError::query("Song lookup failed", e))?;
        Ok(rows.first().map(|row| SongRef {
            song_id: row.get(0),
            artist_id: row.get(1),
        }))
    }
}

impl LoadBatch for PostgresBatch<'_> {
    fn insert_song(&mut self, song: &Song) -> Result<(), EtlError> {
        self.tx
            .execute(
                SONG_TABLE_INSERT,
                &[
                    &song.song_id,
                    &song.title,
                    &song.artist_id,
                    &song.year,
                    &song.duration,
                ],
            )
            .map_err(|e| EtlError::insert(SONGS_TABLE.name, e))?;
        Ok(())
    }

    fn insert_artist(&mut self, artist: &Artist) -> Result<(), EtlError> {
        self.tx
            .execute(
                ARTIST_TABLE_INSERT,
                &[
                    &artist.artist_id,
                    &artist.name,
                    &artist.location,
                    &artist.latitude,
                    &artist.longitude,
                ],
            )
            .map_err(|e| EtlError::insert(ARTISTS_TABLE.name, e))?;
        Ok(())
    }

    fn insert_time(&mut self, time: &TimeRow) -> Result<(), EtlError> {
        self.tx
            .execute(
                TIME_TABLE_INSERT,
                &[
                    &time.start_time,
                    &time.hour,
                    &time.day,
                    &time.week,
                    &time.month,
                    &time.year,
                    &time.weekday,
                ],
            )
            .map_err(|e| EtlError::insert(TIME_TABLE.name, e))?;
        Ok(())
    }

    fn insert_user(&mut self, user: &UserRow) -> Result<(), EtlError> {
        self.tx
            .execute(
                USER_TABLE_INSERT,
                &[
                    &user.user_id,
                    &user.first_name,
                    &user.last_name,
                    &user.gender.code(),
                    &user.level.as_str(),
                ],
            )
            .map_err(|e| EtlError::insert(USERS_TABLE.name, e))?;
        Ok(())
    }

    fn insert_songplay(&mut self, songplay: &Songplay) -> Result<(), EtlError> {
        self.tx
            .execute(
                SONGPLAY_TABLE_INSERT,
                &[
                    &songplay.start_time,
                    &songplay.user_id,
                    &songplay.level.as_str(),
                    &songplay.song_id(),
                    &songplay.artist_id(),
                    &songplay.session_id,
                    &songplay.location,
                    &songplay.user_agent,
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
