pub mod schema;

mod postgres_warehouse;
mod sqlite_warehouse;

pub use postgres_warehouse::PostgresWarehouse;
pub use sqlite_warehouse::SqliteWarehouse;

use crate::config::WarehouseConfig;
use crate::error::EtlError;
use crate::etl::models::{Artist, RowCounts, Song, SongRef, Songplay, TimeRow, UserRow};

/// Resolves a songplay's (title, artist name, duration) to catalog ids.
pub trait SongLookup {
    /// Returns None if no song in the warehouse matches all three values.
    fn find_song(
        &mut self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongRef>, EtlError>;
}

/// One open transaction. Rows inserted through it become visible together on
/// `commit`; dropping the batch without committing rolls everything back.
pub trait LoadBatch: SongLookup {
    fn insert_song(&mut self, song: &Song) -> Result<(), EtlError>;

    fn insert_artist(&mut self, artist: &Artist) -> Result<(), EtlError>;

    fn insert_time(&mut self, time: &TimeRow) -> Result<(), EtlError>;

    /// Inserts the user, or overwrites the stored level if the user exists.
    fn insert_user(&mut self, user: &UserRow) -> Result<(), EtlError>;

    fn insert_songplay(&mut self, songplay: &Songplay) -> Result<(), EtlError>;

    fn commit(self: Box<Self>) -> Result<(), EtlError>;
}

/// An open connection to the relational store. The connection is released
/// when the value is dropped.
pub trait Warehouse {
    /// Drops every table if it exists, then creates all of them.
    fn reset_schema(&mut self) -> Result<(), EtlError>;

    fn begin_batch(&mut self) -> Result<Box<dyn LoadBatch + '_>, EtlError>;

    fn row_counts(&mut self) -> Result<RowCounts, EtlError>;
}

pub fn open_warehouse(config: &WarehouseConfig) -> Result<Box<dyn Warehouse>, EtlError> {
    match config {
        WarehouseConfig::Postgres(pg) => Ok(Box::new(PostgresWarehouse::connect(pg)?)),
        WarehouseConfig::Sqlite(path) => Ok(Box::new(SqliteWarehouse::open(path)?)),
    }
}
