//! Star schema definitions: table layouts, DDL rendering per SQL dialect and
//! the fixed insert/lookup statements.
//!
//! DML uses `$n` placeholders, which both Postgres and SQLite accept, so only
//! the DDL differs between backends.

macro_rules! warehouse_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Timestamp,
    /// Auto-assigned integer id.
    Serial,
}

impl SqlType {
    pub fn render(&self, dialect: Dialect) -> &'static str {
        match (dialect, self) {
            (Dialect::Postgres, SqlType::Text) => "TEXT",
            (Dialect::Postgres, SqlType::Integer) => "INT",
            (Dialect::Postgres, SqlType::Real) => "DOUBLE PRECISION",
            (Dialect::Postgres, SqlType::Timestamp) => "TIMESTAMP",
            (Dialect::Postgres, SqlType::Serial) => "SERIAL",
            (Dialect::Sqlite, SqlType::Text) => "TEXT",
            (Dialect::Sqlite, SqlType::Integer) => "INTEGER",
            (Dialect::Sqlite, SqlType::Real) => "REAL",
            (Dialect::Sqlite, SqlType::Timestamp) => "TEXT",
            // INTEGER PRIMARY KEY aliases the rowid
            (Dialect::Sqlite, SqlType::Serial) => "INTEGER",
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn create_sql(&self, dialect: Dialect) -> String {
        let mut create_sql = format!("CREATE TABLE IF NOT EXISTS {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!(
                "{} {}",
                column.name,
                column.sql_type.render(dialect)
            ));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
        }
        create_sql.push_str(");");
        create_sql
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }

    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}", self.name)
    }
}

pub const SONGPLAYS_TABLE: Table = Table {
    name: "songplays",
    columns: &[
        warehouse_column!("songplay_id", &SqlType::Serial, is_primary_key = true),
        warehouse_column!("start_time", &SqlType::Timestamp, non_null = true),
        warehouse_column!("user_id", &SqlType::Text, non_null = true),
        warehouse_column!("level", &SqlType::Text, non_null = true),
        // song_id/artist_id stay NULL when the lookup finds nothing
        warehouse_column!("song_id", &SqlType::Text),
        warehouse_column!("artist_id", &SqlType::Text),
        warehouse_column!("session_id", &SqlType::Integer, non_null = true),
        warehouse_column!("location", &SqlType::Text),
        warehouse_column!("user_agent", &SqlType::Text),
    ],
};

pub const USERS_TABLE: Table = Table {
    name: "users",
    columns: &[
        warehouse_column!("user_id", &SqlType::Text, is_primary_key = true),
        warehouse_column!("first_name", &SqlType::Text),
        warehouse_column!("last_name", &SqlType::Text),
        warehouse_column!("gender", &SqlType::Text),
        warehouse_column!("level", &SqlType::Text, non_null = true),
    ],
};

pub const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        warehouse_column!("song_id", &SqlType::Text, is_primary_key = true),
        warehouse_column!("title", &SqlType::Text, non_null = true),
        warehouse_column!("artist_id", &SqlType::Text, non_null = true),
        warehouse_column!("year", &SqlType::Integer),
        warehouse_column!("duration", &SqlType::Real, non_null = true),
    ],
};

pub const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        warehouse_column!("artist_id", &SqlType::Text, is_primary_key = true),
        warehouse_column!("name", &SqlType::Text, non_null = true),
        warehouse_column!("location", &SqlType::Text),
        warehouse_column!("latitude", &SqlType::Real),
        warehouse_column!("longitude", &SqlType::Real),
    ],
};

pub const TIME_TABLE: Table = Table {
    name: "time",
    columns: &[
        warehouse_column!("start_time", &SqlType::Timestamp, is_primary_key = true),
        warehouse_column!("hour", &SqlType::Integer, non_null = true),
        warehouse_column!("day", &SqlType::Integer, non_null = true),
        warehouse_column!("week", &SqlType::Integer, non_null = true),
        warehouse_column!("month", &SqlType::Integer, non_null = true),
        warehouse_column!("year", &SqlType::Integer, non_null = true),
        warehouse_column!("weekday", &SqlType::Integer, non_null = true),
    ],
};

/// All tables in creation order.
pub const TABLES: &[Table] = &[
    SONGPLAYS_TABLE,
    USERS_TABLE,
    SONGS_TABLE,
    ARTISTS_TABLE,
    TIME_TABLE,
];

pub fn create_table_queries(dialect: Dialect) -> Vec<String> {
    TABLES.iter().map(|t| t.create_sql(dialect)).collect()
}

pub fn drop_table_queries() -> Vec<String> {
    TABLES.iter().map(|t| t.drop_sql()).collect()
}

pub const SONGPLAY_TABLE_INSERT: &str = "INSERT INTO songplays \
    (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

// A user's level changes over time, the latest row wins.
pub const USER_TABLE_INSERT: &str = "INSERT INTO users \
    (user_id, first_name, last_name, gender, level) \
    VALUES ($1, $2, $3, $4, $5) \
    ON CONFLICT (user_id) DO UPDATE SET level = EXCLUDED.level";

pub const SONG_TABLE_INSERT: &str = "INSERT INTO songs \
    (song_id, title, artist_id, year, duration) \
    VALUES ($1, $2, $3, $4, $5) \
    ON CONFLICT (song_id) DO NOTHING";

pub const ARTIST_TABLE_INSERT: &str = "INSERT INTO artists \
    (artist_id, name, location, latitude, longitude) \
    VALUES ($1, $2, $3, $4, $5) \
    ON CONFLICT (artist_id) DO NOTHING";

pub const TIME_TABLE_INSERT: &str = "INSERT INTO time \
    (start_time, hour, day, week, month, year, weekday) \
    VALUES ($1, $2, $3, $4, $5, $6, $7) \
    ON CONFLICT (start_time) DO NOTHING";

/// (title, artist name, duration) -> (song_id, artist_id)
pub const SONG_SELECT: &str = "SELECT songs.song_id, artists.artist_id \
    FROM songs JOIN artists ON songs.artist_id = artists.artist_id \
    WHERE songs.title = $1 AND artists.name = $2 AND songs.duration = $3";
