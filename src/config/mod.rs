mod file_config;

pub use file_config::{EtlSection, FileConfig, PostgresSection, SqliteSection};

use crate::error::EtlError;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "db.toml";
pub const DEFAULT_SONG_DATA: &str = "data/song_data";
pub const DEFAULT_LOG_DATA: &str = "data/log_data";

/// CLI arguments that take part in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub sqlite_path: Option<PathBuf>,
    pub song_data: Option<PathBuf>,
    pub log_data: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub db_name: String,
    pub user: String,
    pub password: String,
}

impl PostgresConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "host={} dbname={} user={} password={}",
            self.host, self.db_name, self.user, self.password
        )
    }
}

impl From<PostgresSection> for PostgresConfig {
    fn from(section: PostgresSection) -> Self {
        PostgresConfig {
            host: section.host,
            db_name: section.db_name,
            user: section.user,
            password: section.password,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarehouseConfig {
    Postgres(PostgresConfig),
    Sqlite(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub warehouse: WarehouseConfig,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and an optional TOML file config.
    /// The `--sqlite` argument selects the backend over the file; for the data
    /// roots TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self, EtlError> {
        let file = file_config.unwrap_or_default();

        let warehouse = if let Some(path) = &cli.sqlite_path {
            WarehouseConfig::Sqlite(path.clone())
        } else if let Some(sqlite) = file.sqlite {
            WarehouseConfig::Sqlite(PathBuf::from(sqlite.path))
        } else if let Some(postgres) = file.postgres {
            WarehouseConfig::Postgres(postgres.into())
        } else {
            return Err(EtlError::Config(
                "No database configured: add a [POSTGRES] or [SQLITE] section, or pass --sqlite"
                    .to_string(),
            ));
        };

        let etl = file.etl.unwrap_or_default();
        let song_data = etl
            .song_data
            .map(PathBuf::from)
            .or_else(|| cli.song_data.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SONG_DATA));
        let log_data = etl
            .log_data
            .map(PathBuf::from)
            .or_else(|| cli.log_data.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DATA));

        Ok(Self {
            warehouse,
            song_data,
            log_data,
        })
    }

    /// Loads the config file at `path` and resolves it against the CLI.
    /// The file may only be absent when the CLI alone selects a backend.
    pub fn load(cli: &CliConfig, path: &std::path::Path) -> Result<Self, EtlError> {
        let file_config = if path.exists() {
            Some(FileConfig::load(path)?)
        } else if cli.sqlite_path.is_some() {
            None
        } else {
            return Err(EtlError::Config(format!(
                "Config file not found: {:?}",
                path
            )));
        };
        Self::resolve(cli, file_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const POSTGRES_TOML: &str = r#"
[POSTGRES]
HOST = "127.0.0.1"
DB_NAME = "sparkifydb"
USER = "student"
PASSWORD = "secret"
"#;

    #[test]
    fn resolves_postgres_section() {
        let file = FileConfig::parse(POSTGRES_TOML).unwrap();
        let config = AppConfig::resolve(&CliConfig::default(), Some(file)).unwrap();

        match config.warehouse {
            WarehouseConfig::Postgres(pg) => assert_eq!(
                pg.connection_string(),
                "host=127.0.0.1 dbname=sparkifydb user=student password=secret"
            ),
            other => panic!("unexpected warehouse {:?}", other),
        }
        assert_eq!(config.song_data, PathBuf::from(DEFAULT_SONG_DATA));
        assert_eq!(config.log_data, PathBuf::from(DEFAULT_LOG_DATA));
    }

    #[test]
    fn missing_postgres_key_is_rejected() {
        let toml = "[POSTGRES]\nHOST = \"h\"\nDB_NAME = \"d\"\nUSER = \"u\"\n";
        assert!(FileConfig::parse(toml).is_err());
    }

    #[test]
    fn cli_sqlite_wins_over_file() {
        let file = FileConfig::parse(POSTGRES_TOML).unwrap();
        let cli = CliConfig {
            sqlite_path: Some(PathBuf::from("local.db")),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, Some(file)).unwrap();
        assert_eq!(
            config.warehouse,
            WarehouseConfig::Sqlite(PathBuf::from("local.db"))
        );
    }

    #[test]
    fn toml_data_roots_override_cli() {
        let toml = "[SQLITE]\nPATH = \"x.db\"\n[ETL]\nLOG_DATA = \"other/logs\"\n";
        let cli = CliConfig {
            song_data: Some(PathBuf::from("cli/songs")),
            log_data: Some(PathBuf::from("cli/logs")),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, Some(FileConfig::parse(toml).unwrap())).unwrap();
        assert_eq!(config.song_data, PathBuf::from("cli/songs"));
        assert_eq!(config.log_data, PathBuf::from("other/logs"));
    }

    #[test]
    fn no_backend_is_a_config_error() {
        let result = AppConfig::resolve(&CliConfig::default(), None);
        assert!(matches!(result, Err(EtlError::Config(_))));
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.toml");

        let result = AppConfig::load(&CliConfig::default(), &path);
        assert!(matches!(result, Err(EtlError::Config(_))));

        let cli = CliConfig {
            sqlite_path: Some(temp_dir.path().join("etl.db")),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli, &path).is_ok());
    }

    #[test]
    fn loads_file_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.toml");
        std::fs::write(&path, POSTGRES_TOML).unwrap();

        let config = AppConfig::load(&CliConfig::default(), &path).unwrap();
        assert!(matches!(config.warehouse, WarehouseConfig::Postgres(_)));
    }
}
