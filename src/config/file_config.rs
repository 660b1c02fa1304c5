use crate::error::EtlError;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    #[serde(rename = "POSTGRES")]
    pub postgres: Option<PostgresSection>,
    #[serde(rename = "SQLITE")]
    pub sqlite: Option<SqliteSection>,
    #[serde(rename = "ETL")]
    pub etl: Option<EtlSection>,
}

/// Credentials of the Postgres warehouse. Every key is required.
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSection {
    #[serde(rename = "HOST")]
    pub host: String,
    #[serde(rename = "DB_NAME")]
    pub db_name: String,
    #[serde(rename = "USER")]
    pub user: String,
    #[serde(rename = "PASSWORD")]
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SqliteSection {
    #[serde(rename = "PATH")]
    pub path: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EtlSection {
    #[serde(rename = "SONG_DATA")]
    pub song_data: Option<String>,
    #[serde(rename = "LOG_DATA")]
    pub log_data: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, EtlError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::parse(&content)
            .map_err(|e| EtlError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
