//! Sparkify ETL Library
//!
//! Loads the song catalog and the user activity logs of the Sparkify
//! streaming service into a star schema for "who played what, when" queries.

pub mod cli;
pub mod config;
pub mod error;
pub mod etl;
pub mod warehouse;

pub use config::{AppConfig, CliConfig, WarehouseConfig};
pub use error::EtlError;
pub use etl::{process_data, FailurePolicy, LoadReport, LogFileExtractor, SongFileExtractor};
pub use warehouse::{open_warehouse, Warehouse};
