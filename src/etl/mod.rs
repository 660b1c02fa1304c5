mod driver;
mod json_lines;
mod locator;
mod log_file;
pub mod models;
mod song_file;

pub use driver::{process_data, Extractor, FailurePolicy, LoadReport};
pub use json_lines::JsonLines;
pub use locator::find_json_files;
pub use log_file::{extract_log_file, LogEvent, LogFileExtractor, LogFileRows, PlayEvent, PlayEvents};
pub use song_file::{extract_song_file, SongFileExtractor, SongRecord};
