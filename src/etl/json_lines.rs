use crate::error::EtlError;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Lazy reader over a JSON Lines file, yielding one record per non-blank line.
///
/// The sequence is finite and can be restarted by opening the file again.
/// A line that is not valid JSON for `T` yields a `Parse` error carrying the
/// 1-based line number.
pub struct JsonLines<T> {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    _record: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonLines<T> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EtlError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(JsonLines {
            path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
            _record: PhantomData,
        })
    }

    /// Line number of the last record handed out.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<T: DeserializeOwned> Iterator for JsonLines<T> {
    type Item = Result<T, EtlError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(
                serde_json::from_str(&line)
                    .map_err(|e| EtlError::parse(&self.path, self.line_number, e.to_string())),
            );
        }
    }
}
