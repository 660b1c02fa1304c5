use super::locator::find_json_files;
use super::models::RowCounts;
use crate::error::EtlError;
use crate::warehouse::{LoadBatch, Warehouse};
use std::path::Path;
use tracing::{debug, error, info};

/// Turns one data file into warehouse rows through an open batch.
pub trait Extractor {
    fn name(&self) -> &'static str;

    /// Inserts every row derived from `path` and returns how many insert
    /// statements were issued per table.
    fn load_file(&self, path: &Path, batch: &mut dyn LoadBatch) -> Result<RowCounts, EtlError>;
}

/// What to do when a file fails to parse or load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the phase at the first failing file.
    #[default]
    FailFast,
    /// Roll back the failing file and go on with the next one.
    SkipFile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub rows: RowCounts,
}

/// Loads every JSON file under `root` with `extractor`, committing once per
/// file. A failing file is rolled back; whether the phase stops depends on
/// `policy`. A missing `root` always fails the phase.
pub fn process_data(
    warehouse: &mut dyn Warehouse,
    root: &Path,
    extractor: &dyn Extractor,
    policy: FailurePolicy,
) -> Result<LoadReport, EtlError> {
    let all_files = find_json_files(root)?;
    let num_files = all_files.len();
    info!("{} files found in {}", num_files, root.display());

    let mut report = LoadReport {
        files_found: num_files,
        ..Default::default()
    };

    for (index, datafile) in all_files.iter().enumerate() {
        match load_one(warehouse, datafile, extractor) {
            Ok(rows) => {
                debug!("Loaded {:?} from {}", rows, datafile.display());
                report.rows += rows;
                report.files_processed += 1;
            }
            Err(e) => match policy {
                FailurePolicy::FailFast => return Err(e),
                FailurePolicy::SkipFile => {
                    error!(
                        "Skipping {} file {}: {}",
                        extractor.name(),
                        datafile.display(),
                        e
                    );
                    report.files_failed += 1;
                }
            },
        }
        info!("{}/{} files processed.", index + 1, num_files);
    }

    Ok(report)
}

fn load_one(
    warehouse: &mut dyn Warehouse,
    datafile: &Path,
    extractor: &dyn Extractor,
) -> Result<RowCounts, EtlError> {
    let mut batch = warehouse.begin_batch()?;
    let rows = extractor.load_file(datafile, batch.as_mut())?;
    batch.commit()?;
    Ok(rows)
}
