//! CSV table rendering
//!
//! Every record becomes one row; values are written verbatim, sentinel
//! included, and quoted by the `csv` writer when they contain delimiters,
//! quotes or newlines.

use crate::listing::{Field, ListingRecord};
use crate::output::{OutputError, OutputResult};
use std::path::{Path, PathBuf};

/// Renders records as a CSV table
///
/// # Arguments
///
/// * `records` - Records in output order
/// * `columns` - Fields to write, in header order
///
/// # Returns
///
/// * `Ok(None)` - No records; there is no table to write
/// * `Ok(Some(String))` - Header row followed by one row per record
/// * `Err(OutputError)` - The CSV writer failed
pub fn render_table(records: &[ListingRecord], columns: &[Field]) -> OutputResult<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.iter().map(Field::column_name))?;

    for record in records {
        writer.write_record(columns.iter().map(|field| record.get(*field)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Write(e.to_string()))?;

    Ok(Some(String::from_utf8(bytes)?))
}

/// Builds the download file name for a search term
///
/// Characters outside `[A-Za-z0-9_-]` become `_`, so the name is safe on
/// every filesystem.
///
/// # Example
///
/// ```
/// use sumi_sift::output::table_filename;
///
/// assert_eq!(
///     table_filename("film camera", "20240101_120000"),
///     "ebay_results_film_camera_20240101_120000.csv"
/// );
/// ```
pub fn table_filename(search_term: &str, timestamp: &str) -> String {
    let slug: String = search_term
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("ebay_results_{}_{}.csv", slug, timestamp)
}

/// Writes a rendered table into `directory`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - The directory could not be created or the file written
pub fn write_table(
    table: &str,
    directory: &Path,
    search_term: &str,
    timestamp: &str,
) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(table_filename(search_term, timestamp));
    std::fs::write(&path, table)?;
    Ok(path)
}
