//! CSV adapters for import tables and exports.

use super::export::{school_to_row, template_rows};
use super::import::ImportResult;
use super::{export_headers, ImportTable};
use crate::model::school::School;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// Reads a headed CSV into a raw text table.
///
/// Rows may have fewer or more cells than the header; missing cells read as
/// blank during import.
pub fn read_csv<R: Read>(reader: R) -> ImportResult<ImportTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(index, header)| {
            if index == 0 {
                header.trim_start_matches(UTF8_BOM).trim().to_string()
            } else {
                header.to_string()
            }
        })
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(ImportTable::new(headers, rows))
}

pub fn read_csv_path(path: impl AsRef<Path>) -> ImportResult<ImportTable> {
    let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
    read_csv(file)
}

/// Writes records with the export header (import-compatible).
pub fn write_csv<W: Write>(writer: W, records: &[School]) -> csv::Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(export_headers())?;
    for school in records {
        wtr.write_record(school_to_row(school))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the two-row authoring template.
pub fn write_template_csv<W: Write>(writer: W) -> csv::Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(export_headers())?;
    for row in template_rows() {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
