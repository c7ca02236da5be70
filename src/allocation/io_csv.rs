// Primitives for reading CSV files.

use crate::allocation::{
    io_common::{RawRow, RawTable},
    *,
};

pub fn read_csv_table(path: &str) -> AllocResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_csv_records(rdr)
}

// Every line must have as many cells as the header. The csv reader enforces it.
fn read_csv_records<R: std::io::Read>(rdr: csv::Reader<R>) -> AllocResult<RawTable> {
    let mut records = rdr.into_records();

    let header_line = records
        .next()
        .context(EmptyInputSnafu {})?
        .context(CsvLineParseSnafu { lineno: 1usize })?;
    let header: Vec<String> = header_line
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            // Spreadsheet programs may leave a byte order mark in front of the first cell.
            if idx == 0 {
                s.trim_start_matches('\u{feff}').to_string()
            } else {
                s.to_string()
            }
        })
        .collect();
    debug!("read_csv_records: header: {:?}", header);

    let mut rows: Vec<RawRow> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_records: lineno: {:?} line: {:?}", lineno, line);
        rows.push(RawRow {
            lineno,
            cells: line.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(RawTable { header, rows })
}
