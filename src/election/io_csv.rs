// Primitives for reading CSV files.

use std::io::Read;

use log::{debug, info};
use snafu::prelude::*;

use crate::election::config_reader::InputSource;
use crate::election::io_common::{simplify_file_name, text_cell, ParsedTable};
use crate::election::*;

pub fn read_csv_values(path: &str, cfs: &InputSource) -> BScResult<ParsedTable> {
    info!("read_csv_values: reading {}", simplify_file_name(path));
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_csv_records(rdr, cfs)
}

/// Reads the records of an open CSV reader. The reader must not consume the header itself.
pub fn read_csv_records<R: Read>(rdr: csv::Reader<R>, cfs: &InputSource) -> BScResult<ParsedTable> {
    let start_col = cfs.first_value_column_index()?;
    let has_header = cfs.has_header();

    let mut res = ParsedTable::default();
    for (idx, line_r) in rdr.into_records().enumerate() {
        // The line numbers start at 1 to respect most conventions in the spreadsheet world
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if line.len() <= start_col {
            return Err(Box::new(ScError::CsvLineTooShort { lineno }));
        }
        let cells = line.iter().skip(start_col);
        if idx == 0 && has_header {
            let names: Vec<String> = cells.map(|s| s.trim().to_string()).collect();
            debug!("read_csv_records: header: {:?}", names);
            res.names = Some(names);
        } else {
            let row: Vec<_> = cells.map(text_cell).collect();
            debug!("read_csv_records: lineno: {:?} row: {:?}", lineno, row);
            res.rows.push((lineno, row));
        }
    }
    Ok(res)
}
