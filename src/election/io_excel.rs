use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use social_choice::RawValue;

use crate::election::config_reader::InputSource;
use crate::election::io_common::{text_cell, ParsedTable};
use crate::election::*;

pub fn read_excel_values(path: &str, cfs: &InputSource) -> BScResult<ParsedTable> {
    let wrange = get_range(path, cfs)?;
    let start_col = cfs.first_value_column_index()?;
    read_excel_rows(wrange.rows(), start_col, cfs.has_header())
}

pub fn read_excel_rows<'a>(
    rows: impl Iterator<Item = &'a [DataType]>,
    start_col: usize,
    has_header: bool,
) -> BScResult<ParsedTable> {
    let mut res = ParsedTable::default();
    for (idx, row) in rows.enumerate() {
        let lineno = idx + 1;
        if row.len() <= start_col {
            return Err(Box::new(ScError::ExcelLineTooShort { lineno }));
        }
        let cells = &row[start_col..];
        if idx == 0 && has_header {
            let names: Vec<String> = cells.iter().map(header_name).collect();
            debug!("read_excel_rows: header: {:?}", names);
            res.names = Some(names);
        } else {
            let values: Vec<RawValue> = cells.iter().map(read_cell).collect();
            debug!("read_excel_rows: lineno: {:?} row: {:?}", lineno, values);
            res.rows.push((lineno, values));
        }
    }
    Ok(res)
}

fn header_name(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => f.to_string(),
        DataType::Empty => "".to_string(),
        x => format!("{:?}", x),
    }
}

fn read_cell(cell: &DataType) -> RawValue {
    match cell {
        DataType::Int(i) => RawValue::Number(*i as f64),
        DataType::Float(f) => RawValue::Number(*f),
        DataType::String(s) => text_cell(s),
        DataType::Empty => RawValue::Missing,
        x => RawValue::Text(format!("{:?}", x)),
    }
}

fn get_range(path: &str, cfs: &InputSource) -> BScResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "read_excel_values: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                name: worksheet_name.clone(),
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(ScError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_excel_values: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => {
                let names: Vec<String> = all_worksheets.iter().map(|(n, _)| n.clone()).collect();
                Err(Box::new(ScError::AmbiguousWorksheet {
                    path: path.to_string(),
                    names: names.join(", "),
                }))
            }
        }
    }
}
