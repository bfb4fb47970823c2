use std::path::Path;

use log::debug;
use snafu::prelude::*;

use social_choice::builder::Builder;
use social_choice::{RawValue, ValueTable};

use crate::election::*;

/// The content of an input file, before validation.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ParsedTable {
    /// The names of the alternatives, if the file has a header.
    pub names: Option<Vec<String>>,
    /// The cells of every agent, with the line number they come from.
    pub rows: Vec<(usize, Vec<RawValue>)>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn text_cell(s: &str) -> RawValue {
    if s.trim().is_empty() {
        RawValue::Missing
    } else {
        RawValue::Text(s.to_string())
    }
}

/// Validates the parsed content into a value table.
///
/// Rows where all the cells are empty are skipped.
pub fn assemble_table(parsed: ParsedTable) -> BScResult<ValueTable> {
    let mut builder = Builder::new();
    if let Some(names) = parsed.names {
        builder = builder
            .alternatives(&names)
            .context(TableContentSnafu { lineno: 1_usize })?;
    }
    for (lineno, cells) in parsed.rows.iter() {
        if cells.iter().all(|c| *c == RawValue::Missing) {
            debug!("assemble_table: skipping empty line {}", lineno);
            continue;
        }
        builder
            .add_agent_raw(cells)
            .context(TableContentSnafu { lineno: *lineno })?;
    }
    let table = builder.build().context(VotingSnafu {})?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_choice::VotingErrors;

    #[test]
    fn assemble_named_table() {
        let parsed = ParsedTable {
            names: Some(vec!["A".to_string(), "B".to_string()]),
            rows: vec![
                (2, vec![RawValue::Number(1.0), text_cell(" 2.5 ")]),
                (3, vec![text_cell(""), RawValue::Missing]),
                (4, vec![RawValue::Number(3.0), RawValue::Number(0.0)]),
            ],
        };
        let table = assemble_table(parsed).unwrap();
        assert_eq!(table.num_agents(), 2);
        assert_eq!(table.names(), &["A".to_string(), "B".to_string()]);
        assert_eq!(table.row(social_choice::Agent(0)), Some(&[1.0, 2.5][..]));
    }

    #[test]
    fn errors_carry_the_line_number() {
        let parsed = ParsedTable {
            names: None,
            rows: vec![
                (1, vec![RawValue::Number(1.0), RawValue::Number(2.0)]),
                (2, vec![RawValue::Number(1.0), text_cell("abc")]),
            ],
        };
        let err = assemble_table(parsed).unwrap_err();
        match *err {
            ScError::TableContent { lineno, ref source } => {
                assert_eq!(lineno, 2);
                assert!(matches!(source, VotingErrors::MalformedInput { .. }));
            }
            ref e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn empty_input_fails() {
        let err = assemble_table(ParsedTable::default()).unwrap_err();
        assert!(matches!(*err, ScError::Voting { .. }));
    }

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("a/b/values.csv"), "values.csv");
    }
}
