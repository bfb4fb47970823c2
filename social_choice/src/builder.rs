use snafu::prelude::*;

pub use crate::config::*;

/// A builder for assembling a value table, one agent at a time.
///
/// ```
/// pub use social_choice::builder::Builder;
/// # use social_choice::VotingErrors;
///
/// let mut builder = Builder::new()
///     .alternatives(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_agent(&[3.0, 1.0])?;
/// builder.add_agent_raw(&[social_choice::RawValue::Text("2".to_string()), social_choice::RawValue::Number(4.0)])?;
///
/// let table = builder.build()?;
/// assert_eq!(table.num_agents(), 2);
///
/// # Ok::<(), VotingErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _alternatives: Option<Vec<String>>,
    pub(crate) _rows: Vec<Vec<f64>>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn alternatives(self, names: &[String]) -> Result<Builder, VotingErrors> {
        ensure!(
            !names.is_empty(),
            MalformedInputSnafu {
                reason: "no alternative provided"
            }
        );
        Ok(Builder {
            _alternatives: Some(names.to_vec()),
            _rows: self._rows,
        })
    }

    /// Adds the values of one agent.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_agent(&mut self, values: &[f64]) -> Result<(), VotingErrors> {
        let expected = self
            ._alternatives
            .as_ref()
            .map(|names| names.len())
            .or_else(|| self._rows.first().map(|row| row.len()));
        if let Some(width) = expected {
            ensure!(
                values.len() == width,
                MalformedInputSnafu {
                    reason: format!(
                        "agent {} has {} values, expected {}",
                        self._rows.len(),
                        values.len(),
                        width
                    )
                }
            );
        }
        self._rows.push(values.to_vec());
        Ok(())
    }

    /// Adds the cells of one agent, as read from a file.
    ///
    /// Text cells are accepted when they contain a number. Missing cells are rejected.
    pub fn add_agent_raw(&mut self, cells: &[RawValue]) -> Result<(), VotingErrors> {
        let agent = self._rows.len();
        let mut values: Vec<f64> = Vec::with_capacity(cells.len());
        for (idx, cell) in cells.iter().enumerate() {
            let v = match cell {
                RawValue::Number(x) => *x,
                RawValue::Text(s) => match s.trim().parse::<f64>() {
                    Ok(x) => x,
                    Err(_) => {
                        return MalformedInputSnafu {
                            reason: format!(
                                "agent {} has a non-numeric value {:?} for alternative {}",
                                agent, s, idx
                            ),
                        }
                        .fail();
                    }
                },
                RawValue::Missing => {
                    return MalformedInputSnafu {
                        reason: format!("agent {} has no value for alternative {}", agent, idx),
                    }
                    .fail();
                }
            };
            values.push(v);
        }
        self.add_agent(&values)
    }

    pub fn build(self) -> Result<ValueTable, VotingErrors> {
        match self._alternatives {
            Some(names) => ValueTable::with_names(names, self._rows),
            None => ValueTable::new(self._rows),
        }
    }
}
