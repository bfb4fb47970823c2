//! Range voting: the alternative with the highest sum of raw values wins.

use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::scoring::{outcome_from_scores, ScoreOutcome};
use crate::tiebreak::TieBreaker;

/// Checks that all the values of the table lie within `[lower, upper]`.
///
/// Values outside of the bounds are rejected rather than clamped.
pub fn check_range(table: &ValueTable, lower: f64, upper: f64) -> Result<(), VotingErrors> {
    ensure!(
        lower.is_finite() && upper.is_finite() && lower <= upper,
        MalformedInputSnafu {
            reason: format!("invalid range bounds [{}, {}]", lower, upper)
        }
    );
    for agent in table.agents() {
        for alternative in table.alternatives() {
            if let Some(value) = table.value(agent, alternative) {
                ensure!(
                    value >= lower && value <= upper,
                    OutOfRangeSnafu {
                        agent,
                        alternative,
                        value,
                        lower,
                        upper
                    }
                );
            }
        }
    }
    Ok(())
}

/// The sum of the values of every alternative, in alternative order.
pub fn range_tally(table: &ValueTable) -> Vec<(Alternative, f64)> {
    table
        .alternatives()
        .map(|alternative| {
            let total: f64 = table
                .agents()
                .filter_map(|agent| table.value(agent, alternative))
                .sum();
            (alternative, total)
        })
        .collect()
}

pub fn run_range(
    table: &ValueTable,
    lower: f64,
    upper: f64,
    tiebreaker: &mut TieBreaker,
) -> Result<ScoreOutcome, VotingErrors> {
    check_range(table, lower, upper)?;
    let scores = range_tally(table);
    debug!("run_range: scores: {:?}", scores);
    outcome_from_scores(scores, table.num_agents(), tiebreaker)
}
