pub mod builder;
mod config;
pub mod dictatorship;
pub mod manual;
pub mod profile;
pub mod range;
pub mod scoring;
pub mod stv;
pub mod tiebreak;

use log::{debug, info};
use snafu::prelude::*;

pub use crate::config::*;
pub use crate::profile::{build_profile, Profile};
pub use crate::scoring::ScoreOutcome;
pub use crate::stv::StvOutcome;
pub use crate::tiebreak::TieBreaker;

/// Runs the election with the given rules on the values of the agents.
///
/// Arguments:
/// * `table` the values given by each agent to each alternative
/// * `rules` the rule, the tiebreak mode and the number of seats
///
/// ```
/// use social_choice::*;
///
/// let table = ValueTable::new(vec![
///     vec![3.0, 2.0, 1.0],
///     vec![1.0, 3.0, 2.0],
///     vec![2.0, 1.0, 3.0],
/// ])?;
/// let rules = VoteRules {
///     rule: Rule::Borda,
///     ..VoteRules::DEFAULT_RULES
/// };
/// let result = run_election(&table, &rules)?;
/// assert_eq!(result.winner(), Alternative(2));
/// # Ok::<(), VotingErrors>(())
/// ```
pub fn run_election(table: &ValueTable, rules: &VoteRules) -> Result<VotingResult, VotingErrors> {
    info!(
        "Processing {:?} agents and {:?} alternatives, rules: {:?}",
        table.num_agents(),
        table.num_alternatives(),
        rules
    );
    for (alt, name) in table.alternatives().zip(table.names().iter()) {
        info!("Alternative: {}: {}", alt, name);
    }

    let profile = build_profile(table)?;
    match &rules.rule {
        Rule::Range { lower, upper } => {
            let mut tiebreaker = TieBreaker::new(rules.tiebreak_mode, &profile)?;
            let outcome = range::run_range(table, *lower, *upper, &mut tiebreaker)?;
            let res = score_result(outcome);
            info!("Winners: {:?}", res.winners);
            Ok(res)
        }
        _ => run_profile(&profile, rules),
    }
}

/// Runs the election with the given rules on a preference profile.
///
/// All the rules are supported except range voting, which needs the raw values.
pub fn run_profile(profile: &Profile, rules: &VoteRules) -> Result<VotingResult, VotingErrors> {
    let mut tiebreaker = TieBreaker::new(rules.tiebreak_mode, profile)?;
    let res = match &rules.rule {
        Rule::Dictatorship(agent) => {
            let winner = dictatorship::run_dictatorship(profile, *agent)?;
            VotingResult {
                winners: vec![winner],
                tied: vec![winner],
                scores: Vec::new(),
                quota: None,
                round_stats: Vec::new(),
            }
        }
        Rule::Stv => {
            let outcome = stv::run_stv(profile, rules.number_of_winners, &mut tiebreaker)?;
            // The first round is the only one where all the alternatives have a tally.
            let scores = outcome
                .rounds
                .first()
                .map(|r| r.tally.clone())
                .unwrap_or_default();
            VotingResult {
                winners: outcome.winners.clone(),
                tied: outcome.winners,
                scores,
                quota: Some(outcome.quota),
                round_stats: outcome.rounds,
            }
        }
        Rule::Range { .. } => {
            return MalformedInputSnafu {
                reason: "range voting needs the raw values of the agents",
            }
            .fail();
        }
        rule => {
            let vector = scoring::rule_vector(rule, profile.num_alternatives()).context(
                MalformedInputSnafu {
                    reason: format!("{:?} is not a scoring rule", rule),
                },
            )?;
            debug!("run_profile: score vector: {:?}", vector);
            score_result(scoring::run_scoring(profile, &vector, &mut tiebreaker)?)
        }
    };
    info!("Winners: {:?}", res.winners);
    Ok(res)
}

fn score_result(outcome: ScoreOutcome) -> VotingResult {
    VotingResult {
        winners: vec![outcome.winner],
        tied: outcome.tied,
        scores: outcome.scores,
        quota: None,
        round_stats: Vec::new(),
    }
}
