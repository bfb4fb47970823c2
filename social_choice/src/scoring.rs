//! Positional scoring rules.
//!
//! Plurality, veto, Borda and harmonic are all instances of the same rule: each agent gives
//! `s[k]` points to the alternative it ranks at position `k`, and the alternatives with the
//! highest total win.

use log::{debug, info};
use snafu::prelude::*;

use crate::config::*;
use crate::profile::Profile;
use crate::tiebreak::TieBreaker;

/// The result of a rule that assigns a score to every alternative.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreOutcome {
    pub winner: Alternative,
    /// All the alternatives with the highest score, by increasing id.
    pub tied: Vec<Alternative>,
    /// The score of every alternative, in alternative order.
    pub scores: Vec<(Alternative, f64)>,
}

/// Two scores are equal if they only differ by the rounding error of a sum of `terms` values.
///
/// Infinite scores are only equal to themselves.
pub(crate) fn same_score(x: f64, y: f64, terms: usize) -> bool {
    if x == y {
        return true;
    }
    if !x.is_finite() || !y.is_finite() {
        return false;
    }
    let scale = x.abs().max(y.abs());
    (x - y).abs() <= (terms.max(1) as f64) * f64::EPSILON * scale
}

pub fn plurality_vector(num_alternatives: usize) -> Vec<f64> {
    (0..num_alternatives)
        .map(|k| if k == 0 { 1.0 } else { 0.0 })
        .collect()
}

pub fn veto_vector(num_alternatives: usize) -> Vec<f64> {
    (0..num_alternatives)
        .map(|k| if k + 1 == num_alternatives { 0.0 } else { 1.0 })
        .collect()
}

pub fn borda_vector(num_alternatives: usize) -> Vec<f64> {
    (0..num_alternatives)
        .map(|k| (num_alternatives - 1 - k) as f64)
        .collect()
}

pub fn harmonic_vector(num_alternatives: usize) -> Vec<f64> {
    (0..num_alternatives).map(|k| 1.0 / (k + 1) as f64).collect()
}

/// Checks that a score vector has one finite entry per alternative and never increases.
pub fn validate_score_vector(vector: &[f64], num_alternatives: usize) -> Result<(), VotingErrors> {
    ensure!(
        vector.len() == num_alternatives,
        InvalidScoreVectorSnafu {
            reason: format!(
                "the vector has {} entries but there are {} alternatives",
                vector.len(),
                num_alternatives
            )
        }
    );
    ensure!(
        vector.iter().all(|s| s.is_finite()),
        InvalidScoreVectorSnafu {
            reason: format!("the vector contains non-finite entries: {:?}", vector)
        }
    );
    if let Some(k) = vector.windows(2).position(|w| w[1] > w[0]) {
        return InvalidScoreVectorSnafu {
            reason: format!(
                "the vector increases between rank {} and rank {}: {:?}",
                k,
                k + 1,
                vector
            ),
        }
        .fail();
    }
    Ok(())
}

/// The score vector corresponding to a positional rule, if the rule is positional.
pub fn rule_vector(rule: &Rule, num_alternatives: usize) -> Option<Vec<f64>> {
    match rule {
        Rule::Plurality => Some(plurality_vector(num_alternatives)),
        Rule::Veto => Some(veto_vector(num_alternatives)),
        Rule::Borda => Some(borda_vector(num_alternatives)),
        Rule::Harmonic => Some(harmonic_vector(num_alternatives)),
        Rule::Scoring(v) => Some(v.clone()),
        Rule::Dictatorship(_) | Rule::Stv | Rule::Range { .. } => None,
    }
}

/// Computes the total score of every alternative, in alternative order.
///
/// The vector must have been validated against the profile.
pub fn positional_tally(profile: &Profile, vector: &[f64]) -> Vec<(Alternative, f64)> {
    let m = profile.num_alternatives();
    // How many times each alternative appears at each rank. Summing the points from these
    // counts makes the scores independent from the order of the agents.
    let mut rank_counts: Vec<Vec<u64>> = vec![vec![0; m]; m];
    for order in profile.orders() {
        for (rank, alt) in order.iter().enumerate() {
            rank_counts[alt.index()][rank] += 1;
        }
    }
    profile
        .alternatives()
        .map(|alt| {
            let score: f64 = rank_counts[alt.index()]
                .iter()
                .zip(vector.iter())
                .map(|(count, points)| (*count as f64) * points)
                .sum();
            (alt, score)
        })
        .collect()
}

/// All the alternatives that reach the highest score, by increasing id.
///
/// `terms` is the number of values summed into every score.
pub fn top_scorers(scores: &[(Alternative, f64)], terms: usize) -> Vec<Alternative> {
    let max_score = scores
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut res: Vec<Alternative> = scores
        .iter()
        .filter(|(_, s)| same_score(*s, max_score, terms))
        .map(|(alt, _)| *alt)
        .collect();
    res.sort();
    res
}

/// Picks the winner out of a score table, resolving ties with the tiebreaker.
pub(crate) fn outcome_from_scores(
    scores: Vec<(Alternative, f64)>,
    terms: usize,
    tiebreaker: &mut TieBreaker,
) -> Result<ScoreOutcome, VotingErrors> {
    let tied = top_scorers(&scores, terms);
    debug!("outcome_from_scores: scores: {:?} tied: {:?}", scores, tied);
    let winner = tiebreaker.pick_winner(&tied)?;
    if tied.len() > 1 {
        info!(
            "Tie between {:?}, resolved in favour of {} with tiebreak mode {:?}",
            tied,
            winner,
            tiebreaker.mode()
        );
    }
    Ok(ScoreOutcome {
        winner,
        tied,
        scores,
    })
}

/// Runs the positional scoring rule defined by the given vector.
pub fn run_scoring(
    profile: &Profile,
    vector: &[f64],
    tiebreaker: &mut TieBreaker,
) -> Result<ScoreOutcome, VotingErrors> {
    validate_score_vector(vector, profile.num_alternatives())?;
    let scores = positional_tally(profile, vector);
    // One product and one addition per rank.
    outcome_from_scores(scores, 2 * vector.len(), tiebreaker)
}

pub fn plurality(profile: &Profile, tiebreaker: &mut TieBreaker) -> Result<ScoreOutcome, VotingErrors> {
    run_scoring(profile, &plurality_vector(profile.num_alternatives()), tiebreaker)
}

pub fn veto(profile: &Profile, tiebreaker: &mut TieBreaker) -> Result<ScoreOutcome, VotingErrors> {
    run_scoring(profile, &veto_vector(profile.num_alternatives()), tiebreaker)
}

pub fn borda(profile: &Profile, tiebreaker: &mut TieBreaker) -> Result<ScoreOutcome, VotingErrors> {
    run_scoring(profile, &borda_vector(profile.num_alternatives()), tiebreaker)
}

pub fn harmonic(profile: &Profile, tiebreaker: &mut TieBreaker) -> Result<ScoreOutcome, VotingErrors> {
    run_scoring(profile, &harmonic_vector(profile.num_alternatives()), tiebreaker)
}
