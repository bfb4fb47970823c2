use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::profile::Profile;

/// Resolves a tie between alternatives, according to a tiebreak mode.
///
/// The tiebreaker is passed to the rules that need it. It keeps track of the number of
/// draws done so far, so that successive random draws in the same election are not correlated.
#[derive(Debug, Clone)]
pub struct TieBreaker<'a> {
    mode: TieBreakMode,
    profile: &'a Profile,
    draws: u32,
}

impl<'a> TieBreaker<'a> {
    pub fn new(mode: TieBreakMode, profile: &'a Profile) -> Result<TieBreaker<'a>, VotingErrors> {
        if let TieBreakMode::AgentBased(agent) = mode {
            ensure!(
                profile.contains_agent(agent),
                TieBreakSnafu {
                    reason: format!(
                        "unknown agent {} (the election has {} agents)",
                        agent,
                        profile.num_agents()
                    )
                }
            );
        }
        Ok(TieBreaker {
            mode,
            profile,
            draws: 0,
        })
    }

    pub fn mode(&self) -> TieBreakMode {
        self.mode
    }

    /// Selects the alternative that wins the tie.
    pub fn pick_winner(&mut self, tied: &[Alternative]) -> Result<Alternative, VotingErrors> {
        let res = self.sorted_tie(tied)?;
        Ok(res[0])
    }

    /// Selects the alternative that loses the tie, for elimination.
    ///
    /// It is the alternative that the mode favours the least: the smallest id for `MaxId`,
    /// the largest for `MinId`, the lowest ranked one for `AgentBased`.
    pub fn pick_loser(&mut self, tied: &[Alternative]) -> Result<Alternative, VotingErrors> {
        let res = self.sorted_tie(tied)?;
        Ok(res[res.len() - 1])
    }

    // Sorts the tie, the most favoured alternative first.
    fn sorted_tie(&mut self, tied: &[Alternative]) -> Result<Vec<Alternative>, VotingErrors> {
        ensure!(
            !tied.is_empty(),
            TieBreakSnafu {
                reason: "empty set of tied alternatives"
            }
        );
        // No tiebreak, the logic below is not relevant.
        if tied.len() == 1 {
            return Ok(tied.to_vec());
        }

        let res: Vec<Alternative> = match self.mode {
            TieBreakMode::MaxId => {
                let mut res = tied.to_vec();
                res.sort_by(|a1, a2| a2.cmp(a1));
                res
            }
            TieBreakMode::MinId => {
                let mut res = tied.to_vec();
                res.sort();
                res
            }
            TieBreakMode::Random(seed) => {
                self.draws += 1;
                alternative_permutation_crypto(tied, seed, self.draws)
            }
            TieBreakMode::AgentBased(agent) => {
                let order = self.profile.order(agent).map_err(|_| VotingErrors::TieBreak {
                    reason: format!("unknown agent {}", agent),
                })?;
                let mut res = tied.to_vec();
                res.sort_by_key(|alt| order.iter().position(|a| a == alt));
                res
            }
        };
        debug!(
            "sorted_tie: tie {:?} ordered as {:?} using tiebreak mode {:?}",
            tied, res, self.mode
        );
        Ok(res)
    }
}

/// Generates a "random" permutation of the alternatives. Random in this context means hard to guess in advance.
/// Every alternative is hashed together with the seed and the draw number using SHA-256,
/// and the alternatives are sorted by digest.
fn alternative_permutation_crypto(alternatives: &[Alternative], seed: u64, draw: u32) -> Vec<Alternative> {
    let mut data: Vec<(Alternative, String)> = alternatives
        .iter()
        .map(|alt| {
            (
                *alt,
                sha256::digest(format!("{:020}{:08}{:08}", seed, draw, alt.0).as_str()),
            )
        })
        .collect();
    data.sort_by(|p1, p2| p1.1.cmp(&p2.1).then(p1.0.cmp(&p2.0)));
    data.iter().map(|p| p.0).collect()
}
