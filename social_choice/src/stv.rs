//! Single transferable vote.
//!
//! Every ballot counts for its most preferred continuing alternative. In each round, the
//! alternatives that reach the Droop quota are elected; if none does, the alternative with
//! the lowest tally is eliminated and its ballots move to their next continuing preference.
//! When several seats are filled, the surplus of an elected alternative is transferred
//! with a reduced weight (Gregory method).

use log::{debug, info};
use snafu::prelude::*;

use std::collections::{BTreeMap, HashSet};

use crate::config::*;
use crate::profile::Profile;
use crate::scoring::same_score;
use crate::tiebreak::TieBreaker;

type RoundId = u32;

#[derive(PartialEq, Debug, Clone)]
pub struct StvOutcome {
    /// The elected alternatives, in order of election.
    pub winners: Vec<Alternative>,
    pub quota: f64,
    pub rounds: Vec<RoundStats>,
}

// A ballot, and its current preference among the continuing alternatives.
#[derive(PartialEq, Debug, Clone)]
struct Ballot<'a> {
    order: &'a [Alternative],
    weight: f64,
    // Position of the current preference in the order. None if the ballot is exhausted.
    position: Option<usize>,
}

impl<'a> Ballot<'a> {
    fn new(order: &'a [Alternative]) -> Ballot<'a> {
        Ballot {
            order,
            weight: 1.0,
            position: if order.is_empty() { None } else { Some(0) },
        }
    }

    fn current(&self) -> Option<Alternative> {
        self.position.map(|p| self.order[p])
    }

    /// Moves the ballot to the first preference that is still continuing, starting from the
    /// current one. Exhausts the ballot if there is none.
    fn advanced(&self, continuing: &HashSet<Alternative>, weight: f64) -> Ballot<'a> {
        let position = self.position.and_then(|start| {
            (start..self.order.len()).find(|p| continuing.contains(&self.order[*p]))
        });
        Ballot {
            order: self.order,
            weight,
            position,
        }
    }
}

// The state after one round.
#[derive(PartialEq, Debug, Clone)]
struct RoundResult<'a> {
    ballots: Vec<Ballot<'a>>,
    continuing: Vec<Alternative>,
    elected: Vec<Alternative>,
    stats: RoundStats,
}

/// The Droop quota: the smallest number of votes that only `seats` alternatives can reach.
pub fn droop_quota(num_agents: usize, seats: u32) -> f64 {
    ((num_agents as u64 / (seats as u64 + 1)) + 1) as f64
}

/// Runs the single transferable vote for the given number of seats.
pub fn run_stv(
    profile: &Profile,
    seats: u32,
    tiebreaker: &mut TieBreaker,
) -> Result<StvOutcome, VotingErrors> {
    let num_alternatives = profile.num_alternatives();
    ensure!(
        seats >= 1 && seats as usize <= num_alternatives,
        MalformedInputSnafu {
            reason: format!(
                "cannot fill {} seats with {} alternatives",
                seats, num_alternatives
            )
        }
    );
    let quota = droop_quota(profile.num_agents(), seats);
    info!(
        "Processing {} ballots over {} alternatives for {} seats (quota: {})",
        profile.num_agents(),
        num_alternatives,
        seats,
        quota
    );

    let mut cur_ballots: Vec<Ballot> = profile.orders().iter().map(|o| Ballot::new(o)).collect();
    let mut cur_continuing: Vec<Alternative> = profile.alternatives().collect();
    let mut winners: Vec<Alternative> = Vec::new();
    let mut rounds: Vec<RoundStats> = Vec::new();

    // Every round removes at least one alternative from the continuing ones.
    for round_id in 1..=(num_alternatives as RoundId) {
        let remaining_seats = seats as usize - winners.len();
        let round_res = run_one_round(
            &cur_ballots,
            &cur_continuing,
            remaining_seats,
            quota,
            round_id,
            tiebreaker,
        )?;
        info!(
            "Round {} tally: {:?} elected: {:?} eliminated: {:?}",
            round_id,
            round_res.stats.tally,
            round_res.elected,
            round_res
                .stats
                .tally_result_eliminated
                .iter()
                .map(|es| es.alternative)
                .collect::<Vec<Alternative>>()
        );
        // Invariant: the number of continuing alternatives decreased.
        assert!(
            round_res.continuing.len() < cur_continuing.len(),
            "The number of continuing alternatives did not decrease: {:?} -> {:?}",
            cur_continuing,
            round_res.continuing
        );

        winners.extend(round_res.elected.iter().cloned());
        rounds.push(round_res.stats);
        cur_ballots = round_res.ballots;
        cur_continuing = round_res.continuing;

        if winners.len() >= seats as usize {
            return Ok(StvOutcome {
                winners,
                quota,
                rounds,
            });
        }
    }
    NoWinnerSnafu {
        round: rounds.len() as RoundId,
    }
    .fail()
}

fn compute_tally(ballots: &[Ballot], continuing: &[Alternative]) -> Vec<(Alternative, f64)> {
    let mut tally: BTreeMap<Alternative, f64> = continuing.iter().map(|alt| (*alt, 0.0)).collect();
    for b in ballots.iter() {
        if let Some(vc) = b.current().and_then(|alt| tally.get_mut(&alt)) {
            *vc += b.weight;
        }
    }
    tally.into_iter().collect()
}

fn exhausted_weight(ballots: &[Ballot]) -> f64 {
    ballots
        .iter()
        .filter(|b| b.position.is_none())
        .map(|b| b.weight)
        .sum()
}

fn run_one_round<'a>(
    ballots: &[Ballot<'a>],
    continuing: &[Alternative],
    remaining_seats: usize,
    quota: f64,
    round_id: RoundId,
    tiebreaker: &mut TieBreaker,
) -> Result<RoundResult<'a>, VotingErrors> {
    // Initialize the tally with all the continuing alternatives to capture the ones who do
    // not even have a vote.
    let tally = compute_tally(ballots, continuing);
    debug!("run_one_round: round {} tally: {:?}", round_id, tally);

    // Not more alternatives than seats: they all win, whatever their tally.
    if continuing.len() <= remaining_seats {
        let mut elected = tally.clone();
        elected.sort_by(|(a1, c1), (a2, c2)| c2.total_cmp(c1).then(a1.cmp(a2)));
        let elected: Vec<Alternative> = elected.iter().map(|(alt, _)| *alt).collect();
        debug!("run_one_round: directly electing the remaining alternatives {:?}", elected);
        return Ok(RoundResult {
            ballots: ballots.to_vec(),
            continuing: Vec::new(),
            elected: elected.clone(),
            stats: RoundStats {
                round: round_id,
                tally,
                tally_results_elected: elected
                    .iter()
                    .map(|alt| TransferStats {
                        alternative: *alt,
                        transfers: Vec::new(),
                        exhausted: 0.0,
                    })
                    .collect(),
                tally_result_eliminated: Vec::new(),
                exhausted: exhausted_weight(ballots),
            },
        });
    }

    // Ballots left with a zero weight by a surplus transfer are still active.
    ensure!(
        ballots.iter().any(|b| b.position.is_some()),
        NoWinnerSnafu { round: round_id }
    );

    let mut reaching: Vec<(Alternative, f64)> = tally
        .iter()
        .filter(|(_, vc)| *vc >= quota)
        .cloned()
        .collect();
    reaching.sort_by(|(a1, c1), (a2, c2)| c2.total_cmp(c1).then(a1.cmp(a2)));
    reaching.truncate(remaining_seats);

    let (elected, eliminated): (Vec<(Alternative, f64)>, Option<Alternative>) =
        if !reaching.is_empty() {
            (reaching, None)
        } else {
            let min_count = tally
                .iter()
                .map(|(_, vc)| *vc)
                .fold(f64::INFINITY, f64::min);
            let all_smallest: Vec<Alternative> = tally
                .iter()
                .filter(|(_, vc)| same_score(*vc, min_count, ballots.len()))
                .map(|(alt, _)| *alt)
                .collect();
            debug!("run_one_round: all_smallest: {:?}", all_smallest);
            let loser = tiebreaker.pick_loser(&all_smallest)?;
            if all_smallest.len() > 1 {
                info!(
                    "Round {}: tie for the last place between {:?}, eliminating {}",
                    round_id, all_smallest, loser
                );
            }
            (Vec::new(), Some(loser))
        };

    let removed: HashSet<Alternative> = elected
        .iter()
        .map(|(alt, _)| *alt)
        .chain(eliminated.iter().cloned())
        .collect();
    let remaining: Vec<Alternative> = continuing
        .iter()
        .filter(|alt| !removed.contains(alt))
        .cloned()
        .collect();
    let remaining_set: HashSet<Alternative> = remaining.iter().cloned().collect();

    // The fraction of its weight that a ballot keeps when it leaves a removed alternative.
    // Surpluses are only transferred if seats are left to fill after this round.
    let seats_left = remaining_seats - elected.len();
    let mut keep_fraction: BTreeMap<Alternative, f64> = BTreeMap::new();
    for (alt, count) in elected.iter() {
        if seats_left > 0 {
            keep_fraction.insert(*alt, (count - quota) / count);
        }
    }
    if let Some(alt) = eliminated {
        keep_fraction.insert(alt, 1.0);
    }

    // Statistics about transfers:
    // For every removed alternative, keep the vote transfers and the exhausted votes.
    let mut transfer_stats: BTreeMap<Alternative, (BTreeMap<Alternative, f64>, f64)> =
        keep_fraction
            .keys()
            .map(|alt| (*alt, (BTreeMap::new(), 0.0)))
            .collect();

    let new_ballots: Vec<Ballot<'a>> = ballots
        .iter()
        .map(|b| {
            let old_first = match b.current() {
                Some(alt) => alt,
                None => return b.clone(),
            };
            let fraction = match keep_fraction.get(&old_first) {
                Some(f) => *f,
                None => return b.clone(),
            };
            let nb = b.advanced(&remaining_set, b.weight * fraction);
            let e = transfer_stats
                .entry(old_first)
                .or_insert((BTreeMap::new(), 0.0));
            match nb.current() {
                // The ballot is now exhausted. Record the exhausted vote.
                None => e.1 += nb.weight,
                // The ballot has been transfered. Record the transfer.
                Some(new_first) => *e.0.entry(new_first).or_insert(0.0) += nb.weight,
            }
            nb
        })
        .collect();

    let to_stats = |alt: &Alternative| -> TransferStats {
        let (transfers, exhausted) = transfer_stats
            .get(alt)
            .cloned()
            .unwrap_or((BTreeMap::new(), 0.0));
        TransferStats {
            alternative: *alt,
            transfers: transfers.into_iter().collect(),
            exhausted,
        }
    };

    let stats = RoundStats {
        round: round_id,
        tally,
        tally_results_elected: elected.iter().map(|(alt, _)| to_stats(alt)).collect(),
        tally_result_eliminated: eliminated.iter().map(|alt| to_stats(alt)).collect(),
        exhausted: exhausted_weight(&new_ballots),
    };
    debug!("run_one_round: stats: {:?}", stats);

    Ok(RoundResult {
        ballots: new_ballots,
        continuing: remaining,
        elected: elected.iter().map(|(alt, _)| *alt).collect(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::build_profile;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn orders(m: usize, os: &[&[u32]]) -> Profile {
        Profile::from_orders(
            m,
            os.iter()
                .map(|o| o.iter().map(|i| Alternative(*i)).collect())
                .collect(),
        )
        .unwrap()
    }

    fn stv(profile: &Profile, seats: u32, mode: TieBreakMode) -> Result<StvOutcome, VotingErrors> {
        let mut tb = TieBreaker::new(mode, profile).unwrap();
        run_stv(profile, seats, &mut tb)
    }

    #[test]
    fn droop() {
        assert_eq!(droop_quota(5, 1), 3.0);
        assert_eq!(droop_quota(4, 1), 3.0);
        assert_eq!(droop_quota(100, 1), 51.0);
        assert_eq!(droop_quota(7, 2), 3.0);
        assert_eq!(droop_quota(0, 1), 1.0);
    }

    #[test]
    fn lowest_is_eliminated_and_transferred() {
        init();
        let profile = orders(
            3,
            &[&[0, 1, 2], &[0, 2, 1], &[1, 0, 2], &[1, 2, 0], &[2, 0, 1]],
        );
        let res = stv(&profile, 1, TieBreakMode::MaxId).unwrap();
        assert_eq!(res.quota, 3.0);
        assert_eq!(res.winners, vec![Alternative(0)]);
        assert_eq!(res.rounds.len(), 2);

        let r1 = &res.rounds[0];
        assert_eq!(
            r1.tally,
            vec![
                (Alternative(0), 2.0),
                (Alternative(1), 2.0),
                (Alternative(2), 1.0)
            ]
        );
        assert!(r1.tally_results_elected.is_empty());
        assert_eq!(
            r1.tally_result_eliminated,
            vec![TransferStats {
                alternative: Alternative(2),
                transfers: vec![(Alternative(0), 1.0)],
                exhausted: 0.0
            }]
        );

        let r2 = &res.rounds[1];
        assert_eq!(
            r2.tally,
            vec![(Alternative(0), 3.0), (Alternative(1), 2.0)]
        );
        assert_eq!(r2.tally_results_elected[0].alternative, Alternative(0));
    }

    #[test]
    fn majority_in_first_round() {
        let profile = orders(3, &[&[1, 0, 2], &[1, 2, 0], &[0, 1, 2]]);
        let res = stv(&profile, 1, TieBreakMode::MaxId).unwrap();
        assert_eq!(res.winners, vec![Alternative(1)]);
        assert_eq!(res.rounds.len(), 1);
    }

    #[test]
    fn single_alternative_wins_immediately() {
        let profile = orders(1, &[&[0], &[0]]);
        let res = stv(&profile, 1, TieBreakMode::MaxId).unwrap();
        assert_eq!(res.winners, vec![Alternative(0)]);
        assert_eq!(res.rounds.len(), 1);

        // Even without any vote.
        let profile = Profile::from_orders(1, vec![]).unwrap();
        let res = stv(&profile, 1, TieBreakMode::MaxId).unwrap();
        assert_eq!(res.winners, vec![Alternative(0)]);
    }

    #[test]
    fn tie_for_last_place_uses_the_tiebreaker() {
        init();
        let profile = orders(3, &[&[2, 0, 1], &[2, 1, 0], &[0, 2, 1], &[1, 0, 2]]);
        // MaxId eliminates the smallest id first: 0, whose ballot moves to 2.
        let res = stv(&profile, 1, TieBreakMode::MaxId).unwrap();
        assert_eq!(res.winners, vec![Alternative(2)]);
        assert_eq!(res.rounds.len(), 2);
        assert_eq!(
            res.rounds[0].tally_result_eliminated[0].alternative,
            Alternative(0)
        );

        // MinId eliminates 1, then 2 in a tie with 0.
        let res = stv(&profile, 1, TieBreakMode::MinId).unwrap();
        assert_eq!(res.winners, vec![Alternative(0)]);
        assert_eq!(res.rounds.len(), 3);
        let eliminated: Vec<Alternative> = res
            .rounds
            .iter()
            .flat_map(|r| r.tally_result_eliminated.iter().map(|es| es.alternative))
            .collect();
        assert_eq!(eliminated, vec![Alternative(1), Alternative(2)]);
        assert_eq!(
            res.rounds[1].tally,
            vec![(Alternative(0), 2.0), (Alternative(2), 2.0)]
        );
    }

    #[test]
    fn exactly_one_alternative_eliminated_per_round() {
        // Everyone votes for 0: the three others are tied with zero votes, but 0 reaches the
        // quota in the first round.
        let profile = orders(4, &[&[0, 1, 2, 3], &[0, 2, 1, 3], &[1, 0, 2, 3]]);
        let res = stv(&profile, 1, TieBreakMode::MinId).unwrap();
        assert_eq!(res.winners, vec![Alternative(0)]);

        // No quota reached: the ties are broken one alternative at a time.
        let profile = orders(4, &[&[0, 1, 2, 3], &[1, 0, 2, 3], &[2, 3, 0, 1], &[3, 2, 1, 0]]);
        let res = stv(&profile, 1, TieBreakMode::MinId).unwrap();
        for r in res.rounds.iter() {
            assert!(r.tally_result_eliminated.len() <= 1);
        }
    }

    #[test]
    fn rounds_are_bounded() {
        let mut state: u64 = 99;
        for m in 1..7usize {
            for n in 1..12usize {
                let mut values: Vec<Vec<f64>> = Vec::new();
                for _ in 0..n {
                    let mut row = Vec::new();
                    for _ in 0..m {
                        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                        row.push(((state >> 33) % 10) as f64);
                    }
                    values.push(row);
                }
                let profile = build_profile(&ValueTable::new(values).unwrap()).unwrap();
                for mode in [
                    TieBreakMode::MaxId,
                    TieBreakMode::MinId,
                    TieBreakMode::Random(state),
                    TieBreakMode::AgentBased(Agent(0)),
                ] {
                    let res = stv(&profile, 1, mode).unwrap();
                    assert_eq!(res.winners.len(), 1);
                    assert!(res.rounds.len() <= m);
                    let num_eliminated: usize = res
                        .rounds
                        .iter()
                        .map(|r| r.tally_result_eliminated.len())
                        .sum();
                    assert!(num_eliminated < m);
                }
            }
        }
    }

    #[test]
    fn no_ballots_no_winner() {
        let profile = Profile::from_orders(3, vec![]).unwrap();
        let err = stv(&profile, 1, TieBreakMode::MaxId).unwrap_err();
        assert_eq!(err, VotingErrors::NoWinner { round: 1 });
    }

    #[test]
    fn two_seats_with_surplus_transfer() {
        init();
        let profile = orders(
            3,
            &[
                &[0, 1, 2],
                &[0, 1, 2],
                &[0, 1, 2],
                &[0, 1, 2],
                &[1, 2, 0],
                &[2, 1, 0],
                &[2, 1, 0],
            ],
        );
        let res = stv(&profile, 2, TieBreakMode::MaxId).unwrap();
        assert_eq!(res.quota, 3.0);
        assert_eq!(res.winners, vec![Alternative(0), Alternative(2)]);

        // 0 is elected with 4 votes, and its surplus of 1 vote moves to 1.
        let r1 = &res.rounds[0];
        assert_eq!(
            r1.tally_results_elected,
            vec![TransferStats {
                alternative: Alternative(0),
                transfers: vec![(Alternative(1), 1.0)],
                exhausted: 0.0
            }]
        );
        let r2 = &res.rounds[1];
        assert_eq!(
            r2.tally,
            vec![(Alternative(1), 2.0), (Alternative(2), 2.0)]
        );
        assert_eq!(r2.tally_result_eliminated[0].alternative, Alternative(1));
        assert_eq!(
            r2.tally_result_eliminated[0].transfers,
            vec![(Alternative(2), 2.0)]
        );
    }

    #[test]
    fn zero_weight_ballots_keep_the_count_going() {
        init();
        // 0 reaches the quota of 1 exactly: the ballot moves on to 1 with a zero weight.
        let profile = orders(3, &[&[0, 1, 2]]);
        let res = stv(&profile, 2, TieBreakMode::MaxId).unwrap();
        assert_eq!(res.quota, 1.0);
        assert_eq!(res.winners, vec![Alternative(0), Alternative(2)]);
        assert_eq!(res.rounds.len(), 3);
        let r2 = &res.rounds[1];
        assert_eq!(
            r2.tally,
            vec![(Alternative(1), 0.0), (Alternative(2), 0.0)]
        );
        assert_eq!(r2.tally_result_eliminated[0].alternative, Alternative(1));
        assert_eq!(r2.exhausted, 0.0);
    }

    #[test]
    fn invalid_number_of_seats() {
        let profile = orders(2, &[&[0, 1]]);
        let err = stv(&profile, 0, TieBreakMode::MaxId).unwrap_err();
        assert!(matches!(err, VotingErrors::MalformedInput { .. }));
        let err = stv(&profile, 3, TieBreakMode::MaxId).unwrap_err();
        assert!(matches!(err, VotingErrors::MalformedInput { .. }));
    }

    #[test]
    fn random_tiebreak_is_reproducible() {
        let profile = orders(4, &[&[0, 1, 2, 3], &[1, 2, 3, 0], &[2, 3, 0, 1], &[3, 0, 1, 2]]);
        for seed in 0..10 {
            let r1 = stv(&profile, 1, TieBreakMode::Random(seed)).unwrap();
            let r2 = stv(&profile, 1, TieBreakMode::Random(seed)).unwrap();
            assert_eq!(r1, r2);
        }
    }
}
