use log::debug;
use snafu::prelude::*;

use crate::config::*;

/// The preference order of every agent, most preferred alternative first.
///
/// Invariant: every order is a permutation of all the alternatives.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Profile {
    num_alternatives: usize,
    orders: Vec<Vec<Alternative>>,
}

impl Profile {
    /// Builds a profile from explicit orders. Unlike tables, a profile may contain no agent.
    pub fn from_orders(
        num_alternatives: usize,
        orders: Vec<Vec<Alternative>>,
    ) -> Result<Profile, VotingErrors> {
        ensure!(
            num_alternatives > 0,
            MalformedInputSnafu {
                reason: "the profile does not contain any alternative"
            }
        );
        for (idx, order) in orders.iter().enumerate() {
            let mut seen = vec![false; num_alternatives];
            ensure!(
                order.len() == num_alternatives,
                MalformedInputSnafu {
                    reason: format!(
                        "the order of agent {} ranks {} alternatives, expected {}",
                        idx,
                        order.len(),
                        num_alternatives
                    )
                }
            );
            for alt in order.iter() {
                match seen.get_mut(alt.index()) {
                    Some(s) if !*s => *s = true,
                    _ => {
                        return MalformedInputSnafu {
                            reason: format!(
                                "the order of agent {} is not a permutation: {:?}",
                                idx, order
                            ),
                        }
                        .fail();
                    }
                }
            }
        }
        Ok(Profile {
            num_alternatives,
            orders,
        })
    }

    pub fn num_agents(&self) -> usize {
        self.orders.len()
    }

    pub fn num_alternatives(&self) -> usize {
        self.num_alternatives
    }

    pub fn alternatives(&self) -> impl Iterator<Item = Alternative> {
        (0..self.num_alternatives as u32).map(Alternative)
    }

    pub fn orders(&self) -> &[Vec<Alternative>] {
        &self.orders
    }

    pub fn contains_agent(&self, agent: Agent) -> bool {
        agent.index() < self.orders.len()
    }

    pub fn order(&self, agent: Agent) -> Result<&[Alternative], VotingErrors> {
        self.orders
            .get(agent.index())
            .map(|o| o.as_slice())
            .context(UnknownAgentSnafu {
                agent,
                num_agents: self.orders.len(),
            })
    }

    pub fn top(&self, agent: Agent) -> Result<Alternative, VotingErrors> {
        Ok(self.order(agent)?[0])
    }

    /// The rank (0 for the favourite) that an agent gives to an alternative.
    pub fn rank_of(&self, agent: Agent, alternative: Alternative) -> Result<usize, VotingErrors> {
        let order = self.order(agent)?;
        order
            .iter()
            .position(|a| *a == alternative)
            .context(MalformedInputSnafu {
                reason: format!("unknown alternative {}", alternative),
            })
    }
}

/// Converts the values of every agent into a ranking of the alternatives.
///
/// Higher values are preferred. Alternatives with the same value are ranked by increasing id.
pub fn build_profile(table: &ValueTable) -> Result<Profile, VotingErrors> {
    let mut orders: Vec<Vec<Alternative>> = Vec::with_capacity(table.num_agents());
    for agent in table.agents() {
        let row = table.row(agent).context(UnknownAgentSnafu {
            agent,
            num_agents: table.num_agents(),
        })?;
        ensure!(
            row.len() == table.num_alternatives(),
            MalformedInputSnafu {
                reason: format!("agent {} does not cover all the alternatives", agent)
            }
        );
        let mut order: Vec<Alternative> = table.alternatives().collect();
        order.sort_by(|a1, a2| {
            row[a2.index()]
                .total_cmp(&row[a1.index()])
                .then(a1.cmp(a2))
        });
        orders.push(order);
    }
    debug!("build_profile: orders: {:?}", orders);
    Profile::from_orders(table.num_alternatives(), orders)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alts(ids: &[u32]) -> Vec<Alternative> {
        ids.iter().map(|i| Alternative(*i)).collect()
    }

    #[test]
    fn ranks_by_decreasing_value() {
        let table = ValueTable::new(vec![
            vec![3.0, 2.0, 1.0],
            vec![1.0, 3.0, 2.0],
            vec![2.0, 1.0, 3.0],
        ])
        .unwrap();
        let profile = build_profile(&table).unwrap();
        assert_eq!(profile.order(Agent(0)).unwrap(), alts(&[0, 1, 2]).as_slice());
        assert_eq!(profile.order(Agent(1)).unwrap(), alts(&[1, 2, 0]).as_slice());
        assert_eq!(profile.order(Agent(2)).unwrap(), alts(&[2, 0, 1]).as_slice());
        assert_eq!(profile.top(Agent(1)).unwrap(), Alternative(1));
        assert_eq!(profile.rank_of(Agent(2), Alternative(1)).unwrap(), 2);
    }

    #[test]
    fn equal_values_ranked_by_id() {
        let table = ValueTable::new(vec![vec![1.0, 5.0, 1.0, 5.0]]).unwrap();
        let profile = build_profile(&table).unwrap();
        assert_eq!(
            profile.order(Agent(0)).unwrap(),
            alts(&[1, 3, 0, 2]).as_slice()
        );
    }

    #[test]
    fn every_order_is_a_permutation() {
        // Deterministic pseudo-random tables, with many repeated values.
        let mut state: u64 = 17;
        for m in 1..7usize {
            let mut values: Vec<Vec<f64>> = Vec::new();
            for _ in 0..9 {
                let mut row = Vec::new();
                for _ in 0..m {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                    row.push(((state >> 33) % 4) as f64);
                }
                values.push(row);
            }
            let profile = build_profile(&ValueTable::new(values).unwrap()).unwrap();
            for order in profile.orders() {
                let mut sorted = order.clone();
                sorted.sort();
                let expected: Vec<Alternative> = (0..m as u32).map(Alternative).collect();
                assert_eq!(sorted, expected);
            }
        }
    }

    #[test]
    fn unknown_agent() {
        let profile = build_profile(&ValueTable::new(vec![vec![1.0, 2.0]]).unwrap()).unwrap();
        let err = profile.order(Agent(3)).unwrap_err();
        assert_eq!(
            err,
            VotingErrors::UnknownAgent {
                agent: Agent(3),
                num_agents: 1
            }
        );
    }

    #[test]
    fn from_orders_rejects_duplicates() {
        let err = Profile::from_orders(3, vec![alts(&[0, 1, 1])]).unwrap_err();
        assert!(matches!(err, VotingErrors::MalformedInput { .. }));
        let err = Profile::from_orders(3, vec![alts(&[0, 1])]).unwrap_err();
        assert!(matches!(err, VotingErrors::MalformedInput { .. }));
        let err = Profile::from_orders(2, vec![alts(&[0, 2])]).unwrap_err();
        assert!(matches!(err, VotingErrors::MalformedInput { .. }));
        assert!(Profile::from_orders(2, vec![]).is_ok());
    }
}
