// ********* Input data structures ***********

use snafu::prelude::*;
use std::fmt::Display;

/// An alternative (candidate) of the election. Alternatives are numbered from 0 to m-1,
/// following the columns of the value table.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Alternative(pub u32);

/// An agent (voter). Agents are numbered from 0 to n-1, following the rows of the value table.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct Agent(pub u32);

impl Alternative {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Agent {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for Alternative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The content of a cell, as read by the input readers.
///
/// In most cases, it is enough to use the numeric API of the builder.
#[derive(PartialEq, Debug, Clone)]
pub enum RawValue {
    /// A numeric cell.
    Number(f64),
    /// A textual cell. It is accepted if it can be parsed as a number.
    Text(String),
    /// An empty cell. Every agent must give a value to every alternative.
    Missing,
}

/// The numeric values given by every agent to every alternative.
///
/// Rows are agents, columns are alternatives. The table is always rectangular,
/// non-empty and only contains finite values.
#[derive(PartialEq, Debug, Clone)]
pub struct ValueTable {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl ValueTable {
    /// Creates a table whose alternatives are named after their index.
    pub fn new(values: Vec<Vec<f64>>) -> Result<ValueTable, VotingErrors> {
        let width = values.first().map(|row| row.len()).unwrap_or(0);
        let names = (0..width).map(|idx| idx.to_string()).collect();
        ValueTable::with_names(names, values)
    }

    pub fn with_names(names: Vec<String>, values: Vec<Vec<f64>>) -> Result<ValueTable, VotingErrors> {
        ensure!(
            !values.is_empty(),
            MalformedInputSnafu {
                reason: "the table does not contain any agent"
            }
        );
        ensure!(
            !names.is_empty(),
            MalformedInputSnafu {
                reason: "the table does not contain any alternative"
            }
        );
        for (idx, row) in values.iter().enumerate() {
            ensure!(
                row.len() == names.len(),
                MalformedInputSnafu {
                    reason: format!(
                        "agent {} has {} values, expected {}",
                        idx,
                        row.len(),
                        names.len()
                    )
                }
            );
            if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                return MalformedInputSnafu {
                    reason: format!(
                        "agent {} has a non-numeric value {:?} for alternative {}",
                        idx, row[col], col
                    ),
                }
                .fail();
            }
        }
        Ok(ValueTable { names, values })
    }

    pub fn num_agents(&self) -> usize {
        self.values.len()
    }

    pub fn num_alternatives(&self) -> usize {
        self.names.len()
    }

    pub fn agents(&self) -> impl Iterator<Item = Agent> {
        (0..self.values.len() as u32).map(Agent)
    }

    pub fn alternatives(&self) -> impl Iterator<Item = Alternative> {
        (0..self.names.len() as u32).map(Alternative)
    }

    /// The value given by an agent to an alternative, if both exist.
    pub fn value(&self, agent: Agent, alternative: Alternative) -> Option<f64> {
        self.values
            .get(agent.index())
            .and_then(|row| row.get(alternative.index()))
            .cloned()
    }

    pub fn row(&self, agent: Agent) -> Option<&[f64]> {
        self.values.get(agent.index()).map(|row| row.as_slice())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, alternative: Alternative) -> Option<&str> {
        self.names.get(alternative.index()).map(|s| s.as_str())
    }
}

// ******** Output data structures *********

/// The votes moved away from one alternative during a round.
#[derive(PartialEq, Debug, Clone)]
pub struct TransferStats {
    pub alternative: Alternative,
    pub transfers: Vec<(Alternative, f64)>,
    pub exhausted: f64,
}

/// Statistics for one round of the single transferable vote.
#[derive(PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// The tally of all the alternatives still running at the start of the round.
    pub tally: Vec<(Alternative, f64)>,
    /// Elected alternatives, with the transfer of their surplus (if any).
    pub tally_results_elected: Vec<TransferStats>,
    pub tally_result_eliminated: Vec<TransferStats>,
    /// The total weight of the exhausted ballots at the end of the round.
    pub exhausted: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct VotingResult {
    /// The winners, in order of election. There is exactly one winner unless
    /// several seats are filled by the single transferable vote.
    pub winners: Vec<Alternative>,
    /// The alternatives that were tied for the win before the tiebreak.
    pub tied: Vec<Alternative>,
    /// Final score of every alternative, in alternative order. Empty for the dictatorship.
    pub scores: Vec<(Alternative, f64)>,
    /// The quota for the single transferable vote.
    pub quota: Option<f64>,
    pub round_stats: Vec<RoundStats>,
}

impl VotingResult {
    pub fn winner(&self) -> Alternative {
        self.winners[0]
    }

    /// All the alternatives with a score, by decreasing score. Equal scores are listed by increasing id.
    pub fn ranking(&self) -> Vec<(Alternative, f64)> {
        let mut res = self.scores.clone();
        res.sort_by(|(a1, s1), (a2, s2)| s2.total_cmp(s1).then(a1.cmp(a2)));
        res
    }
}

/// Errors that prevent the algorithms from completing successfully.
#[derive(PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    #[snafu(display("Malformed input: {reason}"))]
    MalformedInput { reason: String },
    #[snafu(display("Invalid score vector: {reason}"))]
    InvalidScoreVector { reason: String },
    #[snafu(display(
        "Value {value} of agent {agent} for alternative {alternative} is outside of [{lower}, {upper}]"
    ))]
    OutOfRange {
        agent: Agent,
        alternative: Alternative,
        value: f64,
        lower: f64,
        upper: f64,
    },
    #[snafu(display("Unknown agent {agent} (the election has {num_agents} agents)"))]
    UnknownAgent { agent: Agent, num_agents: usize },
    #[snafu(display("Tiebreak failed: {reason}"))]
    TieBreak { reason: String },
    #[snafu(display("No winner: all the ballots are exhausted in round {round}"))]
    NoWinner { round: u32 },
}

// ********* Configuration **********

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// The alternative with the largest id wins the tie.
    MaxId,
    /// The alternative with the smallest id wins the tie.
    MinId,
    /// A draw seeded by the given number. The same seed always leads to the same draws.
    Random(u64),
    /// The preferences of the given agent decide.
    AgentBased(Agent),
}

/// The voting rule to apply.
///
/// Plurality, veto, Borda, harmonic and scoring are all positional scoring rules.
/// Range voting works on the raw values instead of the ranks.
#[derive(PartialEq, Debug, Clone)]
pub enum Rule {
    Dictatorship(Agent),
    Plurality,
    /// A non-increasing score vector, with one entry per rank.
    Scoring(Vec<f64>),
    /// One point to every alternative except the last ranked one.
    Veto,
    Borda,
    Harmonic,
    Stv,
    Range { lower: f64, upper: f64 },
}

#[derive(PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub rule: Rule,
    pub tiebreak_mode: TieBreakMode,
    /// Only used by the single transferable vote.
    pub number_of_winners: u32,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        rule: Rule::Plurality,
        tiebreak_mode: TieBreakMode::MaxId,
        number_of_winners: 1,
    };
}
