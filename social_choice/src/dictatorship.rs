use log::debug;

use crate::config::*;
use crate::profile::Profile;

/// The favourite alternative of the dictator wins. There is never a tie to break.
pub fn run_dictatorship(profile: &Profile, dictator: Agent) -> Result<Alternative, VotingErrors> {
    let winner = profile.top(dictator)?;
    debug!("run_dictatorship: agent {} picks {}", dictator, winner);
    Ok(winner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::build_profile;

    #[test]
    fn dictator_top_choice_wins() {
        let table = ValueTable::new(vec![
            vec![9.0, 0.0, 0.0],
            vec![9.0, 0.0, 0.0],
            vec![1.0, 5.0, 2.0],
            vec![9.0, 0.0, 0.0],
        ])
        .unwrap();
        let profile = build_profile(&table).unwrap();
        assert_eq!(
            run_dictatorship(&profile, Agent(2)).unwrap(),
            Alternative(1)
        );
        assert_eq!(
            run_dictatorship(&profile, Agent(0)).unwrap(),
            Alternative(0)
        );
    }

    #[test]
    fn unknown_dictator() {
        let profile = build_profile(&ValueTable::new(vec![vec![1.0, 2.0]]).unwrap()).unwrap();
        let err = run_dictatorship(&profile, Agent(1)).unwrap_err();
        assert_eq!(
            err,
            VotingErrors::UnknownAgent {
                agent: Agent(1),
                num_agents: 1
            }
        );
    }
}
