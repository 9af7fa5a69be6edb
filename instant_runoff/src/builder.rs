use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

pub use crate::config::*;
use crate::{tabulate, tabulation_to_result, CandidateId};

/// A builder for adding ballots.
///
/// Ballots are validated as they are added: every choice must be a registered candidate and
/// no candidate may be ranked twice on the same ballot.
///
/// ```
/// pub use instant_runoff::builder::Builder;
/// pub use instant_runoff::{VoteRules, Winner};
/// # use instant_runoff::ElectionError;
///
/// let mut builder = Builder::new(&VoteRules::DEFAULT_RULES)
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_ballot(&["Anna".to_string(), "Bob".to_string()])?;
/// builder.add_ballot(&["Bob".to_string()])?;
/// builder.add_ballot(&["Anna".to_string()])?;
///
/// let result = builder.resolve()?;
/// assert_eq!(result.winner(), Winner::Candidate("Anna".to_string()));
/// # Ok::<(), ElectionError>(())
/// ```
pub struct Builder<C> {
    rules: VoteRules,
    candidates: Vec<C>,
    candidate_ids: HashMap<C, CandidateId>,
    ballots: Vec<Vec<CandidateId>>,
}

impl<C> Builder<C>
where
    C: Eq + Hash + Clone + Debug,
{
    pub fn new(rules: &VoteRules) -> Builder<C> {
        Builder {
            rules: rules.clone(),
            candidates: Vec::new(),
            candidate_ids: HashMap::new(),
            ballots: Vec::new(),
        }
    }

    /// Registers the candidates, in roster order. The ballots added so far are dropped.
    pub fn candidates(self, cands: &[C]) -> Result<Builder<C>, ElectionError> {
        let mut candidate_ids: HashMap<C, CandidateId> = HashMap::new();
        for (idx, c) in cands.iter().enumerate() {
            if candidate_ids
                .insert(c.clone(), CandidateId(idx as u32))
                .is_some()
            {
                return Err(ElectionError::DuplicateCandidate {
                    name: format!("{:?}", c),
                });
            }
        }
        Ok(Builder {
            rules: self.rules,
            candidates: cands.to_vec(),
            candidate_ids,
            ballots: Vec::new(),
        })
    }

    /// Adds one ballot, most preferred candidate first. An empty ballot is accepted and casts
    /// no vote.
    pub fn add_ballot(&mut self, choices: &[C]) -> Result<(), ElectionError> {
        let ballot = self.ballots.len();
        let mut seen: HashSet<CandidateId> = HashSet::new();
        let mut ranks: Vec<CandidateId> = Vec::with_capacity(choices.len());
        for c in choices.iter() {
            let cid = *self
                .candidate_ids
                .get(c)
                .ok_or_else(|| ElectionError::InvalidBallot {
                    ballot,
                    reason: BallotDefect::UnknownCandidate(format!("{:?}", c)),
                })?;
            if !seen.insert(cid) {
                return Err(ElectionError::InvalidBallot {
                    ballot,
                    reason: BallotDefect::RepeatedCandidate(format!("{:?}", c)),
                });
            }
            ranks.push(cid);
        }
        self.ballots.push(ranks);
        Ok(())
    }

    pub fn num_ballots(&self) -> usize {
        self.ballots.len()
    }

    pub fn resolve(&self) -> Result<ElectionResult<C>, ElectionError> {
        debug!(
            "resolve: {:?} ballots, candidates: {:?}",
            self.ballots.len(),
            self.candidates
        );
        let roster: Vec<CandidateId> = (0..self.candidates.len())
            .map(|idx| CandidateId(idx as u32))
            .collect();
        let tab = tabulate(&roster, &self.ballots, &self.rules)?;
        Ok(tabulation_to_result(&tab, &self.candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_registration() {
        let res = Builder::new(&VoteRules::DEFAULT_RULES).candidates(&["A", "B", "A"]);
        assert_eq!(
            res.err(),
            Some(ElectionError::DuplicateCandidate {
                name: "\"A\"".to_string()
            })
        );
    }

    #[test]
    fn rejected_ballots_are_not_kept() {
        let mut builder = Builder::new(&VoteRules::DEFAULT_RULES)
            .candidates(&["A", "B"])
            .unwrap();
        builder.add_ballot(&["A", "B"]).unwrap();
        assert!(builder.add_ballot(&["B", "Z"]).is_err());
        assert!(builder.add_ballot(&["A", "A"]).is_err());
        builder.add_ballot(&[]).unwrap();
        assert_eq!(builder.num_ballots(), 2);

        // The ballot position counts accepted ballots only.
        assert_eq!(
            builder.add_ballot(&["C"]),
            Err(ElectionError::InvalidBallot {
                ballot: 2,
                reason: BallotDefect::UnknownCandidate("\"C\"".to_string())
            })
        );
    }

    #[test]
    fn registering_candidates_resets_ballots() {
        let mut builder = Builder::new(&VoteRules::DEFAULT_RULES)
            .candidates(&["A"])
            .unwrap();
        builder.add_ballot(&["A"]).unwrap();
        let builder = builder.candidates(&["A", "B"]).unwrap();
        assert_eq!(builder.num_ballots(), 0);
        assert_eq!(builder.resolve().err(), Some(ElectionError::EmptyElectorate));
    }
}
