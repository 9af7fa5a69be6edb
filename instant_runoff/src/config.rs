// ********* Output data structures ***********

use std::error::Error;
use std::fmt::Display;

use crate::ledger::TransferLedger;

pub type RoundId = u32;

/// How a resolution ended.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Outcome<C> {
    /// The candidate held strictly more than half of the votes cast in the last round.
    MajorityWin(C),
    /// The candidate was the last one left in the race, whatever its share of the votes.
    SoleSurvivorWin(C),
    /// All the remaining candidates were eliminated together.
    Tie,
}

impl<C: Clone> Outcome<C> {
    pub fn winner(&self) -> Winner<C> {
        match self {
            Outcome::MajorityWin(c) | Outcome::SoleSurvivorWin(c) => Winner::Candidate(c.clone()),
            Outcome::Tie => Winner::Tie,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Winner<C> {
    Candidate(C),
    Tie,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats<C> {
    pub round: RoundId,
    /// The votes of every candidate still in the race, by decreasing count.
    /// Candidates with the same count keep the order of the roster.
    pub tally: Vec<(C, u64)>,
    pub total_votes: u64,
    /// Ballots that cast no vote in this round (empty from the start or exhausted since).
    pub exhausted: u64,
    /// Candidates removed at the end of this round, in roster order.
    pub eliminated: Vec<C>,
    /// Set on the last round only.
    pub outcome: Option<Outcome<C>>,
}

impl<C: PartialEq> RoundStats<C> {
    pub fn votes_for(&self, candidate: &C) -> Option<u64> {
        self.tally
            .iter()
            .find(|(c, _)| c == candidate)
            .map(|(_, count)| *count)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResult<C> {
    pub outcome: Outcome<C>,
    /// The registered candidates, in roster order.
    pub roster: Vec<C>,
    pub round_stats: Vec<RoundStats<C>>,
    pub ledger: TransferLedger<C>,
}

impl<C: Clone> ElectionResult<C> {
    pub fn winner(&self) -> Winner<C> {
        self.outcome.winner()
    }
}

/// Why a ballot was rejected.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotDefect {
    UnknownCandidate(String),
    RepeatedCandidate(String),
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ElectionError {
    /// The ballot at the given position (starting at 0) cannot be counted.
    InvalidBallot { ballot: usize, reason: BallotDefect },
    DuplicateCandidate { name: String },
    /// No ballot or no candidate.
    EmptyElectorate,
    /// No vote was cast in this round while several candidates were still running.
    DegenerateRound { round: RoundId },
}

impl Error for ElectionError {}

impl Display for ElectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElectionError::InvalidBallot {
                ballot,
                reason: BallotDefect::UnknownCandidate(name),
            } => write!(f, "ballot {}: unknown candidate {}", ballot, name),
            ElectionError::InvalidBallot {
                ballot,
                reason: BallotDefect::RepeatedCandidate(name),
            } => write!(f, "ballot {}: candidate {} ranked more than once", ballot, name),
            ElectionError::DuplicateCandidate { name } => {
                write!(f, "candidate {} is registered more than once", name)
            }
            ElectionError::EmptyElectorate => write!(f, "the election has no ballot or no candidate"),
            ElectionError::DegenerateRound { round } => {
                write!(f, "no vote was cast in round {}", round)
            }
        }
    }
}

// ********* Configuration **********

/// What to do with a round in which no ballot holds a vote while several candidates are
/// still running. This only happens when every ballot is empty.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DegenerateRoundPolicy {
    /// Eliminate all the remaining candidates and end with a tie.
    Tie,
    /// Stop with `ElectionError::DegenerateRound`.
    Fail,
}

/// Treatment of the registered candidates that no ballot mentions.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UnrankedCandidatePolicy {
    /// They enter the first round with zero votes and take part in the elimination.
    Participate,
    /// They are removed from the roster before the first round.
    Exclude,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub degenerate_round: DegenerateRoundPolicy,
    pub unranked_candidates: UnrankedCandidatePolicy,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        degenerate_round: DegenerateRoundPolicy::Tie,
        unranked_candidates: UnrankedCandidatePolicy::Participate,
    };
}

impl Default for VoteRules {
    fn default() -> Self {
        VoteRules::DEFAULT_RULES
    }
}
