/*!
Instant-runoff resolution of single-winner elections, with a record of how every vote
moved from one round to the next.

```
use instant_runoff::{resolve_election, Winner};

let candidates = ["A", "B", "C"];
let ballots = vec![
    vec!["A", "B"],
    vec!["B", "C"],
    vec!["C", "A"],
    vec!["A", "C"],
    vec!["B", "A"],
];
let (ledger, winner) = resolve_election(&ballots, &candidates)?;
assert_eq!(winner, Winner::Candidate("A"));
// The ballot sitting on C moved to A at the start of the second round.
assert_eq!(ledger.transferred(2, &"A", &"C"), 1);
assert_eq!(ledger.received(2, &"A"), 3);
# Ok::<(), instant_runoff::ElectionError>(())
```
*/
pub mod builder;
mod config;
mod ledger;
pub mod manual;
pub mod quick_start;
pub mod report;

use log::{debug, info};

use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    hash::Hash,
    ops::{Add, AddAssign},
};

pub use crate::builder::Builder;
pub use crate::config::*;
pub use crate::ledger::{Transfer, TransferLedger};
pub use crate::report::{ordinal, parse_ordinal};

use crate::ledger::TransferLog;

// **** Private structures ****

// Position of the candidate in the roster.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub(crate) struct CandidateId(pub(crate) u32);

impl CandidateId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
pub(crate) struct VoteCount(pub(crate) u64);

impl VoteCount {
    pub(crate) const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

/// A validated ranking read through a cursor.
///
/// The ranking itself is never modified: advancing past eliminated candidates returns a new
/// cursor. A cursor past the last choice is an exhausted ballot.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub(crate) struct ActiveBallot<'a> {
    ranks: &'a [CandidateId],
    position: usize,
}

impl<'a> ActiveBallot<'a> {
    pub(crate) fn new(ranks: &'a [CandidateId]) -> ActiveBallot<'a> {
        ActiveBallot { ranks, position: 0 }
    }

    pub(crate) fn leading(&self) -> Option<CandidateId> {
        self.ranks.get(self.position).copied()
    }

    /// Skips all the leading choices that have been eliminated.
    pub(crate) fn advanced(&self, eliminated: &HashSet<CandidateId>) -> ActiveBallot<'a> {
        let skipped = self.ranks[self.position..]
            .iter()
            .take_while(|cid| eliminated.contains(cid))
            .count();
        ActiveBallot {
            ranks: self.ranks,
            position: self.position + skipped,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct RoundStatistics {
    // In the order of the candidates still running.
    tally: Vec<(CandidateId, VoteCount)>,
    exhausted: VoteCount,
    eliminated: Vec<CandidateId>,
    outcome: Option<Outcome<CandidateId>>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct Tabulation {
    roster: Vec<CandidateId>,
    rounds: Vec<RoundStatistics>,
    transfers: TransferLog,
    outcome: Outcome<CandidateId>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum RoundDecision {
    Elect(Outcome<CandidateId>),
    Eliminate(Vec<CandidateId>),
}

/// Runs the instant-runoff algorithm with the default rules and returns the ledger of
/// transfers along with the winner.
///
/// Arguments:
/// * `ballots` the ranked choices of each voter, most preferred first
/// * `candidates` the registered candidates. Every candidate mentioned in a ballot must be
/// registered.
pub fn resolve_election<C>(
    ballots: &[Vec<C>],
    candidates: &[C],
) -> Result<(TransferLedger<C>, Winner<C>), ElectionError>
where
    C: Eq + Hash + Clone + Debug,
{
    let res = run_election(ballots, candidates, &VoteRules::DEFAULT_RULES)?;
    let winner = res.winner();
    Ok((res.ledger, winner))
}

/// Runs the instant-runoff algorithm with the given rules.
///
/// The result contains the statistics of every round on top of the ledger.
pub fn run_election<C>(
    ballots: &[Vec<C>],
    candidates: &[C],
    rules: &VoteRules,
) -> Result<ElectionResult<C>, ElectionError>
where
    C: Eq + Hash + Clone + Debug,
{
    let mut builder = Builder::new(rules).candidates(candidates)?;
    for ballot in ballots.iter() {
        builder.add_ballot(ballot)?;
    }
    builder.resolve()
}

pub(crate) fn tabulate(
    roster: &[CandidateId],
    rankings: &[Vec<CandidateId>],
    rules: &VoteRules,
) -> Result<Tabulation, ElectionError> {
    if roster.is_empty() || rankings.is_empty() {
        return Err(ElectionError::EmptyElectorate);
    }
    info!(
        "Processing {:?} ballots, {:?} candidates, rules: {:?}",
        rankings.len(),
        roster.len(),
        rules
    );

    let num_ballots = rankings.len() as u64;
    let mut cur_candidates: Vec<CandidateId> =
        initial_candidates(roster, rankings, rules.unranked_candidates);
    let mut eliminated: HashSet<CandidateId> = HashSet::new();
    let mut cur_ballots: Vec<ActiveBallot> = rankings
        .iter()
        .map(|r| ActiveBallot::new(r))
        .filter(|b| b.leading().is_some())
        .collect();
    let mut transfers = TransferLog::new();
    let mut rounds: Vec<RoundStatistics> = Vec::new();

    loop {
        let round_id = (rounds.len() + 1) as RoundId;
        let tally = compute_tally(&cur_ballots, &cur_candidates);
        let total: VoteCount = tally.iter().map(|(_, vc)| *vc).sum();
        debug!(
            "tabulate: round {:?}: tally {:?}, total {:?}",
            round_id, tally, total
        );
        if round_id > 1 {
            for (cid, vc) in tally.iter() {
                debug_assert_eq!(
                    transfers.received(round_id, *cid),
                    *vc,
                    "transfers into round {:?} do not add up for {:?}",
                    round_id,
                    cid
                );
            }
        }
        let exhausted = VoteCount(num_ballots - total.0);

        match resolve_round(&tally, total, round_id, rules)? {
            RoundDecision::Elect(outcome) => {
                info!("Round {:?}: {:?}", round_id, outcome);
                rounds.push(RoundStatistics {
                    tally,
                    exhausted,
                    eliminated: Vec::new(),
                    outcome: Some(outcome.clone()),
                });
                return Ok(Tabulation {
                    roster: roster.to_vec(),
                    rounds,
                    transfers,
                    outcome,
                });
            }
            RoundDecision::Eliminate(losers) => {
                info!("Round {:?}: eliminating {:?}", round_id, losers);
                let survivors: Vec<CandidateId> = cur_candidates
                    .iter()
                    .filter(|cid| !losers.contains(cid))
                    .cloned()
                    .collect();
                // Invariant: the number of candidates decreases at every round.
                assert!(
                    survivors.len() < cur_candidates.len(),
                    "The number of candidates did not decrease: {:?} -> {:?}",
                    cur_candidates,
                    survivors
                );
                eliminated.extend(losers.iter().cloned());

                if survivors.is_empty() {
                    info!("Round {:?}: all the remaining candidates are tied", round_id);
                    rounds.push(RoundStatistics {
                        tally,
                        exhausted,
                        eliminated: losers,
                        outcome: Some(Outcome::Tie),
                    });
                    return Ok(Tabulation {
                        roster: roster.to_vec(),
                        rounds,
                        transfers,
                        outcome: Outcome::Tie,
                    });
                }

                rounds.push(RoundStatistics {
                    tally,
                    exhausted,
                    eliminated: losers,
                    outcome: None,
                });
                cur_ballots = transfers.record_round(&cur_ballots, &eliminated, round_id + 1);
                cur_candidates = survivors;
            }
        }
    }
}

fn initial_candidates(
    roster: &[CandidateId],
    rankings: &[Vec<CandidateId>],
    policy: UnrankedCandidatePolicy,
) -> Vec<CandidateId> {
    match policy {
        UnrankedCandidatePolicy::Participate => roster.to_vec(),
        UnrankedCandidatePolicy::Exclude => {
            let ranked: HashSet<CandidateId> = rankings.iter().flatten().cloned().collect();
            let res: Vec<CandidateId> = roster
                .iter()
                .filter(|cid| ranked.contains(cid))
                .cloned()
                .collect();
            if res.is_empty() {
                // Nobody is ranked: keep everyone and let the degenerate round policy decide.
                debug!("initial_candidates: no candidate is ranked, keeping the roster");
                roster.to_vec()
            } else {
                debug!(
                    "initial_candidates: excluding {:?} unranked candidates",
                    roster.len() - res.len()
                );
                res
            }
        }
    }
}

// Every running candidate gets an entry, even without a vote.
fn compute_tally(
    ballots: &[ActiveBallot],
    candidates: &[CandidateId],
) -> Vec<(CandidateId, VoteCount)> {
    let mut tally: HashMap<CandidateId, VoteCount> = candidates
        .iter()
        .map(|cid| (*cid, VoteCount::EMPTY))
        .collect();
    for b in ballots.iter() {
        if let Some(vc) = b.leading().and_then(|cid| tally.get_mut(&cid)) {
            *vc += VoteCount(1);
        }
    }
    candidates
        .iter()
        .map(|cid| (*cid, tally.get(cid).cloned().unwrap_or(VoteCount::EMPTY)))
        .collect()
}

fn resolve_round(
    tally: &[(CandidateId, VoteCount)],
    total: VoteCount,
    round_id: RoundId,
    rules: &VoteRules,
) -> Result<RoundDecision, ElectionError> {
    // Only one candidate. It is the winner by any standard.
    if let [(cid, _)] = tally {
        return Ok(RoundDecision::Elect(Outcome::SoleSurvivorWin(*cid)));
    }

    if total == VoteCount::EMPTY {
        debug!("resolve_round: no vote cast in round {:?}", round_id);
        return match rules.degenerate_round {
            DegenerateRoundPolicy::Tie => Ok(RoundDecision::Eliminate(
                tally.iter().map(|(cid, _)| *cid).collect(),
            )),
            DegenerateRoundPolicy::Fail => Err(ElectionError::DegenerateRound { round: round_id }),
        };
    }

    // Strictly more than half of the votes. At most one candidate can reach it.
    if let Some((cid, vc)) = tally.iter().find(|(_, vc)| vc.0 * 2 > total.0) {
        debug!(
            "resolve_round: {:?} has {:?} out of {:?}, marking as winner",
            cid, vc, total
        );
        return Ok(RoundDecision::Elect(Outcome::MajorityWin(*cid)));
    }

    Ok(RoundDecision::Eliminate(find_eliminated_candidates(tally)))
}

// All the candidates sharing the lowest count, in roster order.
fn find_eliminated_candidates(tally: &[(CandidateId, VoteCount)]) -> Vec<CandidateId> {
    let min_count = match tally.iter().map(|(_, vc)| *vc).min() {
        Some(vc) => vc,
        None => return Vec::new(),
    };
    let all_smallest: Vec<CandidateId> = tally
        .iter()
        .filter_map(|(cid, vc)| if *vc == min_count { Some(*cid) } else { None })
        .collect();
    debug!(
        "find_eliminated_candidates: min count {:?}, all_smallest: {:?}",
        min_count, all_smallest
    );
    all_smallest
}

pub(crate) fn tabulation_to_result<C: Clone>(
    tab: &Tabulation,
    candidates_by_id: &[C],
) -> ElectionResult<C> {
    let name = |cid: &CandidateId| candidates_by_id[cid.index()].clone();
    let round_stats = tab
        .rounds
        .iter()
        .enumerate()
        .map(|(idx, r)| round_result_to_stat(r, (idx + 1) as RoundId, &name))
        .collect();
    ElectionResult {
        outcome: outcome_with_names(&tab.outcome, &name),
        roster: tab.roster.iter().map(&name).collect(),
        round_stats,
        ledger: tab.transfers.to_ledger(candidates_by_id),
    }
}

fn round_result_to_stat<C, F>(stats: &RoundStatistics, round_id: RoundId, name: &F) -> RoundStats<C>
where
    F: Fn(&CandidateId) -> C,
{
    let mut sorted_tally: Vec<(CandidateId, VoteCount)> = stats.tally.clone();
    // Stable: equal counts keep the roster order.
    sorted_tally.sort_by(|a, b| b.1.cmp(&a.1));
    RoundStats {
        round: round_id,
        tally: sorted_tally.iter().map(|(cid, vc)| (name(cid), vc.0)).collect(),
        total_votes: stats.tally.iter().map(|(_, vc)| *vc).sum::<VoteCount>().0,
        exhausted: stats.exhausted.0,
        eliminated: stats.eliminated.iter().map(name).collect(),
        outcome: stats.outcome.as_ref().map(|o| outcome_with_names(o, name)),
    }
}

fn outcome_with_names<C, F>(outcome: &Outcome<CandidateId>, name: &F) -> Outcome<C>
where
    F: Fn(&CandidateId) -> C,
{
    match outcome {
        Outcome::MajorityWin(cid) => Outcome::MajorityWin(name(cid)),
        Outcome::SoleSurvivorWin(cid) => Outcome::SoleSurvivorWin(name(cid)),
        Outcome::Tie => Outcome::Tie,
    }
}
