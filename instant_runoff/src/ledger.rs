use log::debug;
use std::collections::{BTreeMap, HashSet};

use crate::{ActiveBallot, CandidateId, RoundId, VoteCount};

/// Votes that reached `destination` at the start of `round` while sitting on `source` in the
/// previous round. When both are the same candidate, the votes simply stayed in place.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Transfer<C> {
    pub round: RoundId,
    pub destination: C,
    pub source: C,
    pub count: u64,
}

impl<C: PartialEq> Transfer<C> {
    pub fn is_retained(&self) -> bool {
        self.destination == self.source
    }
}

/// The provenance of every vote across the rounds of an election.
///
/// There is one set of records for every round after the first one. Records are ordered by
/// round, then by destination and source in roster order. Exhausted ballots do not appear.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransferLedger<C> {
    records: Vec<Transfer<C>>,
}

impl<C> TransferLedger<C> {
    pub fn iter(&self) -> std::slice::Iter<'_, Transfer<C>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The rounds that received transfers, in increasing order.
    pub fn rounds(&self) -> Vec<RoundId> {
        let mut res: Vec<RoundId> = self.records.iter().map(|t| t.round).collect();
        res.dedup();
        res
    }

    pub fn round(&self, round: RoundId) -> impl Iterator<Item = &Transfer<C>> + '_ {
        self.records.iter().filter(move |t| t.round == round)
    }
}

impl<C: PartialEq> TransferLedger<C> {
    /// Total number of votes held by the candidate at the start of the round.
    pub fn received(&self, round: RoundId, candidate: &C) -> u64 {
        self.round(round)
            .filter(|t| t.destination == *candidate)
            .map(|t| t.count)
            .sum()
    }

    pub fn transferred(&self, round: RoundId, destination: &C, source: &C) -> u64 {
        self.round(round)
            .find(|t| t.destination == *destination && t.source == *source)
            .map(|t| t.count)
            .unwrap_or(0)
    }
}

impl<'a, C> IntoIterator for &'a TransferLedger<C> {
    type Item = &'a Transfer<C>;
    type IntoIter = std::slice::Iter<'a, Transfer<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// Ledger under construction, on internal ids.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub(crate) struct TransferLog {
    entries: BTreeMap<(RoundId, CandidateId, CandidateId), VoteCount>,
}

impl TransferLog {
    pub(crate) fn new() -> TransferLog {
        TransferLog::default()
    }

    /// Moves every ballot past its eliminated leading choices and records where its vote went.
    ///
    /// `eliminated` holds all the candidates eliminated so far, not only the ones of the last
    /// round. Returns the ballots that still have a vote to cast in `round`.
    pub(crate) fn record_round<'a>(
        &mut self,
        ballots: &[ActiveBallot<'a>],
        eliminated: &HashSet<CandidateId>,
        round: RoundId,
    ) -> Vec<ActiveBallot<'a>> {
        let mut advanced: Vec<ActiveBallot<'a>> = Vec::with_capacity(ballots.len());
        let mut exhausted = VoteCount::EMPTY;
        for ballot in ballots.iter() {
            let source = match ballot.leading() {
                Some(cid) => cid,
                None => continue,
            };
            let next = ballot.advanced(eliminated);
            match next.leading() {
                Some(destination) => {
                    let e = self
                        .entries
                        .entry((round, destination, source))
                        .or_insert(VoteCount::EMPTY);
                    *e += VoteCount(1);
                    advanced.push(next);
                }
                None => {
                    exhausted += VoteCount(1);
                }
            }
        }
        debug!(
            "record_round: round {:?}: {:?} ballots carried over, {:?} exhausted",
            round,
            advanced.len(),
            exhausted
        );
        advanced
    }

    pub(crate) fn received(&self, round: RoundId, cid: CandidateId) -> VoteCount {
        self.entries
            .iter()
            .filter(|((r, dest, _), _)| *r == round && *dest == cid)
            .map(|(_, vc)| *vc)
            .sum()
    }

    pub(crate) fn to_ledger<C: Clone>(&self, candidates_by_id: &[C]) -> TransferLedger<C> {
        let records = self
            .entries
            .iter()
            .map(|((round, dest, src), vc)| Transfer {
                round: *round,
                destination: candidates_by_id[dest.index()].clone(),
                source: candidates_by_id[src.index()].clone(),
                count: vc.0,
            })
            .collect();
        TransferLedger { records }
    }
}
