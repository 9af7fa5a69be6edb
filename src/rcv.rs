use log::{debug, info, warn};

use instant_runoff::{ElectionError, ElectionResult, Outcome, TransferLedger};
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rcv::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_msforms;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook has no data in the selected worksheet"))]
    EmptyExcel {},
    #[snafu(display("The workbook has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet {},
    #[snafu(display("Line {lineno}: unexpected cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Cannot find the column of candidate {candidate_name} in the header"))]
    CannotFindCandidateInHeader { candidate_name: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Line {lineno} is too short"))]
    CsvLineToShort { lineno: usize },
    #[snafu(display("The file has no header row before row {first_row}"))]
    MissingHeader { first_row: usize },
    #[snafu(display("Line {lineno}: cannot read the ballot count {content:?}"))]
    ParsingCount { lineno: usize, content: String },
    #[snafu(display("Line {lineno}: cannot understand the rank {label:?}"))]
    UnknownRankLabel { lineno: usize, label: String },
    #[snafu(display("Ballot {id}: several candidates share the rank {rank}"))]
    SharedRank { id: String, rank: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive number or a column name"))]
    ParsingJsonNumber {},
    #[snafu(display("Cannot find the directory of the configuration file"))]
    MissingParentDir {},
    #[snafu(display("No candidates provided: this input requires the list of candidates"))]
    MissingCandidates {},
    #[snafu(display("Ballot {id} was rejected"))]
    RejectedBallot { id: String, source: ElectionError },
    #[snafu(display("The election could not be tabulated"))]
    Tabulation { source: ElectionError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RcvResult<T> = Result<T, RcvError>;

/// A ballot, as parsed by the readers.
/// Each rank holds the candidates marked at that position, possibly none.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<Vec<String>>,
}

fn outcome_to_json(outcome: &Outcome<String>) -> JSValue {
    match outcome {
        Outcome::MajorityWin(c) => json!({"type": "majority", "winner": c}),
        Outcome::SoleSurvivorWin(c) => json!({"type": "soleSurvivor", "winner": c}),
        Outcome::Tie => json!({"type": "tie", "winner": null}),
    }
}

fn result_stats_to_json(rs: &ElectionResult<String>) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in rs.round_stats.iter() {
        // Pairs keep the order of the tally: most votes first.
        let tally: Vec<JSValue> = round_stat
            .tally
            .iter()
            .map(|(name, count)| json!([name, count]))
            .collect();
        let mut js = json!({
            "round": round_stat.round,
            "tally": tally,
            "totalVotes": round_stat.total_votes,
            "exhausted": round_stat.exhausted,
            "eliminated": round_stat.eliminated,
        });
        if let Some(outcome) = &round_stat.outcome {
            js["outcome"] = outcome_to_json(outcome);
        }
        l.push(js);
    }
    l
}

/// The records of the ledger, in the order of the ledger.
fn transfers_to_json(ledger: &TransferLedger<String>) -> Vec<JSValue> {
    ledger
        .iter()
        .map(|t| {
            json!({
                "round": t.round,
                "destination": t.destination,
                "source": t.source,
                "count": t.count,
            })
        })
        .collect()
}

/// The nodes and links of a flow diagram (Sankey) of the votes.
///
/// A node stands for a candidate in a round: the first round and every round of the ledger.
/// A link carries the votes from a candidate in round `r - 1` to a candidate in round `r`.
fn flow_to_json(rs: &ElectionResult<String>) -> JSValue {
    let mut nodes: Vec<String> = Vec::new();
    let mut node_ids: HashMap<(u32, String), usize> = HashMap::new();
    let ledger_rounds = rs.ledger.rounds();
    let flow_rounds = rs
        .round_stats
        .iter()
        .filter(|s| s.round == 1 || ledger_rounds.contains(&s.round));
    for stats in flow_rounds {
        for name in rs.roster.iter() {
            if stats.votes_for(name).is_some() {
                node_ids.insert((stats.round, name.clone()), nodes.len());
                nodes.push(format!("Round {}, Candidate {}", stats.round, name));
            }
        }
    }

    let mut links: Vec<JSValue> = Vec::new();
    for t in rs.ledger.iter().filter(|t| t.count > 0) {
        let source = node_ids.get(&(t.round - 1, t.source.clone()));
        let target = node_ids.get(&(t.round, t.destination.clone()));
        if let (Some(source), Some(target)) = (source, target) {
            links.push(json!({"source": source, "target": target, "value": t.count}));
        }
    }
    json!({"nodes": nodes, "links": links})
}

fn build_summary_js(config: &RcvConfig, rv: &ElectionResult<String>) -> JSValue {
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        candidates: rv.roster.clone(),
    };
    json!({
        "config": c,
        "winner": rv.winner().to_string(),
        "outcome": outcome_to_json(&rv.outcome),
        "rounds": result_stats_to_json(rv),
        "transfers": transfers_to_json(&rv.ledger),
        "flow": flow_to_json(rv),
    })
}

fn read_ranking_data(
    root_path: &Path,
    cfs: &FileSource,
    candidates: &[String],
) -> RcvResult<(Vec<String>, Vec<ParsedBallot>)> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.display().to_string();
    info!("Attempting to read rank file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => {
            ensure!(!candidates.is_empty(), MissingCandidatesSnafu);
            let ballots = io_csv::read_csv_ranking(&p2, cfs)?;
            Ok((candidates.to_vec(), ballots))
        }
        "csv_likert" => io_csv::read_csv_likert(&p2, cfs, candidates),
        "msforms_likert" => io_msforms::read_msforms_likert(&p2, cfs, candidates),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Turns the parsed ballots into rankings: blank ranks are dropped, the remaining ranks are
/// closed up and every ballot is repeated according to its count.
///
/// Returns the id of every ranking along with the rankings.
fn validate_ballots(
    parsed_ballots: &[ParsedBallot],
) -> RcvResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut ids: Vec<String> = Vec::new();
    let mut res: Vec<Vec<String>> = Vec::new();
    for (idx, pb) in parsed_ballots.iter().enumerate() {
        let id = pb.id.clone().unwrap_or_else(|| format!("#{}", idx + 1));
        let mut candidates: Vec<String> = Vec::new();
        for (rank_idx, rank) in pb.choices.iter().enumerate() {
            let marked: Vec<&String> = rank.iter().filter(|s| !s.trim().is_empty()).collect();
            match marked.as_slice() {
                [] => {}
                [name] => candidates.push(name.trim().to_string()),
                _ => {
                    return SharedRankSnafu {
                        id,
                        rank: rank_idx + 1,
                    }
                    .fail()
                }
            }
        }
        debug!("Choices for ballot {:?}: {:?}", id, candidates);

        // Default of 1 if not specified
        let count = pb.count.unwrap_or(1);
        if count == 0 {
            warn!("Ballot {} has a count of zero and is skipped", id);
        }
        for _ in 0..count {
            ids.push(id.clone());
            res.push(candidates.clone());
        }
    }
    Ok((ids, res))
}

/// Reads all the sources of the configuration and runs the election.
pub fn tabulate_config(
    config: &RcvConfig,
    root_path: &Path,
) -> RcvResult<ElectionResult<String>> {
    let rules = config.rules.vote_rules()?;

    if config.cvr_file_sources.is_empty() {
        whatever!("no file sources detected");
    }

    let mut candidates: Vec<String> = config.candidates.iter().map(|c| c.name.clone()).collect();
    let mut ballot_ids: Vec<String> = Vec::new();
    let mut ballots: Vec<Vec<String>> = Vec::new();
    for cfs in config.cvr_file_sources.iter() {
        let (source_candidates, parsed_ballots) = read_ranking_data(root_path, cfs, &candidates)?;
        if candidates.is_empty() {
            info!("Candidates read from the header: {:?}", source_candidates);
            candidates = source_candidates;
        }
        let (mut ids, mut file_ballots) = validate_ballots(&parsed_ballots)?;
        ballot_ids.append(&mut ids);
        ballots.append(&mut file_ballots);
    }

    info!(
        "Read {} ballots for {} candidates",
        ballots.len(),
        candidates.len()
    );

    let res = instant_runoff::run_election(&ballots, &candidates, &rules);
    debug!("res {:?}", res);
    res.map_err(|e| {
        let rejected_id = match e {
            ElectionError::InvalidBallot { ballot, .. } => ballot_ids.get(ballot).cloned(),
            _ => None,
        };
        match rejected_id {
            Some(id) => RcvError::RejectedBallot { id, source: e },
            None => RcvError::Tabulation { source: e },
        }
    })
}

/// Runs the election, prints the rounds and writes the summary.
///
/// `out` is either `stdout` or a file path. When a reference summary is given, any
/// difference with the computed summary is an error.
pub fn run_election(
    config: &RcvConfig,
    root_path: &Path,
    out: Option<String>,
    check_summary_path: Option<String>,
) -> RcvResult<()> {
    info!("config: {:?}", config);
    let result = tabulate_config(config, root_path)?;

    for round_stat in result.round_stats.iter() {
        println!("{}", round_stat);
    }
    println!("Winner: {}", result.winner());

    // Assemble the final json
    let result_js = build_summary_js(config, &result);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingJsonSnafu { path })?;
            info!("Summary written to {}", path);
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
        info!("The summary matches the reference {}", summary_p);
    }

    Ok(())
}

/// Entry point of the program: the configuration file when one is given, the command line
/// otherwise.
pub fn run_from_args(args: &Args) -> RcvResult<()> {
    let (mut config, root_path) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?;
            (config, root_p.to_path_buf())
        }
        None => (RcvConfig::from_args(args)?, PathBuf::new()),
    };
    config.rules.override_with(args);

    let out = match &args.out {
        Some(o) => Some(o.clone()),
        None => config.output_settings.output_file.as_ref().map(|o| {
            if o == "stdout" {
                o.clone()
            } else {
                root_path.join(o).display().to_string()
            }
        }),
    };
    run_election(&config, &root_path, out, args.reference.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use instant_runoff::Winner;

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
    }

    fn pb(count: u64, choices: &[&[&str]]) -> ParsedBallot {
        ParsedBallot {
            id: None,
            count: Some(count),
            choices: choices
                .iter()
                .map(|rank| rank.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn names(l: &[&str]) -> Vec<String> {
        l.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn validation_closes_gaps_and_expands_counts() {
        let (ids, ballots) = validate_ballots(&[
            pb(2, &[&["A"], &[], &["", "B"]]),
            pb(0, &[&["C"]]),
            pb(1, &[&[" "], &[" C "]]),
        ])
        .unwrap();
        assert_eq!(ids, names(&["#1", "#1", "#3"]));
        assert_eq!(
            ballots,
            vec![names(&["A", "B"]), names(&["A", "B"]), names(&["C"])]
        );
    }

    #[test]
    fn shared_rank_is_an_error() {
        let res = validate_ballots(&[pb(1, &[&["A"], &["B", "C"]])]);
        match res {
            Err(RcvError::SharedRank { id, rank }) => {
                assert_eq!(id, "#1");
                assert_eq!(rank, 2);
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn google_forms_export() {
        let config = RcvConfig::simple(
            "Forms",
            FileSource::new("csv_likert", "google_forms.csv"),
            &[],
        );
        let result = tabulate_config(&config, &data_dir()).unwrap();
        assert_eq!(result.roster, names(&["A", "B", "C"]));
        assert_eq!(result.winner(), Winner::Candidate("A".to_string()));
        assert_eq!(result.round_stats.len(), 2);
        assert_eq!(result.ledger.transferred(2, &"A".to_string(), &"C".to_string()), 1);
        assert_eq!(result.ledger.transferred(2, &"A".to_string(), &"A".to_string()), 2);
        assert_eq!(result.ledger.transferred(2, &"B".to_string(), &"B".to_string()), 2);
    }

    #[test]
    fn configuration_file_with_counts() {
        let config_path = data_dir().join("ranked_config.json");
        let config = read_config(&config_path.display().to_string()).unwrap();
        let result = tabulate_config(&config, &data_dir()).unwrap();
        assert_eq!(result.winner(), Winner::Candidate("A".to_string()));
        assert_eq!(result.round_stats[0].total_votes, 5);
        assert_eq!(result.round_stats[0].eliminated, names(&["C"]));
        assert_eq!(result.ledger.received(2, &"A".to_string()), 3);
    }

    #[test]
    fn unknown_candidate_names_the_ballot() {
        let config_path = data_dir().join("ranked_config.json");
        let mut config = read_config(&config_path.display().to_string()).unwrap();
        config.candidates.retain(|c| c.name != "C");
        match tabulate_config(&config, &data_dir()) {
            Err(RcvError::RejectedBallot { id, .. }) => assert_eq!(id, "b2"),
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn summary_keeps_the_order_of_rounds_and_tallies() {
        // Candidate k is the first and only choice of k ballots.
        let candidates: Vec<String> = (1..=11).map(|k| format!("c{:02}", k)).collect();
        let mut ballots: Vec<Vec<String>> = Vec::new();
        for (idx, c) in candidates.iter().enumerate() {
            for _ in 0..=idx {
                ballots.push(vec![c.clone()]);
            }
        }
        let result = instant_runoff::run_election(
            &ballots,
            &candidates,
            &instant_runoff::VoteRules::DEFAULT_RULES,
        )
        .unwrap();
        assert_eq!(result.round_stats.len(), 10);

        let rounds: Vec<u64> = transfers_to_json(&result.ledger)
            .iter()
            .map(|t| t["round"].as_u64().unwrap())
            .collect();
        let mut sorted_rounds = rounds.clone();
        sorted_rounds.sort();
        assert_eq!(rounds, sorted_rounds);
        assert_eq!(rounds.last(), Some(&10));

        let stats = result_stats_to_json(&result);
        assert_eq!(stats[9]["tally"], json!([["c11", 11], ["c10", 10]]));
        assert_eq!(stats[0]["tally"][0], json!(["c11", 11]));
    }

    #[test]
    fn summary_flow() {
        let ballots = vec![
            names(&["A", "B"]),
            names(&["B", "C"]),
            names(&["C", "A"]),
            names(&["A", "C"]),
            names(&["B", "A"]),
        ];
        let result = instant_runoff::run_election(
            &ballots,
            &names(&["A", "B", "C"]),
            &instant_runoff::VoteRules::DEFAULT_RULES,
        )
        .unwrap();
        let flow = flow_to_json(&result);
        assert_eq!(
            flow["nodes"],
            json!([
                "Round 1, Candidate A",
                "Round 1, Candidate B",
                "Round 1, Candidate C",
                "Round 2, Candidate A",
                "Round 2, Candidate B"
            ])
        );
        assert_eq!(
            flow["links"],
            json!([
                {"source": 0, "target": 3, "value": 2},
                {"source": 2, "target": 3, "value": 1},
                {"source": 1, "target": 4, "value": 2}
            ])
        );
        assert_eq!(
            transfers_to_json(&result.ledger),
            vec![
                json!({"round": 2, "destination": "A", "source": "A", "count": 2}),
                json!({"round": 2, "destination": "A", "source": "C", "count": 1}),
                json!({"round": 2, "destination": "B", "source": "B", "count": 2}),
            ]
        );

        let config = RcvConfig::simple("Test", FileSource::new("csv", "none.csv"), &[]);
        let summary = build_summary_js(&config, &result);
        assert_eq!(summary["winner"], json!("A"));
        assert_eq!(summary["outcome"], json!({"type": "majority", "winner": "A"}));
        assert_eq!(summary["rounds"][0]["eliminated"], json!(["C"]));
        assert_eq!(summary["rounds"][1]["tally"], json!([["A", 3], ["B", 2]]));
    }
}
