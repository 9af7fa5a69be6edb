use crate::args::Args;
use crate::rcv::*;

use instant_runoff::{DegenerateRoundPolicy, UnrankedCandidatePolicy, VoteRules};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    /// Where to write the summary: `stdout` or a path relative to the configuration file.
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub candidates: Vec<String>,
}

/// A file of ballots.
///
/// Rows and columns are counted from 1. Columns may also be given with their spreadsheet
/// names (`A`, `B`, ..., `AA`).
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub first_vote_column: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    pub first_vote_row: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    /// The labels of the ranks, from the first choice to the last one.
    pub choices: Option<Vec<String>>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            first_vote_column: None,
            first_vote_row: None,
            id_column: None,
            count_column: None,
            excel_worksheet_name: None,
            choices: None,
        }
    }

    /// The first column with choices, starting at 0.
    pub fn first_vote_column_index(&self, default: usize) -> RcvResult<usize> {
        Ok(read_js_int_or(&self.first_vote_column, default)? - 1)
    }

    /// The first row with a ballot, starting at 0.
    pub fn first_vote_row_index(&self, default: usize) -> RcvResult<usize> {
        Ok(read_js_int_or(&self.first_vote_row, default)? - 1)
    }

    pub fn id_column_index(&self) -> RcvResult<Option<usize>> {
        match self.id_column {
            Some(_) => read_js_int(&self.id_column).map(|x| Some(x - 1)),
            None => Ok(None),
        }
    }

    pub fn count_column_index(&self) -> RcvResult<Option<usize>> {
        match self.count_column {
            Some(_) => read_js_int(&self.count_column).map(|x| Some(x - 1)),
            None => Ok(None),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvCandidate {
    pub name: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RcvRules {
    #[serde(rename = "unrankedCandidates")]
    pub unranked_candidates: Option<String>,
    #[serde(rename = "degenerateRound")]
    pub degenerate_round: Option<String>,
}

impl RcvRules {
    pub fn vote_rules(&self) -> RcvResult<VoteRules> {
        let mut rules = VoteRules::DEFAULT_RULES;
        if let Some(mode) = &self.unranked_candidates {
            rules.unranked_candidates = match mode.as_str() {
                "participate" => UnrankedCandidatePolicy::Participate,
                "exclude" => UnrankedCandidatePolicy::Exclude,
                x => whatever!("unknown rule for unranked candidates: {}", x),
            };
        }
        if let Some(mode) = &self.degenerate_round {
            rules.degenerate_round = match mode.as_str() {
                "tie" => DegenerateRoundPolicy::Tie,
                "fail" => DegenerateRoundPolicy::Fail,
                x => whatever!("unknown rule for degenerate rounds: {}", x),
            };
        }
        Ok(rules)
    }

    /// The rules given on the command line take precedence.
    pub fn override_with(&mut self, args: &Args) {
        if args.unranked_candidates.is_some() {
            self.unranked_candidates = args.unranked_candidates.clone();
        }
        if args.degenerate_round.is_some() {
            self.degenerate_round = args.degenerate_round.clone();
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources")]
    pub cvr_file_sources: Vec<FileSource>,
    #[serde(default)]
    pub candidates: Vec<RcvCandidate>,
    #[serde(default)]
    pub rules: RcvRules,
}

impl RcvConfig {
    /// A configuration with a single source and the default rules.
    pub fn simple(contest_name: &str, source: FileSource, candidates: &[String]) -> RcvConfig {
        RcvConfig {
            output_settings: OutputSettings {
                contest_name: contest_name.to_string(),
                contest_date: None,
                output_file: None,
            },
            cvr_file_sources: vec![source],
            candidates: candidates
                .iter()
                .map(|name| RcvCandidate { name: name.clone() })
                .collect(),
            rules: RcvRules::default(),
        }
    }

    pub fn from_args(args: &Args) -> RcvResult<RcvConfig> {
        let input = args
            .input
            .as_ref()
            .whatever_context("An input file is required when no configuration is provided")?;
        let provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
        let mut source = FileSource::new(&provider, input);
        source.first_vote_column = args.first_vote_column.map(|x| JSValue::from(x as u64));
        source.first_vote_row = args.first_vote_row.map(|x| JSValue::from(x as u64));
        source.excel_worksheet_name = args.excel_worksheet_name.clone();
        source.choices = args.choices.clone();

        let contest_name = io_common::simplify_file_name(input);
        let candidates = args.candidates.clone().unwrap_or_default();
        Ok(RcvConfig::simple(&contest_name, source, &candidates))
    }
}

pub fn read_config(path: &str) -> RcvResult<RcvConfig> {
    let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RcvConfig = serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}

fn read_js_int_or(x: &Option<JSValue>, default: usize) -> RcvResult<usize> {
    match x {
        None => Ok(default),
        Some(_) => read_js_int(x),
    }
}

/// Reads a position starting at 1, either as a number or as a spreadsheet column name.
fn read_js_int(x: &Option<JSValue>) -> RcvResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        // Parsing the Excel-style columns
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            Some(s.to_ascii_lowercase().chars().fold(0, |acc, c| {
                acc * 26 + (c as usize) - ('a' as usize) + 1
            }))
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    };
    res.filter(|x| *x > 0).context(ParsingJsonNumberSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn column_positions() {
        assert_eq!(read_js_int(&Some(json!(3))).unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("4"))).unwrap(), 4);
        assert_eq!(read_js_int(&Some(json!("B"))).unwrap(), 2);
        assert_eq!(read_js_int(&Some(json!("aa"))).unwrap(), 27);
        assert!(read_js_int(&Some(json!(0))).is_err());
        assert!(read_js_int(&Some(json!(""))).is_err());
        assert!(read_js_int(&None).is_err());
        assert_eq!(read_js_int_or(&None, 2).unwrap(), 2);
    }

    #[test]
    fn parsing_a_configuration() {
        let config: RcvConfig = serde_json::from_value(json!({
            "outputSettings": {"contestName": "Board", "outputFile": "stdout"},
            "cvrFileSources": [{
                "provider": "csv",
                "filePath": "ballots.csv",
                "firstVoteColumnIndex": "C",
                "firstVoteRowIndex": 2,
                "idColumnIndex": 1
            }],
            "candidates": [{"name": "A"}, {"name": "B"}],
            "rules": {"degenerateRound": "fail"}
        }))
        .unwrap();
        let cfs = &config.cvr_file_sources[0];
        assert_eq!(cfs.first_vote_column_index(1).unwrap(), 2);
        assert_eq!(cfs.first_vote_row_index(1).unwrap(), 1);
        assert_eq!(cfs.id_column_index().unwrap(), Some(0));
        assert_eq!(cfs.count_column_index().unwrap(), None);
        let rules = config.rules.vote_rules().unwrap();
        assert_eq!(rules.degenerate_round, DegenerateRoundPolicy::Fail);
        assert_eq!(
            rules.unranked_candidates,
            UnrankedCandidatePolicy::Participate
        );
    }

    #[test]
    fn rules_are_optional_and_checked() {
        let config: RcvConfig = serde_json::from_value(json!({
            "outputSettings": {"contestName": "Board"},
            "cvrFileSources": []
        }))
        .unwrap();
        assert!(config.candidates.is_empty());
        assert_eq!(config.rules.vote_rules().unwrap(), VoteRules::DEFAULT_RULES);

        let rules = RcvRules {
            unranked_candidates: Some("ignore".to_string()),
            degenerate_round: None,
        };
        assert!(rules.vote_rules().is_err());
    }
}
