use std::collections::HashMap;
use std::path::Path;

use instant_runoff::parse_ordinal;

use crate::rcv::*;

/// Forms exports start with a timestamp or a respondent id before the questions.
pub const LIKERT_FIRST_COLUMN: usize = 2;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id_lineno(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Groups the (candidate, rank) pairs of a ballot by rank. Ranks start at 1, and the ranks
/// nobody was given stay empty.
pub fn assemble_choices(ranks: &[(String, u32)]) -> Vec<Vec<String>> {
    let max_sels = ranks.iter().map(|(_, rank)| *rank).max().unwrap_or(0);
    let mut choices: Vec<Vec<String>> = vec![vec![]; max_sels as usize];
    for (cname, rank) in ranks.iter() {
        if let Some(elt) = choices.get_mut((rank - 1) as usize) {
            elt.push(cname.clone());
        }
    }
    choices
}

pub fn parse_count(content: &str, lineno: usize) -> RcvResult<u64> {
    content
        .trim()
        .parse::<u64>()
        .ok()
        .context(ParsingCountSnafu { lineno, content })
}

/// The rank of a label: its position in the configured choices if any, an ordinal otherwise.
fn read_rank_label(label: &str, ranked_choices: &Option<HashMap<String, u32>>) -> Option<u32> {
    match ranked_choices {
        Some(m) => m.get(label.trim()).cloned(),
        None => parse_ordinal(label),
    }
}

/// Given the header of a file (names of each of the columns), and the names of the candidates,
/// finds the mapping from each candidate to a column index position.
pub fn get_col_index_mapping(
    req_col_names: &[String],
    header: &[Option<String>],
) -> RcvResult<Vec<(usize, String)>> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| x.as_ref().map(|s| (s.trim().to_string(), idx)))
        .collect();

    debug!("get_col_index_mapping: col_names: {:?}", col_names);

    let mut col_indexes: Vec<(usize, String)> = Vec::new();
    for cname in req_col_names {
        let idx = col_names
            .get(cname)
            .context(CannotFindCandidateInHeaderSnafu {
                candidate_name: cname,
            })?;
        col_indexes.push((*idx, cname.clone()));
    }
    Ok(col_indexes)
}

/// The columns of the candidates of a grid question, in candidate order.
///
/// When no candidates are given, they are the names of the header from the first vote column.
pub fn likert_columns(
    header: &[Option<String>],
    cfs: &FileSource,
    candidate_names: &[String],
) -> RcvResult<Vec<(usize, String)>> {
    let id_idx_o = cfs.id_column_index()?;
    let count_idx_o = cfs.count_column_index()?;

    let names: Vec<String> = if candidate_names.is_empty() {
        let first_col = cfs.first_vote_column_index(LIKERT_FIRST_COLUMN)?;
        header
            .iter()
            .enumerate()
            .skip(first_col)
            .filter(|(idx, _)| Some(*idx) != id_idx_o && Some(*idx) != count_idx_o)
            .filter_map(|(_, x)| x.as_ref().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect()
    } else {
        candidate_names.to_vec()
    };

    // Every candidate should have its name associated to a column
    get_col_index_mapping(&names, header)
}

/// Reads the ballots of a grid question: one column per candidate, one row per ballot, and the
/// rank given to the candidate in each cell.
///
/// Ranks go up to the number of configured choices, or to the number of candidates when the
/// ranks are ordinals. Returns the candidates along with the ballots.
pub fn read_likert_rows(
    path: &str,
    header: &[Option<String>],
    rows: &[(usize, Vec<Option<String>>)],
    cfs: &FileSource,
    candidate_names: &[String],
) -> RcvResult<(Vec<String>, Vec<ParsedBallot>)> {
    let default_id = make_default_id_lineno(path);
    let id_idx_o = cfs.id_column_index()?;
    let count_idx_o = cfs.count_column_index()?;

    let col_indexes = likert_columns(header, cfs, candidate_names)?;
    debug!("read_likert_rows: col_indexes: {:?}", col_indexes);
    let names: Vec<String> = col_indexes.iter().map(|(_, name)| name.clone()).collect();

    let ranked_choices: Option<HashMap<String, u32>> = cfs.choices.as_ref().map(|cs| {
        cs.iter()
            .enumerate()
            // The ranks start at 1
            .map(|(idx, s)| (s.trim().to_string(), (idx + 1) as u32))
            .collect()
    });

    let max_rank = match &cfs.choices {
        Some(cs) => cs.len(),
        None => col_indexes.len(),
    } as u32;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (lineno, row) in rows.iter() {
        let cell = |idx: usize| row.get(idx).cloned().flatten();

        let mut choices: Vec<(String, u32)> = Vec::new();
        for (col_idx, cand_name) in col_indexes.iter() {
            match cell(*col_idx) {
                Some(label) if !label.trim().is_empty() => {
                    let rank = read_rank_label(&label, &ranked_choices)
                        .filter(|rank| *rank <= max_rank)
                        .context(UnknownRankLabelSnafu {
                            lineno: *lineno,
                            label: label.clone(),
                        })?;
                    choices.push((cand_name.clone(), rank));
                }
                // No choice made, skip.
                _ => {}
            }
        }

        let id = id_idx_o
            .and_then(cell)
            .unwrap_or_else(|| default_id(*lineno));
        let count = match count_idx_o {
            Some(idx) => parse_count(&cell(idx).unwrap_or_default(), *lineno)?,
            None => 1,
        };
        debug!(
            "read_likert_rows: lineno: {:?} id: {:?} choices: {:?}",
            lineno, id, &choices
        );
        res.push(ParsedBallot {
            id: Some(id),
            count: Some(count),
            choices: assemble_choices(&choices),
        });
    }
    Ok((names, res))
}
