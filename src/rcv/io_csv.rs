// Primitives for reading CSV files.

use csv::StringRecord;

use crate::rcv::{
    io_common::{make_default_id_lineno, parse_count, read_likert_rows},
    *,
};

/// One ballot per row, one rank per column starting at the first vote column. The cells hold
/// the names of the candidates.
pub fn read_csv_ranking(path: &str, cfs: &FileSource) -> RcvResult<Vec<ParsedBallot>> {
    let default_id = make_default_id_lineno(path);

    let id_idx_o = cfs.id_column_index()?;
    let choices_start_col = cfs.first_vote_column_index(1)?;
    let count_idx_o = cfs.count_column_index()?;
    let first_row = cfs.first_vote_row_index(1)?;

    let mut res: Vec<ParsedBallot> = Vec::new();
    for (idx, line) in get_records(path)?.into_iter().enumerate().skip(first_row) {
        let lineno = idx + 1;
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineToShortSnafu { lineno })?
                .to_string()
        } else {
            default_id(lineno)
        };

        let count: u64 = if let Some(count_idx) = count_idx_o {
            let content = line.get(count_idx).context(CsvLineToShortSnafu { lineno })?;
            parse_count(content, lineno)?
        } else {
            1
        };

        let choices_parsed: Vec<Vec<String>> = line
            .iter()
            .enumerate()
            .skip(choices_start_col)
            .filter(|(col, _)| Some(*col) != id_idx_o && Some(*col) != count_idx_o)
            .map(|(_, s)| vec![s.to_string()])
            .collect();
        debug!(
            "read_csv_ranking: lineno: {:?} row: {:?}",
            lineno, &choices_parsed
        );

        res.push(ParsedBallot {
            id: Some(id),
            count: Some(count),
            choices: choices_parsed,
        });
    }
    Ok(res)
}

/// A forms export: the header row comes just before the first ballot and names the candidates.
pub fn read_csv_likert(
    path: &str,
    cfs: &FileSource,
    candidate_names: &[String],
) -> RcvResult<(Vec<String>, Vec<ParsedBallot>)> {
    let first_row = cfs.first_vote_row_index(2)?;
    ensure!(
        first_row > 0,
        MissingHeaderSnafu {
            first_row: first_row + 1
        }
    );
    let records = get_records(path)?;
    let header = records
        .get(first_row - 1)
        .map(record_cells)
        .context(MissingHeaderSnafu {
            first_row: first_row + 1,
        })?;
    debug!("read_csv_likert: header: {:?}", header);

    let rows: Vec<(usize, Vec<Option<String>>)> = records
        .iter()
        .enumerate()
        .skip(first_row)
        .map(|(idx, r)| (idx + 1, record_cells(r)))
        .collect();
    read_likert_rows(path, &header, &rows, cfs, candidate_names)
}

fn record_cells(record: &StringRecord) -> Vec<Option<String>> {
    record
        .iter()
        .map(|s| {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        })
        .collect()
}

fn get_records(path: &str) -> RcvResult<Vec<StringRecord>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records: Vec<StringRecord> = Vec::new();
    for line_r in rdr.into_records() {
        records.push(line_r.context(CsvLineParseSnafu {})?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn data_path(name: &str) -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/data")
            .join(name)
            .display()
            .to_string()
    }

    fn s(l: &[&str]) -> Vec<Vec<String>> {
        l.iter().map(|x| vec![x.to_string()]).collect()
    }

    #[test]
    fn ranking_with_header_id_and_count() {
        let mut cfs = FileSource::new("csv", "ranked.csv");
        cfs.first_vote_row = Some(serde_json::json!(2));
        cfs.id_column = Some(serde_json::json!("A"));
        cfs.count_column = Some(serde_json::json!(2));
        let ballots = read_csv_ranking(&data_path("ranked.csv"), &cfs).unwrap();
        assert_eq!(ballots.len(), 4);
        assert_eq!(
            ballots[0],
            ParsedBallot {
                id: Some("b1".to_string()),
                count: Some(2),
                choices: s(&["A", "B"]),
            }
        );
        assert_eq!(ballots[3].id, Some("b4".to_string()));
    }

    #[test]
    fn ranking_without_header() {
        let cfs = FileSource::new("csv", "ranked.csv");
        let ballots = read_csv_ranking(&data_path("ranked.csv"), &cfs).unwrap();
        assert_eq!(ballots.len(), 5);
        assert_eq!(ballots[1].id, Some("ranked.csv-00000002".to_string()));
        assert_eq!(ballots[1].choices, s(&["b1", "2", "A", "B"]));
    }

    #[test]
    fn forms_export() {
        let cfs = FileSource::new("csv_likert", "google_forms.csv");
        let (names, ballots) =
            read_csv_likert(&data_path("google_forms.csv"), &cfs, &[]).unwrap();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(ballots.len(), 5);
        assert_eq!(ballots[1].choices, s(&["B", "C"]));
        assert_eq!(ballots[2].choices, s(&["C", "A"]));
    }

    #[test]
    fn missing_file() {
        let cfs = FileSource::new("csv", "missing.csv");
        let res = read_csv_ranking(&data_path("missing.csv"), &cfs);
        assert!(matches!(res, Err(RcvError::CsvOpen { .. })));
    }
}
