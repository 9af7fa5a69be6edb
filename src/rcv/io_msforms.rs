use calamine::{open_workbook, DataType, Reader, Xlsx};

use std::collections::HashSet;

use crate::rcv::{
    io_common::{likert_columns, read_likert_rows},
    *,
};

/// A forms export saved as an Excel workbook. Same layout as the CSV export: the header row
/// comes just before the first ballot and names the candidates.
pub fn read_msforms_likert(
    path: &str,
    cfs: &FileSource,
    candidate_names: &[String],
) -> RcvResult<(Vec<String>, Vec<ParsedBallot>)> {
    let wrange = get_range(path, cfs)?;
    let first_row = cfs.first_vote_row_index(2)?;
    ensure!(
        first_row > 0,
        MissingHeaderSnafu {
            first_row: first_row + 1
        }
    );

    let mut all_rows = wrange.rows().enumerate();
    let header: Vec<Option<String>> = all_rows
        .by_ref()
        .nth(first_row - 1)
        .map(|(_, row)| row.iter().map(read_header_cell).collect())
        .context(EmptyExcelSnafu {})?;
    debug!("read_msforms_likert: header: {:?}", header);

    // Only the cells of these columns are read, the other ones may hold anything.
    let mut used_cols: HashSet<usize> = likert_columns(&header, cfs, candidate_names)?
        .iter()
        .map(|(idx, _)| *idx)
        .collect();
    used_cols.extend(cfs.id_column_index()?);
    used_cols.extend(cfs.count_column_index()?);

    let mut rows: Vec<(usize, Vec<Option<String>>)> = Vec::new();
    for (idx, row) in all_rows {
        let lineno = idx + 1;
        rows.push((lineno, read_row(row, lineno, &used_cols)?));
    }

    read_likert_rows(path, &header, &rows, cfs, candidate_names)
}

fn read_row(
    row: &[DataType],
    lineno: usize,
    used_cols: &HashSet<usize>,
) -> RcvResult<Vec<Option<String>>> {
    row.iter()
        .enumerate()
        .map(|(col, cell)| {
            if used_cols.contains(&col) {
                read_cell(cell, lineno)
            } else {
                Ok(None)
            }
        })
        .collect()
}

/// Column names are text. Any other cell in the header names no column.
fn read_header_cell(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) if !s.trim().is_empty() => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Some((*f as i64).to_string()),
        _ => None,
    }
}

fn read_cell(cell: &DataType, lineno: usize) -> RcvResult<Option<String>> {
    match cell {
        DataType::String(s) if s.trim().is_empty() => Ok(None),
        DataType::String(s) => Ok(Some(s.clone())),
        DataType::Int(i) => Ok(Some(i.to_string())),
        DataType::Float(f) if f.fract() == 0.0 => Ok(Some((*f as i64).to_string())),
        DataType::Float(f) => Ok(Some(f.to_string())),
        // Timestamps are never read as choices.
        DataType::DateTime(f) => Ok(Some(f.to_string())),
        DataType::Empty => Ok(None),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, cfs: &FileSource) -> RcvResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu {}.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", &path, &worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu {}.fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(read_cell(&DataType::Empty, 1).unwrap(), None);
        assert_eq!(read_cell(&DataType::String(" ".to_string()), 1).unwrap(), None);
        assert_eq!(
            read_cell(&DataType::String("2nd".to_string()), 1).unwrap(),
            Some("2nd".to_string())
        );
        assert_eq!(read_cell(&DataType::Int(3), 1).unwrap(), Some("3".to_string()));
        assert_eq!(read_cell(&DataType::Float(2.0), 1).unwrap(), Some("2".to_string()));
        assert!(matches!(
            read_cell(&DataType::Bool(true), 4),
            Err(RcvError::ExcelWrongCellType { lineno: 4, .. })
        ));
    }

    #[test]
    fn unused_columns_may_hold_anything() {
        let row = vec![
            DataType::Bool(true),
            DataType::String("1st".to_string()),
            DataType::Empty,
        ];
        let used_cols: HashSet<usize> = [1, 2].into_iter().collect();
        assert_eq!(
            read_row(&row, 5, &used_cols).unwrap(),
            vec![None, Some("1st".to_string()), None]
        );

        let used_cols: HashSet<usize> = [0, 1].into_iter().collect();
        assert!(matches!(
            read_row(&row, 5, &used_cols),
            Err(RcvError::ExcelWrongCellType { lineno: 5, .. })
        ));
    }

    #[test]
    fn header_cells() {
        assert_eq!(
            read_header_cell(&DataType::String("Alice".to_string())),
            Some("Alice".to_string())
        );
        assert_eq!(read_header_cell(&DataType::Float(3.0)), Some("3".to_string()));
        assert_eq!(read_header_cell(&DataType::Bool(true)), None);
        assert_eq!(read_header_cell(&DataType::Empty), None);
    }

    #[test]
    fn missing_workbook() {
        let cfs = FileSource::new("msforms_likert", "missing.xlsx");
        let res = read_msforms_likert("missing.xlsx", &cfs, &[]);
        assert!(matches!(res, Err(RcvError::OpeningExcel { .. })));
    }
}
