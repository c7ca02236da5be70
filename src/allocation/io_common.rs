use crate::allocation::*;

/// The leading columns of the input, before the supervisors.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Roll", "Name", "Email", "CGPA"];
pub const FIRST_RANK_COLUMN: usize = REQUIRED_COLUMNS.len();

/// A table as read from the input, before any interpretation of the cells.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRow {
    // The line in the input file, starting at 1 (the header).
    pub lineno: usize,
    pub cells: Vec<String>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Ranks are integers. Spreadsheets often export them as `2.0`, which is accepted as well.
pub fn parse_rank(lineno: usize, column: &str, cell: &str) -> AllocResult<u32> {
    let s = cell.trim();
    if let Ok(x) = s.parse::<u32>() {
        return Ok(x);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => ParsingRankSnafu {
            lineno,
            column,
            content: cell,
        }
        .fail(),
    }
}

pub fn parse_score(lineno: usize, cell: &str) -> AllocResult<f64> {
    cell.trim().parse::<f64>().ok().context(ParsingScoreSnafu {
        lineno,
        content: cell,
    })
}

/// Splits the table into the supervisors (the columns after the first four) and the students.
pub fn parse_students(table: &RawTable) -> AllocResult<(Vec<String>, Vec<Student>)> {
    let header = &table.header;
    // The required columns come first, in this order. Anything else would shift the ranks.
    for (idx, expected) in REQUIRED_COLUMNS.iter().enumerate() {
        let matches = header
            .get(idx)
            .map(|found| expected.eq_ignore_ascii_case(found.trim()))
            .unwrap_or(false);
        if !matches {
            return MissingColumnSnafu {
                column: *expected,
                found: header.clone(),
            }
            .fail();
        }
    }

    let supervisors: Vec<String> = header[FIRST_RANK_COLUMN..]
        .iter()
        .map(|s| s.trim().to_string())
        .collect();
    debug!("parse_students: supervisors: {:?}", supervisors);

    let mut students: Vec<Student> = Vec::with_capacity(table.rows.len());
    for row in table.rows.iter() {
        let lineno = row.lineno;
        if row.cells.len() != header.len() {
            return WrongRowLengthSnafu {
                lineno,
                expected: header.len(),
                found: row.cells.len(),
            }
            .fail();
        }
        let score = parse_score(lineno, &row.cells[3])?;
        let ranks: Vec<u32> = row.cells[FIRST_RANK_COLUMN..]
            .iter()
            .zip(supervisors.iter())
            .map(|(cell, sup)| parse_rank(lineno, sup, cell))
            .collect::<AllocResult<Vec<u32>>>()?;
        debug!(
            "parse_students: lineno: {:?} roll: {:?} score: {:?} ranks: {:?}",
            lineno, &row.cells[0], score, &ranks
        );
        students.push(Student {
            roll: row.cells[0].trim().to_string(),
            name: row.cells[1].trim().to_string(),
            email: row.cells[2].trim().to_string(),
            score,
            ranks,
        });
    }
    Ok((supervisors, students))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(idx, r)| RawRow {
                    lineno: idx + 2,
                    cells: r.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn ranks_accept_integral_floats() {
        assert_eq!(parse_rank(2, "F1", "3").unwrap(), 3);
        assert_eq!(parse_rank(2, "F1", " 2.0 ").unwrap(), 2);
        assert!(matches!(
            parse_rank(2, "F1", "2.5"),
            Err(AllocError::ParsingRank { lineno: 2, .. })
        ));
        assert!(parse_rank(2, "F1", "-1").is_err());
        assert!(parse_rank(2, "F1", "").is_err());
        assert!(parse_rank(2, "F1", "first").is_err());
    }

    #[test]
    fn students_and_supervisors() {
        let t = table(
            &["Roll", "Name", "Email", "CGPA", "F1", "F2"],
            &[
                &["CS01", "Asha", "asha@example.com", "9.1", "2", "1"],
                &["CS02", " Bilal ", "bilal@example.com", "8", "1", "2"],
            ],
        );
        let (supervisors, students) = parse_students(&t).unwrap();
        assert_eq!(supervisors, vec!["F1".to_string(), "F2".to_string()]);
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].ranks, vec![2, 1]);
        assert_eq!(students[0].score, 9.1);
        assert_eq!(students[1].name, "Bilal");
    }

    #[test]
    fn short_header_is_missing_columns() {
        let t = table(&["Roll", "Name"], &[]);
        let err = parse_students(&t).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required column Email: the header is [\"Roll\", \"Name\"]"
        );
    }

    #[test]
    fn missing_score_column_is_not_replaced_by_a_supervisor() {
        let t = table(
            &["Roll", "Name", "Email", "F1", "F2"],
            &[
                &["S1", "A", "a@example.com", "2", "1"],
                &["S2", "B", "b@example.com", "2", "1"],
            ],
        );
        match parse_students(&t) {
            Err(AllocError::MissingColumn { column, found }) => {
                assert_eq!(column, "CGPA");
                assert_eq!(found.len(), 5);
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn required_columns_ignore_case_and_spaces() {
        let t = table(
            &["roll", " NAME", "Email ", "cgpa", "F1"],
            &[&["S1", "A", "a@example.com", "9", "1"]],
        );
        let (supervisors, students) = parse_students(&t).unwrap();
        assert_eq!(supervisors, vec!["F1".to_string()]);
        assert_eq!(students[0].score, 9.0);
    }

    #[test]
    fn bad_score_names_the_line() {
        let t = table(
            &["Roll", "Name", "Email", "CGPA", "F1"],
            &[&["CS01", "Asha", "a@example.com", "high", "1"]],
        );
        assert!(matches!(
            parse_students(&t),
            Err(AllocError::ParsingScore { lineno: 2, .. })
        ));
    }

    #[test]
    fn bad_rank_names_the_column() {
        let t = table(
            &["Roll", "Name", "Email", "CGPA", "F1", "F2"],
            &[
                &["CS01", "Asha", "a@example.com", "9", "1", "2"],
                &["CS02", "Bilal", "b@example.com", "8", "1", "x"],
            ],
        );
        match parse_students(&t) {
            Err(AllocError::ParsingRank { lineno, column, .. }) => {
                assert_eq!(lineno, 3);
                assert_eq!(column, "F2");
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let t = table(
            &["Roll", "Name", "Email", "CGPA", "F1", "F2"],
            &[&["CS01", "Asha", "a@example.com", "9", "1"]],
        );
        assert!(matches!(
            parse_students(&t),
            Err(AllocError::WrongRowLength {
                lineno: 2,
                expected: 6,
                found: 5
            })
        ));
    }

    #[test]
    fn file_name_only() {
        assert_eq!(simplify_file_name("/tmp/data/input.csv"), "input.csv");
        assert_eq!(simplify_file_name("input.csv"), "input.csv");
    }
}
