// The tables written at the end of an allocation.

use crate::allocation::{
    io_common::{RawTable, FIRST_RANK_COLUMN},
    *,
};

const ALLOCATED_COLUMN: &str = "Allocated";

/// One line per supervisor with the number of students that ranked it at each position.
pub fn preference_count_table(res: &AllocationResult) -> Vec<Vec<String>> {
    let num_ranks = res.preference_counts.len();
    let mut header = vec!["Fac".to_string()];
    header.extend((1..=num_ranks).map(|r| format!("Count Pref {}", r)));

    let mut lines = vec![header];
    for pc in res.preference_counts.iter() {
        let mut line = vec![pc.supervisor.clone()];
        line.extend(pc.counts.iter().map(|c| c.to_string()));
        lines.push(line);
    }
    lines
}

fn allocated_cell(student: &AllocatedStudent) -> String {
    student.supervisor.clone().unwrap_or_default()
}

/// The input lines as they were read, in priority order, with the allocated supervisor.
pub fn score_wise_table(table: &RawTable, res: &AllocationResult) -> Vec<Vec<String>> {
    let mut header = table.header.clone();
    header.push(ALLOCATED_COLUMN.to_string());

    let mut lines = vec![header];
    for student in res.by_score.iter() {
        let mut line = table.rows[student.input_index].cells.clone();
        line.push(allocated_cell(student));
        lines.push(line);
    }
    lines
}

/// The identity columns of each student sorted by roll, with the allocated supervisor.
pub fn roll_wise_table(table: &RawTable, res: &AllocationResult) -> Vec<Vec<String>> {
    let mut header: Vec<String> = table.header[..FIRST_RANK_COLUMN].to_vec();
    header.push(ALLOCATED_COLUMN.to_string());

    let mut lines = vec![header];
    for student in res.by_roll.iter() {
        let mut line: Vec<String> = table.rows[student.input_index].cells[..FIRST_RANK_COLUMN].to_vec();
        line.push(allocated_cell(student));
        lines.push(line);
    }
    lines
}

pub fn render_csv(lines: &[Vec<String>]) -> AllocResult<String> {
    let mut buffer: Vec<u8> = Vec::new();
    {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buffer);
        for line in lines.iter() {
            wtr.write_record(line).context(RenderingCsvSnafu {})?;
        }
        wtr.flush().context(RenderingIoSnafu {})?;
    }
    Ok(String::from_utf8_lossy(&buffer).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::io_common::RawRow;

    fn sample_table() -> RawTable {
        let line = |lineno: usize, cells: &[&str]| RawRow {
            lineno,
            cells: cells.iter().map(|s| s.to_string()).collect(),
        };
        RawTable {
            header: ["Roll", "Name", "Email", "CGPA", "F1", "F2"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: vec![
                line(2, &["CS02", "Rao, Bilal", "b@example.com", "8.50", "1", "2"]),
                line(3, &["CS01", "Asha", "a@example.com", "9.1", "2", "1"]),
            ],
        }
    }

    fn sample_result() -> AllocationResult {
        let allocated = |input_index: usize, roll: &str, score: f64, sup: Option<&str>| {
            AllocatedStudent {
                input_index,
                roll: roll.to_string(),
                name: "".to_string(),
                email: "".to_string(),
                score,
                supervisor: sup.map(|s| s.to_string()),
            }
        };
        AllocationResult {
            supervisors: vec![],
            preference_counts: vec![
                PreferenceCount {
                    supervisor: "F1".to_string(),
                    counts: vec![1, 1],
                },
                PreferenceCount {
                    supervisor: "F2".to_string(),
                    counts: vec![1, 1],
                },
            ],
            by_score: vec![
                allocated(1, "CS01", 9.1, Some("F2")),
                allocated(0, "CS02", 8.5, None),
            ],
            by_roll: vec![
                allocated(1, "CS01", 9.1, Some("F2")),
                allocated(0, "CS02", 8.5, None),
            ],
            round_stats: vec![],
        }
    }

    #[test]
    fn preference_counts() {
        let s = render_csv(&preference_count_table(&sample_result())).unwrap();
        assert_eq!(s, "Fac,Count Pref 1,Count Pref 2\nF1,1,1\nF2,1,1\n");
    }

    #[test]
    fn score_wise_keeps_the_input_cells() {
        let s = render_csv(&score_wise_table(&sample_table(), &sample_result())).unwrap();
        assert_eq!(
            s,
            "Roll,Name,Email,CGPA,F1,F2,Allocated\n\
             CS01,Asha,a@example.com,9.1,2,1,F2\n\
             CS02,\"Rao, Bilal\",b@example.com,8.50,1,2,\n"
        );
    }

    #[test]
    fn roll_wise_has_the_identity_columns() {
        let lines = roll_wise_table(&sample_table(), &sample_result());
        assert_eq!(lines[0], vec!["Roll", "Name", "Email", "CGPA", "Allocated"]);
        assert_eq!(lines[1], vec!["CS01", "Asha", "a@example.com", "9.1", "F2"]);
        assert_eq!(lines[2][4], "");
    }
}
