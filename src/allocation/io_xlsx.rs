use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use crate::allocation::{
    io_common::{RawRow, RawTable},
    *,
};

pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> AllocResult<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?,
    }
    .context(OpeningExcelSnafu { path })?;
    range_to_table(&wrange)
}

fn read_cell(cell: &DataType, lineno: usize) -> AllocResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        // 9.0 is written as 9
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn range_to_table(wrange: &Range<DataType>) -> AllocResult<RawTable> {
    // Line numbers as shown by the spreadsheet program.
    let first_line = wrange.start().map(|(r, _)| r as usize + 1).unwrap_or(1);

    let mut iter = wrange.rows().enumerate();
    let (_, header_row) = iter.next().context(EmptyInputSnafu {})?;
    let header: Vec<String> = header_row
        .iter()
        .map(|c| read_cell(c, first_line))
        .collect::<AllocResult<Vec<String>>>()?;
    debug!("range_to_table: header: {:?}", header);

    let mut rows: Vec<RawRow> = Vec::new();
    for (idx, row) in iter {
        let lineno = first_line + idx;
        let cells: Vec<String> = row
            .iter()
            .map(|c| read_cell(c, lineno))
            .collect::<AllocResult<Vec<String>>>()?;
        if cells.iter().all(|c| c.trim().is_empty()) {
            debug!("range_to_table: skipping empty line {:?}", lineno);
            continue;
        }
        debug!("range_to_table: lineno: {:?} row: {:?}", lineno, cells);
        rows.push(RawRow { lineno, cells });
    }
    Ok(RawTable { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(cells: &[Vec<DataType>]) -> Range<DataType> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    #[test]
    fn numbers_are_read_as_text() {
        let range = sheet(&[
            vec![s("Roll"), s("Name"), s("Email"), s("CGPA"), s("F1"), s("F2")],
            vec![
                s("CS01"),
                s("Asha"),
                s("a@example.com"),
                DataType::Float(9.5),
                DataType::Float(2.0),
                DataType::Int(1),
            ],
        ]);
        let t = range_to_table(&range).unwrap();
        assert_eq!(t.header[4], "F1");
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].lineno, 2);
        assert_eq!(t.rows[0].cells, vec!["CS01", "Asha", "a@example.com", "9.5", "2", "1"]);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let range = sheet(&[
            vec![s("Roll"), s("Name"), s("Email"), s("CGPA"), s("F1")],
            vec![DataType::Empty, DataType::Empty, DataType::Empty, DataType::Empty, DataType::Empty],
            vec![s("CS02"), s("Bilal"), s("b@example.com"), DataType::Float(8.0), DataType::Int(1)],
        ]);
        let t = range_to_table(&range).unwrap();
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].lineno, 3);
        assert_eq!(t.rows[0].cells[3], "8");
    }

    #[test]
    fn missing_file() {
        let res = read_xlsx_table("/nonexistent/students.xlsx", None);
        assert!(matches!(res, Err(AllocError::OpeningExcel { .. })));
    }
}
