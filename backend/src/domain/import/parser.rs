//! Turns raw CSV / XLSX / XLS bytes into header-keyed rows.
//!
//! The first non-empty record is the header row. Data rows keep their
//! spreadsheet line number so dropped rows can be reported back.

use calamine::{open_workbook_from_rs, Data, DataType, Range, Reader, Xls, Xlsx};
use std::io::{Cursor, Read, Seek};
use tracing::debug;

use super::source::SpreadsheetFormat;
use super::ImportError;

/// One data row as `(header, cell)` pairs in column order
pub type RawRow = Vec<(String, String)>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    /// `(line number, row)`; the header row is line 1
    pub rows: Vec<(usize, RawRow)>,
}

pub fn parse(format: SpreadsheetFormat, bytes: &[u8]) -> Result<ParsedSheet, ImportError> {
    let sheet = match format {
        SpreadsheetFormat::Csv => parse_csv(bytes)?,
        SpreadsheetFormat::Xlsx => {
            let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
                .map_err(|e| ImportError::Parse(format!("not a valid xlsx workbook: {}", e)))?;
            let range = first_worksheet(&mut workbook)?;
            from_range(&range)?
        }
        SpreadsheetFormat::Xls => {
            let mut workbook: Xls<_> = open_workbook_from_rs(Cursor::new(bytes))
                .map_err(|e| ImportError::Parse(format!("not a valid xls workbook: {}", e)))?;
            let range = first_worksheet(&mut workbook)?;
            from_range(&range)?
        }
    };
    debug!(
        "Parsed {} sheet: {} columns, {} data rows",
        format.extension(),
        sheet.headers.len(),
        sheet.rows.len()
    );
    Ok(sheet)
}

pub fn parse_csv(bytes: &[u8]) -> Result<ParsedSheet, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ImportError::Parse(format!("malformed CSV: {}", e)))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);
        records.push((line, record.iter().map(str::to_string).collect::<Vec<_>>()));
    }
    assemble(records)
}

fn first_worksheet<RS, R>(workbook: &mut R) -> Result<Range<Data>, ImportError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Parse("workbook has no worksheets".to_string()))?
        .map_err(|e| ImportError::Parse(format!("unreadable worksheet: {}", e)))
}

fn from_range(range: &Range<Data>) -> Result<ParsedSheet, ImportError> {
    let records = range
        .rows()
        .enumerate()
        .map(|(index, cells)| (index + 1, cells.iter().map(cell_text).collect()))
        .collect();
    assemble(records)
}

/// Whole-number floats print without a fraction ("2021", not "2021.0");
/// date cells become `YYYY-MM-DD`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn assemble(records: Vec<(usize, Vec<String>)>) -> Result<ParsedSheet, ImportError> {
    let mut records = records
        .into_iter()
        .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()));

    let (_, header_cells) = records
        .next()
        .ok_or_else(|| ImportError::Parse("no header row found".to_string()))?;
    let headers: Vec<String> = header_cells
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h.as_str() };
            h.trim().to_string()
        })
        .collect();

    let rows = records
        .map(|(line, cells)| {
            let row: RawRow = headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .map(|(i, header)| (header.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect();
            (line, row)
        })
        .collect();

    Ok(ParsedSheet {
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_rows() {
        let csv = "\u{feff}Regimental No,Name,Batch\nTN21SDA1, Arun ,2021\n\n,,\nTN21SDA2,Bala\n";
        let sheet = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(sheet.headers, vec!["Regimental No", "Name", "Batch"]);
        assert_eq!(sheet.rows.len(), 2);
        let (line, first) = &sheet.rows[0];
        assert_eq!(*line, 2);
        assert_eq!(first[1], ("Name".to_string(), "Arun".to_string()));
        // Short rows are padded with empty cells
        assert_eq!(sheet.rows[1].1[2], ("Batch".to_string(), String::new()));
        assert_eq!(sheet.rows[1].0, 5);
    }

    #[test]
    fn test_parse_csv_quoted_fields() {
        let csv = "name,homeAddress\n\"Kumar, R\",\"12, Main Road\"\n";
        let sheet = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(sheet.rows[0].1[0].1, "Kumar, R");
        assert_eq!(sheet.rows[0].1[1].1, "12, Main Road");
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let err = parse_csv(b"").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[test]
    fn test_invalid_workbook_is_a_parse_error() {
        let err = parse(SpreadsheetFormat::Xlsx, b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));

        let err = parse(SpreadsheetFormat::Xls, b"definitely not an ole file").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(2021.0)), "2021");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String(" ATC ".to_string())), "ATC");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
