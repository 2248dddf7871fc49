//! Decoded tabular input
//!
//! `RawTable` is the untyped view of the first worksheet: a header row plus
//! data rows of optional cell text. Workbook decoding is delegated to
//! calamine; this module only picks the decoder by file extension and
//! flattens cells to text.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook, Data, ExcelDateTime, Ods, Range, Reader, Xlsx};

use crate::common::ParseError;

/// One data row, with the spreadsheet row number it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based spreadsheet row number
    pub row: usize,
    /// Cell text; `None` for empty cells
    pub cells: Vec<Option<String>>,
}

impl RawRow {
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }
}

/// Header row plus data rows of the first worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build a table whose header sits on spreadsheet row 1
    ///
    /// Empty or whitespace-only strings become empty cells.
    pub fn from_text<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let headers = headers.into_iter().map(|h| h.as_ref().trim().to_string()).collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRow {
                row: i + 2,
                cells: cells.into_iter().map(|c| non_empty(c.as_ref())).collect(),
            })
            .collect();

        Self { headers, rows }
    }
}

/// Supported workbook formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Ods,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "ods" => Ok(Self::Ods),
            _ => Err(ParseError::UnsupportedFormat { extension }),
        }
    }
}

/// Decode the first worksheet of an `.xlsx` or `.ods` workbook
pub fn read_workbook(path: &Path) -> Result<RawTable, ParseError> {
    let format = SheetFormat::from_path(path)?;

    let range = match format {
        SheetFormat::Xlsx => {
            let workbook = open_workbook::<Xlsx<BufReader<File>>, _>(path)
                .map_err(|e| ParseError::decode(e.to_string()))?;
            first_sheet(workbook)?
        }
        SheetFormat::Ods => {
            let workbook = open_workbook::<Ods<BufReader<File>>, _>(path)
                .map_err(|e| ParseError::decode(e.to_string()))?;
            first_sheet(workbook)?
        }
    };

    tracing::debug!(
        path = %path.display(),
        ?format,
        rows = range.height(),
        "Decoded worksheet"
    );

    Ok(from_range(&range))
}

fn first_sheet<R>(mut workbook: R) -> Result<Range<Data>, ParseError>
where
    R: Reader<BufReader<File>>,
    R::Error: std::fmt::Display,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::decode("workbook has no worksheets"))?
        .map_err(|e| ParseError::decode(e.to_string()))
}

fn from_range(range: &Range<Data>) -> RawTable {
    // Ranges start at the first used cell, not necessarily A1
    let first_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut rows = range.rows();

    let headers = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| cell_text(c).unwrap_or_default())
            .collect(),
        None => return RawTable::default(),
    };

    let rows = rows
        .enumerate()
        .map(|(i, cells)| RawRow {
            row: first_row + i + 1,
            cells: cells.iter().map(cell_text).collect(),
        })
        .collect();

    RawTable { headers, rows }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        // Error cells (#N/A, #REF!, ...) carry no usable value
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => non_empty(s),
        Data::DateTime(dt) => non_empty(&date_text(dt)),
        other => non_empty(&other.to_string()),
    }
}

/// Calendar text for a date cell instead of its serial number
fn date_text(dt: &ExcelDateTime) -> String {
    match dt.as_datetime() {
        Some(value) if dt.is_datetime() => {
            if dt.as_f64().fract() == 0.0 {
                value.format("%Y-%m-%d").to_string()
            } else {
                value.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }
        // Durations and out-of-range serials keep their numeric form
        _ => dt.to_string(),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SheetFormat::from_path(Path::new("suite.xlsx")), Ok(SheetFormat::Xlsx));
        assert_eq!(SheetFormat::from_path(Path::new("suite.ODS")), Ok(SheetFormat::Ods));
        assert_eq!(
            SheetFormat::from_path(Path::new("suite.csv")),
            Err(ParseError::UnsupportedFormat {
                extension: "csv".to_string()
            })
        );
        assert!(matches!(
            SheetFormat::from_path(Path::new("suite")),
            Err(ParseError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_unsupported_format_checked_before_opening() {
        let err = read_workbook(Path::new("/nowhere/suite.xls")).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_workbook_is_decode_failure() {
        let err = read_workbook(Path::new("/nowhere/suite.xlsx")).unwrap_err();
        assert!(matches!(err, ParseError::DecodeFailure { .. }));
    }

    #[test]
    fn test_corrupt_workbook_is_decode_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.ods");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        let err = read_workbook(&path).unwrap_err();
        assert!(matches!(err, ParseError::DecodeFailure { .. }));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("  ".to_string())), None);
        assert_eq!(cell_text(&Data::String(" ok ".to_string())), Some("ok".to_string()));
        assert_eq!(cell_text(&Data::Float(3.0)), Some("3".to_string()));
        assert_eq!(cell_text(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".to_string()));
        assert_eq!(cell_text(&Data::Bool(true)), Some("true".to_string()));
    }

    #[test]
    fn test_date_cells_render_as_calendar_text() {
        use calamine::ExcelDateTimeType;

        let date = Data::DateTime(ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_text(&date), Some("2024-01-01".to_string()));

        let with_time =
            Data::DateTime(ExcelDateTime::new(45292.5, ExcelDateTimeType::DateTime, false));
        assert_eq!(cell_text(&with_time), Some("2024-01-01 12:00:00".to_string()));

        let iso = Data::DateTimeIso("2024-03-05".to_string());
        assert_eq!(cell_text(&iso), Some("2024-03-05".to_string()));
    }

    /// Minimal `.xlsx` with inline strings; `None` leaves a cell out
    fn write_xlsx(path: &Path, rows: &[(usize, Vec<Option<&str>>)]) {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut sheet_rows = String::new();
        for (row, cells) in rows {
            sheet_rows.push_str(&format!(r#"<row r="{row}">"#));
            for (col, cell) in cells.iter().enumerate() {
                let Some(text) = cell else { continue };
                let reference = format!("{}{}", (b'A' + col as u8) as char, row);
                if let Ok(number) = text.parse::<f64>() {
                    sheet_rows.push_str(&format!(r#"<c r="{reference}"><v>{number}</v></c>"#));
                } else {
                    sheet_rows.push_str(&format!(
                        r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#
                    ));
                }
            }
            sheet_rows.push_str("</row>");
        }

        let files = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#
                    .to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Cases" sheetId="1" r:id="rId1"/></sheets></workbook>"#
                    .to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "xl/worksheets/sheet1.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_rows}</sheetData></worksheet>"#
                ),
            ),
        ];

        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in files {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_reads_xlsx_workbook() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("suite.xlsx");
        write_xlsx(
            &path,
            &[
                (1, vec![Some("Test Case ID"), Some("Feature"), Some("Condition"), Some("Input Values"), Some("Expected Result")]),
                (2, vec![Some("TC-1"), Some("login"), Some("registered user"), Some("alice"), Some("dashboard")]),
                (3, vec![Some("TC-2"), Some("cart"), Some("signed in"), Some("42"), Some("1 item")]),
                // row 4 left blank
                (5, vec![Some("TC-3"), Some("search"), Some("signed in"), Some("laptop"), None]),
                (6, vec![Some("TC-4"), Some("logout"), Some("signed in"), Some("click"), Some("login page")]),
            ],
        );

        let table = read_workbook(&path).unwrap();
        assert_eq!(table.headers[0], "Test Case ID");
        assert_eq!(table.rows[0].row, 2);
        assert_eq!(table.rows[1].cell(3), Some("42"));
        assert_eq!(table.rows[2].row, 4);
        assert_eq!(table.rows[2].cells.iter().flatten().count(), 0);

        let suite = crate::suite::load_path(&path).unwrap();
        let ids: Vec<&str> = suite.cases().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["TC-1", "TC-2"]);
        assert_eq!(suite.truncated_at(), Some(5));
        assert_eq!(suite.cases()[1].input_values, "42");
    }

    #[test]
    fn test_from_text_numbers_rows_after_header() {
        let table = RawTable::from_text(["ID", "Feature"], [vec!["1", "login"], vec!["", " "]]);
        assert_eq!(table.headers, vec!["ID", "Feature"]);
        assert_eq!(table.rows[0].row, 2);
        assert_eq!(table.rows[0].cell(1), Some("login"));
        assert_eq!(table.rows[1].row, 3);
        assert_eq!(table.rows[1].cells, vec![None, None]);
        assert_eq!(table.rows[1].cell(5), None);
    }
}
