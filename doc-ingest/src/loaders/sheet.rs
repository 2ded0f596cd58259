use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::warn;

use crate::document::Document;
use crate::errors::IngestError;

/// One document per non-empty sheet; rows joined as `a | b | c`.
pub(super) fn load(name: &str, bytes: &[u8]) -> Result<Vec<Document>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::Spreadsheet(format!("{name}: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut docs = Vec::new();
    for sheet in &sheet_names {
        let range = match workbook.worksheet_range(sheet) {
            Ok(r) => r,
            Err(e) => {
                warn!(file = name, sheet = %sheet, error = %e, "skipping unreadable sheet");
                continue;
            }
        };

        let mut text = String::new();
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            if cells.iter().all(|c| c.is_empty()) {
                continue;
            }
            text.push_str(&cells.join(" | "));
            text.push('\n');
        }
        if !text.is_empty() {
            docs.push(Document::new(text, name).with("sheet", sheet));
        }
    }
    Ok(docs)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_render_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(1500.0)), "1500");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn garbage_is_a_spreadsheet_error() {
        assert!(matches!(
            load("broken.xlsx", b"not a workbook"),
            Err(IngestError::Spreadsheet(_))
        ));
    }
}
