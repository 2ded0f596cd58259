use crate::document::Document;
use crate::errors::IngestError;

/// One document per data row, rendered as `header: value` lines.
pub(super) fn load(name: &str, bytes: &[u8]) -> Result<Vec<Document>, IngestError> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(bytes);
    let headers = rdr.headers()?.clone();

    let mut docs = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let text = headers
            .iter()
            .zip(rec.iter())
            .map(|(h, v)| format!("{h}: {v}"))
            .collect::<Vec<_>>()
            .join("\n");
        docs.push(Document::new(text, name).with("row", row));
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_key_value_documents() {
        let docs = load("expenses.csv", b"Category,Amount\nGroceries,500\nRent,1200\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].text, "Category: Rent\nAmount: 1200");
        assert_eq!(docs[1].metadata["row"], "1");
        assert_eq!(docs[0].metadata["source"], "expenses.csv");
    }
}
