use serde_json::Value;

use crate::document::Document;
use crate::errors::IngestError;

/// A top-level array (or object) gives one document per element, compact
/// JSON, with a 1-based `seq_num`. Anything else is read as JSON-lines.
pub(super) fn load(name: &str, bytes: &[u8]) -> Result<Vec<Document>, IngestError> {
    let values = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Object(map)) => map.into_iter().map(|(_, v)| v).collect(),
        Ok(scalar) => vec![scalar],
        Err(_) => json_lines(bytes)?,
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let text = match v {
                Value::String(s) => s,
                other => serde_json::to_string(&other).map_err(|e| IngestError::Json(e.to_string()))?,
            };
            Ok(Document::new(text, name).with("seq_num", i + 1))
        })
        .collect()
}

fn json_lines(bytes: &[u8]) -> Result<Vec<Value>, IngestError> {
    let text = String::from_utf8_lossy(bytes);
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(n, l)| {
            serde_json::from_str(l).map_err(|e| IngestError::Json(format!("line {}: {e}", n + 1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_elements_are_documents() {
        let docs = load("tx.json", br#"[{"Category":"Rent","Amount":1200},"note"]"#).unwrap();
        assert_eq!(docs.len(), 2);
        let first: Value = serde_json::from_str(&docs[0].text).unwrap();
        assert_eq!(first["Amount"], 1200);
        assert!(!docs[0].text.contains('\n'));
        assert_eq!(docs[1].text, "note");
        assert_eq!(docs[1].metadata["seq_num"], "2");
    }

    #[test]
    fn falls_back_to_json_lines() {
        let docs = load("tx.jsonl", b"{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(matches!(load("bad.json", b"{oops"), Err(IngestError::Json(_))));
    }
}
