//! In-memory table parsed from CSV text or JSON records.

use serde_json::Value;

use crate::error::ChartError;

/// One table cell. Numbers are recognised at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn parse(raw: &str) -> Self {
        let t = raw.trim();
        if t.is_empty() {
            return Cell::Empty;
        }
        match t.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(t.to_string()),
        }
    }

    fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => Cell::Empty,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) => Cell::parse(s),
            Value::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Label used for grouping and pivoting.
    pub fn label(&self) -> String {
        match self {
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
            Cell::Empty => String::new(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Empty => Value::Null,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Column-named rows. Short rows are padded with [`Cell::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Parses CSV text with a header row.
    pub fn from_csv(text: &str) -> Result<Self, ChartError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| ChartError::InvalidData(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(ChartError::InvalidData("missing header row".into()));
        }

        let mut rows = Vec::new();
        for rec in rdr.records() {
            let rec = rec.map_err(|e| ChartError::InvalidData(e.to_string()))?;
            let mut row: Vec<Cell> = rec.iter().take(columns.len()).map(Cell::parse).collect();
            row.resize(columns.len(), Cell::Empty);
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Builds a table from JSON objects; columns follow first appearance.
    pub fn from_records(records: &[Value]) -> Result<Self, ChartError> {
        let mut columns: Vec<String> = Vec::new();
        for r in records {
            let obj = r
                .as_object()
                .ok_or_else(|| ChartError::InvalidData("each record must be a JSON object".into()))?;
            for k in obj.keys() {
                if !columns.contains(k) {
                    columns.push(k.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| {
                columns
                    .iter()
                    .map(|c| obj.get(c).map(Cell::from_json).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |r| &r[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
