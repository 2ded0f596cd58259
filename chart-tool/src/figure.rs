//! Plotly figure construction (`data`, `layout`, `config` JSON).

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::dataset::{Cell, Dataset};
use crate::error::ChartError;
use crate::kind::ChartKind;

/// What to draw, after the chart type has been parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x_column: String,
    pub y_column: String,
    pub title: String,
    pub color_column: Option<String>,
}

/// A complete Plotly figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
    pub config: Value,
}

/// Resolved column positions.
struct Columns {
    x: usize,
    y: usize,
    color: Option<usize>,
}

/// Checks that every referenced column exists. Runs before any chart work.
fn resolve_columns(req: &ChartRequest, ds: &Dataset) -> Result<Columns, ChartError> {
    let x = ds
        .column_index(&req.x_column)
        .ok_or_else(|| ChartError::MissingColumn(req.x_column.clone()))?;
    let y = ds
        .column_index(&req.y_column)
        .ok_or_else(|| ChartError::MissingColumn(req.y_column.clone()))?;
    let color = match &req.color_column {
        Some(c) => Some(
            ds.column_index(c)
                .ok_or_else(|| ChartError::MissingColorColumn(c.clone()))?,
        ),
        None => None,
    };
    Ok(Columns { x, y, color })
}

/// Builds the figure for `req` over `ds`.
///
/// # Errors
/// Missing columns, an empty table, or non-numeric values where the chart
/// needs numbers.
pub fn build_figure(req: &ChartRequest, ds: &Dataset) -> Result<Figure, ChartError> {
    let cols = resolve_columns(req, ds)?;
    if ds.is_empty() {
        return Err(ChartError::NoData);
    }

    let data = match req.kind {
        ChartKind::Pie => vec![pie_trace(req, ds, &cols)?],
        ChartKind::Heatmap => vec![heatmap_trace(req, ds, &cols)?],
        kind => {
            if matches!(kind, ChartKind::Histogram) {
                require_numeric(ds, cols.y, &req.y_column, kind)?;
            }
            groups(ds, cols.color)
                .into_iter()
                .map(|(name, rows)| xy_trace(kind, req, ds, &cols, name, &rows))
                .collect()
        }
    };

    Ok(Figure {
        data,
        layout: layout(req),
        config: json!({ "displayModeBar": false, "responsive": true }),
    })
}

fn require_numeric(ds: &Dataset, idx: usize, name: &str, kind: ChartKind) -> Result<(), ChartError> {
    let all_numeric = ds
        .column(idx)
        .all(|c| matches!(c, Cell::Number(_) | Cell::Empty));
    let any_number = ds.column(idx).any(|c| c.as_f64().is_some());
    if all_numeric && any_number {
        Ok(())
    } else {
        Err(ChartError::NonNumeric {
            column: name.to_string(),
            kind: kind.as_str(),
        })
    }
}

/// Splits row indices by color value, preserving first-appearance order.
/// Without a color column there is one unnamed group with every row.
fn groups(ds: &Dataset, color: Option<usize>) -> Vec<(Option<String>, Vec<usize>)> {
    let Some(ci) = color else {
        return vec![(None, (0..ds.rows.len()).collect())];
    };
    let mut out: Vec<(Option<String>, Vec<usize>)> = Vec::new();
    for (i, row) in ds.rows.iter().enumerate() {
        let label = row[ci].label();
        match out.iter_mut().find(|(n, _)| n.as_deref() == Some(label.as_str())) {
            Some((_, idxs)) => idxs.push(i),
            None => out.push((Some(label), vec![i])),
        }
    }
    out
}

fn xy_trace(
    kind: ChartKind,
    req: &ChartRequest,
    ds: &Dataset,
    cols: &Columns,
    name: Option<String>,
    rows: &[usize],
) -> Value {
    let xs: Vec<Value> = rows.iter().map(|&i| ds.rows[i][cols.x].to_json()).collect();
    let ys: Vec<Value> = rows.iter().map(|&i| ds.rows[i][cols.y].to_json()).collect();

    let mut t = Map::new();
    match kind {
        ChartKind::Bar => {
            t.insert("type".into(), json!("bar"));
        }
        ChartKind::Line => {
            t.insert("type".into(), json!("scatter"));
            t.insert("mode".into(), json!("lines"));
        }
        ChartKind::Scatter => {
            t.insert("type".into(), json!("scatter"));
            t.insert("mode".into(), json!("markers"));
        }
        ChartKind::Area => {
            t.insert("type".into(), json!("scatter"));
            t.insert("mode".into(), json!("lines"));
            t.insert("stackgroup".into(), json!("one"));
        }
        ChartKind::Box => {
            t.insert("type".into(), json!("box"));
        }
        ChartKind::Violin => {
            t.insert("type".into(), json!("violin"));
            t.insert("box".into(), json!({ "visible": true }));
        }
        ChartKind::Histogram => {
            t.insert("type".into(), json!("histogram"));
            t.insert("histfunc".into(), json!("sum"));
        }
        // Handled by dedicated builders.
        ChartKind::Pie | ChartKind::Heatmap => {}
    }
    t.insert("x".into(), Value::Array(xs));
    t.insert("y".into(), Value::Array(ys));
    if let Some(n) = name {
        t.insert("name".into(), json!(n));
    }
    t.insert(
        "hovertemplate".into(),
        json!(format!(
            "{}: %{{x}}<br>{}: %{{y}}<extra></extra>",
            req.x_column, req.y_column
        )),
    );
    Value::Object(t)
}

fn pie_trace(req: &ChartRequest, ds: &Dataset, cols: &Columns) -> Result<Value, ChartError> {
    require_numeric(ds, cols.y, &req.y_column, ChartKind::Pie)?;
    let labels: Vec<Value> = ds.column(cols.x).map(|c| json!(c.label())).collect();
    let values: Vec<Value> = ds.column(cols.y).map(Cell::to_json).collect();
    Ok(json!({
        "type": "pie",
        "labels": labels,
        "values": values,
        "hovertemplate": format!("{}: %{{label}}<br>{}: %{{value}}<extra></extra>", req.x_column, req.y_column),
    }))
}

/// Pivot: rows = distinct y values, columns = distinct x values, cells =
/// sum of the value column. Missing cells stay `null`.
fn heatmap_trace(req: &ChartRequest, ds: &Dataset, cols: &Columns) -> Result<Value, ChartError> {
    let (vi, vname) = match (cols.color, &req.color_column) {
        (Some(ci), Some(name)) => (ci, name.as_str()),
        _ => match ds.column_index("value") {
            Some(vi) => (vi, "value"),
            None => return Err(ChartError::MissingHeatmapValues),
        },
    };
    require_numeric(ds, vi, vname, ChartKind::Heatmap)?;

    let mut xs: Vec<String> = Vec::new();
    let mut ys: Vec<String> = Vec::new();
    for row in &ds.rows {
        let (x, y) = (row[cols.x].label(), row[cols.y].label());
        if !xs.contains(&x) {
            xs.push(x);
        }
        if !ys.contains(&y) {
            ys.push(y);
        }
    }

    let mut z: Vec<Vec<Option<f64>>> = vec![vec![None; xs.len()]; ys.len()];
    for row in &ds.rows {
        let Some(v) = row[vi].as_f64() else { continue };
        let xi = xs.iter().position(|x| *x == row[cols.x].label());
        let yi = ys.iter().position(|y| *y == row[cols.y].label());
        if let (Some(xi), Some(yi)) = (xi, yi) {
            let cell = &mut z[yi][xi];
            *cell = Some(cell.unwrap_or(0.0) + v);
        }
    }

    Ok(json!({
        "type": "heatmap",
        "x": xs,
        "y": ys,
        "z": z,
        "colorscale": "Viridis",
        "hovertemplate": format!("{}: %{{x}}<br>{}: %{{y}}<br>{}: %{{z}}<extra></extra>", req.x_column, req.y_column, vname),
    }))
}

/// Dark theme with transparent backgrounds so the chart blends into the chat.
fn layout(req: &ChartRequest) -> Value {
    let mut l = json!({
        "title": { "text": req.title },
        "paper_bgcolor": "rgba(0,0,0,0)",
        "plot_bgcolor": "rgba(0,0,0,0)",
        "font": { "color": "#f2f5fa" },
        "margin": { "l": 50, "r": 50, "t": 80, "b": 50 },
        "height": 500,
        "autosize": true,
        "xaxis": { "title": { "text": req.x_column }, "gridcolor": "#283442" },
        "yaxis": { "title": { "text": req.y_column }, "gridcolor": "#283442" },
    });
    if let Some(c) = &req.color_column {
        l["legend"] = json!({ "title": { "text": c } });
    }
    l
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expenses() -> Dataset {
        Dataset::from_csv(
            "Category,Amount,Month\nGroceries,500,Jan\nRent,1200,Jan\nGroceries,450,Feb\nRent,1200,Feb\nFun,150,Feb\n",
        )
        .unwrap()
    }

    fn req(kind: ChartKind) -> ChartRequest {
        ChartRequest {
            kind,
            x_column: "Category".into(),
            y_column: "Amount".into(),
            title: "Expenses".into(),
            color_column: None,
        }
    }

    #[test]
    fn missing_x_column_is_reported_by_name() {
        let mut r = req(ChartKind::Bar);
        r.x_column = "Vendor".into();
        let err = build_figure(&r, &expenses()).unwrap_err();
        assert_eq!(err, ChartError::MissingColumn("Vendor".into()));
        assert!(err.to_string().contains("'Vendor'"));
    }

    #[test]
    fn missing_color_column_has_its_own_message() {
        let mut r = req(ChartKind::Bar);
        r.color_column = Some("Region".into());
        let msg = build_figure(&r, &expenses()).unwrap_err().to_string();
        assert_eq!(msg, "Error: Color column 'Region' not found in CSV data");
    }

    #[test]
    fn bar_single_trace() {
        let f = build_figure(&req(ChartKind::Bar), &expenses()).unwrap();
        assert_eq!(f.data.len(), 1);
        assert_eq!(f.data[0]["type"], "bar");
        assert_eq!(f.data[0]["x"][0], "Groceries");
        assert_eq!(f.data[0]["y"][1], 1200.0);
        assert_eq!(f.layout["height"], 500);
        assert_eq!(f.config["displayModeBar"], false);
    }

    #[test]
    fn color_column_splits_traces_in_order() {
        let mut r = req(ChartKind::Line);
        r.color_column = Some("Month".into());
        let f = build_figure(&r, &expenses()).unwrap();
        assert_eq!(f.data.len(), 2);
        assert_eq!(f.data[0]["name"], "Jan");
        assert_eq!(f.data[1]["name"], "Feb");
        assert_eq!(f.data[1]["mode"], "lines");
        assert_eq!(f.layout["legend"]["title"]["text"], "Month");
    }

    #[test]
    fn pie_uses_labels_and_values() {
        let f = build_figure(&req(ChartKind::Pie), &expenses()).unwrap();
        assert_eq!(f.data[0]["labels"][2], "Groceries");
        assert_eq!(f.data[0]["values"][4], 150.0);
    }

    #[test]
    fn pie_rejects_text_values() {
        let mut r = req(ChartKind::Pie);
        r.y_column = "Month".into();
        assert!(matches!(
            build_figure(&r, &expenses()),
            Err(ChartError::NonNumeric { .. })
        ));
    }

    #[test]
    fn heatmap_pivots_and_sums() {
        let r = ChartRequest {
            kind: ChartKind::Heatmap,
            x_column: "Month".into(),
            y_column: "Category".into(),
            title: "Spend".into(),
            color_column: Some("Amount".into()),
        };
        let f = build_figure(&r, &expenses()).unwrap();
        let t = &f.data[0];
        assert_eq!(t["x"], json!(["Jan", "Feb"]));
        assert_eq!(t["y"], json!(["Groceries", "Rent", "Fun"]));
        assert_eq!(t["z"][0], json!([500.0, 450.0]));
        assert_eq!(t["z"][2], json!([null, 150.0]));
    }

    #[test]
    fn heatmap_without_values_is_an_error() {
        let mut r = req(ChartKind::Heatmap);
        r.y_column = "Month".into();
        assert_eq!(
            build_figure(&r, &expenses()).unwrap_err(),
            ChartError::MissingHeatmapValues
        );
    }

    #[test]
    fn empty_table_is_an_error() {
        let ds = Dataset::from_csv("Category,Amount\n").unwrap();
        assert_eq!(build_figure(&req(ChartKind::Bar), &ds).unwrap_err(), ChartError::NoData);
    }
}
