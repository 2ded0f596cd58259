//! The `create_csv_visualization` tool: argument schema and entry point.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::error::ChartError;
use crate::figure::ChartRequest;
use crate::render_chart;
use crate::kind::ChartKind;

pub const TOOL_NAME: &str = "create_csv_visualization";

pub const TOOL_DESCRIPTION: &str = "Create an interactive chart from tabular data. \
Pass the table either as CSV text (csv_data) or as a list of JSON records (data), \
then name the columns for the x and y axes. Use color_column to split the chart \
into one series per distinct value.";

/// Arguments the model supplies when calling the tool.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VisualizationArgs {
    pub chart_type: String,
    #[serde(default)]
    pub csv_data: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    pub x_column: String,
    pub y_column: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color_column: Option<String>,
}

impl VisualizationArgs {
    /// Decodes tool-call arguments. Accepts an object, or a string holding
    /// one (some providers double-encode).
    pub fn from_value(v: &Value) -> Result<Self, serde_json::Error> {
        match v {
            Value::String(s) => serde_json::from_str(s),
            other => Self::deserialize(other),
        }
    }

    fn dataset(&self) -> Result<Dataset, ChartError> {
        match (&self.data, &self.csv_data) {
            (Some(records), _) if !records.is_empty() => Dataset::from_records(records),
            (_, Some(csv)) if !csv.trim().is_empty() => Dataset::from_csv(csv),
            _ => Err(ChartError::InvalidData(
                "provide the table as csv_data or data".into(),
            )),
        }
    }
}

/// JSON Schema of [`VisualizationArgs`], as advertised to the model.
pub fn parameters_schema() -> Value {
    let kinds: Vec<&str> = ChartKind::ALL.iter().map(|k| k.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "chart_type": {
                "type": "string",
                "enum": kinds,
                "description": "Kind of chart to draw"
            },
            "csv_data": {
                "type": "string",
                "description": "Table as CSV text with a header row"
            },
            "data": {
                "type": "array",
                "items": { "type": "object" },
                "description": "Table as a list of records (column name to value)"
            },
            "x_column": { "type": "string", "description": "Column for the x axis (labels for pie charts)" },
            "y_column": { "type": "string", "description": "Column for the y axis (values for pie charts)" },
            "title": { "type": "string", "description": "Chart title" },
            "color_column": { "type": "string", "description": "Optional column to group series by" }
        },
        "required": ["chart_type", "x_column", "y_column", "title"]
    })
}

/// What the tool hands back to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub description: String,
    pub artifact: Option<String>,
}

impl ToolResult {
    fn failed(err: ChartError) -> Self {
        Self {
            description: err.to_string(),
            artifact: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.artifact.is_some()
    }

    /// Description and artifact as a single tool message body.
    pub fn to_message_content(&self) -> String {
        match &self.artifact {
            Some(html) => format!("{}\n\n{}", self.description, html),
            None => self.description.clone(),
        }
    }
}

/// Runs the tool. Never fails: problems come back as an error description
/// with no artifact.
pub fn create_csv_visualization(args: &VisualizationArgs) -> ToolResult {
    match try_visualize(args) {
        Ok(r) => r,
        Err(e) => {
            warn!(tool = TOOL_NAME, chart = %args.chart_type, error = %e, "visualization failed");
            ToolResult::failed(e)
        }
    }
}

fn try_visualize(args: &VisualizationArgs) -> Result<ToolResult, ChartError> {
    let kind: ChartKind = args.chart_type.parse()?;
    let ds = args.dataset()?;
    let title = if args.title.trim().is_empty() {
        format!("{} by {}", args.y_column, args.x_column)
    } else {
        args.title.clone()
    };
    let req = ChartRequest {
        kind,
        x_column: args.x_column.clone(),
        y_column: args.y_column.clone(),
        title,
        color_column: args.color_column.clone().filter(|c| !c.trim().is_empty()),
    };

    let html = render_chart(&req, &ds)?;
    debug!(tool = TOOL_NAME, chart = kind.as_str(), rows = ds.rows.len(), "chart rendered");

    let mut description = format!(
        "Created a {} chart titled '{}' using columns {} and {}",
        kind, req.title, req.x_column, req.y_column
    );
    if let Some(c) = &req.color_column {
        description.push_str(&format!(", grouped by {c}"));
    }

    Ok(ToolResult {
        description,
        artifact: Some(html),
    })
}
