//! Chart tool errors.
//!
//! Every message is phrased for the language model: the tool boundary turns
//! these into plain text so the model can correct itself or ask the user.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("Error: Column '{0}' not found in CSV data")]
    MissingColumn(String),

    #[error("Error: Color column '{0}' not found in CSV data")]
    MissingColorColumn(String),

    #[error("Error: Unsupported chart type '{0}'. Supported types: {supported}", supported = crate::kind::ChartKind::supported_list())]
    UnsupportedChartType(String),

    #[error("Error: Could not parse data: {0}")]
    InvalidData(String),

    #[error("Error: The data has no rows")]
    NoData,

    #[error("Error: Column '{column}' must be numeric for a {kind} chart")]
    NonNumeric { column: String, kind: &'static str },

    #[error("Error: Heatmap needs a color column or a 'value' column holding the cell values")]
    MissingHeatmapValues,
}
