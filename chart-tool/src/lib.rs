//! Turns tabular data into an interactive Plotly chart fragment.
//!
//! The crate is a pure function of its inputs: no I/O beyond formatting,
//! no shared state. [`tool::create_csv_visualization`] is the entry point the
//! assistant registers as a model tool; [`render_chart`] is the same thing
//! for callers that already hold a [`Dataset`].

pub mod dataset;
pub mod error;
mod figure;
mod html;
pub mod kind;
pub mod tool;

pub use dataset::{Cell, Dataset};
pub use error::ChartError;
pub use figure::{ChartRequest, Figure, build_figure};
pub use html::{PLOTLY_CDN, WRAPPER_CLASS, render_fragment};
pub use kind::ChartKind;
pub use tool::{TOOL_NAME, ToolResult, VisualizationArgs, create_csv_visualization};

/// Builds and renders a chart in one step.
pub fn render_chart(req: &ChartRequest, ds: &Dataset) -> Result<String, ChartError> {
    let fig = build_figure(req, ds)?;
    render_fragment(&fig).map_err(|e| ChartError::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(y: &str) -> ChartRequest {
        ChartRequest {
            kind: ChartKind::Bar,
            x_column: "Category".into(),
            y_column: y.into(),
            title: "Spend".into(),
            color_column: None,
        }
    }

    #[test]
    fn render_chart_wraps_figure_in_fragment() {
        let ds = Dataset::from_csv("Category,Amount\nRent,1200\nFun,150\n").unwrap();
        let html = render_chart(&request("Amount"), &ds).unwrap();
        assert!(html.starts_with(&format!("<div class=\"{WRAPPER_CLASS}\"")));
        assert!(html.contains(PLOTLY_CDN));
        assert_eq!(html, render_chart(&request("Amount"), &ds).unwrap());
    }

    #[test]
    fn render_chart_reports_missing_column() {
        let ds = Dataset::from_csv("Category,Amount\nRent,1200\n").unwrap();
        let err = render_chart(&request("Total"), &ds).unwrap_err();
        assert_eq!(err, ChartError::MissingColumn("Total".into()));
    }
}
