use std::{fmt, str::FromStr};

use crate::error::ChartError;

/// Supported chart families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Box,
    Violin,
    Histogram,
    Heatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 9] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Area,
        ChartKind::Box,
        ChartKind::Violin,
        ChartKind::Histogram,
        ChartKind::Heatmap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Area => "area",
            ChartKind::Box => "box",
            ChartKind::Violin => "violin",
            ChartKind::Histogram => "histogram",
            ChartKind::Heatmap => "heatmap",
        }
    }

    /// Comma-separated list used in error messages and the tool schema.
    pub fn supported_list() -> String {
        Self::ALL.map(ChartKind::as_str).join(", ")
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == norm)
            .ok_or_else(|| ChartError::UnsupportedChartType(s.trim().to_string()))
    }
}
