use serde::Serialize;

use crate::services::suggestions::ChartType;

/// Static reference data about a supported chart type, surfaced to
/// clients so they can explain recommendations without calling the
/// engine.
#[derive(Debug, Clone, Serialize)]
pub struct ChartTypeInfo {
    pub chart_type: ChartType,
    pub name: &'static str,
    pub description: &'static str,
    pub best_for: &'static [&'static str],
    pub data_requirements: &'static [&'static str],
    pub ideal_categories: &'static str,
}

pub const SUPPORTED_CHART_TYPES: &[ChartTypeInfo] = &[
    ChartTypeInfo {
        chart_type: ChartType::Bar,
        name: "Bar Chart",
        description: "Shows categorical data with rectangular bars",
        best_for: &[
            "Categorical data",
            "Frequency distributions",
            "Comparisons between categories",
        ],
        data_requirements: &[
            "One categorical column",
            "Optionally one numeric column for values",
        ],
        ideal_categories: "2-15 unique values",
    },
    ChartTypeInfo {
        chart_type: ChartType::Histogram,
        name: "Histogram",
        description: "Shows distribution of continuous numerical data",
        best_for: &[
            "Data distributions",
            "Frequency of numeric ranges",
            "Identifying patterns and outliers",
        ],
        data_requirements: &["One continuous numeric column"],
        ideal_categories: "Continuous data with many values",
    },
    ChartTypeInfo {
        chart_type: ChartType::Scatter,
        name: "Scatter Plot",
        description: "Shows relationship between two numeric variables",
        best_for: &[
            "Correlation analysis",
            "Pattern detection",
            "Outlier identification",
        ],
        data_requirements: &["Two numeric columns"],
        ideal_categories: "Continuous numeric data",
    },
    ChartTypeInfo {
        chart_type: ChartType::Line,
        name: "Line Chart",
        description: "Shows trends over time or ordered categories",
        best_for: &["Time series data", "Trend analysis", "Sequential data"],
        data_requirements: &["One datetime/ordered column", "One numeric column"],
        ideal_categories: "Time-based or sequential data",
    },
    ChartTypeInfo {
        chart_type: ChartType::Box,
        name: "Box Plot",
        description: "Shows distribution summary with quartiles and outliers",
        best_for: &[
            "Distribution comparison",
            "Outlier detection",
            "Statistical summaries",
        ],
        data_requirements: &["One categorical column", "One numeric column"],
        ideal_categories: "2-10 categories for comparison",
    },
    ChartTypeInfo {
        chart_type: ChartType::Pie,
        name: "Pie Chart",
        description: "Shows proportional relationships as parts of a whole",
        best_for: &[
            "Proportional data",
            "Part-to-whole relationships",
            "Percentage breakdowns",
        ],
        data_requirements: &["One categorical column with frequencies"],
        ideal_categories: "2-8 categories maximum",
    },
    ChartTypeInfo {
        chart_type: ChartType::Heatmap,
        name: "Heatmap",
        description: "Shows correlation matrix or 2D data patterns",
        best_for: &[
            "Correlation analysis",
            "Pattern detection",
            "Matrix visualization",
        ],
        data_requirements: &[
            "Multiple numeric columns for correlation",
            "Or two categorical + one numeric",
        ],
        ideal_categories: "3+ numeric variables",
    },
];
