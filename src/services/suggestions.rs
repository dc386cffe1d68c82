use serde::Serialize;

use crate::services::classifier::{ColumnProfile, ColumnProfiles};

/// Bar charts are only offered for the first few categorical columns.
const BAR_MAX_SUGGESTIONS: usize = 3;
/// Upper cardinality bound for a readable bar chart.
const BAR_MAX_UNIQUE: usize = 15;
const HISTOGRAM_MAX_SUGGESTIONS: usize = 2;
/// Upper cardinality bound for a readable box plot grouping.
const BOX_MAX_UNIQUE: usize = 10;
const PIE_UNIQUE_RANGE: std::ops::RangeInclusive<usize> = 2..=8;
const HEATMAP_MIN_NUMERIC: usize = 3;
const HEATMAP_MAX_COLUMNS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Histogram,
    Scatter,
    Line,
    Box,
    Pie,
    Heatmap,
}

/// A recommended chart: which type, which columns, and why. Immutable
/// once produced; list order is the rendering order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSuggestion {
    pub chart_type: ChartType,
    pub title: String,
    pub description: String,
    pub columns: Vec<String>,
    pub reasoning: String,
}

/// Derive ranked chart suggestions from column profiles. The output
/// order is fixed: bar, histogram, scatter, line, box, pie, heatmap.
/// Categories whose gating conditions are unmet are simply absent.
pub fn suggest(profiles: &ColumnProfiles) -> Vec<ChartSuggestion> {
    if profiles.is_empty() {
        return Vec::new();
    }

    let numeric_cols: Vec<&ColumnProfile> = profiles.iter().filter(|p| p.is_numeric).collect();
    let categorical_cols: Vec<&ColumnProfile> =
        profiles.iter().filter(|p| p.is_categorical).collect();
    let continuous_cols: Vec<&ColumnProfile> =
        profiles.iter().filter(|p| p.is_continuous).collect();
    let datetime_cols: Vec<&ColumnProfile> = profiles.iter().filter(|p| p.is_datetime).collect();

    let mut suggestions = Vec::new();

    // Bar charts for categorical data
    for profile in categorical_cols.iter().take(BAR_MAX_SUGGESTIONS) {
        if profile.unique_count <= BAR_MAX_UNIQUE {
            suggestions.push(ChartSuggestion {
                chart_type: ChartType::Bar,
                title: format!("Distribution of {}", profile.name),
                description: format!(
                    "Bar chart showing the frequency of different values in {}",
                    profile.name
                ),
                columns: vec![profile.name.clone()],
                reasoning: format!(
                    "Column '{}' is categorical with {} unique values, suitable for bar chart visualization",
                    profile.name, profile.unique_count
                ),
            });
        }
    }

    // Histograms for continuous numeric data
    for profile in continuous_cols.iter().take(HISTOGRAM_MAX_SUGGESTIONS) {
        suggestions.push(ChartSuggestion {
            chart_type: ChartType::Histogram,
            title: format!("Distribution of {}", profile.name),
            description: format!(
                "Histogram showing the distribution of values in {}",
                profile.name
            ),
            columns: vec![profile.name.clone()],
            reasoning: format!(
                "Column '{}' is numeric and continuous, perfect for histogram to show data distribution",
                profile.name
            ),
        });
    }

    // Scatter plot for the first pair of numeric columns
    if let [first, second, ..] = numeric_cols.as_slice() {
        suggestions.push(ChartSuggestion {
            chart_type: ChartType::Scatter,
            title: format!("{} vs {}", first.name, second.name),
            description: format!(
                "Scatter plot showing the relationship between {} and {}",
                first.name, second.name
            ),
            columns: vec![first.name.clone(), second.name.clone()],
            reasoning: format!(
                "Both '{}' and '{}' are numeric columns, ideal for exploring correlation with scatter plot",
                first.name, second.name
            ),
        });
    }

    // Line chart for time series data
    if let (Some(datetime), Some(numeric)) = (datetime_cols.first(), numeric_cols.first()) {
        suggestions.push(ChartSuggestion {
            chart_type: ChartType::Line,
            title: format!("{} over {}", numeric.name, datetime.name),
            description: format!(
                "Line chart showing how {} changes over {}",
                numeric.name, datetime.name
            ),
            columns: vec![datetime.name.clone(), numeric.name.clone()],
            reasoning: format!(
                "Column '{}' appears to be temporal and '{}' is numeric, perfect for time series visualization",
                datetime.name, numeric.name
            ),
        });
    }

    // Box plot for numeric data grouped by the first categorical column
    if let (Some(category), Some(numeric)) = (categorical_cols.first(), numeric_cols.first()) {
        if category.unique_count <= BOX_MAX_UNIQUE {
            suggestions.push(ChartSuggestion {
                chart_type: ChartType::Box,
                title: format!("{} by {}", numeric.name, category.name),
                description: format!(
                    "Box plot showing the distribution of {} across different {} categories",
                    numeric.name, category.name
                ),
                columns: vec![category.name.clone(), numeric.name.clone()],
                reasoning: format!(
                    "Column '{}' is categorical with few unique values, and '{}' is numeric - ideal for comparing distributions",
                    category.name, numeric.name
                ),
            });
        }
    }

    // At most one pie chart, for the first categorical column in range
    if let Some(profile) = categorical_cols
        .iter()
        .find(|p| PIE_UNIQUE_RANGE.contains(&p.unique_count))
    {
        suggestions.push(ChartSuggestion {
            chart_type: ChartType::Pie,
            title: format!("Composition of {}", profile.name),
            description: format!(
                "Pie chart showing the proportional breakdown of {}",
                profile.name
            ),
            columns: vec![profile.name.clone()],
            reasoning: format!(
                "Column '{}' has {} categories, suitable for showing proportions in a pie chart",
                profile.name, profile.unique_count
            ),
        });
    }

    // Correlation heatmap when enough numeric columns exist
    if numeric_cols.len() >= HEATMAP_MIN_NUMERIC {
        suggestions.push(ChartSuggestion {
            chart_type: ChartType::Heatmap,
            title: "Correlation Matrix".to_string(),
            description: "Heatmap showing correlations between numeric variables".to_string(),
            columns: numeric_cols
                .iter()
                .take(HEATMAP_MAX_COLUMNS)
                .map(|p| p.name.clone())
                .collect(),
            reasoning:
                "Multiple numeric columns detected - correlation heatmap will reveal relationships between variables"
                    .to_string(),
        });
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnValues, TableData};
    use crate::services::classifier::classify;

    fn numeric_column(name: &str, values: Vec<f64>) -> Column {
        Column::new(name, ColumnValues::Numeric(values.into_iter().map(Some).collect()))
    }

    fn text_column(name: &str, values: &[&str]) -> Column {
        Column::new(
            name,
            ColumnValues::Text(values.iter().map(|v| Some(v.to_string())).collect()),
        )
    }

    fn chart_types(suggestions: &[ChartSuggestion]) -> Vec<ChartType> {
        suggestions.iter().map(|s| s.chart_type).collect()
    }

    #[test]
    fn empty_profiles_give_empty_suggestions() {
        let profiles = classify(&TableData::default());
        assert!(suggest(&profiles).is_empty());
    }

    #[test]
    fn category_and_value_dataset() {
        let data = TableData::new(vec![
            text_column("category", &["A", "A", "B", "C", "A", "B"]),
            numeric_column("value", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        ]);
        let profiles = classify(&data);
        let category = profiles.get("category").unwrap();
        assert!(category.is_categorical);
        assert_eq!(category.unique_count, 3);

        let suggestions = suggest(&profiles);
        let types = chart_types(&suggestions);
        assert!(types.contains(&ChartType::Bar));
        assert!(types.contains(&ChartType::Pie));
        assert!(types.contains(&ChartType::Box));
        assert!(!types.contains(&ChartType::Scatter));
        assert!(!types.contains(&ChartType::Heatmap));
        assert!(!types.contains(&ChartType::Line));

        let bar = suggestions.iter().find(|s| s.chart_type == ChartType::Bar).unwrap();
        assert_eq!(bar.columns, vec!["category"]);
        let boxplot = suggestions.iter().find(|s| s.chart_type == ChartType::Box).unwrap();
        assert_eq!(boxplot.columns, vec!["category", "value"]);
    }

    #[test]
    fn all_numeric_dataset_gets_scatter_and_heatmap() {
        let columns: Vec<Column> = ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                numeric_column(*name, (0..50).map(|v| (v * (i + 1)) as f64).collect())
            })
            .collect();
        let suggestions = suggest(&classify(&TableData::new(columns)));
        let types = chart_types(&suggestions);

        assert_eq!(types.iter().filter(|t| **t == ChartType::Scatter).count(), 1);
        assert_eq!(types.iter().filter(|t| **t == ChartType::Heatmap).count(), 1);
        assert!(!types.contains(&ChartType::Bar));
        assert!(!types.contains(&ChartType::Pie));
        assert!(!types.contains(&ChartType::Box));
        assert!(!types.contains(&ChartType::Line));

        let scatter = suggestions.iter().find(|s| s.chart_type == ChartType::Scatter).unwrap();
        assert_eq!(scatter.columns, vec!["a", "b"]);
        let heatmap = suggestions.iter().find(|s| s.chart_type == ChartType::Heatmap).unwrap();
        assert_eq!(heatmap.columns, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn datetime_and_numeric_give_one_line_chart() {
        let dates: Vec<String> = (1..=12).map(|m| format!("2023-{:02}-01", m)).collect();
        let date_refs: Vec<&str> = dates.iter().map(String::as_str).collect();
        let data = TableData::new(vec![
            text_column("date", &date_refs),
            numeric_column("sales", (0..12).map(|v| v as f64 * 10.5).collect()),
        ]);
        let profiles = classify(&data);
        assert!(profiles.get("date").unwrap().is_datetime);

        let suggestions = suggest(&profiles);
        let lines: Vec<_> = suggestions
            .iter()
            .filter(|s| s.chart_type == ChartType::Line)
            .collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].columns, vec!["date", "sales"]);
    }

    #[test]
    fn at_most_one_pie_even_with_many_candidates() {
        let columns = vec![
            text_column("first", &["a", "b", "c", "a", "b", "c"]),
            text_column("second", &["x", "y", "x", "y", "x", "y"]),
            text_column("third", &["p", "q", "r", "s", "p", "q"]),
        ];
        let suggestions = suggest(&classify(&TableData::new(columns)));
        let pies: Vec<_> = suggestions
            .iter()
            .filter(|s| s.chart_type == ChartType::Pie)
            .collect();
        assert_eq!(pies.len(), 1);
        assert_eq!(pies[0].columns, vec!["first"]);
    }

    #[test]
    fn box_plot_only_checks_first_categorical_column() {
        // First categorical column has too many categories; later ones
        // are not tried.
        let wide: Vec<String> = (0..20).map(|i| format!("v{}", i)).collect();
        let wide_refs: Vec<&str> = wide.iter().map(String::as_str).collect();
        let columns = vec![
            text_column("wide", &wide_refs),
            text_column("narrow", &(0..20).map(|i| ["a", "b"][i % 2]).collect::<Vec<_>>()),
            numeric_column("value", (0..20).map(|v| v as f64).collect()),
        ];
        let suggestions = suggest(&classify(&TableData::new(columns)));
        assert!(!chart_types(&suggestions).contains(&ChartType::Box));
    }

    #[test]
    fn bar_suggestions_are_capped_and_cardinality_gated() {
        let narrow: Vec<&str> = (0..40).map(|i| ["a", "b", "c"][i % 3]).collect();
        let wide: Vec<String> = (0..40).map(|i| format!("v{}", i % 16)).collect();
        let wide_refs: Vec<&str> = wide.iter().map(String::as_str).collect();
        let columns = vec![
            text_column("c1", &narrow),
            text_column("c2", &wide_refs),
            text_column("c3", &narrow),
            text_column("c4", &narrow),
        ];
        let suggestions = suggest(&classify(&TableData::new(columns)));
        let bars: Vec<_> = suggestions
            .iter()
            .filter(|s| s.chart_type == ChartType::Bar)
            .collect();
        // c2 has 16 uniques and is skipped; c4 is beyond the first 3.
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].columns, vec!["c1"]);
        assert_eq!(bars[1].columns, vec!["c3"]);
    }

    #[test]
    fn suggestion_order_is_fixed() {
        let dates: Vec<String> = (1..=10).map(|m| format!("2023-{:02}-01", m)).collect();
        let date_refs: Vec<&str> = dates.iter().map(String::as_str).collect();
        let columns = vec![
            text_column("label", &(0..10).map(|i| ["a", "b", "c"][i % 3]).collect::<Vec<_>>()),
            text_column("when", &date_refs),
            numeric_column("x", (0..10).map(|v| v as f64).collect()),
            numeric_column("y", (10..20).map(|v| v as f64).collect()),
            numeric_column("z", (20..30).map(|v| v as f64).collect()),
        ];
        let suggestions = suggest(&classify(&TableData::new(columns)));
        let types = chart_types(&suggestions);
        let expected_order = [
            ChartType::Bar,
            ChartType::Scatter,
            ChartType::Line,
            ChartType::Box,
            ChartType::Pie,
            ChartType::Heatmap,
        ];
        let positions: Vec<usize> = expected_order
            .iter()
            .map(|t| types.iter().position(|x| x == t).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn suggest_is_deterministic() {
        let data = TableData::new(vec![
            text_column("label", &["a", "b", "a", "c"]),
            numeric_column("value", vec![1.0, 2.0, 3.0, 4.0]),
        ]);
        let profiles = classify(&data);
        assert_eq!(suggest(&profiles), suggest(&profiles));
    }
}
