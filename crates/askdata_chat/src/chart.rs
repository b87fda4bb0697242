//! Table to chart projection.
//!
//! Everything here is a pure function of its inputs, so a table message can
//! be re-projected on every render as its view mode or selection changes.

use serde::{Deserialize, Serialize};

use crate::table::Row;

/// One plotted series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column the series was taken from.
    pub label: String,
    /// One value per row, aligned with [`ChartData::labels`].
    pub data: Vec<f64>,
}

/// Chart-ready series derived from a result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    /// Label/value pairs of the first dataset, as a pie chart draws them.
    ///
    /// A projected `ChartData` always has at least one dataset; a
    /// hand-built one without any yields no slices.
    pub fn pie_slices(&self) -> Vec<(&str, f64)> {
        match self.datasets.first() {
            Some(first) => self
                .labels
                .iter()
                .map(String::as_str)
                .zip(first.data.iter().copied())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Columns with at least one non-null value that reads as a finite number.
///
/// Order follows `columns`. Empty `columns` or `rows` give an empty result.
pub fn classify_numeric_columns(columns: &[String], rows: &[Row]) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }

    columns
        .iter()
        .filter(|column| {
            rows.iter()
                .any(|row| row.get(column).as_finite_number().is_some())
        })
        .cloned()
        .collect()
}

/// Series plotted when the user has not picked any.
///
/// With several numeric columns the label column is left out; a lone
/// numeric column is used even when it is the label column.
pub fn default_selection(numeric_columns: &[String], label_column: Option<&str>) -> Vec<String> {
    if numeric_columns.len() > 1 {
        numeric_columns
            .iter()
            .filter(|column| Some(column.as_str()) != label_column)
            .cloned()
            .collect()
    } else {
        numeric_columns.to_vec()
    }
}

/// Resolve which columns get plotted.
///
/// A non-empty `selected` is intersected with the numeric columns (in
/// selection order); otherwise the default selection applies.
pub fn data_columns(
    columns: &[String],
    rows: &[Row],
    selected: Option<&[String]>,
    label_column: Option<&str>,
) -> Vec<String> {
    let numeric = classify_numeric_columns(columns, rows);
    let label_column = label_column.or_else(|| columns.first().map(String::as_str));

    match selected {
        Some(selected) if !selected.is_empty() => {
            let mut chosen: Vec<String> = Vec::with_capacity(selected.len());
            for column in selected {
                if numeric.contains(column) && !chosen.contains(column) {
                    chosen.push(column.clone());
                }
            }
            chosen
        }
        _ => default_selection(&numeric, label_column),
    }
}

/// Project a result set into chart series.
///
/// Returns `None` when nothing can be plotted; the caller then shows the
/// table instead. A returned chart never has an empty `datasets`.
pub fn project(
    columns: &[String],
    rows: &[Row],
    selected: Option<&[String]>,
    label_column: Option<&str>,
) -> Option<ChartData> {
    let label_column = label_column.or_else(|| columns.first().map(String::as_str))?;
    let series = data_columns(columns, rows, selected, Some(label_column));
    if series.is_empty() {
        return None;
    }

    let labels = rows
        .iter()
        .map(|row| row.get(label_column).to_label())
        .collect();

    let datasets = series
        .into_iter()
        .map(|column| {
            let data = rows
                .iter()
                .map(|row| row.get(&column).as_finite_number().unwrap_or(0.0))
                .collect();
            Dataset {
                label: column,
                data,
            }
        })
        .collect();

    Some(ChartData { labels, datasets })
}
