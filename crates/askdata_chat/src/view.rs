//! Per-message view state rules.
//!
//! A table message can be shown as a table or projected into a line, bar
//! or pie chart. The rules here decide what a requested view change turns
//! into, and hold the one invariant of the view state: a chart never ends
//! up with zero selected series.

use crate::chart::{self, ChartData};
use crate::table::TableData;
use crate::types::{ChartType, ViewMode};

/// What the render surface should draw for a table message.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Table,
    Chart { chart_type: ChartType, data: ChartData },
}

/// Numeric columns of the table's own payload.
pub fn numeric_columns(table: &TableData) -> Vec<String> {
    chart::classify_numeric_columns(&table.columns, &table.rows)
}

/// Series used for projection right now.
///
/// An explicit selection wins when it still names numeric columns;
/// otherwise the default computed from this table applies.
pub fn effective_selection(table: &TableData) -> Vec<String> {
    chart::data_columns(
        &table.columns,
        &table.rows,
        table.selected_columns.as_deref(),
        table.label_column(),
    )
}

/// Normalize a requested selection: numeric columns only, no duplicates,
/// request order kept. `None` when nothing valid remains.
pub fn sanitize_selection(table: &TableData, requested: &[String]) -> Option<Vec<String>> {
    let numeric = numeric_columns(table);
    let mut kept: Vec<String> = Vec::with_capacity(requested.len());
    for column in requested {
        if numeric.contains(column) && !kept.contains(column) {
            kept.push(column.clone());
        }
    }

    if kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

/// Selection after toggling `column`, or `None` if the toggle is rejected.
///
/// Toggling on appends the column. Toggling off the last selected column,
/// or toggling on a column that is not numeric, is rejected.
pub fn toggle_column(table: &TableData, column: &str) -> Option<Vec<String>> {
    let mut selection = effective_selection(table);

    if let Some(pos) = selection.iter().position(|c| c == column) {
        if selection.len() == 1 {
            return None;
        }
        selection.remove(pos);
        return Some(selection);
    }

    let numeric = numeric_columns(table);
    if !numeric.iter().any(|c| c == column) {
        return None;
    }
    selection.push(column.to_string());
    Some(selection)
}

/// Decide how to draw the table in its current state.
///
/// A chart view whose projection is absent falls back to the table.
pub fn resolve(table: &TableData) -> Presentation {
    resolve_as(table, table.view_mode)
}

/// Like [`resolve`], for an arbitrary view mode.
pub fn resolve_as(table: &TableData, mode: ViewMode) -> Presentation {
    let Some(chart_type) = mode.chart_type() else {
        return Presentation::Table;
    };

    match chart::project(
        &table.columns,
        &table.rows,
        table.selected_columns.as_deref(),
        table.label_column(),
    ) {
        Some(data) => Presentation::Chart { chart_type, data },
        None => Presentation::Table,
    }
}

/// Whether any chart view is possible for this table.
pub fn is_chartable(table: &TableData) -> bool {
    !effective_selection(table).is_empty() && !table.rows.is_empty()
}
