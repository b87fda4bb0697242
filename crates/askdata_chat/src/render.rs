//! Plain-text table formatting.

use crate::table::{Row, TableData};

/// Format rows as an aligned text table.
///
/// Each column is padded to its widest cell (header included). Null cells
/// print as empty.
///
/// ```text
/// month | revenue
/// ------+--------
/// Jan   | 100
/// ```
pub fn format_table(columns: &[String], rows: &[Row]) -> String {
    if rows.is_empty() || columns.is_empty() {
        return crate::gateway::NO_DATA_CAPTION.to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| row.get(c).to_label()).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|line| line[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let pad = |text: &str, width: usize| {
        let len = text.chars().count();
        format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
    };

    let header = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad(c, *w))
        .collect::<Vec<_>>()
        .join(" | ");
    let divider = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = vec![header.trim_end().to_string(), divider];
    for line in &cells {
        let text = line
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(text.trim_end().to_string());
    }

    lines.join("\n")
}

/// Format a table payload.
pub fn format_table_data(table: &TableData) -> String {
    format_table(&table.columns, &table.rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Scalar;

    #[test]
    fn test_format_table() {
        let columns = vec!["month".to_string(), "revenue".to_string()];
        let rows = vec![
            Row::new().with("month", "Jan").with("revenue", 100),
            Row::new().with("month", "February").with("revenue", Scalar::Null),
        ];

        let expected = "\
month    | revenue
---------+--------
Jan      | 100
February |";
        assert_eq!(format_table(&columns, &rows), expected);
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_table(&["a".to_string()], &[]), "No data");
    }
}
