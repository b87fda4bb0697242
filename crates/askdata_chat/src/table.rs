//! Typed tabular payloads.
//!
//! Backend records arrive as loosely typed JSON objects. They are converted
//! once, at the gateway boundary, into rows of tagged [`Scalar`] values so
//! that numeric classification and coercion are total functions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::ViewMode;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl Scalar {
    /// Finite numeric reading of the value, if it has one.
    ///
    /// Text counts when its trimmed content parses as a finite number, so
    /// `"5"` reads as `5.0` while `""`, `"abc"` and `"NaN"` do not.
    pub fn as_finite_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            Self::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Category label for the value. Null becomes the empty string.
    pub fn to_label(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::Null => String::new(),
        }
    }
}

impl From<&serde_json::Value> for Scalar {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            Value::String(s) => Self::Text(s.clone()),
            Value::Bool(b) => Self::Text(b.to_string()),
            // Nested values are not expected in a flat record; keep them readable.
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Integral values print without a trailing `.0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One record of a result set. Keys keep their insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<(String, Scalar)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace. A replaced key keeps its position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Scalar>) {
        let column = column.into();
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == column) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((column, value)),
        }
    }

    /// Value for `column`; a missing key reads as null.
    pub fn get(&self, column: &str) -> &Scalar {
        static NULL: Scalar = Scalar::Null;
        self.values
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v)
            .unwrap_or(&NULL)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.iter().any(|(k, _)| k == column)
    }

    /// Keys in record order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<&serde_json::Map<String, serde_json::Value>> for Row {
    fn from(record: &serde_json::Map<String, serde_json::Value>) -> Self {
        record
            .iter()
            .fold(Row::new(), |row, (k, v)| row.with(k.clone(), Scalar::from(v)))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.values.iter().map(|(k, v)| (k, v)))
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Row::from(&record))
    }
}

/// Table payload of an assistant answer, together with its view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    /// Ordered column names, taken from the first record.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Current rendering of the table.
    #[serde(rename = "viewMode", default)]
    pub view_mode: ViewMode,
    /// Explicit series choice. `None` means the default selection applies.
    #[serde(rename = "selectedColumns", default, skip_serializing_if = "Option::is_none")]
    pub selected_columns: Option<Vec<String>>,
}

impl TableData {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            view_mode: ViewMode::Table,
            selected_columns: None,
        }
    }

    /// First column, treated as the category axis.
    pub fn label_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}
