//! Core types for the conversation history.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::ChartData;
use crate::table::TableData;

/// Identifier of a message, strictly increasing in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(MessageId)
    }
}

/// Message role in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Rendering of a table message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Line,
    Bar,
    Pie,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [Self::Table, Self::Line, Self::Bar, Self::Pie];

    /// Chart kind drawn for this view, `None` for the plain table.
    pub fn chart_type(&self) -> Option<ChartType> {
        match self {
            Self::Table => None,
            Self::Line => Some(ChartType::Line),
            Self::Bar => Some(ChartType::Bar),
            Self::Pie => Some(ChartType::Pie),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            "pie" => Ok(Self::Pie),
            other => Err(format!(
                "unknown view mode '{}', expected one of: table, line, bar, pie",
                other
            )),
        }
    }
}

/// Kind of a chart, either pre-rendered or projected from a table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Bar,
    Pie,
}

impl From<ChartType> for ViewMode {
    fn from(chart: ChartType) -> Self {
        match chart {
            ChartType::Line => Self::Line,
            ChartType::Bar => Self::Bar,
            ChartType::Pie => Self::Pie,
        }
    }
}

/// A chart that arrived already rendered; it is never re-projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(rename = "chartType")]
    pub chart_type: ChartType,
    #[serde(rename = "chartData")]
    pub chart_data: ChartData,
}

/// Structured payload of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessageBody {
    /// Prose only.
    Text,
    /// Result set that can be projected into any view.
    Table(TableData),
    /// Pre-baked chart.
    Chart(ChartPayload),
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text => MessageKind::Text,
            Self::Table(_) => MessageKind::Table,
            Self::Chart(_) => MessageKind::Chart,
        }
    }
}

/// Discriminant of [`MessageBody`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Table,
    Chart,
}

/// Execution details reported by the backend alongside a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    /// SQL the backend generated for the question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    /// Row count as reported by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Backend execution time in milliseconds.
    #[serde(rename = "executionTimeMs", skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
}

impl QueryInfo {
    pub fn is_empty(&self) -> bool {
        self.sql.is_none() && self.count.is_none() && self.execution_time_ms.is_none()
    }
}

/// A message that has not been recorded yet (no id, no timestamp).
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: Option<String>,
    pub body: MessageBody,
    pub query: Option<QueryInfo>,
}

impl NewMessage {
    /// A user's question.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
            body: MessageBody::Text,
            query: None,
        }
    }

    /// An assistant answer carrying only prose.
    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            body: MessageBody::Text,
            query: None,
        }
    }

    /// An assistant answer carrying a result set.
    pub fn assistant_table(content: impl Into<String>, table: TableData) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: Some(content.into()),
            body: MessageBody::Table(table),
            query: None,
        }
    }

    pub fn with_query_info(mut self, info: QueryInfo) -> Self {
        self.query = if info.is_empty() { None } else { Some(info) };
        self
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }
}

/// One recorded turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub body: MessageBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryInfo>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub(crate) fn from_new(id: MessageId, timestamp: DateTime<Utc>, new: NewMessage) -> Self {
        Self {
            id,
            role: new.role,
            content: new.content,
            body: new.body,
            query: new.query,
            timestamp,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }

    /// Table payload, if this is a table message.
    pub fn table(&self) -> Option<&TableData> {
        match &self.body {
            MessageBody::Table(table) => Some(table),
            _ => None,
        }
    }

    pub(crate) fn table_mut(&mut self) -> Option<&mut TableData> {
        match &mut self.body {
            MessageBody::Table(table) => Some(table),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("pie".parse::<ViewMode>().unwrap(), ViewMode::Pie);
        assert_eq!(" Bar ".parse::<ViewMode>().unwrap(), ViewMode::Bar);
        assert!("scatter".parse::<ViewMode>().is_err());
        assert_eq!(ViewMode::default(), ViewMode::Table);
    }

    #[test]
    fn test_view_mode_chart_type() {
        assert_eq!(ViewMode::Table.chart_type(), None);
        assert_eq!(ViewMode::Line.chart_type(), Some(ChartType::Line));
        for mode in ViewMode::ALL.iter().skip(1) {
            let chart = mode.chart_type().unwrap();
            assert_eq!(ViewMode::from(chart), *mode);
        }
    }

    #[test]
    fn test_message_id_parse() {
        assert_eq!("#12".parse::<MessageId>().unwrap(), MessageId(12));
        assert_eq!("3".parse::<MessageId>().unwrap(), MessageId(3));
        assert!("x".parse::<MessageId>().is_err());
    }

    #[test]
    fn test_message_serialization() {
        let table = TableData::new(
            vec!["month".into(), "revenue".into()],
            vec![Row::new().with("month", "Jan").with("revenue", 100)],
        );
        let message = Message::from_new(
            MessageId(1),
            Utc::now(),
            NewMessage::assistant_table("Query result", table),
        );

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["kind"], "table");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["viewMode"], "table");
        assert_eq!(json["columns"][1], "revenue");
        assert!(json.get("selectedColumns").is_none());

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_empty_query_info_is_dropped() {
        let message = NewMessage::assistant_text("No data").with_query_info(QueryInfo::default());
        assert!(message.query.is_none());
    }
}
