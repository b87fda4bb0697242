//! Query backend gateway.
//!
//! Sends one natural-language question to the backend and turns the reply
//! into a message ready to be recorded. The gateway never touches the store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use crate::config::ChatConfig;
use crate::error::{ChatError, ChatResult};
use crate::table::{Row, TableData};
use crate::types::{NewMessage, QueryInfo};

/// Caption of an answer that carries rows.
pub const RESULT_CAPTION: &str = "Query result";
/// Caption of a successful answer without rows.
pub const NO_DATA_CAPTION: &str = "No data";
/// Rejection text used when the backend gives no reason.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Anything that can answer a question with a message.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Ask one question. On success the message is a text or table answer.
    async fn send(&self, query: &str) -> ChatResult<NewMessage>;
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    success: bool,
    #[serde(default)]
    results: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
    // Optional fields are read loosely; a badly typed one is dropped.
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    sql: Option<serde_json::Value>,
    #[serde(default)]
    count: Option<serde_json::Value>,
    #[serde(default)]
    execution_time: Option<serde_json::Value>,
}

fn loose_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn loose_number(value: Option<&serde_json::Value>) -> Option<f64> {
    let n = match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn loose_count(value: Option<serde_json::Value>) -> Option<u64> {
    if let Some(n) = value.as_ref().and_then(serde_json::Value::as_u64) {
        return Some(n);
    }
    loose_number(value.as_ref())
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
}

/// Turn a raw response body into an assistant message.
///
/// Columns come from the first record, in its key order. An empty or
/// missing result set is a "no data" text answer, not an error.
pub fn normalize_response(body: &str) -> ChatResult<NewMessage> {
    let response: AskResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

    if !response.success {
        let reason = loose_text(response.error).unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        return Err(ChatError::BackendRejected(reason));
    }

    let info = QueryInfo {
        sql: loose_text(response.sql),
        count: loose_count(response.count),
        execution_time_ms: loose_number(response.execution_time.as_ref()),
    };

    let records = response.results.unwrap_or_default();
    let Some(first) = records.first() else {
        debug!("Backend returned no rows");
        return Ok(NewMessage::assistant_text(NO_DATA_CAPTION).with_query_info(info));
    };

    let columns: Vec<String> = first.keys().cloned().collect();
    let rows: Vec<Row> = records.iter().map(Row::from).collect();
    debug!(columns = columns.len(), rows = rows.len(), "Normalized result set");

    Ok(NewMessage::assistant_table(RESULT_CAPTION, TableData::new(columns, rows)).with_query_info(info))
}

/// Gateway that POSTs questions to the backend over HTTP.
pub struct HttpQueryGateway {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpQueryGateway {
    /// Create a gateway with the given configuration.
    pub fn new(config: &ChatConfig) -> ChatResult<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout_duration() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    /// Get the endpoint questions are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryGateway for HttpQueryGateway {
    async fn send(&self, query: &str) -> ChatResult<NewMessage> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("ask", %request_id);

        async move {
            info!(endpoint = %self.endpoint, "Sending query");

            let response = self
                .client
                .post(&self.endpoint)
                .json(&AskRequest { query })
                .send()
                .await?;

            // The backend reports failures in the body, so the status is
            // only logged.
            let status = response.status();
            if !status.is_success() {
                warn!(%status, "Backend returned non-success status");
            }

            let body = response.text().await?;
            let message = normalize_response(&body);

            match &message {
                Ok(m) => info!(kind = ?m.kind(), "Query answered"),
                Err(e) => warn!(error = %e, "Query failed"),
            }
            message
        }
        .instrument(span)
        .await
    }
}
