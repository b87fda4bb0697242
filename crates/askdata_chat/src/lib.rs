//! # askdata_chat - Conversation core for askdata
//!
//! This crate records a conversation with a natural-language query backend
//! and turns its tabular answers into something a render surface can draw:
//! - An ordered message history with a loading flag
//! - Normalization of heterogeneous backend responses into messages
//! - On-demand projection of a result set into line, bar or pie series
//! - Per-message view state (view mode and plotted columns)
//!
//! ## Architecture
//!
//! ```text
//!  user text
//!      │
//!      ▼
//! ┌──────────────┐  send   ┌──────────────┐  POST /ask  ┌─────────┐
//! │ Orchestrator │────────▶│ QueryGateway │────────────▶│ backend │
//! └──────┬───────┘         └──────────────┘             └─────────┘
//!        │ append
//!        ▼
//! ┌──────────────┐  read   ┌──────────────┐
//! │ MessageStore │────────▶│ view / chart │──▶ render surface
//! └──────────────┘         └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use askdata_chat::{ChatConfig, HttpQueryGateway, MessageStore, Orchestrator, RecordingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChatConfig::from_env()?;
//!     let gateway = HttpQueryGateway::new(&config)?;
//!     let orchestrator = Orchestrator::new(
//!         MessageStore::shared(),
//!         Arc::new(gateway),
//!         Arc::new(RecordingNotifier::new()),
//!     );
//!
//!     let outcome = orchestrator.submit("revenue by month").await;
//!     println!("{:?}", outcome.message().map(|m| m.kind()));
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod orchestrator;
pub mod render;
pub mod store;
pub mod table;
pub mod types;
pub mod view;

pub use chart::{classify_numeric_columns, default_selection, project, ChartData, Dataset};
pub use config::{ChatConfig, StaleResponsePolicy, DEFAULT_ENDPOINT};
pub use error::{ChatError, ChatResult};
pub use gateway::{normalize_response, HttpQueryGateway, QueryGateway};
pub use mock::{MockGateway, MockReply, RecordingNotifier};
pub use orchestrator::{Notification, Notifier, Orchestrator, SubmitOutcome};
pub use render::{format_table, format_table_data};
pub use store::{MessageStore, StoreHandle};
pub use table::{Row, Scalar, TableData};
pub use types::*;
pub use view::Presentation;
