//! Conversation history store.
//!
//! The store is the only owner of the ordered message history and of the
//! pending-response flag. Everything else reaches them through a
//! [`StoreHandle`] and the operations below.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::types::{Message, MessageId, NewMessage, ViewMode};
use crate::view;

/// Shared handle to a store, given to the orchestrator and the render surface.
pub type StoreHandle = Arc<RwLock<MessageStore>>;

/// Ordered, append-only conversation history plus a loading flag.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
    last_timestamp: Option<DateTime<Utc>>,
    loading: bool,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
            last_timestamp: None,
            loading: false,
        }
    }

    /// Create a store wrapped in a shared handle.
    pub fn shared() -> StoreHandle {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Record a message at the end of the history.
    ///
    /// Ids keep increasing across [`clear`](Self::clear), and timestamps
    /// never go backwards even if the wall clock does.
    pub fn append(&mut self, new: NewMessage) -> Message {
        let id = MessageId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);

        let message = Message::from_new(id, timestamp, new);
        debug!(id = %message.id, kind = ?message.kind(), "Appended message");
        self.messages.push(message.clone());
        message
    }

    /// Drop the whole history.
    pub fn clear(&mut self) {
        debug!(count = self.messages.len(), "Clearing history");
        self.messages.clear();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Switch the view of a table message. Leaves the selection alone.
    ///
    /// Returns whether a message was updated; unknown ids and non-table
    /// messages are ignored.
    pub fn set_view_mode(&mut self, id: MessageId, mode: ViewMode) -> bool {
        match self.find_mut(id).and_then(Message::table_mut) {
            Some(table) => {
                table.view_mode = mode;
                true
            }
            None => false,
        }
    }

    /// Replace the plotted series of a table message.
    ///
    /// Only numeric columns of that message are kept. If nothing remains
    /// the request is ignored, so a stored selection is never empty.
    pub fn set_selected_columns(&mut self, id: MessageId, columns: &[String]) -> bool {
        let Some(table) = self.find_mut(id).and_then(Message::table_mut) else {
            return false;
        };

        match view::sanitize_selection(table, columns) {
            Some(selection) => {
                table.selected_columns = Some(selection);
                true
            }
            None => {
                debug!(%id, "Ignoring empty column selection");
                false
            }
        }
    }

    /// Toggle one series of a table message on or off.
    pub fn toggle_column(&mut self, id: MessageId, column: &str) -> bool {
        let Some(table) = self.find_mut(id).and_then(Message::table_mut) else {
            return false;
        };

        match view::toggle_column(table, column) {
            Some(selection) => {
                table.selected_columns = Some(selection);
                true
            }
            None => false,
        }
    }

    fn find_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Row, TableData};
    use crate::types::MessageRole;

    fn table_message() -> NewMessage {
        NewMessage::assistant_table(
            "Query result",
            TableData::new(
                vec!["month".into(), "revenue".into(), "cost".into()],
                vec![
                    Row::new().with("month", "Jan").with("revenue", 100).with("cost", 40),
                    Row::new().with("month", "Feb").with("revenue", 150).with("cost", 60),
                ],
            ),
        )
    }

    fn selection(store: &MessageStore, id: MessageId) -> Option<Vec<String>> {
        store.get(id).and_then(|m| m.table()).and_then(|t| t.selected_columns.clone())
    }

    #[test]
    fn test_append_ids_increase() {
        let mut store = MessageStore::new();
        let a = store.append(NewMessage::user("first"));
        let b = store.append(NewMessage::assistant_text("No data"));
        let c = store.append(NewMessage::user("second"));

        assert!(a.id < b.id && b.id < c.id);
        assert!(a.timestamp <= b.timestamp && b.timestamp <= c.timestamp);
        let order: Vec<_> = store.messages().iter().map(|m| m.id).collect();
        assert_eq!(order, vec![a.id, b.id, c.id]);
        assert_eq!(store.messages()[0].role, MessageRole::User);
    }

    #[test]
    fn test_ids_keep_increasing_after_clear() {
        let mut store = MessageStore::new();
        let before = store.append(NewMessage::user("q"));
        store.clear();
        assert!(store.is_empty());
        let after = store.append(NewMessage::user("q"));
        assert!(after.id > before.id);
    }

    #[test]
    fn test_loading_independent_of_history() {
        let mut store = MessageStore::new();
        assert!(!store.is_loading());
        store.set_loading(true);
        store.clear();
        assert!(store.is_loading());
        store.set_loading(false);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_set_view_mode_keeps_selection() {
        let mut store = MessageStore::new();
        let id = store.append(table_message()).id;
        assert!(store.set_selected_columns(id, &["cost".to_string()]));
        assert!(store.set_view_mode(id, ViewMode::Line));

        let table = store.get(id).unwrap().table().unwrap();
        assert_eq!(table.view_mode, ViewMode::Line);
        assert_eq!(table.selected_columns, Some(vec!["cost".to_string()]));
    }

    #[test]
    fn test_set_view_mode_ignores_text_messages() {
        let mut store = MessageStore::new();
        let id = store.append(NewMessage::user("hello")).id;
        assert!(!store.set_view_mode(id, ViewMode::Pie));
    }

    #[test]
    fn test_empty_selection_rejected() {
        let mut store = MessageStore::new();
        let id = store.append(table_message()).id;
        assert!(store.set_selected_columns(id, &["revenue".to_string()]));

        assert!(!store.set_selected_columns(id, &[]));
        assert!(!store.set_selected_columns(id, &["month".to_string()]));
        assert_eq!(selection(&store, id), Some(vec!["revenue".to_string()]));
    }

    #[test]
    fn test_toggle_off_last_column_is_noop() {
        let mut store = MessageStore::new();
        let id = store.append(table_message()).id;
        assert!(store.toggle_column(id, "revenue"));
        assert_eq!(selection(&store, id), Some(vec!["cost".to_string()]));

        assert!(!store.toggle_column(id, "cost"));
        assert!(!store.toggle_column(id, "cost"));
        assert_eq!(selection(&store, id), Some(vec!["cost".to_string()]));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut store = MessageStore::new();
        let id = store.append(table_message()).id;
        let snapshot = store.messages().to_vec();

        let missing = MessageId(999);
        assert!(!store.set_view_mode(missing, ViewMode::Bar));
        assert!(!store.set_selected_columns(missing, &["cost".to_string()]));
        assert!(!store.toggle_column(missing, "cost"));

        assert_eq!(store.messages(), snapshot.as_slice());
        assert!(store.get(id).is_some());
    }

    #[test]
    fn test_shared_handle() {
        let handle = MessageStore::shared();
        handle.write().append(NewMessage::user("q"));
        assert_eq!(handle.read().len(), 1);
    }
}
