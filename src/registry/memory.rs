//! Process-local token registry.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{TokenRecord, TokenRegistry};
use crate::error::{ReminderError, Result};

/// Registry kept in memory, keyed by token.
///
/// Used by the daemon when no remote endpoint is configured, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryTokenRegistry {
    rows: Mutex<HashMap<String, TokenRecord>>,
}

impl InMemoryTokenRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Returns `true` when no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the row for `token`.
    pub fn get(&self, token: &str) -> Option<TokenRecord> {
        self.rows.lock().ok()?.get(token).cloned()
    }
}

#[async_trait]
impl TokenRegistry for InMemoryTokenRegistry {
    async fn upsert(&self, record: &TokenRecord) -> Result<()> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| ReminderError::Registry("registry lock poisoned".to_owned()))?;
        rows.insert(record.token.clone(), record.clone());
        Ok(())
    }
}
