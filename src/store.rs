//! Persistence contract for expense records.

use crate::error::ParseError;
use crate::model::Expense;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Keyed store for expense records. The single hard requirement is that a
/// saved record is retrievable by its identifier; read-backs are optional
/// conveniences.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Persists the record, assigning a fresh identifier when it has none.
    /// Saves to an existing identifier overwrite (last-write-wins).
    async fn save(&self, expense: Expense) -> Result<Uuid, ParseError>;

    async fn get_by_id(&self, id: Uuid) -> Option<Expense>;

    async fn get_all(&self) -> Vec<Expense>;
}

/// In-memory store backed by a mutex-guarded map, giving atomic
/// insert/overwrite semantics under concurrent requests.
#[derive(Debug, Default)]
pub struct InMemoryExpenseStore {
    expenses: Mutex<HashMap<Uuid, Expense>>,
}

impl InMemoryExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn save(&self, mut expense: Expense) -> Result<Uuid, ParseError> {
        let id = expense.id.unwrap_or_else(Uuid::new_v4);
        expense.id = Some(id);
        let mut expenses = self.expenses.lock().map_err(|_| ParseError::Internal {
            detail: "expense store mutex poisoned".to_string(),
        })?;
        expenses.insert(id, expense);
        Ok(id)
    }

    async fn get_by_id(&self, id: Uuid) -> Option<Expense> {
        self.expenses.lock().ok()?.get(&id).cloned()
    }

    async fn get_all(&self) -> Vec<Expense> {
        match self.expenses.lock() {
            Ok(expenses) => expenses.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}
