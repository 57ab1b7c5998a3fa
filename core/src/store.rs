//! Thread-safe, in-memory todo collection.
//!
//! # Design
//! Records live in a `Vec` behind a single `RwLock`. The vector keeps
//! insertion order for free; lookups are a linear scan, which is fine at
//! to-do-list scale. Every mutation, including the scan that locates its
//! target, runs under one write-lock acquisition, so operations are
//! linearizable and `list` never observes half of a mutation. Callers only
//! ever receive clones.

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::Todo;

static GLOBAL: OnceCell<TodoStore> = OnceCell::new();

/// Ordered, lock-guarded collection of todo records.
#[derive(Debug, Default)]
pub struct TodoStore {
    todos: RwLock<Vec<Todo>>,
}

impl TodoStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide store, creating it empty on first use.
    ///
    /// Concurrent first calls race on a single initialization; later calls
    /// never reset a populated store.
    pub fn global() -> &'static TodoStore {
        GLOBAL.get_or_init(TodoStore::new)
    }

    /// Returns a snapshot of every record in insertion order.
    pub fn list(&self) -> Vec<Todo> {
        self.todos.read().clone()
    }

    /// Appends a new, incomplete record and returns its id.
    pub fn add(&self, message: impl Into<String>) -> String {
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            complete: false,
        };
        let id = todo.id.clone();
        self.todos.write().push(todo);
        id
    }

    /// Removes the record with the given id, keeping the others in order.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut todos = self.todos.write();
        let index = position(&todos, id)?;
        todos.remove(index);
        Ok(())
    }

    /// Marks the record with the given id as complete. Idempotent.
    pub fn complete(&self, id: &str) -> Result<(), StoreError> {
        let mut todos = self.todos.write();
        let index = position(&todos, id)?;
        todos[index].complete = true;
        Ok(())
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.todos.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.read().is_empty()
    }
}

fn position(todos: &[Todo], id: &str) -> Result<usize, StoreError> {
    todos
        .iter()
        .position(|todo| todo.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}
