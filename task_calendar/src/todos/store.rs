use std::collections::{BTreeMap, HashSet};

use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::storage::storage::SlotStorage;

use super::migration::{self, Decoded};
use super::summary::{DateSummary, TodoCounts};
use super::{Todo, TodoId};

pub const DEFAULT_SLOT_KEY: &str = "todos";

/// Source of "today" and of the millisecond timestamps used for fresh ids.
pub trait Clock {
    fn today(&self) -> NaiveDate;
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub millis: i64,
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> i64 {
        self.millis
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("serializing todos: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("todo storage failed: {0:#}")]
    Storage(anyhow::Error),
}

/// The session's todo list, mirrored to one slot of a [`SlotStorage`].
///
/// Every effective mutation rewrites the whole slot. When that write fails the
/// in-memory change is kept and the error is returned; the next successful
/// write stores the full current list again.
pub struct TodoStore {
    storage: Box<dyn SlotStorage>,
    key: String,
    clock: Box<dyn Clock>,
    todos: Vec<Todo>,
    // highest id handed out or loaded, so deleted ids are not reused before i64::MAX
    last_id: TodoId,
}

impl TodoStore {
    pub fn load(storage: Box<dyn SlotStorage>, key: &str) -> Result<Self, StoreError> {
        Self::load_with_clock(storage, key, Box::new(SystemClock))
    }

    pub fn load_with_clock(
        storage: Box<dyn SlotStorage>,
        key: &str,
        clock: Box<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let raw = storage.get_item(key).map_err(StoreError::Storage)?;
        let decoded = match raw {
            None => Decoded::default(),
            Some(raw) => migration::decode_todos(&raw, clock.today()),
        };

        if let Some(raw) = &decoded.backup {
            keep_backup(storage.as_ref(), key, raw)?;
        }

        let last_id = decoded.todos.iter().map(|x| x.id).max().unwrap_or(0);
        let store = TodoStore {
            storage,
            key: key.to_string(),
            clock,
            todos: decoded.todos,
            last_id,
        };
        if decoded.repaired {
            // The repaired list is already in memory and gets saved with the next change.
            if let Err(e) = store.persist() {
                warn!(key = %key, error = %e, "could not save repaired todos");
            }
        }
        Ok(store)
    }

    /// Appends a new todo. Blank text is ignored and returns `None`.
    pub fn add(
        &mut self,
        text: &str,
        date: Option<NaiveDate>,
    ) -> Result<Option<Todo>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let todo = Todo {
            id: self.next_id(),
            text: text.to_string(),
            completed: false,
            date: date.unwrap_or_else(|| self.clock.today()),
        };
        self.todos.push(todo.clone());
        self.persist()?;
        Ok(Some(todo))
    }

    /// Flips `completed` and returns the new value, or `None` for an unknown id.
    pub fn toggle(&mut self, id: TodoId) -> Result<Option<bool>, StoreError> {
        let Some(todo) = self.todos.iter_mut().find(|x| x.id == id) else {
            return Ok(None);
        };
        todo.completed = !todo.completed;
        let completed = todo.completed;
        self.persist()?;
        Ok(Some(completed))
    }

    /// Reschedules a todo in place; its position in the list is kept.
    pub fn move_to_date(
        &mut self,
        id: TodoId,
        date: NaiveDate,
    ) -> Result<Option<Todo>, StoreError> {
        let Some(todo) = self.todos.iter_mut().find(|x| x.id == id) else {
            return Ok(None);
        };
        todo.date = date;
        let todo = todo.clone();
        self.persist()?;
        Ok(Some(todo))
    }

    pub fn delete(&mut self, id: TodoId) -> Result<Option<Todo>, StoreError> {
        let Some(index) = self.todos.iter().position(|x| x.id == id) else {
            return Ok(None);
        };
        let removed = self.todos.remove(index);
        self.persist()?;
        Ok(Some(removed))
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|x| x.id == id)
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn group_by_date(&self) -> BTreeMap<NaiveDate, Vec<&Todo>> {
        let mut groups: BTreeMap<NaiveDate, Vec<&Todo>> = BTreeMap::new();
        for todo in &self.todos {
            groups.entry(todo.date).or_default().push(todo);
        }
        groups
    }

    /// Distinct dates that have todos, oldest first.
    pub fn sorted_dates(&self) -> Vec<NaiveDate> {
        self.group_by_date().into_keys().collect()
    }

    pub fn todos_for_date(&self, date: NaiveDate) -> Vec<&Todo> {
        self.todos.iter().filter(|x| x.date == date).collect()
    }

    pub fn counts(&self) -> TodoCounts {
        TodoCounts::from_todos(&self.todos)
    }

    pub fn counts_for_date(&self, date: NaiveDate) -> TodoCounts {
        TodoCounts::from_todos(self.todos_for_date(date))
    }

    pub fn date_summaries(&self) -> Vec<DateSummary> {
        self.group_by_date()
            .into_iter()
            .map(|(date, todos)| DateSummary {
                date,
                counts: TodoCounts::from_todos(todos),
            })
            .collect()
    }

    fn next_id(&mut self) -> TodoId {
        let Some(after_last) = self.last_id.checked_add(1) else {
            let used: HashSet<TodoId> = self.todos.iter().map(|x| x.id).collect();
            let id = migration::lowest_free_id(&used);
            warn!(id, "todo ids reached their maximum, reusing a free one");
            return id;
        };
        let id = self.clock.now_millis().max(after_last);
        self.last_id = id;
        id
    }

    fn persist(&self) -> Result<(), StoreError> {
        let value = serde_json::to_string(&self.todos)?;
        self.storage
            .set_item(&self.key, &value)
            .map_err(StoreError::Storage)?;
        debug!(key = %self.key, count = self.todos.len(), "saved todos");
        Ok(())
    }
}

/// Copies damaged slot data to the first free `<key>.corrupt` slot, unless an
/// identical copy is already kept there.
fn keep_backup(storage: &dyn SlotStorage, key: &str, raw: &str) -> Result<(), StoreError> {
    for n in 1.. {
        let backup_key = migration::backup_key(key, n);
        match storage.get_item(&backup_key).map_err(StoreError::Storage)? {
            Some(kept) if kept == raw => {
                debug!(key = %key, backup_key = %backup_key, "damaged todos already kept");
                return Ok(());
            }
            Some(_) => continue,
            None => {
                warn!(
                    key = %key,
                    backup_key = %backup_key,
                    "stored todos were damaged, keeping a copy"
                );
                return storage
                    .set_item(&backup_key, raw)
                    .map_err(StoreError::Storage);
            }
        }
    }
    Ok(())
}
