//! Reading the persisted todo list.
//!
//! The slot holds a JSON array of `{id, text, completed, date}` objects. Older
//! data has no `date` field; such records are dated "today", evaluated once
//! when the list is loaded, since their real creation day is unknown.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{Todo, TodoId, DATE_FORMAT};

/// Result of decoding one slot value.
#[derive(Debug, Default, PartialEq)]
pub struct Decoded {
    pub todos: Vec<Todo>,
    /// Something was backfilled or dropped, so the slot should be rewritten.
    pub repaired: bool,
    /// Raw value to keep aside because data could not be read back.
    pub backup: Option<String>,
}

#[derive(Deserialize)]
struct StoredTodo {
    id: TodoId,
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    date: Option<String>,
}

/// Slot name for the `n`th kept copy of damaged data, counting from 1.
pub fn backup_key(key: &str, n: usize) -> String {
    if n <= 1 {
        format!("{key}.corrupt")
    } else {
        format!("{key}.corrupt.{n}")
    }
}

/// Smallest positive id not in `used`, for when ids have run up to `i64::MAX`.
pub(crate) fn lowest_free_id(used: &HashSet<TodoId>) -> TodoId {
    (1..=TodoId::MAX).find(|x| !used.contains(x)).unwrap_or(0)
}

pub fn decode_todos(raw: &str, today: NaiveDate) -> Decoded {
    let records: Vec<Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "stored todos are not a JSON array, starting empty");
            return Decoded {
                backup: Some(raw.to_string()),
                ..Default::default()
            };
        }
    };

    let mut decoded = Decoded::default();
    let mut dropped = false;
    for (index, record) in records.into_iter().enumerate() {
        let stored: StoredTodo = match serde_json::from_value(record) {
            Ok(x) => x,
            Err(e) => {
                warn!(index, error = %e, "skipping unreadable todo");
                dropped = true;
                continue;
            }
        };
        if stored.text.trim().is_empty() {
            warn!(index, id = stored.id, "skipping todo without text");
            dropped = true;
            continue;
        }
        let (date, backfilled) = stored_date(stored.date.as_deref(), today);
        decoded.repaired |= backfilled;
        decoded.todos.push(Todo {
            id: stored.id,
            text: stored.text,
            completed: stored.completed,
            date,
        });
    }

    decoded.repaired |= dedupe_ids(&mut decoded.todos);
    if dropped {
        decoded.repaired = true;
        decoded.backup = Some(raw.to_string());
    }
    decoded
}

/// Returns the record's date and whether it had to be filled in or rewritten.
fn stored_date(raw: Option<&str>, today: NaiveDate) -> (NaiveDate, bool) {
    let raw = match raw.map(str::trim) {
        None | Some("") => return (today, true),
        Some(x) => x,
    };
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => (date, date.format(DATE_FORMAT).to_string() != raw),
        Err(e) => {
            warn!(date = raw, error = %e, "unreadable todo date, moving it to today");
            (today, true)
        }
    }
}

/// Gives every repeated id after its first use a fresh id above all others,
/// or the lowest free one once ids reach `i64::MAX`.
fn dedupe_ids(todos: &mut [Todo]) -> bool {
    let mut next = todos.iter().map(|x| x.id).max().unwrap_or(0);
    let mut used: HashSet<TodoId> = todos.iter().map(|x| x.id).collect();
    let mut seen = HashSet::new();
    let mut changed = false;
    for todo in todos.iter_mut() {
        if !seen.insert(todo.id) {
            let fresh = match next.checked_add(1) {
                Some(x) => {
                    next = x;
                    x
                }
                None => lowest_free_id(&used),
            };
            warn!(old = todo.id, new = fresh, "duplicate todo id reassigned");
            todo.id = fresh;
            used.insert(fresh);
            seen.insert(fresh);
            changed = true;
        }
    }
    changed
}
