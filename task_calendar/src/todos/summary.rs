use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Todo;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TodoCounts {
    pub total: usize,
    pub incomplete: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub counts: TodoCounts,
}

impl TodoCounts {
    pub fn from_todos<'a>(todos: impl IntoIterator<Item = &'a Todo>) -> Self {
        todos.into_iter().fold(Self::default(), |acc, x| TodoCounts {
            total: acc.total + 1,
            incomplete: acc.incomplete + usize::from(!x.completed),
        })
    }

    pub fn completed(&self) -> usize {
        self.total - self.incomplete
    }

    /// Share of completed todos as a whole percentage, rounding halves up.
    pub fn percent_complete(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.completed() * 200 + self.total) / (self.total * 2)
    }
}
