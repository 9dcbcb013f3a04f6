use std::io::Write;

use anyhow::{bail, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use self::display_utils::{
    format_short_date, show_date_summaries, show_stats, show_todos_for_date,
};
use self::store::TodoStore;

pub mod add_utils;
pub mod display_utils;
pub mod migration;
pub mod store;
pub mod summary;

pub type TodoId = i64;

/// Canonical on-disk date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub date: NaiveDate,
}

/// Parses `YYYY-MM-DD` or one of `today`, `tomorrow`, `yesterday`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    let date = match input.to_lowercase().as_str() {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        _ => NaiveDate::parse_from_str(input, DATE_FORMAT).ok(),
    };
    match date {
        Some(x) => Ok(x),
        None => bail!("Expected a date like `2024-01-05` or `today` but found {input:?}"),
    }
}

fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

pub fn toggle_todo(store: &mut TodoStore, id: TodoId) -> Result<()> {
    let mut stdout = stdout();
    match store.toggle(id)? {
        None => writeln!(&mut stdout, "No todo with id {id}")?,
        Some(completed) => {
            let text = store.get(id).map_or("", |x| x.text.as_str());
            let verb = if completed { "Done" } else { "Reopened" };
            write!(&mut stdout, "{verb}: {id} ")?;
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(&mut stdout, "{text}")?;
            stdout.reset()?;
        }
    }
    Ok(())
}

pub fn delete_todo(store: &mut TodoStore, id: TodoId) -> Result<()> {
    match store.delete(id)? {
        None => println!("No todo with id {id}"),
        Some(todo) => println!("Deleted: '{}' {}", todo.text, todo.id),
    }
    Ok(())
}

pub fn move_todo(store: &mut TodoStore, id: TodoId, date: &str) -> Result<()> {
    let date = parse_date(date, store.today())?;
    match store.move_to_date(id, date)? {
        None => println!("No todo with id {id}"),
        Some(todo) => println!(
            "Moved: '{}' to {}",
            todo.text,
            format_short_date(todo.date)
        ),
    }
    Ok(())
}

pub fn list_todos(store: &TodoStore, date: Option<&str>) -> Result<()> {
    let date = match date {
        Some(x) => parse_date(x, store.today())?,
        None => store.today(),
    };
    show_todos_for_date(&mut stdout(), date, &store.todos_for_date(date))
}

pub fn list_dates(store: &TodoStore) -> Result<()> {
    show_date_summaries(
        &mut stdout(),
        store.counts(),
        &store.date_summaries(),
        store.today(),
    )
}

pub fn get_stats(store: &TodoStore) -> Result<()> {
    show_stats(&mut stdout(), store.counts())
}

#[cfg(test)]
mod tests {
    use crate::storage::memory_storage::MemoryStorage;

    use super::store::{FixedClock, DEFAULT_SLOT_KEY};
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    fn get_store() -> TodoStore {
        let storage = MemoryStorage::with_item(
            DEFAULT_SLOT_KEY,
            r#"[{"id":1,"text":"follow up","completed":false,"date":"2024-02-29"},
                {"id":2,"text":"deep dive","completed":true,"date":"2024-03-01"}]"#,
        );
        let clock = FixedClock {
            today: today(),
            millis: 1_709_164_800_000,
        };
        TodoStore::load_with_clock(Box::new(storage), DEFAULT_SLOT_KEY, Box::new(clock))
            .unwrap()
    }

    #[test]
    fn parse_date_accepts_words_and_iso() {
        assert_eq!(parse_date("today", today()).unwrap(), today());
        assert_eq!(
            parse_date("Tomorrow", today()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            parse_date("yesterday", today()).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()
        );
        assert_eq!(
            parse_date(" 2023-10-09 ", today()).unwrap(),
            NaiveDate::from_ymd_opt(2023, 10, 9).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2023-02-30", today()).is_err());
        assert!(parse_date("next week", today()).is_err());
        assert!(parse_date("", today()).is_err());
    }

    #[test]
    fn todo_serializes_with_plain_date() {
        let todo = Todo {
            id: 7,
            text: "Buy milk".to_string(),
            completed: false,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        };
        assert_eq!(
            serde_json::to_string(&todo).unwrap(),
            r#"{"id":7,"text":"Buy milk","completed":false,"date":"2024-01-05"}"#
        );
    }

    #[test]
    fn commands_tolerate_unknown_ids() {
        let mut store = get_store();
        toggle_todo(&mut store, 99).unwrap();
        delete_todo(&mut store, 99).unwrap();
        move_todo(&mut store, 99, "today").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn commands_apply_to_store() {
        let mut store = get_store();
        toggle_todo(&mut store, 1).unwrap();
        assert!(store.get(1).unwrap().completed);
        move_todo(&mut store, 2, "tomorrow").unwrap();
        assert_eq!(
            store.get(2).unwrap().date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        delete_todo(&mut store, 1).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn move_rejects_bad_date() {
        let mut store = get_store();
        assert!(move_todo(&mut store, 2, "someday").is_err());
        assert_eq!(
            store.get(2).unwrap().date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn listing_does_not_fail() {
        let store = get_store();
        list_todos(&store, None).unwrap();
        list_todos(&store, Some("2024-03-01")).unwrap();
        list_dates(&store).unwrap();
        get_stats(&store).unwrap();
        assert!(list_todos(&store, Some("garbage")).is_err());
    }
}
