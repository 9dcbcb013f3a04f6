use anyhow::{bail, Result};
use chrono::NaiveDate;

use super::display_utils::format_short_date;
use super::parse_date;
use super::store::TodoStore;

#[derive(Debug, PartialEq)]
struct AddContext {
    text: String,
    date: Option<NaiveDate>,
}

pub fn add_todo(store: &mut TodoStore, input: &str) -> Result<()> {
    let context = get_context(input, store.today())?;
    match store.add(&context.text, context.date)? {
        Some(todo) => println!(
            "Added todo {} for {}",
            todo.id,
            format_short_date(todo.date)
        ),
        None => println!("Nothing to add"),
    }
    Ok(())
}

/// Splits `words... [date:WHEN]` into the todo text and its date.
fn get_context(input: &str, today: NaiveDate) -> Result<AddContext> {
    let mut special_identifiers = true;
    let mut words: Vec<&str> = vec![];
    let mut date = None;
    for word in input.split(' ').rev() {
        if !special_identifiers {
            words.push(word);
            continue;
        }
        if word.is_empty() {
            continue;
        }
        if let Some(when) = word.strip_prefix("date:") {
            if date.is_some() {
                bail!("Invalid input string has multiple dates");
            }
            date = Some(parse_date(when, today)?);
        } else {
            special_identifiers = false;
            words.push(word);
        }
    }
    words.reverse();

    Ok(AddContext {
        text: words.join(" ").trim().to_string(),
        date,
    })
}

#[cfg(test)]
mod tests {
    use crate::storage::memory_storage::MemoryStorage;
    use crate::todos::store::{FixedClock, DEFAULT_SLOT_KEY};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, 9).unwrap()
    }

    #[test]
    fn test_get_context_with_text_alone() {
        assert_eq!(
            get_context("buy   milk", today()).unwrap(),
            AddContext {
                text: "buy   milk".to_string(),
                date: None,
            }
        );
    }

    #[test]
    fn test_get_context_keeps_spacing_before_date() {
        assert_eq!(
            get_context(" call  Ann   date:tomorrow  ", today()).unwrap(),
            AddContext {
                text: "call  Ann".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 10, 10),
            }
        );
    }

    #[test]
    fn test_get_context_with_text_and_date() {
        assert_eq!(
            get_context("buy milk date:2023-10-11", today()).unwrap(),
            AddContext {
                text: "buy milk".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 10, 11),
            }
        );
        assert_eq!(
            get_context("buy milk date:tomorrow", today()).unwrap(),
            AddContext {
                text: "buy milk".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 10, 10),
            }
        );
    }

    #[test]
    fn test_get_context_keeps_inner_date_words() {
        assert_eq!(
            get_context("move date:2023-10-11 meeting", today()).unwrap(),
            AddContext {
                text: "move date:2023-10-11 meeting".to_string(),
                date: None,
            }
        );
    }

    #[test]
    fn test_get_context_with_only_date() {
        assert_eq!(
            get_context("  date:today ", today()).unwrap(),
            AddContext {
                text: "".to_string(),
                date: Some(today()),
            }
        );
    }

    #[test]
    fn test_get_context_fails_with_invalid_date() {
        assert!(get_context("task 1 date:2023-10-32", today()).is_err());
    }

    #[test]
    fn test_get_context_fails_with_multiple_dates() {
        assert!(get_context("task 1 date:today date:tomorrow", today()).is_err());
    }

    #[test]
    fn add_todo_saves_to_store() {
        let clock = FixedClock {
            today: today(),
            millis: 1_696_809_600_000,
        };
        let mut store = TodoStore::load_with_clock(
            Box::new(MemoryStorage::new()),
            DEFAULT_SLOT_KEY,
            Box::new(clock),
        )
        .unwrap();
        add_todo(&mut store, "buy milk date:2023-10-11").unwrap();
        add_todo(&mut store, "   date:today").unwrap();
        add_todo(&mut store, "call mom").unwrap();

        let dates: Vec<NaiveDate> = store.todos().iter().map(|x| x.date).collect();
        assert_eq!(
            dates,
            vec![NaiveDate::from_ymd_opt(2023, 10, 11).unwrap(), today()]
        );
        assert_eq!(store.todos()[0].text, "buy milk");
    }
}
