use anyhow::Result;
use chrono::NaiveDate;
use std::io::{ErrorKind, Write};
use termcolor::{Color, ColorSpec, WriteColor};

use super::summary::{DateSummary, TodoCounts};
use super::Todo;

/// `Jan 5, 2024`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `Friday, January 5, 2024`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn tasks_noun(count: usize) -> &'static str {
    if count == 1 {
        "task"
    } else {
        "tasks"
    }
}

pub fn date_summary_line(summary: &DateSummary) -> String {
    let mut line = format!(
        "{} - {} {}",
        format_short_date(summary.date),
        summary.counts.total,
        tasks_noun(summary.counts.total)
    );
    if summary.counts.incomplete > 0 {
        line.push_str(&format!(" ({} incomplete)", summary.counts.incomplete));
    }
    line
}

pub fn show_todos_for_date(
    out: &mut impl WriteColor,
    date: NaiveDate,
    todos: &[&Todo],
) -> Result<()> {
    out.set_color(ColorSpec::new().set_underline(true))?;
    writeln!(out, "Tasks for {}", format_short_date(date))?;
    out.reset()?;
    writeln!(
        out,
        "{}: {} {} on this date",
        format_long_date(date),
        todos.len(),
        tasks_noun(todos.len())
    )?;

    if todos.is_empty() {
        out.set_color(ColorSpec::new().set_italic(true).set_dimmed(true))?;
        writeln!(out, "No tasks for this date. Add one with `add`!")?;
        out.reset()?;
        return Ok(());
    }

    for todo in todos {
        if let Err(e) = show_todo_row(todo, &mut *out) {
            match e.downcast_ref::<std::io::Error>() {
                Some(x) if x.kind() == ErrorKind::BrokenPipe => break,
                _ => return Err(e),
            }
        }
    }
    Ok(())
}

fn show_todo_row(todo: &Todo, out: &mut impl WriteColor) -> Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{:<15}", todo.id)?;
    out.reset()?;
    write!(out, "{} ", if todo.completed { "[x]" } else { "[ ]" })?;
    let mut text_color = ColorSpec::new();
    if todo.completed {
        text_color
            .set_fg(Some(Color::Rgb(105, 105, 105)))
            .set_strikethrough(true);
    } else {
        text_color.set_fg(Some(Color::White));
    }
    out.set_color(&text_color)?;
    writeln!(out, "{}", todo.text)?;
    out.reset()?;
    Ok(())
}

pub fn show_date_summaries(
    out: &mut impl WriteColor,
    counts: TodoCounts,
    summaries: &[DateSummary],
    selected: NaiveDate,
) -> Result<()> {
    if summaries.is_empty() {
        writeln!(out, "No tasks yet")?;
        return Ok(());
    }
    writeln!(out, "{} items left / {} total", counts.incomplete, counts.total)?;
    out.set_color(ColorSpec::new().set_underline(true))?;
    writeln!(out, "Tasks by Date:")?;
    out.reset()?;
    for summary in summaries {
        if summary.date == selected {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
        }
        writeln!(out, "{}", date_summary_line(summary))?;
        out.reset()?;
    }
    Ok(())
}

pub fn show_stats(out: &mut impl WriteColor, counts: TodoCounts) -> Result<()> {
    writeln!(out, "{} of {} completed", counts.completed(), counts.total)?;
    let percent = counts.percent_complete();
    let color = if percent == 100 { Color::Green } else { Color::Yellow };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    writeln!(out, "{}%", percent)?;
    out.reset()?;
    Ok(())
}
