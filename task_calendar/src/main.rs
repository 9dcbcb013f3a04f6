use std::error::Error;

use clap::Parser;
use clap::Subcommand;
use task_calendar::config::Config;
use task_calendar::todos::TodoId;

#[derive(Parser, Debug)]
#[command(version, about, verbatim_doc_comment)]
/// Task Calendar
/// Optionally create a configuration file in $HOME/.config/task_calendar/config.toml
///
/// [backend]
/// strain = "File" or "SQLite"
/// uri = "file:///home/me/todos" or "file:///home/me/todos.db"
/// key = "todos"
struct Args {
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a todo, e.g. `add buy milk date:2024-01-05` or `date:tomorrow`
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        todo_params: Vec<String>,
    },
    /// Mark todo(s) as done, or reopen them
    Toggle {
        #[arg(required = true)]
        ids: Vec<TodoId>,
    },
    /// Remove todo(s)
    Delete {
        #[arg(required = true)]
        ids: Vec<TodoId>,
    },
    /// Move a todo to another date
    Move { id: TodoId, date: String },
    /// List the todos of one date (defaults to today)
    List { date: Option<String> },
    /// Todo counts for every date that has todos
    Dates {},
    /// How many todos are done
    Stats {},
}

fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let config = Config::load(args.config)?;
    let mut store = config.open_store()?;

    match &args.command {
        Some(Commands::Add { todo_params }) => {
            let todo_params_string = todo_params.join(" ");
            task_calendar::todos::add_utils::add_todo(&mut store, &todo_params_string)?
        }
        Some(Commands::Toggle { ids }) => {
            for id in ids {
                task_calendar::todos::toggle_todo(&mut store, *id)?
            }
        }
        Some(Commands::Delete { ids }) => {
            for id in ids {
                task_calendar::todos::delete_todo(&mut store, *id)?
            }
        }
        Some(Commands::Move { id, date }) => {
            task_calendar::todos::move_todo(&mut store, *id, date)?
        }
        Some(Commands::List { date }) => {
            task_calendar::todos::list_todos(&store, date.as_deref())?
        }
        Some(Commands::Dates {}) => task_calendar::todos::list_dates(&store)?,
        Some(Commands::Stats {}) => task_calendar::todos::get_stats(&store)?,
        None => task_calendar::todos::list_todos(&store, None)?,
    }

    Ok(())
}
