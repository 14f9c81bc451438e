mod config;
mod domain;
mod error;
mod notifications;
mod persistence;
mod store;
mod ticker;
mod timer;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use config::Config;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, ClearType},
};
use domain::{
    compute_totals, format_cost, format_hms, start_of_day, timer_badge, Bucket, Buckets, NewTask,
    Priority, Task, TaskUpdate, TimerState, ViewFilter,
};
use notifications::TerminalAlarm;
use persistence::{export_csv, import_csv, init_local_data_dir};
use std::io::{self, Write};
use std::path::PathBuf;
use store::TaskStore;
use timer::TimerEngine;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A terminal task list with per-task timers, threshold alarms and CSV export", long_about = None)]
struct Cli {
    /// Data directory. Defaults to the nearest .tally, then ~/.tally
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tally directory in the current directory
    Init,
    /// Add a task
    Add {
        name: String,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD). Defaults to now.
        #[arg(short, long)]
        due: Option<NaiveDate>,
        #[arg(short, long)]
        category: Option<String>,
        /// Planned duration in minutes
        #[arg(short = 'm', long)]
        duration: Option<u32>,
    },
    /// List tasks in a view
    List {
        #[arg(value_enum, default_value_t = View::Today)]
        view: View,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        category: Option<String>,
        /// Only tasks due on this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Edit fields of a task
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        due: Option<NaiveDate>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 'm', long)]
        duration: Option<u32>,
    },
    /// Toggle a task's completion
    Done { id: String },
    /// Delete a task
    Delete { id: String },
    /// Move the task at position FROM to position TO (1-based)
    Move { from: usize, to: Option<usize> },
    /// Start or stop a task's timer
    Timer { id: String },
    /// Run the timer in the foreground until q is pressed
    Run,
    /// Show or set the hourly rate
    Rate {
        #[arg(allow_negative_numbers = true)]
        value: Option<f64>,
    },
    /// Export all tasks to CSV
    Export {
        /// Output file, or - for stdout
        #[arg(short, long, default_value = "tasks.csv")]
        output: String,
    },
    /// Import tasks from a CSV file, appending them to the list
    Import { file: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    Today,
    Tomorrow,
    Overdue,
    Completed,
    All,
}

impl View {
    fn bucket(self) -> Option<Bucket> {
        match self {
            View::Today => Some(Bucket::Today),
            View::Tomorrow => Some(Bucket::Tomorrow),
            View::Overdue => Some(Bucket::Overdue),
            View::Completed => Some(Bucket::Completed),
            View::All => None,
        }
    }
}

fn main() -> Result<()> {
    config::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let current_dir =
                std::env::current_dir().context("Could not determine current directory")?;
            let data_dir = init_local_data_dir(&current_dir)?;
            println!("Initialized tally directory: {}", data_dir.display());
        }
        command => {
            let config = Config::resolve(cli.dir)?;
            let storage = config.open_storage()?;
            let mut store = TaskStore::load(Box::new(storage));
            run_command(&mut store, command)?;
        }
    }

    Ok(())
}

/// Commands that operate on the loaded task list
fn run_command(store: &mut TaskStore, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {}
        Commands::Add {
            name,
            priority,
            due,
            category,
            duration,
        } => {
            let request = NewTask {
                name: Some(name),
                priority,
                due_date: due.map(start_of_day),
                category,
                duration,
            };
            match store.create(request) {
                Ok(task) => println!("Added {} {}", short_id(task.id), task.name),
                Err(e) => eprintln!("{}", e),
            }
        }
        Commands::List {
            view,
            priority,
            category,
            date,
        } => {
            let filter = ViewFilter {
                priority,
                category,
                date,
            };
            print_view(store, view, &filter);
        }
        Commands::Edit {
            id,
            name,
            priority,
            due,
            category,
            duration,
        } => {
            let id = resolve_id(store, &id)?;
            let update = TaskUpdate {
                name,
                priority,
                due_date: due.map(start_of_day),
                category,
                duration,
            };
            if store.update(id, &update) {
                println!("Updated {}", short_id(id));
            } else {
                println!("Nothing to change");
            }
        }
        Commands::Done { id } => {
            let id = resolve_id(store, &id)?;
            store.toggle_completion(id);
            if let Some(task) = store.find(id) {
                let state = if task.completed { "done" } else { "not done" };
                println!("{} marked {}", task.name, state);
            }
        }
        Commands::Delete { id } => {
            let id = resolve_id(store, &id)?;
            if store.delete(id) {
                println!("Deleted {}", short_id(id));
            }
        }
        Commands::Move { from, to } => {
            // Positions are 1-based on the command line
            let from = from.wrapping_sub(1);
            let to = to.map(|to| to.wrapping_sub(1));
            if !store.reorder(from, to) {
                println!("Order unchanged");
            }
        }
        Commands::Timer { id } => {
            let id = resolve_id(store, &id)?;
            let mut engine = TimerEngine::new(TerminalAlarm);
            if let (Some(state), Some(task)) = (engine.toggle_timer(store, id), store.find(id)) {
                match state {
                    TimerState::Running => println!("⏱ {} running", task.name),
                    TimerState::Stopped => println!("{} stopped at {}", task.name, format_hms(task.time_spent)),
                }
            }
        }
        Commands::Run => run_tracker(store)?,
        Commands::Rate { value } => {
            if let Some(rate) = value {
                store.set_hourly_rate(rate);
            }
            println!("Hourly rate: {:.2}", store.hourly_rate());
        }
        Commands::Export { output } => {
            let csv = export_csv(store.tasks(), store.hourly_rate());
            if output == "-" {
                println!("{}", csv);
            } else {
                std::fs::write(&output, csv).with_context(|| format!("Failed to write {}", output))?;
                println!("Exported {} tasks to {}", store.len(), output);
            }
        }
        Commands::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let report = import_csv(&content);
            for err in &report.errors {
                tracing::warn!(file = %file.display(), "Skipped CSV line: {}", err);
            }
            let imported = report.tasks.len();
            store.append(report.tasks);
            println!("Imported {} tasks ({} lines skipped)", imported, report.errors.len());
        }
    }

    Ok(())
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn resolve_id(store: &TaskStore, id: &str) -> Result<Uuid> {
    store
        .resolve(id)
        .with_context(|| format!("No single task matches '{}'", id))
}

fn format_task_row(task: &Task, hourly_rate: f64) -> String {
    let category = if task.category.is_empty() {
        String::new()
    } else {
        format!("  [{}]", task.category)
    };
    format!(
        "{} {} {} {}  due {}{}  {} / {}  ${}",
        short_id(task.id),
        timer_badge(task),
        task.priority.marker(),
        task.name,
        task.due_date.format("%Y-%m-%d"),
        category,
        format_hms(task.time_spent),
        format_hms(task.planned_seconds()),
        format_cost(task.time_spent, hourly_rate)
    )
}

fn print_view(store: &TaskStore, view: View, filter: &ViewFilter) {
    let snapshot = store.get();
    let rate = store.hourly_rate();
    let today = Local::now().date_naive();

    let (title, tasks): (&str, Vec<Task>) = match view.bucket() {
        Some(bucket) => {
            let buckets = Buckets::compute(&snapshot, filter, today);
            (bucket.name(), buckets.get(bucket).to_vec())
        }
        None => (
            "All",
            snapshot.iter().filter(|t| filter.matches(t)).cloned().collect(),
        ),
    };

    println!("{} ({})", title, tasks.len());
    for task in &tasks {
        println!("  {}", format_task_row(task, rate));
    }

    let totals = compute_totals(&tasks, rate);
    println!(
        "Total: {} / {}  ${:.2}",
        format_hms(totals.time_spent.num_seconds().max(0) as u64),
        format_hms(totals.planned.num_seconds().max(0) as u64),
        totals.cost
    );
}

/// Foreground tick loop. Space pauses/resumes, q or Esc quits.
fn run_tracker(store: &mut TaskStore) -> Result<()> {
    let mut engine = TimerEngine::new(TerminalAlarm);
    engine.refresh_active_elapsed(store);

    enable_raw_mode()?;
    let result = tick_loop(store, &mut engine);
    disable_raw_mode()?;
    engine.stop();
    println!();

    result
}

fn tick_loop(store: &mut TaskStore, engine: &mut TimerEngine<TerminalAlarm>) -> Result<()> {
    let mut stdout = io::stdout();
    let mut last_active = store.active_id();
    draw_status(&mut stdout, store, engine)?;

    while engine.is_active() {
        if event::poll(engine.until_next_tick())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => engine.stop(),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            engine.stop()
                        }
                        KeyCode::Char(' ') => {
                            if let Some(id) = store.active_id().or(last_active) {
                                engine.toggle_timer(store, id);
                            }
                        }
                        _ => {}
                    }
                    if let Some(id) = store.active_id() {
                        last_active = Some(id);
                    }
                    draw_status(&mut stdout, store, engine)?;
                }
            }
        }

        if engine.poll(store) {
            draw_status(&mut stdout, store, engine)?;
        }
    }

    Ok(())
}

fn draw_status(
    stdout: &mut io::Stdout,
    store: &TaskStore,
    engine: &TimerEngine<TerminalAlarm>,
) -> Result<()> {
    let line = match store.active_id().and_then(|id| store.find(id)) {
        Some(task) => format!(
            "⏱ {}  {} / {}  ${}   [space] pause  [q] quit",
            task.name,
            format_hms(engine.active_elapsed()),
            format_hms(task.planned_seconds()),
            format_cost(engine.active_elapsed(), store.hourly_rate())
        ),
        None => "No timer running   [space] resume  [q] quit".to_string(),
    };

    execute!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine)
    )?;
    write!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}
