//! Terminal driver for the progress engine.
//!
//! # Responsibility
//! - Open the durable store named by configuration and run one engine
//!   operation per invocation.
//! - Print a short, deterministic progress summary.

use adulting_core::{
    init_logging_from_config, open_db, topics, CoreConfig, GrowthNotifier, HttpGrowthNotifier,
    NoopNotifier, ProgressEngine, SqliteKvRepository, SystemClock, Task, TaskList, UserProfile,
    WeekStatus,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

const NOTIFY_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Parser)]
#[command(name = "adulting", version, about = "Adulting 101 progress tracker")]
struct Cli {
    /// Store file; overrides ADULTING_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Skip outbound growth notifications.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show week, growth and both task lists.
    Status,
    /// Add a task to the regular list.
    Add { title: String },
    /// Toggle a task's completion.
    Toggle {
        id: String,
        #[arg(long)]
        suggested: bool,
    },
    /// Remove a task.
    Remove {
        id: String,
        #[arg(long)]
        suggested: bool,
    },
    /// List info topics.
    Topics,
    /// Add the tasks of one info topic.
    AddTopic { id: String },
    /// Re-evaluate week advancement now.
    Tick,
    /// Reset progress, keeping the theme.
    Logout,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    if let Command::Topics = cli.command {
        print_topics();
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = CoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if cli.offline {
        config.notify = None;
    }
    init_logging_from_config(&config)?;

    let conn = open_db(&config.db_path)?;
    let repo = SqliteKvRepository::try_new(&conn)?;
    let http = config
        .notify
        .clone()
        .map(|notify| Arc::new(HttpGrowthNotifier::new(notify)));
    let notifier: Arc<dyn GrowthNotifier> = match &http {
        Some(http) => http.clone(),
        None => Arc::new(NoopNotifier),
    };
    let mut engine = ProgressEngine::load(repo, notifier, Arc::new(SystemClock));
    engine.activate();

    let applied = match cli.command {
        Command::Status | Command::Topics => true,
        Command::Add { title } => match engine.add_task(&title) {
            Some(task_id) => {
                println!("added {task_id}");
                true
            }
            None => {
                eprintln!("title cannot be empty");
                false
            }
        },
        Command::Toggle { id, suggested } => engine.toggle_task(&id, list_for(suggested)),
        Command::Remove { id, suggested } => engine.remove_task(&id, list_for(suggested)),
        Command::AddTopic { id } => {
            let added = engine.add_topic_tasks(&id);
            println!("added {added} task(s)");
            added > 0
        }
        Command::Tick => {
            println!("{}", describe_week(engine.tick()));
            true
        }
        Command::Logout => {
            engine.logout();
            true
        }
    };

    print_status(engine.snapshot(), engine.days_remaining(), engine.week_status());

    // Detached notify workers die with the process.
    if let Some(http) = &http {
        let budget = http.config().timeout * 2 + NOTIFY_GRACE;
        if !http.wait_idle(budget) {
            log::warn!("event=growth_notify module=cli status=timeout");
        }
    }
    Ok(if applied {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn list_for(suggested: bool) -> TaskList {
    if suggested {
        TaskList::Suggested
    } else {
        TaskList::Regular
    }
}

fn describe_week(status: WeekStatus) -> String {
    match status {
        WeekStatus::InProgress => "week in progress".to_string(),
        WeekStatus::ReadyToAdvance { days_passed } => {
            format!("week complete, {days_passed} day(s) passed")
        }
        WeekStatus::Advanced { week } => format!("advanced to week {week}"),
    }
}

fn print_status(profile: &UserProfile, days_remaining: i64, status: WeekStatus) {
    println!(
        "week {} | level {} | growth {}% ({}) | {} day(s) left | {}",
        profile.current_week,
        profile.level,
        profile.flower_growth,
        profile.flower_stage().as_str(),
        days_remaining,
        status.as_str()
    );
    print_list("tasks", &profile.tasks);
    print_list("suggested", &profile.suggested_tasks);
}

fn print_list(label: &str, tasks: &[Task]) {
    println!("{label}:");
    if tasks.is_empty() {
        println!("  (none)");
    }
    for task in tasks {
        let mark = if task.completed { "x" } else { " " };
        match &task.info_link {
            Some(link) => println!("  [{mark}] {} {} -> {link}", task.id, task.title),
            None => println!("  [{mark}] {} {}", task.id, task.title),
        }
    }
}

fn print_topics() {
    for topic in topics() {
        println!(
            "{} (level {}): {} [{} task(s)]",
            topic.id,
            topic.relevant_level,
            topic.title,
            topic.tasks.len()
        );
    }
}
