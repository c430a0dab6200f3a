use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod admin;
mod completion;
mod controller;
mod db;
mod error;
mod guard;
mod models;
mod my_group;
mod navigator;
mod rich_text;
mod rows;
mod screen;
mod session;
mod sheets;
mod storage;

use admin::ActivityDraft;
use controller::Controller;
use guard::LeavePrompt;
use navigator::Viewport;
use session::TerminalPrompt;
use storage::{FileStore, KeyValueStore, MemoryStore};

#[derive(Parser)]
#[command(name = "weekly-notes")]
#[command(about = "Weekly group notes and calendar for Group Scholar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive member session
    Session {
        /// Directory of the local key-value store
        #[arg(long, env = "NOTES_DATA_DIR", default_value = "data")]
        data_dir: PathBuf,
        #[arg(long, env = "NOTES_VIEWPORT_WIDTH", default_value_t = 1280)]
        viewport_width: u32,
        /// Keep completion flags in memory only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Manage shared calendar activities
    Calendar {
        #[command(subcommand)]
        action: CalendarCommand,
    },
    /// Queue an invitation for a new member
    Invite {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long = "division")]
        divisions: Vec<String>,
        #[arg(long = "squad")]
        squads: Vec<String>,
    },
    /// Show a member profile
    Profile {
        #[arg(long)]
        user_id: Uuid,
    },
}

#[derive(Subcommand)]
enum CalendarCommand {
    /// List activities by date
    List,
    /// Create an activity
    Add(ActivityArgs),
    /// Replace an activity's fields
    Update {
        #[arg(long)]
        id: Uuid,
        #[command(flatten)]
        fields: ActivityArgs,
    },
    /// Delete an activity
    Delete {
        #[arg(long)]
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Import activities from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Args)]
struct ActivityArgs {
    #[arg(long)]
    activity: String,
    /// Event date as yyyy-mm-dd
    #[arg(long)]
    date: String,
    #[arg(long, default_value = "")]
    owner: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    investment: String,
}

impl From<ActivityArgs> for ActivityDraft {
    fn from(args: ActivityArgs) -> Self {
        ActivityDraft {
            activity: args.activity,
            event_date: args.date,
            owner_name: args.owner,
            contact_phone: args.phone,
            investment: args.investment,
        }
    }
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

fn run_session(data_dir: PathBuf, viewport_width: u32, ephemeral: bool) -> anyhow::Result<()> {
    let store: Box<dyn KeyValueStore> = if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        let store = FileStore::in_dir(&data_dir);
        info!(path = %store.path().display(), "using local store");
        Box::new(store)
    };

    let mut controller = Controller::new(store, Viewport::from_width(viewport_width));
    let stdin = io::stdin();
    let mut terminal = TerminalPrompt::new(stdin.lock(), io::stdout());
    session::run(&mut controller, &mut terminal)
}

async fn run_calendar(pool: &PgPool, action: CalendarCommand) -> anyhow::Result<()> {
    match action {
        CalendarCommand::List => {
            let activities = db::list_activities(pool).await?;
            print!("{}", screen::render_activities(&activities));
        }
        CalendarCommand::Add(fields) => {
            let activity = ActivityDraft::from(fields).validate()?;
            let id = db::insert_activity(pool, &activity).await?;
            println!("Activity created ({id}).");
        }
        CalendarCommand::Update { id, fields } => {
            let activity = ActivityDraft::from(fields).validate()?;
            if db::update_activity(pool, id, &activity).await? {
                println!("Activity updated.");
            } else {
                println!("No activity with id {id}.");
            }
        }
        CalendarCommand::Delete { id, yes } => {
            if !yes {
                let stdin = io::stdin();
                let mut terminal = TerminalPrompt::new(stdin.lock(), io::stdout());
                if !terminal.confirm("Delete this activity? This cannot be undone.") {
                    println!("Nothing deleted.");
                    return Ok(());
                }
            }
            if db::delete_activity(pool, id).await? {
                println!("Activity deleted.");
            } else {
                println!("No activity with id {id}.");
            }
        }
        CalendarCommand::Import { csv } => {
            let inserted = db::import_csv(pool, &csv).await?;
            println!("Inserted {inserted} activities from {}.", csv.display());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Session {
            data_dir,
            viewport_width,
            ephemeral,
        } => {
            run_session(data_dir, viewport_width, ephemeral)?;
        }
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Calendar { action } => {
            let pool = connect().await?;
            run_calendar(&pool, action).await?;
        }
        Commands::Invite {
            email,
            name,
            role,
            divisions,
            squads,
        } => {
            let payload =
                admin::build_invitation(&email, &name, role.as_deref(), &divisions, &squads)?;
            let pool = connect().await?;
            let id = db::queue_invitation(&pool, &payload).await?;
            info!(%id, email = %payload.email, "invitation queued");
            println!("Invitation sent: {}", payload.email);
        }
        Commands::Profile { user_id } => {
            let pool = connect().await?;
            match db::fetch_profile(&pool, user_id).await? {
                Some(profile) => {
                    println!("User: {}", profile.id);
                    if let Some(name) = profile.full_name {
                        println!("Name: {name}");
                    }
                    println!("Role: {}", profile.role.as_deref().unwrap_or("(none)"));
                    if let Some(division) = profile.division {
                        println!("Division: {division}");
                    }
                    if let Some(squad) = profile.squad_code {
                        println!("Squad: {squad}");
                    }
                    if profile.active == Some(false) {
                        println!("Inactive");
                    }
                }
                None => println!("No profile for {user_id}."),
            }
        }
    }

    Ok(())
}
