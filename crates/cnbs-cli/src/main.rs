//! CNBS - child development screening CLI
//!
//! The `cnbs` command administers the 0–84 month screening scale from the
//! terminal. One session file (JSON) holds one child's assessment; every
//! command loads it, acts, and writes it back.
//!
//! ## Commands
//!
//! - `new`: Start a session from birth and assessment dates
//! - `items`: Show items still awaiting an outcome
//! - `record`: Record a pass/fail outcome for one item
//! - `next`: Advance the search and show the next batch of items
//! - `result`: Score the session
//! - `progress`: Show per-domain search progress
//! - `catalog`: Browse the item table
//! - `schedule`: Project the next assessment date

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use cnbs_core::{
    compute_result, initial_items, next_assessment, next_items, pending_items, Domain,
    ItemCatalog, Outcome, ScaleError, SearchPhase, SessionState, TestItem,
};

#[derive(Parser)]
#[command(name = "cnbs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Child development screening: adaptive administration and scoring", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new assessment session and show the first batch of items
    New {
        /// Child's date of birth (YYYY-MM-DD)
        #[arg(short, long)]
        birth_date: NaiveDate,

        /// Assessment date (default: today)
        #[arg(short, long)]
        assessment_date: Option<NaiveDate>,

        /// Path of the session file to create
        #[arg(short, long, default_value = "session.json")]
        session: PathBuf,
    },

    /// Show items still awaiting an outcome
    Items {
        /// Path of the session file
        #[arg(short, long, default_value = "session.json")]
        session: PathBuf,
    },

    /// Record (or correct) the outcome for one item
    Record {
        /// Item id from the catalog
        item_id: u32,

        /// Observed outcome
        outcome: OutcomeArg,

        /// Path of the session file
        #[arg(short, long, default_value = "session.json")]
        session: PathBuf,
    },

    /// Advance the search and show the next batch of items
    Next {
        /// Path of the session file
        #[arg(short, long, default_value = "session.json")]
        session: PathBuf,
    },

    /// Score the session and show the result
    Result {
        /// Path of the session file
        #[arg(short, long, default_value = "session.json")]
        session: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show per-domain search progress
    Progress {
        /// Path of the session file
        #[arg(short, long, default_value = "session.json")]
        session: PathBuf,
    },

    /// Browse the item catalog
    Catalog {
        /// Only show one domain
        #[arg(long, value_enum)]
        domain: Option<DomainArg>,

        /// Only show one age-group (months)
        #[arg(long)]
        age: Option<u32>,
    },

    /// Project the next assessment date for a child
    Schedule {
        /// Child's date of birth (YYYY-MM-DD)
        #[arg(short, long)]
        birth_date: NaiveDate,

        /// Reference date (default: today)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Pass,
    Fail,
    Untested,
}

impl From<OutcomeArg> for Outcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Pass => Outcome::Pass,
            OutcomeArg::Fail => Outcome::Fail,
            OutcomeArg::Untested => Outcome::Untested,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DomainArg {
    GrossMotor,
    FineMotor,
    Adaptive,
    Language,
    Social,
}

impl From<DomainArg> for Domain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::GrossMotor => Domain::GrossMotor,
            DomainArg::FineMotor => Domain::FineMotor,
            DomainArg::Adaptive => Domain::Adaptive,
            DomainArg::Language => Domain::Language,
            DomainArg::Social => Domain::Social,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let catalog = ItemCatalog::builtin();

    match cli.command {
        Commands::New {
            birth_date,
            assessment_date,
            session,
        } => cmd_new(catalog, birth_date, assessment_date, &session),
        Commands::Items { session } => cmd_items(catalog, &session),
        Commands::Record {
            item_id,
            outcome,
            session,
        } => cmd_record(catalog, &session, item_id, outcome.into()),
        Commands::Next { session } => cmd_next(catalog, &session),
        Commands::Result { session, format } => cmd_result(catalog, &session, format),
        Commands::Progress { session } => cmd_progress(&session),
        Commands::Catalog { domain, age } => cmd_catalog(catalog, domain.map(Into::into), age),
        Commands::Schedule { birth_date, on } => cmd_schedule(birth_date, on),
    }
}

fn load_session(path: &Path) -> Result<SessionState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("session file {} is not valid", path.display()))
}

fn save_session(path: &Path, session: &SessionState) -> Result<()> {
    let raw = serde_json::to_string_pretty(session).context("failed to serialize session")?;
    std::fs::write(path, raw)
        .with_context(|| format!("failed to write session file {}", path.display()))
}

fn print_items(items: &[&TestItem]) {
    for item in items {
        println!(
            "  #{:<4} {:>2} mo  {:<12} {}",
            item.id,
            item.age_months,
            item.domain.to_string(),
            item.description
        );
    }
}

fn cmd_new(
    catalog: &ItemCatalog,
    birth_date: NaiveDate,
    assessment_date: Option<NaiveDate>,
    path: &Path,
) -> Result<()> {
    let assessment_date = assessment_date.unwrap_or_else(|| Local::now().date_naive());
    let session = SessionState::new(birth_date, assessment_date)
        .context("could not initialize the session")?;

    println!("Session {}", session.session_id);
    println!(
        "Chronological age: {} months (anchor age-group: {} months)",
        session.chronological_age_months,
        session.anchor_age_months()
    );
    println!("\nFirst batch to administer:");
    print_items(&initial_items(catalog, &session));

    save_session(path, &session)?;
    println!("\nSession written to {}", path.display());
    Ok(())
}

fn cmd_items(catalog: &ItemCatalog, path: &Path) -> Result<()> {
    let session = load_session(path)?;
    let pending = pending_items(catalog, &session);
    if pending.is_empty() {
        println!("No items awaiting an outcome. Run `cnbs next` to advance the search.");
    } else {
        println!("{} item(s) awaiting an outcome:", pending.len());
        print_items(&pending);
    }
    Ok(())
}

fn cmd_record(catalog: &ItemCatalog, path: &Path, item_id: u32, outcome: Outcome) -> Result<()> {
    let mut session = load_session(path)?;
    match session.record_outcome(catalog, item_id, outcome) {
        Ok(()) => {
            save_session(path, &session)?;
            println!("Recorded {outcome:?} for item #{item_id}");
        }
        // The engine treats an unknown id as a warning, not a failure: the
        // session is untouched and stays usable.
        Err(ScaleError::UnknownItemId(id)) => {
            println!("Item #{id} is not in the catalog; nothing recorded.");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn cmd_next(catalog: &ItemCatalog, path: &Path) -> Result<()> {
    let mut session = load_session(path)?;
    let batch = next_items(catalog, &mut session);
    if batch.is_empty() {
        println!("Assessment complete. Run `cnbs result` for the scores.");
    } else {
        println!("Next batch to administer:");
        print_items(&batch);
    }
    save_session(path, &session)
}

fn cmd_result(catalog: &ItemCatalog, path: &Path, format: OutputFormat) -> Result<()> {
    let session = load_session(path)?;
    let result = compute_result(catalog, &session);

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("failed to serialize result")?
            );
        }
        OutputFormat::Table => {
            if !session.is_finished() {
                println!("(assessment still in progress; interim scores)\n");
            }
            println!(
                "{:<14} {:>10} {:>5}  {:<12} {:>6}",
                "domain", "mental age", "DQ", "class", "gap"
            );
            for analysis in &result.domains {
                println!(
                    "{:<14} {:>10.1} {:>5}  {:<12} {:>6.1}",
                    analysis.domain.to_string(),
                    analysis.mental_age,
                    analysis.quotient,
                    analysis.classification.to_string(),
                    analysis.gap_months
                );
            }
            println!();
            println!(
                "Total mental age: {:.1} months (chronological: {:.1})",
                result.total_mental_age, result.chronological_age_months
            );
            println!(
                "Development quotient: {} ({})",
                result.development_quotient, result.classification
            );
        }
    }
    Ok(())
}

fn cmd_progress(path: &Path) -> Result<()> {
    let session = load_session(path)?;
    let progress = session.progress();
    println!(
        "{}/{} domains complete, {} outcomes recorded",
        progress.completed_domains, progress.total_domains, progress.recorded_outcomes
    );
    for domain in Domain::ALL {
        let state = &session.domains[&domain];
        let phase = match state.phase {
            SearchPhase::SeekingBasal => "seeking basal",
            SearchPhase::SeekingCeiling => "seeking ceiling",
            SearchPhase::Complete => "complete",
        };
        println!("  {:<14} {}", domain.to_string(), phase);
    }
    Ok(())
}

fn cmd_catalog(catalog: &ItemCatalog, domain: Option<Domain>, age: Option<u32>) -> Result<()> {
    let items: Vec<&TestItem> = catalog
        .iter()
        .filter(|item| domain.is_none_or(|d| item.domain == d))
        .filter(|item| age.is_none_or(|a| item.age_months == a))
        .collect();
    println!("{} item(s):", items.len());
    print_items(&items);
    Ok(())
}

fn cmd_schedule(birth_date: NaiveDate, on: Option<NaiveDate>) -> Result<()> {
    let on = on.unwrap_or_else(|| Local::now().date_naive());
    match next_assessment(birth_date, on).context("could not compute the schedule")? {
        Some(next) => println!(
            "Next assessment around {} (age-group {} months)",
            next.date, next.age_months
        ),
        None => println!("Child has aged past the 84-month ladder; no further assessment."),
    }
    Ok(())
}
