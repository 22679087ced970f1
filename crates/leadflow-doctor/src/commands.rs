use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use leadflow_board::{
    BoardConfig, BoardSession, BoardSnapshot, BoardStore, FileStorage, PersistingObserver,
    StorageBackend, SystemClock, elapsed, fixtures, load_board, load_snapshot, save_board,
};
use serde::Serialize;
use tracing::info;

use crate::error::{DoctorError, Result};
use crate::script::{load_script, run_step};

/// Where the board lives and how it is configured.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: BoardConfig,
    pub storage: FileStorage,
}

impl Context {
    fn board_path(&self) -> Result<PathBuf> {
        Ok(self.storage.path_for(&self.config.storage_key)?)
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Overwrite an existing board.
    #[arg(long)]
    pub force: bool,
}

pub fn run_init(ctx: &Context, args: &InitArgs, out: &mut dyn Write) -> Result<()> {
    let key = &ctx.config.storage_key;
    if !args.force && ctx.storage.get(key)?.is_some() {
        return Err(DoctorError::usage(format!(
            "a board is already stored under {key:?}; pass --force to replace it"
        )));
    }
    let board = fixtures::seed_board(&ctx.config, Box::new(SystemClock));
    save_board(&ctx.storage, key, &board)?;
    info!(target: "leadflow.doctor", key = %key, "board initialised");
    writeln!(
        out,
        "initialised {} columns and {} leads at {}",
        board.columns().len(),
        board.cards().len(),
        ctx.board_path()?.display()
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Print the stored snapshot as JSON instead of a listing.
    #[arg(long)]
    pub json: bool,
}

pub fn run_show(ctx: &Context, args: &ShowArgs, out: &mut dyn Write) -> Result<()> {
    let board = load_board(&ctx.storage, &ctx.config, Box::new(SystemClock));
    if args.json {
        writeln!(out, "{}", BoardSnapshot::capture(&board).to_json()?)?;
    } else {
        write_listing(&board, out)?;
    }
    Ok(())
}

fn write_listing(board: &BoardStore, out: &mut dyn Write) -> Result<()> {
    for column in board.columns() {
        let cards = board.cards_in_column(column.id);
        writeln!(out, "{} ({}) [{}]", column.name, cards.len(), column.id)?;
        for card in cards {
            let since = elapsed::format_since(card.column_entered_at, board.now_ms());
            write!(out, "  {}  {}  {}", card.id, card.name, card.contact)?;
            if let Some(email) = &card.email {
                write!(out, "  <{email}>")?;
            }
            if !card.comments.is_empty() {
                write!(out, "  ({} comments)", card.comments.len())?;
            }
            writeln!(out, "  {since}")?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub key: String,
    pub columns: usize,
    pub cards: usize,
    pub problems: Vec<String>,
}

/// Problems in a stored snapshot that loading would have to repair.
#[must_use]
pub fn snapshot_problems(snapshot: &BoardSnapshot) -> Vec<String> {
    let repaired = snapshot.clone().into_store(Box::new(SystemClock));
    let mut problems = repaired.check_invariants();

    let dropped_columns = snapshot.columns.len() - repaired.columns().len();
    if dropped_columns > 0 {
        problems.push(format!("{dropped_columns} duplicate or out-of-range column ids"));
    }
    let dropped_cards = snapshot.cards.len() - repaired.cards().len();
    if dropped_cards > 0 {
        problems.push(format!("{dropped_cards} orphaned, duplicate, or out-of-range cards"));
    }
    if repaired.next_id() != snapshot.next_id {
        problems.push(format!(
            "next_id {} is not above every id in use (needs {})",
            snapshot.next_id,
            repaired.next_id()
        ));
    }
    problems
}

pub fn run_check(ctx: &Context, args: &CheckArgs, out: &mut dyn Write) -> Result<()> {
    let key = &ctx.config.storage_key;
    let Some(snapshot) = load_snapshot(&ctx.storage, key)? else {
        return Err(DoctorError::usage(format!("no board stored under {key:?}")));
    };
    let report = CheckReport {
        key: key.clone(),
        columns: snapshot.columns.len(),
        cards: snapshot.cards.len(),
        problems: snapshot_problems(&snapshot),
    };

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else if report.problems.is_empty() {
        writeln!(out, "ok: {} columns, {} cards", report.columns, report.cards)?;
    } else {
        for problem in &report.problems {
            writeln!(out, "problem: {problem}")?;
        }
    }

    if report.problems.is_empty() {
        Ok(())
    } else {
        Err(DoctorError::failed(format!(
            "{} problems found",
            report.problems.len()
        )))
    }
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// JSON script of drag steps.
    pub script: PathBuf,

    /// Run without saving the result.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_replay(ctx: &Context, args: &ReplayArgs, out: &mut dyn Write) -> Result<()> {
    let steps = load_script(&args.script)?;
    let store = load_board(&ctx.storage, &ctx.config, Box::new(SystemClock));
    let mut session = BoardSession::new(store, &ctx.config);
    if !args.dry_run {
        session = session.with_observer(PersistingObserver::new(
            ctx.storage.clone(),
            ctx.config.storage_key.clone(),
        ));
    }

    let mut changed = 0usize;
    for (i, step) in steps.iter().enumerate() {
        let result = run_step(&mut session, &ctx.config.layout, step);
        if result.changed_board() {
            changed += 1;
        }
        writeln!(out, "{:>3}: {}", i + 1, result.describe())?;
    }

    let verdict = if args.dry_run { "not saved" } else { "saved" };
    writeln!(out, "{} steps, {changed} changed the board ({verdict})", steps.len())?;
    info!(
        target: "leadflow.doctor",
        steps = steps.len(),
        changed,
        dry_run = args.dry_run,
        "replay finished"
    );
    Ok(())
}
