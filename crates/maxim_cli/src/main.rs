//! Command-line front end for the maxim journal.
//!
//! # Responsibility
//! - Map each subcommand to one journal `Command` or read.
//! - Wire the core to an on-disk SQLite key-value store.
//!
//! # Invariants
//! - All state changes go through `Journal::dispatch`.
//! - Flags override `MAXIM_*` environment configuration.

use clap::{Args, Parser, Subcommand};
use log::info;
use maxim_core::db::open_db;
use maxim_core::{
    init_logging, Command, EntryDraft, EntryId, FocusSlot, FsFileIo, Journal, JournalConfig,
    LoadOrigin, Outcome, SqliteKvStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Keep a small journal of maxims to live by
#[derive(Parser, Debug)]
#[command(name = "maxim", version, about)]
struct Cli {
    /// SQLite database file (defaults to MAXIM_DB_PATH or a temp-dir file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// List entries, newest first
    List,
    /// Add a new entry
    Add(EntryArgs),
    /// Replace the fields of an existing entry
    Edit {
        id: EntryId,
        #[command(flatten)]
        fields: EntryArgs,
    },
    /// Toggle the favorite flag
    Favorite { id: EntryId },
    /// Toggle the lived flag
    Lived { id: EntryId },
    /// Delete an entry
    Delete { id: EntryId },
    /// Show one entry in focus mode
    Focus {
        /// Position in the newest-first view
        #[arg(long)]
        index: Option<usize>,
        /// Steps to move from the chosen position (negative moves back)
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        step: isize,
        /// Pick a random entry instead
        #[arg(long, conflicts_with_all = ["index", "step"])]
        random: bool,
        /// Include the note
        #[arg(long)]
        note: bool,
    },
    /// Show, generate or set the sync phrase
    Phrase {
        #[arg(long, conflicts_with = "set")]
        generate: bool,
        #[arg(long)]
        set: Option<String>,
    },
    /// Write a pack file (defaults to a dated file name in the current directory)
    Export { path: Option<PathBuf> },
    /// Replace all entries from a pack file
    Import { path: PathBuf },
    /// Advance the display intensity level
    Spice,
}

impl CliCommand {
    fn label(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add(_) => "add",
            Self::Edit { .. } => "edit",
            Self::Favorite { .. } => "favorite",
            Self::Lived { .. } => "lived",
            Self::Delete { .. } => "delete",
            Self::Focus { .. } => "focus",
            Self::Phrase { .. } => "phrase",
            Self::Export { .. } => "export",
            Self::Import { .. } => "import",
            Self::Spice => "spice",
        }
    }
}

#[derive(Args, Debug)]
struct EntryArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    body: String,
    #[arg(long, default_value = "")]
    note: String,
    #[arg(long)]
    favorite: bool,
    #[arg(long)]
    lived: bool,
}

impl EntryArgs {
    fn to_draft(&self) -> EntryDraft {
        EntryDraft::new(self.title.as_str(), self.body.as_str())
            .with_note(self.note.as_str())
            .with_flags(self.favorite, self.lived)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("maxim: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = resolve_config(&cli);
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let conn = open_db(&config.db_path).map_err(|err| format!("cannot open database: {err}"))?;
    let store = SqliteKvStore::try_new(&conn).map_err(|err| err.to_string())?;
    let mut journal = Journal::open(&store, config.keys.clone());
    // Seed ids are regenerated on every load until written once.
    if journal.items().origin() == LoadOrigin::SeedMissing {
        journal.items().persist().map_err(|err| err.to_string())?;
    }
    info!(
        "event=cli_start module=cli status=ok command={}",
        cli.command.label()
    );

    match cli.command {
        CliCommand::List => {
            for (position, entry) in journal.sorted_view().iter().enumerate() {
                println!(
                    "{position:>3}  {}  {}{} {}",
                    entry.id,
                    if entry.favorite { '★' } else { '☆' },
                    if entry.lived { " lived" } else { "" },
                    entry.title
                );
            }
        }
        CliCommand::Add(fields) => {
            match dispatch(&mut journal, Command::Submit(fields.to_draft()))? {
                Outcome::Created(id) => println!("created {id}"),
                _ => return Err("title and body must not be empty".to_string()),
            }
        }
        CliCommand::Edit { id, fields } => {
            let draft = fields.to_draft();
            let outcome = dispatch(&mut journal, Command::Update { id: id.clone(), draft })?;
            report_change(outcome, &id)?;
        }
        CliCommand::Favorite { id } => {
            report_change(dispatch(&mut journal, Command::ToggleFavorite(id.clone()))?, &id)?;
        }
        CliCommand::Lived { id } => {
            report_change(dispatch(&mut journal, Command::ToggleLived(id.clone()))?, &id)?;
        }
        CliCommand::Delete { id } => {
            report_change(dispatch(&mut journal, Command::Delete(id.clone()))?, &id)?;
        }
        CliCommand::Focus {
            index,
            step,
            random,
            note,
        } => {
            if random {
                dispatch(&mut journal, Command::RandomFocus)?;
            } else {
                dispatch(&mut journal, Command::EnterFocus(index.or(Some(0))))?;
                dispatch(&mut journal, Command::Move(step))?;
            }
            if note {
                dispatch(&mut journal, Command::ToggleNote)?;
            }
            print_focus(&mut journal);
        }
        CliCommand::Phrase { generate, set } => {
            if generate {
                dispatch(&mut journal, Command::GeneratePhrase)?;
            } else if let Some(raw) = set {
                dispatch(&mut journal, Command::SetPhrase(raw))?;
            }
            let phrase = journal.require_phrase().map_err(|err| {
                format!("{err}; run `maxim phrase --generate` or `maxim phrase --set <text>`")
            })?;
            println!("{phrase}");
        }
        CliCommand::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(journal.pack_file_name()));
            journal
                .export_pack_to(&FsFileIo, &path)
                .map_err(|err| err.to_string())?;
            println!("exported {} entries to {}", journal.items().len(), path.display());
        }
        CliCommand::Import { path } => {
            let count = journal
                .import_pack_from(&FsFileIo, &path)
                .map_err(|err| err.to_string())?;
            println!("imported {count} entries");
        }
        CliCommand::Spice => {
            if let Outcome::Spice(level) = dispatch(&mut journal, Command::CycleSpice)? {
                println!("spice level {level}");
            }
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> JournalConfig {
    let mut config = JournalConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(log_dir) = cli.log_dir.clone() {
        config.log_dir = Some(log_dir);
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    config
}

fn dispatch(
    journal: &mut Journal<'_, SqliteKvStore<'_>>,
    command: Command,
) -> Result<Outcome, String> {
    journal.dispatch(command).map_err(|err| err.to_string())
}

fn report_change(outcome: Outcome, id: &EntryId) -> Result<(), String> {
    match outcome {
        Outcome::Ignored => Err(format!("no change applied to {id}")),
        _ => {
            println!("ok {id}");
            Ok(())
        }
    }
}

fn print_focus(journal: &mut Journal<'_, SqliteKvStore<'_>>) {
    let show_note = journal.focus().show_note();
    match journal.focus_slot() {
        FocusSlot::Entry { index, entry } => {
            println!("[{index}] {}", entry.title);
            println!();
            println!("{}", entry.body);
            if show_note && !entry.note.is_empty() {
                println!();
                println!("note: {}", entry.note);
            }
        }
        FocusSlot::Empty => println!("No maxims yet. Add one with `maxim add`."),
        FocusSlot::Inactive => {}
    }
}
