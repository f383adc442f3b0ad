//! mdpad - Markdown editing from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use mdpad_core::goal::{GoalStatus, WordGoal};
use mdpad_core::keymap::Keymap;
use mdpad_core::search::SearchOptions;
use mdpad_core::session::{Confirm, Decline};
use mdpad_core::store::FileStore;
use mdpad_core::{toc, Config, NotificationLevel, Outcome, Selection, Session, SessionEvent};
use std::path::{Path, PathBuf};

/// A markdown editor core with undo history, driven from the shell
#[derive(Parser, Debug)]
#[command(name = "mdpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply editor actions to a file, in order
    Apply {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Action as NAME or NAME=PAYLOAD, e.g. bold, heading=3, insert=text
        #[arg(short, long = "action", value_name = "ACTION", required = true)]
        actions: Vec<String>,

        /// Selection for the action at the same position, START:END or POS.
        /// Actions without one use a caret after the previous insertion.
        #[arg(short, long = "selection", value_name = "RANGE")]
        selections: Vec<Selection>,

        /// Confirm destructive actions such as clear
        #[arg(short, long)]
        yes: bool,

        /// Write the result back to FILE instead of stdout
        #[arg(short, long)]
        in_place: bool,
    },

    /// Render a file to HTML
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write HTML here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Wrap the body in a complete HTML document
        #[arg(long)]
        standalone: bool,
    },

    /// Print the table of contents
    Toc {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print word count, reading time and goal progress
    Stats {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Set and remember a word goal
        #[arg(long, value_name = "WORDS")]
        goal: Option<String>,
    },

    /// Replace every occurrence of a literal string
    Replace {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long, value_name = "TEXT")]
        find: String,

        #[arg(long = "with", value_name = "TEXT")]
        replacement: String,

        #[arg(long)]
        case_sensitive: bool,

        #[arg(short, long)]
        in_place: bool,
    },

    /// Tidy markdown spacing and markers
    Format {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(short, long)]
        in_place: bool,
    },

    /// List keyboard shortcuts
    Keys,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    match cli.command {
        Commands::Apply {
            file,
            actions,
            selections,
            yes,
            in_place,
        } => apply(&config, &file, &actions, &selections, yes, in_place),
        Commands::Render {
            file,
            output,
            standalone,
        } => render(&config, &file, output.as_deref(), standalone),
        Commands::Toc { file } => {
            let session = open(&config, &file)?;
            println!("{}", toc::render_markdown(&session.headings()));
            Ok(())
        }
        Commands::Stats { file, goal } => stats(&config, &file, goal.as_deref()),
        Commands::Replace {
            file,
            find,
            replacement,
            case_sensitive,
            in_place,
        } => {
            let mut session = open(&config, &file)?;
            let count = session.replace_all(&find, &replacement, &SearchOptions { case_sensitive });
            eprintln!("Replaced {count} occurrence(s)");
            finish(&session, &file, in_place)
        }
        Commands::Format { file, in_place } => {
            let text = read(&file)?;
            let formatted = mdpad_core::autoformat::format_markdown(&text);
            if in_place {
                write(&file, &formatted)
            } else {
                print!("{formatted}");
                Ok(())
            }
        }
        Commands::Keys => {
            for (chord, name) in Keymap::default().entries() {
                println!("{chord:<14} {name}");
            }
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

fn open(config: &Config, path: &Path) -> Result<Session> {
    let text = read(path)?;
    Ok(Session::new(&text, config))
}

fn finish(session: &Session, path: &Path, in_place: bool) -> Result<()> {
    if in_place {
        write(path, session.text())
    } else {
        print!("{}", session.text());
        Ok(())
    }
}

fn apply(
    config: &Config,
    path: &Path,
    actions: &[String],
    selections: &[Selection],
    yes: bool,
    in_place: bool,
) -> Result<()> {
    let mut session = open(config, path)?;
    session = if yes {
        session.with_prompter(Box::new(Confirm))
    } else {
        session.with_prompter(Box::new(Decline))
    };
    let events = session.subscribe();

    for (i, action) in actions.iter().enumerate() {
        let (name, payload) = match action.split_once('=') {
            Some((name, payload)) => (name, Some(payload)),
            None => (action.as_str(), None),
        };
        let selection = selections
            .get(i)
            .copied()
            .unwrap_or_else(|| Selection::caret(session.cursor()));

        match session.apply_action(name, payload, selection) {
            Outcome::Ignored => log::warn!("Unknown action {name:?}, skipped"),
            Outcome::Declined => eprintln!("{name}: declined (pass --yes to confirm)"),
            _ => {}
        }
        report(&events);
    }

    finish(&session, path, in_place)
}

fn render(config: &Config, path: &Path, output: Option<&Path>, standalone: bool) -> Result<()> {
    let mut session = open(config, path)?;
    let html = if standalone {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Document".to_string());
        session.export_html(&title)?
    } else {
        session
            .html()
            .map(|html| html.to_string())
            .context("Failed to render document")?
    };

    match output {
        Some(out) => write(out, &html),
        None => {
            print!("{html}");
            Ok(())
        }
    }
}

fn stats(config: &Config, path: &Path, goal_input: Option<&str>) -> Result<()> {
    let session = open(config, path)?;
    let stats = session.stats();
    println!("Words:      {}", stats.words);
    println!("Characters: {}", stats.characters);
    println!("Lines:      {}", stats.lines);
    println!("Reading:    {} min", stats.reading_minutes);

    let store = FileStore::open_default()?;
    let mut goal = WordGoal::load(&store)?;
    if let Some(input) = goal_input {
        goal.set_from_input(input, &store)?;
    } else if goal.target().is_none() {
        goal = WordGoal::new(config.goal.words);
    }

    match goal.status(stats.words) {
        GoalStatus::NotSet => {}
        GoalStatus::Started(pct) | GoalStatus::Close(pct) => {
            println!("Goal:       {pct}% of {}", goal.target().unwrap_or_default());
        }
        GoalStatus::Reached => println!("Goal:       reached!"),
    }
    Ok(())
}

/// Print queued session notifications to stderr
fn report(events: &Receiver<SessionEvent>) {
    for event in events.try_iter() {
        if let SessionEvent::Notify(n) = event {
            let tag = match n.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Warning => "warning",
                NotificationLevel::Error => "error",
            };
            eprintln!("[{tag}] {}: {}", n.title, n.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_parses_apply() {
        let cli = Cli::try_parse_from([
            "mdpad", "apply", "doc.md", "-a", "bold", "-s", "0:4", "-a", "heading=2", "--yes",
        ]);
        match cli.map(|c| c.command) {
            Ok(Commands::Apply {
                actions,
                selections,
                yes,
                in_place,
                ..
            }) => {
                assert_eq!(actions, vec!["bold", "heading=2"]);
                assert_eq!(selections, vec![Selection::new(0, 4)]);
                assert!(yes);
                assert!(!in_place);
            }
            other => panic!("Unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_selection() {
        let cli = Cli::try_parse_from(["mdpad", "apply", "doc.md", "-a", "bold", "-s", "x:y"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_apply_in_place() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"hello world")?;

        apply(
            &Config::default(),
            file.path(),
            &["bold".to_string(), "hr".to_string()],
            &[Selection::new(6, 11)],
            false,
            true,
        )?;

        assert_eq!(read(file.path())?, "hello **world**\n---\n");
        Ok(())
    }

    #[test]
    fn test_clear_needs_yes() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"keep")?;

        apply(&Config::default(), file.path(), &["clear".to_string()], &[], false, true)?;
        assert_eq!(read(file.path())?, "keep");

        apply(&Config::default(), file.path(), &["clear".to_string()], &[], true, true)?;
        assert_eq!(read(file.path())?, "");
        Ok(())
    }
}
