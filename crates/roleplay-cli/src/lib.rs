//! CLI logic for the Roleplay story tool.
//!
//! This module contains the command implementations behind the `roleplay`
//! binary: scaffolding a project, checking it, printing its layout, and
//! playing it on a terminal.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use log::{info, warn};

use roleplay::{
    RoleplayError, Studio,
    model::DEFAULT_TITLE,
    player::{Exits, Player},
};

use error_adapter::{render, report_reportables};

/// Run the Roleplay CLI application on the process's stdin and stdout.
///
/// # Errors
///
/// Returns `RoleplayError` for:
/// - Configuration loading errors
/// - File I/O and JSON errors
/// - Projects that fail validation (`check`) or cannot be played (`play`)
pub fn run(args: &Args) -> Result<(), RoleplayError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    execute(args, stdin.lock(), stdout.lock())
}

/// Run a command, reading player input from `input` and writing every
/// result to `output`.
pub fn execute<R: BufRead, W: Write>(
    args: &Args,
    input: R,
    mut output: W,
) -> Result<(), RoleplayError> {
    info!(path = args.command.path(); "Processing project");

    let app_config = config::load_config(args.config.as_ref())?;
    let mut studio = Studio::new(app_config);

    match &args.command {
        Command::New { output: dir, title } => {
            let project = studio.scaffold(title.as_deref().unwrap_or(DEFAULT_TITLE));
            studio.save(dir, &project)?;
            writeln!(output, "Created \"{}\" in {dir}", project.meta.title)?;
        }
        Command::Check { input: path } => {
            let project = studio.load(path, None)?;
            let report = studio.check(&project)?;
            for reportable in report_reportables(&report) {
                write!(output, "{}", render(&reportable))?;
            }
            writeln!(
                output,
                "{path}: {} scenes, {} warnings",
                project.len(),
                report.warnings().count()
            )?;
        }
        Command::Layout { input: path, json } => {
            let project = studio.load(path, None)?;
            let layout = studio.layout(&project);
            if *json {
                writeln!(output, "{}", serde_json::to_string_pretty(&layout)?)?;
            } else {
                for (row, ids) in layout.rows().iter().enumerate() {
                    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                    writeln!(output, "{row}: {}", ids.join("  "))?;
                }
            }
        }
        Command::Play { input: path } => {
            let project = studio.load(path, None)?;
            let player = studio.play(Arc::new(project))?;
            play(player, input, &mut output)?;
        }
    }

    Ok(())
}

/// Interactive play loop.
///
/// Commands: `1`-`3` choose, `c` continue, `b` back, `f` forward,
/// `h` history, `j N` jump, `q` quit. End of input quits.
fn play<R: BufRead, W: Write>(mut player: Player, input: R, output: &mut W) -> io::Result<()> {
    show_scene(&player, output)?;
    let mut lines = input.lines();

    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };

        let mut words = line.split_whitespace();
        let moved = match (words.next(), words.next()) {
            (None, _) => continue,
            (Some("q"), _) => break,
            (Some("c"), _) => player.advance().map(|_| ()),
            (Some("b"), _) => {
                if !player.back() {
                    writeln!(output, "Already at the first scene.")?;
                    continue;
                }
                Ok(())
            }
            (Some("f"), _) => {
                if !player.forward() {
                    writeln!(output, "Nothing to go forward to.")?;
                    continue;
                }
                Ok(())
            }
            (Some("h"), _) => {
                show_history(&player, output)?;
                continue;
            }
            (Some("j"), position) => match position.and_then(|p| p.parse::<usize>().ok()) {
                Some(position) if position > 0 => player.jump(position - 1).map(|_| ()),
                _ => {
                    writeln!(output, "Usage: j N")?;
                    continue;
                }
            },
            (Some(word), _) => match word.parse::<usize>() {
                Ok(choice) if choice > 0 => player.choose(choice - 1).map(|_| ()),
                _ => {
                    writeln!(output, "Unknown command `{word}`.")?;
                    continue;
                }
            },
        };

        match moved {
            Ok(()) => show_scene(&player, output)?,
            Err(err) => {
                warn!(err:% = err; "Move rejected");
                writeln!(output, "{err}")?;
            }
        }
    }

    Ok(())
}

fn show_scene<W: Write>(player: &Player, output: &mut W) -> io::Result<()> {
    let scene = player.current();
    writeln!(output, "== {} ==", scene.id)?;
    for line in &scene.dialogue {
        if !line.text.trim().is_empty() {
            writeln!(output, "{}", line.text)?;
        }
    }

    match player.exits() {
        Exits::Choices(choices) => {
            for choice in choices {
                let suffix = if choice.is_enabled() { "" } else { " (unavailable)" };
                writeln!(output, "  {}) {}{suffix}", choice.index + 1, choice.label)?;
            }
        }
        Exits::Continue { target } => {
            let suffix = if target.is_some() { "" } else { " (unavailable)" };
            writeln!(output, "  c) Continue{suffix}")?;
        }
        Exits::Ending => writeln!(output, "[The End]")?,
        Exits::None => writeln!(output, "[No way forward]")?,
    }
    Ok(())
}

fn show_history<W: Write>(player: &Player, output: &mut W) -> io::Result<()> {
    for (position, entry) in player.history().iter().enumerate() {
        let marker = if entry.current { '*' } else { ' ' };
        writeln!(output, "{marker}{:>3}. {}", position + 1, entry.label)?;
    }
    Ok(())
}
