use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use uvm::{assemble, decode_log, emit_image, snapshot, Halt, MemRange, RunState};

/// uvm is an assembler and interpreter for a minimal accumulator-based
/// virtual machine.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a text source file into a binary image plus a decode log
    Asm {
        /// Source file to assemble
        src: PathBuf,
        /// Destination for the binary image
        bin: PathBuf,
        /// Destination for the JSON decode log
        log: PathBuf,
    },
    /// Execute a binary image and dump a memory range afterwards
    Run {
        /// Binary image to execute
        bin: PathBuf,
        /// Destination for the JSON memory snapshot
        result: PathBuf,
        /// Inclusive cell range to dump, formatted as `<start>:<end>`
        range: String,
    },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Asm { src, bin, log } => asm(&src, &bin, &log),
        Command::Run { bin, result, range } => run(&bin, &result, &range),
    }
}

fn asm(src: &Path, bin: &Path, log: &Path) -> Result<()> {
    use MsgColor::*;
    file_message(Green, "Assembling", src);
    let contents = fs::read_to_string(src).into_diagnostic()?;
    let program = assemble(&contents)?;
    let entries = decode_log(&program);

    // Nothing is written unless the whole source assembled
    fs::write(bin, emit_image(&program)).into_diagnostic()?;
    fs::write(log, to_json(&entries)?).into_diagnostic()?;

    message(
        Green,
        "Finished",
        &format!("emitted {} instruction(s)", program.len()),
    );
    file_message(Green, "Saved", bin);
    file_message(Green, "Saved", log);
    Ok(())
}

fn run(bin: &Path, result: &Path, range_arg: &str) -> Result<()> {
    use MsgColor::*;
    file_message(Green, "Running", bin);
    let image = fs::read(bin).into_diagnostic()?;

    let mut state = RunState::new();
    match state.run(&image)? {
        Halt::Normal => {}
        Halt::Truncated { at } => message(
            Cyan,
            "Warning",
            &format!("image ends with a partial word at byte {at}, ignored"),
        ),
    }

    // The dump range is only checked once execution has halted, so a fatal
    // run always wins over a bad range
    let range: MemRange = range_arg.parse()?;
    let snap = snapshot(state.view(range), range);
    fs::write(result, to_json(&snap)?).into_diagnostic()?;

    message(Green, "Halted", "execution complete");
    file_message(Green, "Saved", result);
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).into_diagnostic()?;
    out.push('\n');
    Ok(out)
}

enum MsgColor {
    Green,
    Cyan,
}

fn file_message(color: MsgColor, left: &str, path: &Path) {
    message(color, left, &format!("target {}", path.display()));
}

fn message(color: MsgColor, left: &str, right: &str) {
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
    };
    println!("{left:>12} {right}");
}
