use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{bail, IntoDiagnostic, Result};

use salvm::output::Output;
use salvm::{has_errors, CommandReader, Program, Session, SessionOptions, Termination};

/// salvm loads SAL accumulator-machine programs and steps through them interactively.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.sal` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load a program and control it with step (s), run-all (a) and quit (q) commands
    Run {
        /// Program file, one instruction per line
        name: PathBuf,
        /// Read session commands from argument before stdin, separated by `;` or newlines
        #[arg(short, long)]
        command: Option<String>,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
        /// Instructions to execute in a run before asking to continue
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        watermark: Option<u64>,
    },
    /// Check a program file without running it
    Check {
        /// File to check
        name: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    salvm::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(salvm::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                command,
                minimal,
                watermark,
            } => {
                let options = SessionOptions {
                    watermark: watermark
                        .map(|count| count as usize)
                        .or_else(salvm::env::watermark)
                        .unwrap_or(salvm::DEFAULT_WATERMARK),
                };
                run(&name, command, minimal, options)
            }
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let program = Program::from_source(fs::read_to_string(&name).into_diagnostic()?);
                let reports = program.check();
                for report in &reports {
                    eprintln!("{:?}", report);
                }
                if has_errors(&reports) {
                    bail!("found {} problem(s) in `{}`", reports.len(), name.display());
                }
                message(Green, "Success", "no errors found!");
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, None, false, default_options())
    } else {
        // Classic startup: ask for the program file
        print!("Enter the SAL program filename: ");
        io::stdout().flush().into_diagnostic()?;
        let mut name = String::new();
        io::stdin().read_line(&mut name).into_diagnostic()?;
        let name = name.trim();
        if name.is_empty() {
            println!();
            println!("{SHORT_INFO}");
            return Ok(());
        }
        run(Path::new(name), None, false, default_options())
    }
}

enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, right.as_str());
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    if Output::is_minimal() {
        return;
    }
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}

fn default_options() -> SessionOptions {
    SessionOptions {
        watermark: salvm::env::watermark().unwrap_or(salvm::DEFAULT_WATERMARK),
    }
}

fn run(name: &Path, command: Option<String>, minimal: bool, options: SessionOptions) -> Result<()> {
    Output::set_minimal(minimal || salvm::env::is_minimal());

    if !name.is_file() {
        bail!("File `{}` does not exist. Exiting...", name.display());
    }
    file_message(MsgColor::Green, "Loading", name);
    let program = Program::from_source(fs::read_to_string(name).into_diagnostic()?);

    message(MsgColor::Green, "Running", "session started");
    let mut session = Session::new(program, CommandReader::from(command), options);
    match session.run() {
        Termination::Halted => {
            message(MsgColor::Cyan, "Halted", "program requested exit");
            std::process::exit(0);
        }
        Termination::OutOfBounds => {
            message(MsgColor::Red, "Stopped", "program counter out of bounds");
        }
        Termination::Declined | Termination::Quit => {
            file_message(MsgColor::Green, "Completed", name);
        }
    }
    Ok(())
}

const SHORT_INFO: &str = r"
Welcome to salvm, an interpreter for SAL: a tiny accumulator-machine assembly language
with a 256-cell memory, two registers and ten instructions.
Please use `-h` or `--help` to access the usage instructions and documentation.
";
