mod argument;
mod stdin;
mod terminal;

use std::fmt;
use std::io::{self, IsTerminal as _};

pub use self::argument::Argument;
use self::stdin::Stdin;
use self::terminal::Terminal;
use crate::{dprint, dprintln};

/// Initial capacity of a command buffer.
const INITIAL_BUFFER_CAPACITY: usize = 64;

/// What the session is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    Command,
    /// Watermark reached after `executed` instructions.
    Confirm { executed: usize },
}

/// Read from argument first, if `Some`. Then read from stream.
#[derive(Debug)]
pub struct CommandReader {
    argument: Option<Argument>,
    stream: Stream,
}

/// Stdin or interactive terminal.
#[derive(Debug)]
enum Stream {
    Stdin(Stdin),
    Terminal(Terminal),
}

/// A source of session commands and confirmation answers.
pub trait Read {
    /// `None` indicates EOF.
    /// Returned string slice MAY include leading or trailing whitespace.
    fn read(&mut self, prompt: Prompt) -> Option<&str>;
}

impl CommandReader {
    pub fn from(argument: Option<String>) -> Self {
        Self {
            argument: argument.map(Argument::from),
            stream: Stream::new(),
        }
    }
}

impl Stream {
    pub fn new() -> Self {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            Self::Terminal(Terminal::new())
        } else {
            Self::Stdin(Stdin::from(stdin))
        }
    }
}

impl Read for CommandReader {
    fn read(&mut self, prompt: Prompt) -> Option<&str> {
        // Always try to read from argument first
        // If argument is `None`, or if read from argument returns `None`, then read from stream
        if let Some(argument) = &mut self.argument {
            if let Some(command) = argument.read(prompt) {
                echo_command(prompt, Some(command));
                return Some(command);
            }
        }
        self.stream.read(prompt)
    }
}

impl Read for Stream {
    fn read(&mut self, prompt: Prompt) -> Option<&str> {
        match self {
            Self::Stdin(stdin) => {
                let command = stdin.read(prompt);
                echo_command(prompt, command);
                command
            }
            // Terminal shows its own prompt
            Self::Terminal(terminal) => terminal.read(prompt),
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "Enter command (s - step, a - execute all, q - quit): "),
            Self::Confirm { executed } => {
                write!(f, "{} instructions executed. Continue? (y/n): ", executed)
            }
        }
    }
}

/// Load the next line into `pending` once it has been used up.
///
/// Returns `false` on EOF. A blank line is not EOF.
fn refill<F>(pending: &mut Argument, mut next_line: F) -> bool
where
    F: FnMut() -> Option<String>,
{
    if pending.is_exhausted() {
        let Some(mut line) = next_line() else {
            return false;
        };
        // Terminal strips the newline, so bare `Enter` arrives empty
        if line.is_empty() {
            line.push('\n');
        }
        *pending = Argument::from(line);
    }
    true
}

/// Print prompt and command.
fn echo_command(prompt: Prompt, command: Option<&str>) {
    if command.is_some_and(|command| command.trim().is_empty()) {
        return;
    }
    dprint!(Sometimes, Normal, "\x1b[1m{}\x1b[0m", prompt);
    dprintln!(
        Sometimes,
        Normal,
        "{}",
        command.unwrap_or("\x1b[3m(end of input)\x1b[0m").trim()
    );
}
