use std::error;
use std::fmt;

/// A session verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Execute the instruction at the program counter.
    Step,
    /// Execute until the program ends, leaves the legal range, or a watermark is declined.
    Run,
    /// Print final state and end the session.
    Quit,
}

/// Error parsing a command.
#[derive(Debug, PartialEq)]
pub enum Error {
    Invalid {
        command_name: String,
        suggested: Option<Command>,
    },
    TooManyArguments {
        command: Command,
    },
}

impl Command {
    /// Matched case-insensitively. One-letter forms are the classic ones.
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "s" | "step" => Some(Self::Step),
            "a" | "all" | "run" => Some(Self::Run),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// Closest command by leading letter, for misspelt input.
    fn suggest(name: &str) -> Option<Self> {
        match name.chars().next()?.to_ascii_lowercase() {
            's' => Some(Self::Step),
            'a' | 'r' => Some(Self::Run),
            'q' | 'e' => Some(Self::Quit),
            _ => None,
        }
    }
}

impl TryFrom<&str> for Command {
    type Error = Error;

    /// Assumes line is non-empty.
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();

        let Some(command) = Self::from_name(name) else {
            return Err(Error::Invalid {
                command_name: name.to_string(),
                suggested: Self::suggest(name),
            });
        };
        if words.next().is_some() {
            return Err(Error::TooManyArguments { command });
        }
        Ok(command)
    }
}

/// Whether a confirmation answer means "continue".
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => write!(f, "step"),
            Self::Run => write!(f, "all"),
            Self::Quit => write!(f, "quit"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid {
                command_name,
                suggested,
            } => {
                write!(f, "Invalid command `{}`.", command_name)?;
                if let Some(suggested) = suggested {
                    write!(f, " Did you mean `{}`?", suggested)?;
                }
                Ok(())
            }
            Self::TooManyArguments { command } => {
                write!(f, "Command `{}` takes no arguments.", command)
            }
        }
    }
}

impl error::Error for Error {}
