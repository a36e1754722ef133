use std::io::Write as _;

use console::Term;

use super::argument::Argument;
use super::{refill, Prompt, Read};

/// Interactive terminal, read a line at a time.
#[derive(Debug)]
pub struct Terminal {
    term: Term,
    pending: Argument,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            pending: Argument::from(String::new()),
        }
    }

    /// `None` indicates EOF (`Ctrl+D`) or a terminal error.
    fn read_line(term: &mut Term, prompt: Prompt) -> Option<String> {
        // Must use `write!` to be flushed
        write!(term, "\x1b[1m{}\x1b[0m", prompt).ok()?;
        term.flush().ok()?;
        term.read_line().ok()
    }
}

impl Read for Terminal {
    fn read(&mut self, prompt: Prompt) -> Option<&str> {
        let term = &mut self.term;
        if !refill(&mut self.pending, || Self::read_line(term, prompt)) {
            return None;
        }
        self.pending.read(prompt)
    }
}
