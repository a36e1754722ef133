use std::io;

use super::argument::Argument;
use super::{refill, Prompt, Read, INITIAL_BUFFER_CAPACITY};

/// Stdin which is not attached to a terminal, i.e. piped.
#[derive(Debug)]
pub struct Stdin {
    stdin: io::Stdin,
    /// Rest of the last line read. Commands borrow from here.
    pending: Argument,
}

impl Stdin {
    pub fn from(stdin: io::Stdin) -> Self {
        Self {
            stdin,
            pending: Argument::from(String::new()),
        }
    }
}

/// `None` indicates EOF or a failed read.
fn read_line(stdin: &io::Stdin) -> Option<String> {
    let mut line = String::with_capacity(INITIAL_BUFFER_CAPACITY);
    match stdin.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

impl Read for Stdin {
    fn read(&mut self, prompt: Prompt) -> Option<&str> {
        let stdin = &self.stdin;
        if !refill(&mut self.pending, || read_line(stdin)) {
            return None;
        }
        self.pending.read(prompt)
    }
}
