// Machine
mod state;
pub use state::{MachineState, DATA_START, MAX_VALUE, MEMORY_SIZE, MIN_VALUE};
mod instruction;
pub use instruction::{Effect, Instruction, Opcode, JUMP_MAX};
mod symbol;
pub use symbol::SymbolTable;

// Decoding
mod parse;
pub use parse::DecodeError;
mod dispatch;
pub use dispatch::dispatch;
mod program;
pub use program::{has_errors, Program, PROGRAM_MAX};

// Running
mod runtime;
pub use runtime::{Outcome, Session, SessionOptions, Status, Termination};
mod command;
pub use command::Command;
mod reader;
pub use reader::{Argument, CommandReader, Prompt, Read};

#[macro_use]
pub mod output;
mod error;

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 2;

/// Instructions a run may execute before asking whether to continue.
pub const DEFAULT_WATERMARK: usize = 1000;
