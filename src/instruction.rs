use std::fmt;
use std::str::FromStr;

use crate::dprintln;
use crate::state::{in_bounds, MachineState, MEMORY_SIZE};

/// Highest program counter a `JMP` may target.
pub const JUMP_MAX: i64 = 127;

/// Instruction keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Dec,
    Add,
    Sub,
    Lda,
    Ldi,
    Str,
    Xch,
    Jmp,
    Jzs,
    Hlt,
}

/// What the operand of an opcode must be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Symbol,
    Integer,
}

/// A decoded instruction, borrowing its symbol operand from the program line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Bind symbol to the next free data address
    Declare { symbol: &'a str },
    /// A <- A + B
    Add,
    /// A <- A - B
    Subtract,
    /// A <- mem[symbol]
    LoadMemory { symbol: &'a str },
    /// A <- value
    LoadImmediate { value: i64 },
    /// mem[symbol] <- A, if A is in bounds
    Store { symbol: &'a str },
    /// Swap A and B
    Exchange,
    /// Continue at `address`
    Jump { address: i64 },
    /// Continue at `address` if the zero flag is set
    JumpIfZero { address: i64 },
    Halt,
}

/// Result of executing one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Keep going; the controller advances the program counter.
    Proceed,
    /// Program requested termination.
    Halt,
}

impl Opcode {
    pub fn operand_kind(self) -> OperandKind {
        match self {
            Self::Dec | Self::Lda | Self::Str => OperandKind::Symbol,
            Self::Ldi | Self::Jmp | Self::Jzs => OperandKind::Integer,
            Self::Add | Self::Sub | Self::Xch | Self::Hlt => OperandKind::None,
        }
    }
}

impl FromStr for Opcode {
    type Err = ();

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEC" => Ok(Self::Dec),
            "ADD" => Ok(Self::Add),
            "SUB" => Ok(Self::Sub),
            "LDA" => Ok(Self::Lda),
            "LDI" => Ok(Self::Ldi),
            "STR" => Ok(Self::Str),
            "XCH" => Ok(Self::Xch),
            "JMP" => Ok(Self::Jmp),
            "JZS" => Ok(Self::Jzs),
            "HLT" => Ok(Self::Hlt),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dec => write!(f, "DEC"),
            Self::Add => write!(f, "ADD"),
            Self::Sub => write!(f, "SUB"),
            Self::Lda => write!(f, "LDA"),
            Self::Ldi => write!(f, "LDI"),
            Self::Str => write!(f, "STR"),
            Self::Xch => write!(f, "XCH"),
            Self::Jmp => write!(f, "JMP"),
            Self::Jzs => write!(f, "JZS"),
            Self::Hlt => write!(f, "HLT"),
        }
    }
}

impl<'a> Instruction<'a> {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Declare { .. } => Opcode::Dec,
            Self::Add => Opcode::Add,
            Self::Subtract => Opcode::Sub,
            Self::LoadMemory { .. } => Opcode::Lda,
            Self::LoadImmediate { .. } => Opcode::Ldi,
            Self::Store { .. } => Opcode::Str,
            Self::Exchange => Opcode::Xch,
            Self::Jump { .. } => Opcode::Jmp,
            Self::JumpIfZero { .. } => Opcode::Jzs,
            Self::Halt => Opcode::Hlt,
        }
    }

    /// Commit the instruction's effect to `state`.
    ///
    /// Conditions the program can recover from are reported and leave the relevant part of
    /// `state` untouched.
    pub fn execute(&self, state: &mut MachineState) -> Effect {
        match *self {
            Self::Declare { symbol } => {
                if state.next_data >= MEMORY_SIZE {
                    dprintln!(
                        Always,
                        Error,
                        "Error: No data memory left to declare `{}`.",
                        symbol
                    );
                    return Effect::Proceed;
                }
                state.symbols.declare(symbol, state.next_data);
                state.next_data += 1;
            }

            Self::Add => {
                let result = state.acc.wrapping_add(state.data);
                state.update_overflow_flag(result);
                state.acc = result;
                state.update_zero_flag(state.acc);
            }
            Self::Subtract => {
                let result = state.acc.wrapping_sub(state.data);
                state.update_overflow_flag(result);
                state.acc = result;
                state.update_zero_flag(state.acc);
            }

            Self::LoadMemory { symbol } => {
                let address = state.symbols.resolve(symbol);
                state.acc = state.mem[address];
            }
            Self::LoadImmediate { value } => {
                state.acc = value;
            }
            Self::Store { symbol } => {
                let address = state.symbols.resolve(symbol);
                if !in_bounds(state.acc) {
                    dprintln!(
                        Always,
                        Error,
                        "Error: Out-of-bounds value {} at address {}.",
                        state.acc,
                        address
                    );
                    return Effect::Proceed;
                }
                state.mem[address] = state.acc;
            }

            Self::Exchange => {
                std::mem::swap(&mut state.acc, &mut state.data);
            }

            // Targets are stored minus one: the controller increments after every instruction
            Self::Jump { address } => {
                if !(0..=JUMP_MAX).contains(&address) {
                    dprintln!(
                        Always,
                        Error,
                        "Error: JMP address {} out of bounds. Must be in range [0, {}].",
                        address,
                        JUMP_MAX
                    );
                    return Effect::Proceed;
                }
                state.pc = address - 1;
            }
            Self::JumpIfZero { address } => {
                if state.zero {
                    state.pc = address.wrapping_sub(1);
                }
            }

            Self::Halt => return Effect::Halt,
        }
        Effect::Proceed
    }
}
