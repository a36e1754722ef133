use std::error::Error;
use std::fmt;
use std::num::ParseIntError;

use crate::instruction::{Instruction, Opcode, OperandKind};
use crate::symbol::{Span, SrcOffset};

/// Whitespace-delimited word of a program line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Relative to the start of the line.
    pub span: Span,
}

/// A program line split into opcode keyword and optional operand.
///
/// Anything after the operand is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line<'a> {
    pub opcode: Option<Token<'a>>,
    pub operand: Option<Token<'a>>,
}

/// Error decoding a program line.
#[derive(Debug, PartialEq)]
pub enum DecodeError {
    UnknownOpcode {
        opcode: String,
    },
    MissingOperand {
        opcode: Opcode,
    },
    MalformedInteger {
        opcode: Opcode,
        operand: String,
        error: ParseIntError,
    },
}

impl<'a> Line<'a> {
    pub fn tokenize(line: &'a str) -> Self {
        let mut tokens = Tokens { line, cursor: 0 };
        Self {
            opcode: tokens.next(),
            operand: tokens.next(),
        }
    }
}

struct Tokens<'a> {
    line: &'a str,
    /// Byte index.
    cursor: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.line[self.cursor..];
        let start = self.cursor + (rest.len() - rest.trim_start().len());
        let rest = &self.line[start..];
        if rest.is_empty() {
            self.cursor = self.line.len();
            return None;
        }
        let len = rest
            .find(|ch: char| ch.is_whitespace())
            .unwrap_or(rest.len());
        self.cursor = start + len;
        Some(Token {
            text: &rest[..len],
            span: Span::new(SrcOffset(start), len),
        })
    }
}

impl<'a> TryFrom<Line<'a>> for Instruction<'a> {
    type Error = DecodeError;

    fn try_from(line: Line<'a>) -> Result<Self, Self::Error> {
        let keyword = line.opcode.map(|token| token.text).unwrap_or_default();
        let opcode: Opcode = keyword.parse().map_err(|_| DecodeError::UnknownOpcode {
            opcode: keyword.to_string(),
        })?;

        let operand = match opcode.operand_kind() {
            OperandKind::None => None,
            _ => Some(
                line.operand
                    .ok_or(DecodeError::MissingOperand { opcode })?
                    .text,
            ),
        };
        let symbol = || operand.unwrap_or_default();
        let integer = || parse_integer(opcode, operand.unwrap_or_default());

        let instruction = match opcode {
            Opcode::Dec => Self::Declare { symbol: symbol() },
            Opcode::Add => Self::Add,
            Opcode::Sub => Self::Subtract,
            Opcode::Lda => Self::LoadMemory { symbol: symbol() },
            Opcode::Ldi => Self::LoadImmediate { value: integer()? },
            Opcode::Str => Self::Store { symbol: symbol() },
            Opcode::Xch => Self::Exchange,
            Opcode::Jmp => Self::Jump { address: integer()? },
            Opcode::Jzs => Self::JumpIfZero { address: integer()? },
            Opcode::Hlt => Self::Halt,
        };
        Ok(instruction)
    }
}

impl<'a> TryFrom<&'a str> for Instruction<'a> {
    type Error = DecodeError;

    fn try_from(line: &'a str) -> Result<Self, Self::Error> {
        Line::tokenize(line).try_into()
    }
}

fn parse_integer(opcode: Opcode, operand: &str) -> Result<i64, DecodeError> {
    operand
        .parse()
        .map_err(|error| DecodeError::MalformedInteger {
            opcode,
            operand: operand.to_string(),
            error,
        })
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode { opcode } if opcode.is_empty() => {
                write!(f, "Unknown instruction: empty line")
            }
            Self::UnknownOpcode { opcode } => write!(f, "Unknown opcode: {}", opcode),
            Self::MissingOperand { opcode } => {
                let kind = match opcode.operand_kind() {
                    OperandKind::Integer => "an integer",
                    _ => "a symbol",
                };
                write!(f, "Unknown instruction: `{}` requires {} operand", opcode, kind)
            }
            Self::MalformedInteger {
                opcode,
                operand,
                error,
            } => write!(
                f,
                "Unknown instruction: `{} {}` has a malformed integer operand ({})",
                opcode, operand, error
            ),
        }
    }
}

impl Error for DecodeError {}
