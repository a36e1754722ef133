use miette::{miette, LabeledSpan, Report, Severity};

use crate::instruction::{Opcode, JUMP_MAX};
use crate::parse::DecodeError;
use crate::program::PROGRAM_MAX;
use crate::symbol::Span;

// Load errors

pub fn load_too_long(span: Span, src: String, len: usize) -> Report {
    miette!(
        severity = Severity::Warning,
        code = "load::too_long",
        help = format!("only the first {PROGRAM_MAX} lines are loaded; the rest is ignored"),
        labels = vec![LabeledSpan::at(span, "first ignored line")],
        "Program has {len} lines, exceeding {PROGRAM_MAX}",
    )
    .with_source_code(src)
}

// Check errors

pub fn check_unknown_opcode(span: Span, src: String, opcode: &str) -> Report {
    let help = match opcode.to_ascii_uppercase().parse::<Opcode>() {
        Ok(suggested) => format!("opcodes are case-sensitive; did you mean `{suggested}`?"),
        Err(()) => "valid opcodes are DEC, ADD, SUB, LDA, LDI, STR, XCH, JMP, JZS and HLT".into(),
    };
    miette!(
        severity = Severity::Error,
        code = "check::unknown_opcode",
        help = help,
        labels = vec![LabeledSpan::at(span, "unknown opcode")],
        "Encountered an unknown opcode",
    )
    .with_source_code(src)
}

pub fn check_empty_line(span: Span, src: String) -> Report {
    miette!(
        severity = Severity::Error,
        code = "check::empty_line",
        help = "every line is one instruction; an empty line is reported each time it runs",
        labels = vec![LabeledSpan::at(span, "empty line")],
        "Encountered a line without an opcode",
    )
    .with_source_code(src)
}

pub fn check_missing_operand(span: Span, src: String, error: &DecodeError) -> Report {
    miette!(
        severity = Severity::Error,
        code = "check::missing_operand",
        help = "add an operand after the opcode, separated by whitespace",
        labels = vec![LabeledSpan::at(span, "missing operand")],
        "{error}",
    )
    .with_source_code(src)
}

pub fn check_bad_integer(span: Span, src: String, error: &DecodeError) -> Report {
    miette!(
        severity = Severity::Error,
        code = "check::bad_integer",
        help = "integer operands are base-10, like `42` or `-7`",
        labels = vec![LabeledSpan::at(span, "malformed integer")],
        "{error}",
    )
    .with_source_code(src)
}

pub fn check_jump_range(span: Span, src: String, address: i64) -> Report {
    miette!(
        severity = Severity::Warning,
        code = "check::jump_range",
        help = format!("jump targets must be in range [0, {JUMP_MAX}]; this jump will be skipped"),
        labels = vec![LabeledSpan::at(span, "out of range")],
        "Jump target {address} is out of bounds",
    )
    .with_source_code(src)
}
