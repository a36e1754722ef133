use std::ops::Range;

use miette::{Report, Severity};

use crate::dprintln;
use crate::error;
use crate::instruction::{Instruction, JUMP_MAX};
use crate::parse::{DecodeError, Line};
use crate::symbol::{Span, SrcOffset};

/// Maximum number of program lines. Also the size of the program-counter range.
pub const PROGRAM_MAX: usize = 128;

/// Loaded program: ordered raw instruction lines, indexed by program counter.
#[derive(Clone, Debug)]
pub struct Program {
    src: String,
    /// Byte range of each kept line within `src`, without line terminators.
    lines: Vec<Range<usize>>,
    /// Line count before truncation.
    source_len: usize,
    /// Byte range of the first line dropped by truncation.
    first_ignored: Option<Range<usize>>,
}

impl Program {
    /// Split `src` into lines, keeping at most [`PROGRAM_MAX`] of them.
    pub fn from_source(src: impl Into<String>) -> Self {
        let src = src.into();
        let mut lines = Vec::new();
        let mut offset = 0;
        for line in src.split_inclusive('\n') {
            let text = line.trim_end_matches('\n').trim_end_matches('\r');
            lines.push(offset..offset + text.len());
            offset += line.len();
        }
        let source_len = lines.len();
        let first_ignored = lines.get(PROGRAM_MAX).cloned();

        if source_len > PROGRAM_MAX {
            dprintln!(
                Always,
                Warning,
                "Warning: Program exceeds {} instructions. Truncating.",
                PROGRAM_MAX
            );
            lines.truncate(PROGRAM_MAX);
        }

        Self {
            src,
            lines,
            source_len,
            first_ignored,
        }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let src = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_source(src)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.source_len > self.lines.len()
    }

    /// Line at program counter `pc`, if there is one.
    pub fn get(&self, pc: i64) -> Option<&str> {
        let index = usize::try_from(pc).ok()?;
        self.lines.get(index).map(|range| &self.src[range.clone()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|range| &self.src[range.clone()])
    }

    /// Decode every kept line without executing anything.
    ///
    /// Returns a report per problem, in source order. Reports with [`Severity::Error`] mark
    /// lines that will be skipped as malformed when executed.
    pub fn check(&self) -> Vec<Report> {
        let mut reports = Vec::new();

        for range in &self.lines {
            let text = &self.src[range.clone()];
            let line = Line::tokenize(text);
            let at = |span: Span| span.shifted(range.start);

            let Some(opcode) = line.opcode else {
                let span = Span::new(SrcOffset(range.start), text.len());
                reports.push(error::check_empty_line(span, self.src.clone()));
                continue;
            };
            let operand_span = line.operand.map(|token| at(token.span));

            match Instruction::try_from(line) {
                Ok(Instruction::Jump { address }) if !(0..=JUMP_MAX).contains(&address) => {
                    let span = operand_span.unwrap_or_else(|| at(opcode.span));
                    reports.push(error::check_jump_range(span, self.src.clone(), address));
                }
                Ok(_) => (),
                Err(DecodeError::UnknownOpcode { .. }) => {
                    reports.push(error::check_unknown_opcode(
                        at(opcode.span),
                        self.src.clone(),
                        opcode.text,
                    ));
                }
                Err(decode @ DecodeError::MissingOperand { .. }) => {
                    let span = at(opcode.span);
                    reports.push(error::check_missing_operand(span, self.src.clone(), &decode));
                }
                Err(decode @ DecodeError::MalformedInteger { .. }) => {
                    let span = operand_span.unwrap_or_else(|| at(opcode.span));
                    reports.push(error::check_bad_integer(span, self.src.clone(), &decode));
                }
            }
        }

        if let Some(ignored) = &self.first_ignored {
            reports.push(error::load_too_long(
                Span::new(SrcOffset(ignored.start), ignored.len()),
                self.src.clone(),
                self.source_len,
            ));
        }

        reports
    }
}

/// Whether any report would stop the program from being accepted.
pub fn has_errors(reports: &[Report]) -> bool {
    reports
        .iter()
        .any(|report| report.severity().unwrap_or(Severity::Error) == Severity::Error)
}
