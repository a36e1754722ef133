use std::cell::RefCell;
use std::io::{self, Write as _};
use std::str::Chars;

use colored::{ColoredString, Colorize};

use crate::state::MachineState;

#[macro_export]
macro_rules! dprint {
    ( $cond:ident, $kind:ident, $fmt:literal $($tt:tt)* ) => {{
        let s = format!(
            $fmt
            $($tt)*
        );
        $crate::output::Output::Debugger(
            $crate::output::Condition::$cond,
            $crate::output::Category::$kind,
        )
        .print_str(&s);
    }};
}

#[macro_export]
macro_rules! dprintln {
    ( $cond:ident ) => {{
        $crate::output::Output::Debugger(
            $crate::output::Condition::$cond,
            $crate::output::Category::Normal,
        )
        .print_str("\n");
    }};
    ( $cond:ident, $kind:ident, $fmt:literal $($tt:tt)* ) => {{
        let s = format!(
            concat!($fmt, "\n")
            $($tt)*
        );
        $crate::output::Output::Debugger(
            $crate::output::Condition::$cond,
            $crate::output::Category::$kind,
        )
        .print_str(&s);
    }};
}

/// Where a piece of text goes.
///
/// `Normal` is the machine's own output (trace snapshots, state dumps) on stdout.
/// `Debugger` is everything said *about* the session on stderr.
#[derive(Clone, Copy, Debug)]
pub enum Output {
    Normal,
    Debugger(Condition, Category),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Printed in every mode.
    Always,
    /// Skipped with `--minimal`.
    Sometimes,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    Normal,
    Info,
    Warning,
    Error,
}

struct Decolored<'a> {
    chars: Chars<'a>,
}

impl Output {
    thread_local! {
        static IS_LINE_START: RefCell<bool> = const { RefCell::new(true) };
        static IS_MINIMAL: RefCell<bool> = const { RefCell::new(false) };
    }

    pub fn set_line_start(new_value: bool) -> bool {
        Self::IS_LINE_START.with(|value| value.replace(new_value))
    }
    /// Private. Use [`Output::start_new_line`].
    fn is_line_start() -> bool {
        Self::IS_LINE_START.with(|value| *value.borrow())
    }
    pub fn set_minimal(new_value: bool) -> bool {
        Self::IS_MINIMAL.with(|value| value.replace(new_value))
    }
    pub fn is_minimal() -> bool {
        Self::IS_MINIMAL.with(|value| *value.borrow())
    }

    fn set_line_start_from_str(string: &str) {
        let last = Decolored::new(string).last();
        if let Some(ch) = last {
            Output::set_line_start(ch == '\n');
        }
    }

    pub fn print_str(&self, string: &str) {
        match self {
            Self::Normal => {
                if Self::is_minimal() {
                    print_colorless(string);
                } else {
                    print!("{}", string);
                }
                // Snapshots interleave with prompts on a terminal.
                // A broken stdout makes the next `print!` panic, so a failed flush is dropped here.
                let _ = io::stdout().flush();
                Self::set_line_start_from_str(string);
            }

            Self::Debugger(condition, category) => match (Self::is_minimal(), *condition) {
                (false, _) => {
                    eprint!("{}", category.paint(string));
                    Self::set_line_start_from_str(string);
                }
                // Always remove color if `--minimal`
                (true, Condition::Always) => {
                    eprint_colorless(string);
                    Self::set_line_start_from_str(string);
                }
                (true, Condition::Sometimes) => (),
            },
        }
    }

    pub fn start_new_line(&self) {
        if !Self::is_line_start() {
            self.print_str("\n");
        }
    }

    /// Short register/flag line printed after every dispatched instruction.
    pub fn print_snapshot(&self, state: &MachineState, instruction: &str) {
        self.print_str(&format!("\x1b[2mInstruction:\x1b[0m {}\n", instruction));
        self.print_str(&format!(
            "\x1b[1mPC:\x1b[0m {}, \x1b[1mA:\x1b[0m {}, \x1b[1mB:\x1b[0m {}, \x1b[1mZero:\x1b[0m {}, \x1b[1mOverflow:\x1b[0m {}\n",
            state.pc(),
            state.accumulator(),
            state.data_register(),
            state.zero_flag() as u8,
            state.overflow_flag() as u8,
        ));
    }

    /// Full dump of registers, flags and every declared symbol with its memory cell.
    pub fn print_state(&self, state: &MachineState) {
        self.print_str("\x1b[1m--- Machine State ---\x1b[0m\n");
        self.print_str(&format!("Accumulator: {}\n", state.accumulator()));
        self.print_str(&format!("Data Register: {}\n", state.data_register()));
        self.print_str(&format!("Program Counter: {}\n", state.pc()));
        self.print_str(&format!("Zero Bit: {}\n", state.zero_flag() as u8));
        self.print_str(&format!("Overflow Bit: {}\n", state.overflow_flag() as u8));

        self.print_str("\n\x1b[1m--- Data Memory ---\x1b[0m\n");
        for (name, address) in state.symbols().sorted() {
            self.print_str(&format!(
                "  {} \x1b[2m(Address: {})\x1b[0m = {}\n",
                name,
                address,
                state.mem(address)
            ));
        }
        self.print_str("\x1b[1m--- End of State ---\x1b[0m\n");
    }
}

impl Category {
    fn paint(self, string: &str) -> ColoredString {
        let string = ColoredString::from(string);
        match self {
            Self::Normal => string,
            Self::Info => string.blue(),
            Self::Warning => string.yellow(),
            Self::Error => string.red(),
        }
    }
}

impl<'a> Decolored<'a> {
    pub fn new(string: &'a str) -> Self {
        Self {
            chars: string.chars(),
        }
    }
}

impl<'a> Iterator for Decolored<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ch) = self.chars.next() {
            // Skip everything between '\x1b' and 'm' (inclusive)
            if ch == '\x1b' {
                while self.chars.next().is_some_and(|ch| ch != 'm') {}
                continue;
            }
            return Some(ch);
        }
        None
    }
}

fn print_colorless(string: &str) {
    print!("{}", Decolored::new(string).collect::<String>());
}

fn eprint_colorless(string: &str) {
    eprint!("{}", Decolored::new(string).collect::<String>());
}
