use crate::command::{is_affirmative, Command};
use crate::dispatch::dispatch;
use crate::instruction::Effect;
use crate::output::{Category, Condition, Output};
use crate::program::{Program, PROGRAM_MAX};
use crate::reader::{Prompt, Read};
use crate::state::MachineState;
use crate::{dprintln, DEFAULT_WATERMARK};

/// Options for a [`Session`], normally filled from CLI flags and the environment.
#[derive(Clone, Copy, Debug)]
pub struct SessionOptions {
    /// Instructions a `run` may execute before asking to continue.
    pub watermark: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            watermark: DEFAULT_WATERMARK,
        }
    }
}

/// One interactive execution of a loaded program.
///
/// Owns the machine state; commands and confirmation answers come from `R`.
pub struct Session<R> {
    state: MachineState,
    program: Program,
    reader: R,
    status: Status,
    options: SessionOptions,
    /// Instructions executed since the last watermark, across steps and runs.
    executed: usize,
    /// Set once the session is over; later steps and runs report it again.
    ended: Option<Termination>,
}

/// The current status of the execution loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// Waiting for a command.
    #[default]
    Idle,
    /// Executing a single instruction.
    Stepping,
    /// Executing until completion, a bounds violation, or a declined watermark.
    Running,
    /// Terminal. No more instructions will execute.
    Halted,
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// `quit` command or end of input. Final state was printed.
    Quit,
    /// Program executed `HLT`. Final state was printed; the embedder should exit successfully.
    Halted,
    /// A step was requested with the program counter outside the program.
    OutOfBounds,
    /// Watermark confirmation was declined.
    Declined,
}

/// Outcome of a single step or a run, before the session decides what happens next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Back to waiting for commands.
    Paused,
    /// The session is over.
    Finished(Termination),
}

impl<R: Read> Session<R> {
    pub fn new(program: Program, reader: R, options: SessionOptions) -> Self {
        Self {
            state: MachineState::new(),
            program,
            reader,
            status: Status::default(),
            options,
            executed: 0,
            ended: None,
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Accept commands until the session terminates.
    pub fn run(&mut self) -> Termination {
        loop {
            // Convert EOF to `quit` command
            let command = self.next_command().unwrap_or(Command::Quit);
            let outcome = match command {
                Command::Step => self.step(),
                Command::Run => self.run_all(),
                Command::Quit => self.quit(),
            };
            if let Outcome::Finished(termination) = outcome {
                return termination;
            }
        }
    }

    /// Execute the instruction at the program counter, then advance it.
    pub fn step(&mut self) -> Outcome {
        if let Some(termination) = self.ended {
            return Outcome::Finished(termination);
        }
        self.status = Status::Stepping;

        let Some(line) = self.program.get(self.state.pc) else {
            dprintln!(
                Always,
                Error,
                "Error: Program counter {} exceeded program size. Halting execution.",
                self.state.pc
            );
            self.status = Status::Halted;
            return self.finish(Termination::OutOfBounds);
        };
        let line = line.to_owned();

        if let Some(termination) = self.execute(&line) {
            return self.finish(termination);
        }
        self.status = Status::Idle;
        Outcome::Paused
    }

    /// Execute until the program counter leaves the program.
    ///
    /// Pauses every `watermark` instructions to ask whether to continue.
    pub fn run_all(&mut self) -> Outcome {
        if let Some(termination) = self.ended {
            return Outcome::Finished(termination);
        }
        self.status = Status::Running;

        while self.state.pc < self.program.len() as i64 {
            if !(0..PROGRAM_MAX as i64).contains(&self.state.pc) {
                dprintln!(
                    Always,
                    Error,
                    "Error: Program counter {} exceeded legal range (0-{}). Halting execution.",
                    self.state.pc,
                    PROGRAM_MAX - 1
                );
                break;
            }
            let Some(line) = self.program.get(self.state.pc) else {
                break;
            };
            let line = line.to_owned();

            if let Some(termination) = self.execute(&line) {
                return self.finish(termination);
            }

            if self.executed >= self.options.watermark && !self.confirm() {
                self.status = Status::Idle;
                return self.finish(Termination::Declined);
            }
        }

        self.status = Status::Idle;
        Outcome::Paused
    }

    /// Print final state and end the session.
    pub fn quit(&mut self) -> Outcome {
        Output::Normal.print_state(&self.state);
        self.finish(Termination::Quit)
    }

    fn finish(&mut self, termination: Termination) -> Outcome {
        self.ended = Some(termination);
        Outcome::Finished(termination)
    }

    /// Dispatch one line and advance the program counter.
    ///
    /// Returns `Some` if the program halted.
    fn execute(&mut self, line: &str) -> Option<Termination> {
        dprintln!(
            Sometimes,
            Info,
            "Executing instruction at PC: {}",
            self.state.pc
        );
        match dispatch(&mut self.state, line) {
            Effect::Proceed => {
                self.state.pc = self.state.pc.wrapping_add(1);
                self.executed += 1;
                None
            }
            Effect::Halt => {
                self.status = Status::Halted;
                dprintln!(Always, Warning, "Program halted.");
                Output::Normal.print_state(&self.state);
                Some(Termination::Halted)
            }
        }
    }

    /// Ask whether to keep running past the watermark. Resets the count on yes.
    fn confirm(&mut self) -> bool {
        Output::Normal.print_state(&self.state);
        let prompt = Prompt::Confirm {
            executed: self.executed,
        };
        let answer = self.reader.read(prompt).is_some_and(is_affirmative);
        if answer {
            self.executed = 0;
        } else {
            dprintln!(Always, Warning, "Run aborted.");
        }
        answer
    }

    /// Returns `None` on EOF.
    fn next_command(&mut self) -> Option<Command> {
        // Loop until valid command or EOF
        loop {
            Output::Debugger(Condition::Always, Category::Normal).start_new_line();
            let line = self.reader.read(Prompt::Command)?.trim();
            // Necessary, since `Command::try_from` assumes non-empty line
            if line.is_empty() {
                continue;
            }

            match Command::try_from(line) {
                Ok(command) => return Some(command),
                Err(error) => {
                    dprintln!(Always, Error, "{}", error);
                    dprintln!(Always, Error, "Please enter 's', 'a', or 'q'.");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Argument;
    use crate::state::DATA_START;

    fn session(lines: &[&str], commands: &str) -> Session<Argument> {
        Session::new(
            Program::from_lines(lines),
            Argument::from(commands.to_string()),
            SessionOptions::default(),
        )
    }

    #[test]
    fn step_scenario() {
        let mut session = session(&["LDI 5", "LDI 3", "XCH", "SUB", "HLT"], "");

        assert_eq!(session.step(), Outcome::Paused);
        assert_eq!(session.state().accumulator(), 5);
        assert_eq!(session.state().pc(), 1);

        assert_eq!(session.step(), Outcome::Paused);
        assert_eq!(session.state().accumulator(), 3);
        assert_eq!(session.state().data_register(), 0);

        session.step();
        assert_eq!(session.state().accumulator(), 0);
        assert_eq!(session.state().data_register(), 3);

        session.step();
        assert_eq!(session.state().accumulator(), -3);
        assert!(!session.state().zero_flag());

        assert_eq!(session.step(), Outcome::Finished(Termination::Halted));
        assert_eq!(session.status(), Status::Halted);
        assert_eq!(session.state().pc(), 4, "HLT does not advance");

        // Nothing runs after a halt
        assert_eq!(session.run_all(), Outcome::Finished(Termination::Halted));
        assert_eq!(session.state().accumulator(), -3);
    }

    #[test]
    fn step_past_end_halts() {
        let mut session = session(&["LDI 1"], "");
        assert_eq!(session.step(), Outcome::Paused);
        assert_eq!(session.step(), Outcome::Finished(Termination::OutOfBounds));
        assert_eq!(session.status(), Status::Halted);
        assert_eq!(session.state().accumulator(), 1);
    }

    #[test]
    fn run_to_completion_returns_to_idle() {
        let mut session = session(&["DEC x", "LDI 7", "STR x", "LDI 0", "LDA x"], "");
        assert_eq!(session.run_all(), Outcome::Paused);
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.state().pc(), 5);
        assert_eq!(session.state().accumulator(), 7);
        assert_eq!(session.state().mem(DATA_START), 7);
    }

    #[test]
    fn jump_lands_on_target() {
        let mut session = session(&["JMP 3", "LDI 1", "LDI 2", "LDI 3"], "");
        session.step();
        assert_eq!(session.state().pc(), 3);
        session.step();
        assert_eq!(session.state().accumulator(), 3);
    }

    #[test]
    fn jump_to_zero() {
        let mut session = session(&["LDI 4", "JMP 0"], "");
        session.step();
        session.step();
        assert_eq!(session.state().pc(), 0);
    }

    #[test]
    fn jump_if_zero_falls_through() {
        let mut session = session(&["LDI 1", "JZS 3", "LDI 2", "LDI 3"], "");
        session.step();
        session.step();
        assert_eq!(session.state().pc(), 2);
    }

    #[test]
    fn jump_if_zero_branches() {
        let mut session = session(&["XCH", "SUB", "JZS 4", "LDI 2", "LDI 3"], "");
        assert_eq!(session.run_all(), Outcome::Paused);
        assert_eq!(session.state().accumulator(), 3);
    }

    #[test]
    fn jump_if_zero_out_of_range_stops_run() {
        let mut session = session(&["SUB", "JZS 300", "LDI 9"], "");
        assert_eq!(session.run_all(), Outcome::Paused);
        assert_eq!(session.state().pc(), 300);
        assert_eq!(session.state().accumulator(), 0);
        // Next step hits the bounds check
        assert_eq!(session.step(), Outcome::Finished(Termination::OutOfBounds));
    }

    #[test]
    fn negative_pc_is_rejected() {
        let mut session = session(&["SUB", "JZS -5"], "");
        assert_eq!(session.run_all(), Outcome::Paused);
        assert_eq!(session.state().pc(), -5);
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.step(), Outcome::Finished(Termination::OutOfBounds));
    }

    #[test]
    fn extreme_jump_target_wraps_pc() {
        let mut session = session(&["SUB", "JZS -9223372036854775808"], "");
        assert_eq!(session.run_all(), Outcome::Paused);
        assert_eq!(session.state().pc(), i64::MIN);
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.step(), Outcome::Finished(Termination::OutOfBounds));
    }

    #[test]
    fn halt_during_run() {
        let mut session = session(&["LDI 2", "HLT", "LDI 3"], "");
        assert_eq!(session.run_all(), Outcome::Finished(Termination::Halted));
        assert_eq!(session.state().accumulator(), 2);
    }

    /// Counts A down from `n` to zero. Executes `3n + 2` instructions.
    const COUNTDOWN: [&str; 6] = ["LDI -1", "XCH", "LDI {n}", "ADD", "JZS 6", "JMP 3"];

    fn countdown(n: i64, commands: &str) -> Session<Argument> {
        let lines = COUNTDOWN.map(|line| line.replace("{n}", &n.to_string()));
        Session::new(
            Program::from_lines(lines),
            Argument::from(commands.to_string()),
            SessionOptions::default(),
        )
    }

    #[test]
    fn watermark_pauses_once() {
        // 1001 instructions; a second pause would read EOF and decline
        let mut session = countdown(333, "y");
        assert_eq!(session.run_all(), Outcome::Paused);
        assert!(session.reader.is_exhausted(), "exactly one confirmation");
        assert_eq!(session.executed, 1);
        assert_eq!(session.state().accumulator(), 0);
        assert_eq!(session.state().pc(), 6);
    }

    #[test]
    fn watermark_repeats() {
        let mut session = Session::new(
            Program::from_lines(["ADD", "JMP 0"]),
            Argument::from("y;yes;n".to_string()),
            SessionOptions::default(),
        );
        assert_eq!(session.run_all(), Outcome::Finished(Termination::Declined));
        // Accepted at 1000 and 2000, declined at 3000
        assert_eq!(session.executed, DEFAULT_WATERMARK);
        assert!(session.reader.is_exhausted());
    }

    #[test]
    fn watermark_declined_by_eof() {
        let mut session = Session::new(
            Program::from_lines(["ADD", "JMP 0"]),
            Argument::from(String::new()),
            SessionOptions { watermark: 10 },
        );
        assert_eq!(session.run_all(), Outcome::Finished(Termination::Declined));
        assert_eq!(session.state().pc(), 0, "paused after the jump");
    }

    #[test]
    fn watermark_not_reached() {
        let mut lines = vec!["ADD"; PROGRAM_MAX];
        lines.push("ADD");
        let mut session = Session::new(
            Program::from_lines(lines),
            Argument::from(String::new()),
            SessionOptions { watermark: PROGRAM_MAX + 1 },
        );
        assert_eq!(session.run_all(), Outcome::Paused);
        assert_eq!(session.state().pc(), PROGRAM_MAX as i64);
        assert_eq!(session.executed, PROGRAM_MAX);
    }

    #[test]
    fn watermark_counts_steps() {
        let mut session = Session::new(
            Program::from_lines(["ADD", "ADD", "ADD", "ADD"]),
            Argument::from(String::new()),
            SessionOptions { watermark: 3 },
        );
        session.step();
        session.step();
        assert_eq!(session.run_all(), Outcome::Finished(Termination::Declined));
        assert_eq!(session.state().pc(), 3);
    }

    #[test]
    fn command_loop() {
        let mut session = session(&["LDI 5", "LDI 3", "HLT"], "s; bogus; s; q");
        assert_eq!(session.run(), Termination::Quit);
        assert_eq!(session.state().accumulator(), 3);
        assert_eq!(session.state().pc(), 2);
    }

    #[test]
    fn command_loop_run_then_halt() {
        let mut session = session(&["LDI 5", "HLT"], "a");
        assert_eq!(session.run(), Termination::Halted);
    }

    #[test]
    fn command_loop_eof_quits() {
        let mut session = session(&["LDI 5"], "s");
        assert_eq!(session.run(), Termination::Quit);
        assert_eq!(session.state().accumulator(), 5);
    }

    #[test]
    fn command_loop_step_after_completion() {
        let mut session = session(&["LDI 5", "XCH", "LDI 5", "ADD"], "a\ns\nq");
        assert_eq!(session.run(), Termination::OutOfBounds);
        assert_eq!(session.state().accumulator(), 10);
    }

    #[test]
    fn malformed_lines_do_not_stop_run() {
        let mut session = session(&["LDI 1", "FOO", "LDI x", "JMP 999", "XCH"], "");
        assert_eq!(session.run_all(), Outcome::Paused);
        assert_eq!(session.state().data_register(), 1);
        assert_eq!(session.state().pc(), 5);
    }
}
