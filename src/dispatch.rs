use crate::dprintln;
use crate::instruction::{Effect, Instruction};
use crate::output::Output;
use crate::state::MachineState;

/// Decode and execute one program line against `state`.
///
/// Lines that fail to decode are reported and leave `state` unchanged. Every line except a
/// `HLT` is followed by a trace snapshot, which the caller should treat as output only.
pub fn dispatch(state: &mut MachineState, line: &str) -> Effect {
    let effect = match Instruction::try_from(line) {
        Ok(instruction) => instruction.execute(state),
        Err(error) => {
            dprintln!(Always, Error, "{}", error);
            Effect::Proceed
        }
    };
    if effect == Effect::Proceed {
        Output::Normal.print_snapshot(state, line);
    }
    effect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executes_in_order() {
        let mut state = MachineState::new();
        for line in ["LDI 5", "XCH", "LDI 3", "ADD"] {
            assert_eq!(dispatch(&mut state, line), Effect::Proceed);
        }
        assert_eq!(state.accumulator(), 8);
        assert_eq!(state.data_register(), 5);
    }

    #[test]
    fn bad_lines_are_no_ops() {
        let mut state = MachineState::new();
        dispatch(&mut state, "LDI 9");
        let before = state.clone();
        for line in ["NOP", "LDI nine", "JMP", "", "ldi 3"] {
            assert_eq!(dispatch(&mut state, line), Effect::Proceed, "`{line}`");
        }
        assert_eq!(state.accumulator(), before.accumulator());
        assert_eq!(state.pc(), before.pc());
        assert_eq!(state.zero_flag(), before.zero_flag());
    }

    #[test]
    fn halt_is_passed_through() {
        let mut state = MachineState::new();
        assert_eq!(dispatch(&mut state, "HLT"), Effect::Halt);
    }
}
