use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn salvm(file: &str, commands: &str) -> Command {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("run")
        .arg(format!("tests/files/{file}"))
        .arg("--minimal")
        .arg("--command")
        .arg(commands);
    cmd
}

#[test]
fn steps_through_scenario() {
    salvm("scenario.sal", "s;s;s;s;s")
        .assert()
        .success()
        .stdout(contains("Instruction: LDI 5\nPC: 0, A: 5, B: 0, Zero: 0, Overflow: 0"))
        .stdout(contains("Instruction: LDI 3\nPC: 1, A: 3, B: 0, Zero: 0, Overflow: 0"))
        .stdout(contains("Instruction: XCH\nPC: 2, A: 0, B: 3, Zero: 0, Overflow: 0"))
        .stdout(contains("Instruction: SUB\nPC: 3, A: -3, B: 3, Zero: 0, Overflow: 0"))
        .stdout(contains("Instruction: HLT").not())
        .stdout(contains("Accumulator: -3\nData Register: 3\nProgram Counter: 4"))
        .stderr(contains("Program halted."));
}

#[test]
fn halt_skips_remaining_commands() {
    // The trailing `s` would fail with an out-of-bounds error if it ran
    salvm("scenario.sal", "a;s;s")
        .assert()
        .success()
        .stderr(contains("Program halted."))
        .stderr(contains("exceeded program size").not());
}

#[test]
fn runs_countdown_to_completion() {
    salvm("countdown.sal", "a;q")
        .assert()
        .success()
        .stdout(contains("Accumulator: 0\n"))
        .stdout(contains("Zero Bit: 1\n"))
        .stdout(contains("Program Counter: 6\n"));
}

#[test]
fn step_after_completion_reports_bounds() {
    salvm("countdown.sal", "a;s;q")
        .assert()
        .success()
        .stderr(contains(
            "Error: Program counter 6 exceeded program size. Halting execution.",
        ))
        // Session ended before `q`, so no final dump
        .stdout(contains("--- Machine State ---").not());
}

#[test]
fn dumps_symbols_on_quit() {
    salvm("store.sal", "a;q")
        .assert()
        .success()
        .stdout(contains(
            "--- Data Memory ---\n  spare (Address: 129) = 0\n  total (Address: 128) = 42\n--- End of State ---",
        ))
        .stderr(contains("Error: Out-of-bounds value 40000 at address 129."));
}

#[test]
fn undeclared_symbols_bind_to_address_zero() {
    salvm("undeclared.sal", "a;q")
        .assert()
        .success()
        .stdout(contains("Accumulator: 3\n"))
        .stdout(contains(
            "--- Data Memory ---\n  ghost (Address: 0) = 3\n  phantom (Address: 0) = 3\n--- End of State ---",
        ));
}

#[test]
fn end_of_input_quits() {
    salvm("store.sal", "s")
        .assert()
        .success()
        .stdout(contains("--- End of State ---"));
}

#[test]
fn rejects_invalid_commands() {
    salvm("scenario.sal", "step;jump;q")
        .assert()
        .success()
        .stdout(contains("Instruction: LDI 5"))
        .stderr(contains("Invalid command `jump`."))
        .stdout(contains("Accumulator: 5\n"));
}

#[test]
fn recovers_from_bad_lines() {
    salvm("broken.sal", "a;q")
        .assert()
        .success()
        .stderr(contains("Unknown opcode: ldi"))
        .stderr(contains("Unknown instruction: `LDI two`"))
        .stderr(contains("Unknown instruction: `JMP` requires an integer operand"))
        .stderr(contains("Error: JMP address 200 out of bounds."))
        .stdout(contains("Accumulator: 1\n"));
}

#[test]
fn watermark_asks_to_continue() {
    let mut cmd = salvm("forever.sal", "a;y;n");
    cmd.arg("--watermark").arg("10");
    cmd.assert()
        .success()
        .stderr(contains("Run aborted."))
        .stdout(contains("--- Machine State ---").count(2));
}

#[test]
fn watermark_from_environment() {
    let mut cmd = salvm("forever.sal", "a;n");
    cmd.env("SALVM_WATERMARK", "4");
    cmd.assert()
        .success()
        .stdout(contains("Accumulator: 0\n").and(contains("Program Counter: 0\n")));
}

#[test]
fn reads_commands_from_stdin() {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("run")
        .arg("tests/files/scenario.sal")
        .arg("--minimal")
        .write_stdin("s\ns;q\n");
    cmd.assert()
        .success()
        .stdout(contains("PC: 1, A: 3, B: 0"))
        .stdout(contains("Accumulator: 3\n"));
}

#[test]
fn truncates_long_programs() {
    let path = std::env::temp_dir().join(format!("salvm-long-{}.sal", std::process::id()));
    let mut src = "ADD\n".repeat(130);
    src.insert_str(0, "LDI 1\nXCH\n");
    fs::write(&path, src).unwrap();

    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("run")
        .arg(&path)
        .arg("--minimal")
        .arg("--command")
        .arg("a;q");
    cmd.assert()
        .success()
        .stderr(contains("Program exceeds 128 instructions. Truncating."))
        // 126 ADDs of B = 1 survive truncation
        .stdout(contains("Accumulator: 126\n"))
        .stdout(contains("Program Counter: 128\n"));

    let _ = fs::remove_file(&path);
}

#[test]
fn checks_valid_program() {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("check").arg("tests/files/countdown.sal");
    cmd.assert().success().stderr(contains("no errors found!"));
}

#[test]
fn checks_broken_program() {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("check").arg("tests/files/broken.sal");
    cmd.assert()
        .failure()
        .stderr(contains("check::unknown_opcode"))
        .stderr(contains("check::bad_integer"))
        .stderr(contains("check::missing_operand"))
        .stderr(contains("check::jump_range"));
}
