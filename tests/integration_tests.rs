use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn lc3_vm() -> Command {
    Command::cargo_bin("lc3-vm").unwrap()
}

#[test]
fn requires_image_path() {
    lc3_vm().assert().failure().code(2);
}

#[test]
fn runs_hello_world() {
    lc3_vm()
        .arg("tests/files/hello.obj")
        .assert()
        .success()
        .stdout(contains("Loading"))
        .stdout(contains("Hello, world!"))
        .stdout(contains("Halted"))
        .stdout(contains("Completed"));
}

#[test]
fn minimal_hides_status() {
    lc3_vm()
        .arg("tests/files/hello.obj")
        .arg("--minimal")
        .assert()
        .success()
        .stdout(contains("Hello, world!"))
        .stdout(contains("Loading").not())
        .stdout(contains("Completed").not());
}

#[test]
fn echoes_piped_input() {
    lc3_vm()
        .arg("tests/files/echo.obj")
        .arg("--minimal")
        .write_stdin("ok")
        .assert()
        .success()
        .stdout(contains("ok"));
}

#[test]
fn reads_keyboard_registers() {
    lc3_vm()
        .arg("tests/files/keyboard.obj")
        .arg("--minimal")
        .write_stdin("x")
        .assert()
        .success()
        .stdout(contains("x"));
}

#[test]
fn input_closed_is_fatal() {
    lc3_vm()
        .arg("tests/files/echo.obj")
        .arg("--minimal")
        .write_stdin("o")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Input closed"));
}

#[test]
fn reserved_opcode_is_fatal() {
    lc3_vm()
        .arg("tests/files/reserved.obj")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("reserved opcode"))
        .stderr(contains("execution stopped").not());
}

#[test]
fn unknown_trap_is_fatal() {
    lc3_vm()
        .arg("tests/files/bad_trap.obj")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("unknown vector"));
}

#[test]
fn missing_image() {
    lc3_vm()
        .arg("tests/files/missing.obj")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Could not read program image"));
}

#[test]
fn truncated_image() {
    lc3_vm()
        .arg("tests/files/truncated.obj")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("not aligned to 16 bits"));
}
