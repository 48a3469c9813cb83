mod common;
use common::*;
use tokiwen::lang::{ErrorCode, Variable};
use tokiwen::mach::Event;

const COUNTDOWN: &str = "
    .data 03 00 00 00 00 00 00 00
    .var count 0 8 1.5-1.10
    * 2: LOAD(0)
      2: BRANCH_IF_ZERO(8)
    * 3: INTERRUPT(1)
    * 4: LOAD_I(1)
      4: SUBTRACT(0)
      4: SET(0)
    * 5: JUMP(0)
      5: NOOP()
    * 6: LOAD_I(99)
      6: INTERRUPT(1)
";

#[test]
fn test_store_and_print() {
    let mut p = load(
        "
        * 1: LOAD_I(5)
          1: SET(0)
        * 2: LOAD_I(0)
          2: ADD(0)
        * 3: INTERRUPT(1)
        ",
    );
    assert_eq!(exec(&mut p), "5\n");
    assert_eq!(p.pc(), 5);
    assert!(p.is_done());
    assert_eq!(p.current_line(), None);
}

#[test]
fn test_countdown_loop() {
    let mut p = load(COUNTDOWN);
    assert_eq!(exec(&mut p), "3\n2\n1\n99\n");
    assert_eq!(p.memory().read(0), 0);
    assert_eq!(p.run_program().unwrap(), Event::End);
}

#[test]
fn test_reset_then_rerun() {
    let mut p = load(COUNTDOWN);
    assert_eq!(exec(&mut p), "3\n2\n1\n99\n");
    p.reset().unwrap();
    assert_eq!(p.pc(), 0);
    assert_eq!(p.x(), 0);
    assert_eq!(p.memory().read(0), 3);
    assert_eq!(exec(&mut p), "3\n2\n1\n99\n");
}

#[test]
fn test_variable_width() {
    let mut p = load(
        "
        .var flags 16 8 1.1-1.6
        * 1: LOAD_I(0x1ff)
          1: SET(16)
        ",
    );
    exec(&mut p);
    let program = p.program().unwrap().clone();
    let flags = &program.metadata.variables[&16];
    assert_eq!(flags.id(), "flags:1.1");
    assert_eq!(flags.value(p.memory()), 0x1ff);
    let short = Variable {
        size: 2,
        ..flags.clone()
    };
    assert_eq!(short.value(p.memory()), 0x1ff);
    let byte = Variable {
        size: 1,
        ..flags.clone()
    };
    assert_eq!(byte.value(p.memory()), -1);
}

#[test]
fn test_division_by_zero_reports_line() {
    let mut p = load(
        "
        * 1: LOAD_I(1)
        * 3: DIVIDE_I(0)
        * 4: INTERRUPT(1)
        ",
    );
    assert_eq!(exec(&mut p), "DIVISION BY ZERO IN 3 AT INSTRUCTION 1\n");
    assert_eq!(p.pc(), 1);
    assert_eq!(p.x(), 1);
    let error = p.run_one_statement().unwrap_err();
    assert_eq!(error.code(), ErrorCode::DivisionByZero);
}

#[test]
fn test_unknown_opcode_is_skipped() {
    let mut p = load(
        "
        * 1: LOAD_I(6)
        * 2: #42(1, 2)
        * 3: INTERRUPT(1)
        ",
    );
    assert_eq!(exec(&mut p), "6\n");
    p.undo_one_instruction().unwrap();
    p.undo_one_instruction().unwrap();
    assert_eq!(p.pc(), 1);
    assert_eq!(p.x(), 6);
}

#[test]
fn test_unknown_syscall_is_skipped() {
    let mut p = load(
        "
        * 1: LOAD_I(6)
        * 2: INTERRUPT(7)
        * 3: INTERRUPT(1)
        ",
    );
    assert_eq!(exec(&mut p), "6\n");
}
