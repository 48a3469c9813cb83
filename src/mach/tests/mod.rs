use super::*;
use crate::lang::{Instruction, Program};
use std::rc::Rc;


fn processor(listing: &str) -> Processor {
    let mut p = Processor::new(Config { memory_size: 64 });
    let program: Program = listing.parse().unwrap();
    p.set_program(Rc::new(program)).unwrap();
    p
}

fn single(op: Opcode, operands: &[Word]) -> Rc<Program> {
    Rc::new(crate::lang::one_statement_per_instruction(vec![Instruction::new(
        op, operands,
    )]))
}

/// Everything an instruction could change.
#[derive(Debug, PartialEq)]
struct Snapshot {
    pc: Address,
    x: Word,
    memory: Vec<u8>,
}

fn snapshot(p: &Processor) -> Snapshot {
    Snapshot {
        pc: p.pc(),
        x: p.x(),
        memory: p.memory().bytes().to_vec(),
    }
}
