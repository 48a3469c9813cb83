use super::{Address, Channel, Memory, Word};
use crate::lang::{LineNumber, Program};
use std::rc::Rc;

/// Receives register changes and program loads.
pub trait ProcessorObserver {
    fn program_loaded(&mut self, _program: &Program) {}
    fn pc_changed(&mut self, _pc: Address) {}
    fn x_changed(&mut self, _x: Word) {}
}

/// ## Architectural state
///
/// Registers, memory and the two I/O channels. Executions mutate the state
/// only through these setters so that every change is observed.

pub struct Cpu {
    pc: Address,
    x: Word,
    program: Option<Rc<Program>>,
    memory: Memory,
    input: Channel,
    output: Channel,
    observers: Vec<Box<dyn ProcessorObserver>>,
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cpu {{ pc: {}, x: {} }}", self.pc, self.x)
    }
}

impl Cpu {
    pub fn new(memory: Memory, input: Channel, output: Channel) -> Cpu {
        Cpu {
            pc: 0,
            x: 0,
            program: None,
            memory,
            input,
            output,
            observers: vec![],
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn ProcessorObserver>) {
        self.observers.push(observer);
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    pub fn set_pc(&mut self, value: Address) {
        self.pc = value;
        for observer in self.observers.iter_mut() {
            observer.pc_changed(value);
        }
    }

    pub fn inc_pc(&mut self) {
        self.set_pc(self.pc.wrapping_add(1));
    }

    pub fn dec_pc(&mut self) {
        self.set_pc(self.pc.wrapping_sub(1));
    }

    pub fn x(&self) -> Word {
        self.x
    }

    pub fn set_x(&mut self, value: Word) {
        self.x = value;
        for observer in self.observers.iter_mut() {
            observer.x_changed(value);
        }
    }

    pub fn program(&self) -> Option<&Rc<Program>> {
        self.program.as_ref()
    }

    pub(super) fn set_program(&mut self, program: Rc<Program>) {
        self.program = Some(Rc::clone(&program));
        for observer in self.observers.iter_mut() {
            observer.program_loaded(&program);
        }
    }

    /// Source line that generated the instruction at `index`.
    pub fn source_line(&self, index: Address) -> Option<LineNumber> {
        self.program
            .as_ref()
            .and_then(|p| p.metadata.source_line(index))
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn input(&mut self) -> &mut Channel {
        &mut self.input
    }

    pub fn output(&mut self) -> &mut Channel {
        &mut self.output
    }
}
