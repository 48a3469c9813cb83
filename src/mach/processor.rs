use super::{
    Address, Channel, Config, Cpu, Execution, ExecutionStack, Memory, Progress,
    ProcessorObserver, Word,
};
use crate::error;
use crate::lang::{Error, LineNumber, Program};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Where a run operation left the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Paused between instructions; more remain.
    Stopped,
    /// An `INTERRUPT(0)` waits for a value on the input channel. Any run
    /// operation called after the value is written resumes it.
    Input,
    /// The program counter is past the last instruction.
    End,
}

/// ## Reversible processor
///
/// Runs a loaded program an instruction or a statement at a time and undoes
/// it the same way. Statements are delimited by the boundaries the compiler
/// recorded in the program metadata.

pub struct Processor {
    cpu: Cpu,
    stack: ExecutionStack,
    boundaries: Vec<bool>,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Processor {{ {:?}, history: {} }}", self.cpu, self.stack.len())
    }
}

impl Default for Processor {
    fn default() -> Processor {
        Processor::new(Config::default())
    }
}

impl Processor {
    pub fn new(config: Config) -> Processor {
        Processor {
            cpu: Cpu::new(Memory::new(config.memory_size), Channel::new(), Channel::new()),
            stack: ExecutionStack::new(),
            boundaries: vec![],
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn ProcessorObserver>) {
        self.cpu.subscribe(observer);
    }

    pub fn pc(&self) -> Address {
        self.cpu.pc()
    }

    pub fn x(&self) -> Word {
        self.cpu.x()
    }

    pub fn memory(&self) -> &Memory {
        self.cpu.memory()
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        self.cpu.memory_mut()
    }

    pub fn input(&mut self) -> &mut Channel {
        self.cpu.input()
    }

    pub fn output(&mut self) -> &mut Channel {
        self.cpu.output()
    }

    pub fn program(&self) -> Option<&Rc<Program>> {
        self.cpu.program()
    }

    pub fn history(&self) -> &ExecutionStack {
        &self.stack
    }

    /// Loads the data segment and statement boundaries. Registers and
    /// history are kept; call `reset` first to start over. Refused while an
    /// instruction of the current program waits for input.
    pub fn set_program(&mut self, program: Rc<Program>) -> Result<()> {
        self.check_not_waiting()?;
        self.cpu.memory_mut().load(&program.data);
        self.boundaries = vec![false; program.len()];
        for &boundary in program.metadata.statement_boundaries.iter() {
            if let Some(is_boundary) = self.boundaries.get_mut(boundary) {
                *is_boundary = true;
            }
        }
        log::info!(
            "loaded program: {} instructions, {} data bytes, {} variables",
            program.len(),
            program.data.len(),
            program.metadata.variables.len()
        );
        self.cpu.set_program(program);
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        match self.cpu.program() {
            Some(program) => self.cpu.pc() >= program.len(),
            None => false,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.stack.is_pending()
    }

    pub fn is_boundary(&self, index: Address) -> bool {
        self.boundaries.get(index).copied().unwrap_or(false)
    }

    /// Source line of the next instruction, `None` once the program is done.
    pub fn current_line(&self) -> Option<LineNumber> {
        self.cpu.source_line(self.cpu.pc())
    }

    pub fn run_one_instruction(&mut self) -> Result<Event> {
        let program = self.check_for_program()?;
        if self.stack.is_pending() {
            let progress = self.stack.resume(&mut self.cpu)?;
            return Ok(self.event(progress));
        }
        let instruction = match program.instruction(self.cpu.pc()) {
            Some(instruction) => instruction,
            None => return Ok(Event::End),
        };
        let execution = Execution::capture(instruction, &self.cpu);
        let progress = self.stack.push(execution, &mut self.cpu)?;
        Ok(self.event(progress))
    }

    pub fn run_one_statement(&mut self) -> Result<Event> {
        self.check_for_program()?;
        loop {
            match self.run_one_instruction()? {
                Event::Input => return Ok(Event::Input),
                Event::End => return Ok(Event::End),
                Event::Stopped => {
                    if self.is_boundary(self.cpu.pc()) {
                        return Ok(Event::Stopped);
                    }
                }
            }
        }
    }

    pub fn run_program(&mut self) -> Result<Event> {
        self.check_for_program()?;
        loop {
            match self.run_one_instruction()? {
                Event::Stopped => {}
                event => return Ok(event),
            }
        }
    }

    /// Reverts the last executed instruction. Does nothing without history.
    pub fn undo_one_instruction(&mut self) -> Result<()> {
        self.check_for_program()?;
        self.check_not_waiting()?;
        if !self.stack.is_empty() {
            self.stack.pop(&mut self.cpu)?;
        }
        Ok(())
    }

    /// Reverts instructions until the program counter is back on a
    /// statement boundary or the history runs out.
    pub fn undo_one_statement(&mut self) -> Result<()> {
        self.check_for_program()?;
        self.check_not_waiting()?;
        while !self.stack.is_empty() {
            self.stack.pop(&mut self.cpu)?;
            if self.is_boundary(self.cpu.pc()) {
                break;
            }
        }
        Ok(())
    }

    /// Reverts the whole history. Memory outside of what executions wrote
    /// is left alone; use `Memory::reset` for that.
    pub fn reset(&mut self) -> Result<()> {
        self.check_not_waiting()?;
        while !self.stack.is_empty() {
            self.stack.pop(&mut self.cpu)?;
        }
        Ok(())
    }

    fn check_for_program(&self) -> Result<Rc<Program>> {
        match self.cpu.program() {
            Some(program) => Ok(Rc::clone(program)),
            None => Err(error!(NoProgram; "LOAD A PROGRAM BEFORE RUNNING")),
        }
    }

    fn check_not_waiting(&self) -> Result<()> {
        if self.stack.is_pending() {
            Err(error!(InputPending))
        } else {
            Ok(())
        }
    }

    fn event(&self, progress: Progress) -> Event {
        match progress {
            Progress::Waiting => Event::Input,
            Progress::Complete if self.is_done() => Event::End,
            Progress::Complete => Event::Stopped,
        }
    }
}
