/*!
## Rust Machine Module

This Rust module is the reversible virtual machine for Tokiwen programs.
Every executed instruction is kept on an execution stack so that it can be
undone exactly, one instruction or one source statement at a time.

*/

/// A machine word: 64-bit two's complement, wrapping on overflow.
pub type Word = i64;
pub type Address = usize;

mod channel;
mod cpu;
mod execution;
mod memory;
mod opcode;
mod processor;
mod stack;

pub use channel::{Channel, ChannelObserver, Read, Ticket};
pub use cpu::{Cpu, ProcessorObserver};
pub use execution::{Execution, Progress, FLOAT_SENTINEL};
pub use memory::{Memory, MemoryObserver};
pub use opcode::{Opcode, Syscall};
pub use processor::{Event, Processor};
pub use stack::ExecutionStack;

/// Size of the word memory of the workbench.
pub const DEFAULT_MEMORY_SIZE: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub memory_size: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            memory_size: DEFAULT_MEMORY_SIZE,
        }
    }
}

#[cfg(test)]
mod tests;
