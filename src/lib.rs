//! # Tokiwen
//!
//! A reversible virtual machine for the Tokiwen teaching language.
//!
//! Programs are compiled elsewhere and arrive as a text listing of
//! instructions, an initial data segment and the compiler's metadata.
//! The machine runs them one instruction or one source statement at a
//! time, and every step can be undone exactly.
//!
//! ```
//! use std::rc::Rc;
//! use tokiwen::lang::Program;
//! use tokiwen::mach::{Event, Processor};
//!
//! let program: Program = "
//!     * 1: LOAD_I(5)
//!     * 2: INTERRUPT(1)
//! ".parse().unwrap();
//! let mut processor = Processor::default();
//! processor.set_program(Rc::new(program)).unwrap();
//! assert_eq!(processor.run_program().unwrap(), Event::End);
//! assert_eq!(processor.output().try_read(), Some(5));
//! processor.undo_one_statement().unwrap();
//! assert_eq!(processor.pc(), 1);
//! ```
//!
//! Run the `tokiwen` executable with a listing file to step through it
//! interactively. Type `help` at the prompt for the list of commands.

pub mod lang;
pub mod mach;
