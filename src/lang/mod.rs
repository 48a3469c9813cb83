/*!
# Rust Language Module

This Rust module describes the compiled programs the machine consumes:
instructions, the initial data segment, and the compiler's metadata.
Programs are produced by the external compiler and loaded from their
text listing.

*/

pub type LineNumber = u64;

#[macro_use]
mod error;
mod assembly;
mod metadata;
mod program;

pub use assembly::one_statement_per_instruction;
pub use error::Error;
pub use error::ErrorCode;
pub use metadata::{Location, Metadata, Position, Variable};
pub use program::{Instruction, Program, MISSING_OPERAND};
