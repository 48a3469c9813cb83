use super::Metadata;
use crate::mach::{Address, Opcode, Word};
use std::convert::TryFrom;

/// Reported for operands the instruction does not have.
pub const MISSING_OPERAND: Word = 0xBAD;

/// ## One compiled instruction
///
/// The opcode is kept as the raw byte emitted by the compiler so that codes
/// unknown to this machine survive loading and can be shown in listings.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: u8,
    operands: Vec<Word>,
}

impl Instruction {
    pub fn new(op: Opcode, operands: &[Word]) -> Instruction {
        debug_assert_eq!(op.arity(), operands.len());
        Instruction {
            opcode: op.code(),
            operands: operands.to_vec(),
        }
    }

    pub fn from_raw(opcode: u8, operands: Vec<Word>) -> Instruction {
        Instruction { opcode, operands }
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn op(&self) -> Option<Opcode> {
        Opcode::try_from(self.opcode).ok()
    }

    pub fn mnemonic(&self) -> String {
        match self.op() {
            Some(op) => op.to_string(),
            None => format!("#{}", self.opcode),
        }
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    pub fn operand(&self, index: usize) -> Word {
        self.operands
            .get(index)
            .copied()
            .unwrap_or(MISSING_OPERAND)
    }

    pub fn operands(&self) -> &[Word] {
        &self.operands
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let operands: Vec<String> = self.operands.iter().map(|o| o.to_string()).collect();
        write!(f, "{}({})", self.mnemonic(), operands.join(", "))
    }
}

/// ## Compiled program
///
/// Output of the compiler: code, the initial data segment, and metadata.
/// The processor only ever reads it.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub data: Vec<u8>,
    pub instructions: Vec<Instruction>,
    pub metadata: Metadata,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>, data: Vec<u8>, metadata: Metadata) -> Program {
        Program {
            data,
            instructions,
            metadata,
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instruction(&self, index: Address) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn is_boundary(&self, index: Address) -> bool {
        self.metadata.statement_boundaries.contains(&index)
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for chunk in self.data.chunks(16) {
            let bytes: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
            writeln!(f, ".data {}", bytes.join(" "))?;
        }
        for var in self.metadata.variables.values() {
            let at = &var.declared_at;
            writeln!(
                f,
                ".var {} {} {} {}-{}",
                var.name, var.address, var.size, at.begin, at.end
            )?;
        }
        for (index, instruction) in self.instructions.iter().enumerate() {
            let marker = if self.is_boundary(index) { '*' } else { ' ' };
            let line = self.metadata.source_line(index).unwrap_or(0);
            writeln!(f, "{} {}: {}", marker, line, instruction)?;
        }
        Ok(())
    }
}
