use super::LineNumber;
use crate::mach::{Address, Memory, Word};
use std::collections::BTreeMap;

/// ## Source position reported by the compiler

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: LineNumber,
    pub column: u64,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub begin: Position,
    pub end: Position,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, ":{}", self.begin)
    }
}

/// ## Declared variable
///
/// The compiler places every variable at a fixed byte address. Memory always
/// holds full 64-bit words; `size` is the declared width in bytes.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub address: Address,
    pub size: u64,
    pub declared_at: Location,
}

impl Variable {
    /// Name qualified by declaration site, unique even for shadowed names.
    pub fn id(&self) -> String {
        format!("{}{}", self.name, self.declared_at)
    }

    /// The word at the variable's address narrowed to its declared width.
    pub fn value(&self, memory: &Memory) -> Word {
        let word = memory.read(self.address);
        match self.size {
            1..=7 => {
                let shift = 64 - 8 * self.size as u32;
                (word << shift) >> shift
            }
            _ => word,
        }
    }
}

/// ## Compiler metadata attached to a program

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub statement_boundaries: Vec<Address>,
    pub source_lines: Vec<LineNumber>,
    pub variables: BTreeMap<Address, Variable>,
}

impl Metadata {
    pub fn source_line(&self, index: Address) -> Option<LineNumber> {
        self.source_lines.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(size: u64) -> Variable {
        Variable {
            name: "a".into(),
            address: 8,
            size,
            declared_at: Location::default(),
        }
    }

    #[test]
    fn test_value_is_narrowed_to_declared_width() {
        let mut memory = Memory::new(32);
        memory.write(8, 0x1ff);
        assert_eq!(var(8).value(&memory), 0x1ff);
        assert_eq!(var(1).value(&memory), -1);
        assert_eq!(var(2).value(&memory), 0x1ff);
        memory.write(8, 0x7f);
        assert_eq!(var(1).value(&memory), 127);
    }

    #[test]
    fn test_id_includes_declaration_site() {
        let mut v = var(8);
        v.declared_at.begin = Position { line: 3, column: 5 };
        assert_eq!(v.id(), "a:3.5");
    }
}
