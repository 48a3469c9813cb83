//! Text form of a compiled program.
//!
//! ```text
//! ; count to three
//! .data 03 00 00 00 00 00 00 00
//! .var limit 0 8 1.1-1.12
//! * 1: LOAD_I(0)
//! * 2: ADD_I(1)
//!   2: INTERRUPT(1)
//! ```
//!
//! `*` marks the first instruction of a source statement and the number
//! before `:` is the source line the instruction was generated from.

use super::{Instruction, LineNumber, Location, Metadata, Position, Program, Variable};
use crate::error;
use crate::lang::Error;
use crate::mach::{Opcode, Word};
use std::str::FromStr;

type Result<T> = std::result::Result<T, Error>;

impl FromStr for Program {
    type Err = Error;

    fn from_str(s: &str) -> Result<Program> {
        let mut program = Program::default();
        for (index, text) in s.lines().enumerate() {
            let line_number = index as LineNumber + 1;
            let text = match text.find(';') {
                Some(pos) => &text[..pos],
                None => text,
            }
            .trim();
            if text.is_empty() {
                continue;
            }
            let result = if let Some(rest) = text.strip_prefix(".data") {
                parse_data(rest, &mut program.data)
            } else if let Some(rest) = text.strip_prefix(".var") {
                parse_variable(rest).map(|var| {
                    program.metadata.variables.insert(var.address, var);
                })
            } else {
                parse_instruction(text, &mut program)
            };
            result.map_err(|e| e.in_line_number(line_number))?;
        }
        Ok(program)
    }
}

fn parse_data(s: &str, data: &mut Vec<u8>) -> Result<()> {
    for byte in s.split_whitespace() {
        match u8::from_str_radix(byte, 16) {
            Ok(b) => data.push(b),
            Err(_) => return Err(error!(SyntaxError; &format!("BAD DATA BYTE `{}`", byte))),
        }
    }
    Ok(())
}

fn parse_variable(s: &str) -> Result<Variable> {
    let fields: Vec<&str> = s.split_whitespace().collect();
    if fields.len() != 4 {
        return Err(error!(SyntaxError; "EXPECTED `.var NAME ADDRESS SIZE BEGIN-END`"));
    }
    let (begin, end) = match fields[3].find('-') {
        Some(pos) => (&fields[3][..pos], &fields[3][pos + 1..]),
        None => return Err(error!(SyntaxError; "EXPECTED `BEGIN-END` LOCATION")),
    };
    Ok(Variable {
        name: fields[0].to_string(),
        address: parse_unsigned(fields[1])? as usize,
        size: parse_unsigned(fields[2])?,
        declared_at: Location {
            begin: parse_position(begin)?,
            end: parse_position(end)?,
        },
    })
}

fn parse_position(s: &str) -> Result<Position> {
    let mut parts = s.splitn(2, '.');
    let line = parse_unsigned(parts.next().unwrap_or(""))?;
    let column = match parts.next() {
        Some(c) => parse_unsigned(c)?,
        None => 0,
    };
    Ok(Position { line, column })
}

fn parse_instruction(s: &str, program: &mut Program) -> Result<()> {
    let (boundary, s) = match s.strip_prefix('*') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let (source_line, s) = match s.find(':') {
        Some(pos) => (parse_unsigned(s[..pos].trim())?, s[pos + 1..].trim()),
        None => return Err(error!(SyntaxError; "EXPECTED `LINE:` BEFORE INSTRUCTION")),
    };
    let open = s
        .find('(')
        .ok_or_else(|| error!(SyntaxError; "EXPECTED `(`"))?;
    let close = match s.rfind(')') {
        Some(pos) if pos > open && s[pos + 1..].trim().is_empty() => pos,
        _ => return Err(error!(SyntaxError; "EXPECTED `)`")),
    };
    let mnemonic = s[..open].trim();
    let operands = s[open + 1..close]
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(parse_word)
        .collect::<Result<Vec<Word>>>()?;

    let instruction = if let Some(code) = mnemonic.strip_prefix('#') {
        let code = code
            .parse::<u8>()
            .map_err(|_| error!(SyntaxError; &format!("BAD OPCODE `{}`", mnemonic)))?;
        Instruction::from_raw(code, operands)
    } else {
        let op = Opcode::from_str(mnemonic)
            .map_err(|_| error!(UnknownMnemonic; mnemonic))?;
        if op.arity() != operands.len() {
            return Err(error!(OperandCount; &format!(
                "{} TAKES {}, GOT {}",
                op,
                op.arity(),
                operands.len()
            )));
        }
        Instruction::new(op, &operands)
    };

    let index = program.instructions.len();
    program.instructions.push(instruction);
    if boundary {
        program.metadata.statement_boundaries.push(index);
    }
    program.metadata.source_lines.push(source_line);
    Ok(())
}

fn parse_unsigned(s: &str) -> Result<u64> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|_| error!(SyntaxError; &format!("BAD NUMBER `{}`", s)))
}

fn parse_word(s: &str) -> Result<Word> {
    match s.strip_prefix('-') {
        Some(rest) => rest
            .parse::<u64>()
            .map(|v| (v as Word).wrapping_neg())
            .map_err(|_| error!(SyntaxError; &format!("BAD NUMBER `{}`", s))),
        None => parse_unsigned(s).map(|v| v as Word),
    }
}

/// Builds the metadata a listing would carry when every instruction starts a
/// new statement on its own source line.
pub fn one_statement_per_instruction(instructions: Vec<Instruction>) -> Program {
    let len = instructions.len();
    let metadata = Metadata {
        statement_boundaries: (0..len).collect(),
        source_lines: (1..=len as LineNumber).collect(),
        ..Metadata::default()
    };
    Program::new(instructions, vec![], metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_parse_listing() {
        let program: Program = "
            ; header
            .data 05 00 00 00 00 00 00 00
            .data ff
            .var n 0 8 1.5-1.6
            * 1: LOAD_I(0x10)
              1: SET(0)
            * 2: INTERRUPT(1) ; write
              2: #42(3, -4)
        "
        .parse()
        .unwrap();
        assert_eq!(program.data, vec![5, 0, 0, 0, 0, 0, 0, 0, 0xff]);
        assert_eq!(program.len(), 4);
        assert_eq!(program.instructions[0], Instruction::new(Opcode::LoadI, &[16]));
        assert_eq!(program.instructions[3].opcode(), 42);
        assert_eq!(program.instructions[3].operands(), &[3, -4]);
        assert_eq!(program.metadata.statement_boundaries, vec![0, 2]);
        assert_eq!(program.metadata.source_lines, vec![1, 1, 2, 2]);
        let var = &program.metadata.variables[&0];
        assert_eq!(var.name, "n");
        assert_eq!(var.declared_at.end, Position { line: 1, column: 6 });
    }

    #[test]
    fn test_display_parses_back() {
        let text = ".data 01 02\n.var x 8 4 2.1-2.9\n* 2: LOAD(8)\n  2: NEGATE()\n* 3: JUMP(0)\n";
        let program: Program = text.parse().unwrap();
        assert_eq!(program.to_string(), text);
        assert_eq!(program.to_string().parse::<Program>().unwrap(), program);
    }

    #[test]
    fn test_errors_carry_listing_line() {
        let e = "* 1: LOAD_I(1)\n* 2: FROB(1)".parse::<Program>().unwrap_err();
        assert_eq!(e.code(), ErrorCode::UnknownMnemonic);
        assert_eq!(e.line_number(), Some(2));
        let e = "* 1: ADD()".parse::<Program>().unwrap_err();
        assert_eq!(e.code(), ErrorCode::OperandCount);
        let e = "LOAD_I(1)".parse::<Program>().unwrap_err();
        assert_eq!(e.code(), ErrorCode::SyntaxError);
        let e = ".data zz".parse::<Program>().unwrap_err();
        assert_eq!(e.code(), ErrorCode::SyntaxError);
    }

    #[test]
    fn test_extreme_operands() {
        let program: Program = "* 1: LOAD_I(-9223372036854775808)\n* 1: LOAD_I(0xffffffffffffffff)"
            .parse()
            .unwrap();
        assert_eq!(program.instructions[0].operand(0), Word::MIN);
        assert_eq!(program.instructions[1].operand(0), -1);
    }
}
