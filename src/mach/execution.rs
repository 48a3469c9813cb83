use super::{Address, Cpu, Opcode, Read, Syscall, Ticket, Word};
use crate::error;
use crate::lang::{Error, Instruction};
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// X after any floating point instruction.
pub const FLOAT_SENTINEL: Word = 0xBAD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Complete,
    /// Blocked on the input channel. Apply again to resume.
    Waiting,
}

/// The state an execution overwrites, saved before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    /// Only the program counter advances.
    Step,
    /// X is replaced and the program counter advances.
    Accumulator { previous: Word },
    /// The program counter is replaced.
    Branch { previous: Address },
    /// One memory word is replaced and the program counter advances.
    Store { address: Address, previous: Word },
}

/// ## One executed instruction
///
/// Created immediately before the instruction runs. `revert` puts back only
/// what `apply` changed; rewinding further is the stack's job.
///
/// `INTERRUPT` is the one exception to exact reversal: a value taken from
/// the input channel (and the memory word it was stored to) or sent to the
/// output channel stays where it is.

#[derive(Debug)]
pub struct Execution {
    index: Address,
    instruction: Instruction,
    effect: Effect,
    ticket: Option<Ticket>,
}

impl Execution {
    pub fn capture(instruction: &Instruction, cpu: &Cpu) -> Execution {
        use Opcode::*;
        let effect = match instruction.op() {
            None => {
                log::warn!(
                    "no handler for instruction {} at {}, treating it as NOOP",
                    instruction.mnemonic(),
                    cpu.pc()
                );
                Effect::Step
            }
            Some(Noop) | Some(LoadBp) | Some(Push) | Some(Pop) | Some(Call) | Some(Ret) => {
                Effect::Step
            }
            Some(Set) => {
                let address = instruction.operand(0) as Address;
                Effect::Store {
                    address,
                    previous: cpu.memory().read(address),
                }
            }
            Some(Jump) | Some(BranchIfZero) | Some(BranchIfNotZero) => Effect::Branch {
                previous: cpu.pc(),
            },
            Some(_) => Effect::Accumulator { previous: cpu.x() },
        };
        Execution {
            index: cpu.pc(),
            instruction: instruction.clone(),
            effect,
            ticket: None,
        }
    }

    pub fn index(&self) -> Address {
        self.index
    }

    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    pub fn apply(&mut self, cpu: &mut Cpu) -> Result<Progress> {
        match self.effect {
            Effect::Step => cpu.inc_pc(),
            Effect::Store { address, .. } => {
                let x = cpu.x();
                cpu.memory_mut().write(address, x);
                cpu.inc_pc();
            }
            Effect::Branch { .. } => {
                let target = self.branch_target(cpu);
                cpu.set_pc(target);
            }
            Effect::Accumulator { .. } => {
                if self.instruction.op() == Some(Opcode::Interrupt) {
                    return self.interrupt(cpu);
                }
                let value = self.accumulate(cpu)?;
                cpu.set_x(value);
                cpu.inc_pc();
            }
        }
        Ok(Progress::Complete)
    }

    pub fn revert(&self, cpu: &mut Cpu) {
        match self.effect {
            Effect::Step => cpu.dec_pc(),
            Effect::Accumulator { previous } => {
                cpu.dec_pc();
                cpu.set_x(previous);
            }
            Effect::Branch { previous } => cpu.set_pc(previous),
            Effect::Store { address, previous } => {
                cpu.dec_pc();
                cpu.memory_mut().write(address, previous);
            }
        }
    }

    fn branch_target(&self, cpu: &Cpu) -> Address {
        let target = self.instruction.operand(0) as Address;
        match self.instruction.op() {
            Some(Opcode::Jump) => target,
            Some(Opcode::BranchIfZero) if cpu.x() == 0 => target,
            Some(Opcode::BranchIfNotZero) if cpu.x() != 0 => target,
            _ => cpu.pc() + 1,
        }
    }

    /// New value of X. Nothing is modified, so a failure leaves no trace.
    fn accumulate(&self, cpu: &Cpu) -> Result<Word> {
        use Opcode::*;
        let x = cpu.x();
        let operand = self.instruction.operand(0);
        let mem = || cpu.memory().read(operand as Address);
        let value = match self.instruction.op() {
            Some(Load) => mem(),
            Some(LoadI) => operand,

            Some(Negate) => x.wrapping_neg(),
            Some(Add) => mem().wrapping_add(x),
            Some(Subtract) => mem().wrapping_sub(x),
            Some(Multiply) => mem().wrapping_mul(x),
            Some(Divide) => {
                if x == 0 {
                    return Err(division_by_zero(cpu));
                }
                mem().wrapping_div(x)
            }
            Some(Remainder) => {
                if x == 0 {
                    return Err(division_by_zero(cpu));
                }
                mem().wrapping_rem(x)
            }
            Some(AddI) => x.wrapping_add(operand),
            Some(SubtractI) => x.wrapping_sub(operand),
            Some(MultiplyI) => x.wrapping_mul(operand),
            Some(DivideI) => {
                if operand == 0 {
                    return Err(division_by_zero(cpu));
                }
                x.wrapping_div(operand)
            }
            Some(RemainderI) => {
                if operand == 0 {
                    return Err(division_by_zero(cpu));
                }
                x.wrapping_rem(operand)
            }

            Some(FNegate) | Some(FAdd) | Some(FSubtract) | Some(FMultiply) | Some(FDivide)
            | Some(FAddI) | Some(FSubtractI) | Some(FMultiplyI) | Some(FDivideI) => {
                FLOAT_SENTINEL
            }

            Some(Or) => mem() | x,
            Some(And) => mem() & x,
            Some(Xor) => mem() ^ x,
            Some(Invert) => !x,
            Some(Gt) => (mem() > x) as Word,
            Some(Lt) => (mem() < x) as Word,
            Some(Gteq) => (mem() >= x) as Word,
            Some(Lteq) => (mem() <= x) as Word,
            Some(Equals) => (mem() == x) as Word,
            Some(Not) => (x == 0) as Word,
            Some(OrI) => x | operand,
            Some(AndI) => x & operand,
            Some(XorI) => x ^ operand,

            _ => x,
        };
        Ok(value)
    }

    fn interrupt(&mut self, cpu: &mut Cpu) -> Result<Progress> {
        let operand = self.instruction.operand(0);
        let call = u8::try_from(operand)
            .ok()
            .and_then(|code| Syscall::try_from(code).ok());
        match call {
            Some(Syscall::Read) => {
                let value = match self.ticket {
                    Some(ticket) => match cpu.input().poll(ticket) {
                        Some(value) => value,
                        None => return Ok(Progress::Waiting),
                    },
                    None => match cpu.input().read() {
                        Read::Ready(value) => value,
                        Read::Pending(ticket) => {
                            self.ticket = Some(ticket);
                            return Ok(Progress::Waiting);
                        }
                    },
                };
                self.ticket = None;
                let address = cpu.x() as Address;
                cpu.memory_mut().write(address, value);
            }
            Some(Syscall::Write) => {
                let x = cpu.x();
                cpu.output().write(x);
            }
            None => log::warn!("unknown syscall {} at {}", operand, self.index),
        }
        cpu.inc_pc();
        Ok(Progress::Complete)
    }
}

impl std::fmt::Display for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.index, self.instruction)
    }
}

fn division_by_zero(cpu: &Cpu) -> Error {
    let pc = cpu.pc();
    let error = error!(DivisionByZero).at_instruction(pc);
    match cpu.source_line(pc) {
        Some(line) => error.in_line_number(line),
        None => error,
    }
}
