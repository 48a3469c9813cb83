use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// ## Virtual machine instruction set
///
/// The machine has two registers: the program counter and the accumulator X.
/// Instructions read an operand from memory or take it immediately (`_I`
/// suffix), combine it with X, and leave the result in X.
///
/// For example: `a = a - 1` compiles to `[LOAD_I(1), SUBTRACT(a), SET(a)]`
///
/// Numeric codes are shared with the compiler and must not change.

#[derive(
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    TryFromPrimitive,
    IntoPrimitive,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Opcode {
    Noop = 0,

    // *** Data movement
    Load = 1,
    Set = 2,
    LoadBp = 3,
    LoadI = 4,

    // *** Stack frames (reserved)
    Push = 10,
    Pop = 11,
    Call = 12,
    Ret = 13,

    // *** Integer arithmetic
    Negate = 100,
    Add = 101,
    Subtract = 102,
    Multiply = 103,
    Divide = 104,
    Remainder = 105,
    AddI = 106,
    SubtractI = 107,
    MultiplyI = 108,
    DivideI = 109,
    RemainderI = 110,

    // *** Floating point (reserved)
    FNegate = 111,
    FAdd = 112,
    FSubtract = 113,
    FMultiply = 114,
    FDivide = 115,
    FAddI = 116,
    FSubtractI = 117,
    FMultiplyI = 118,
    FDivideI = 119,

    // *** Bitwise and logic
    Or = 160,
    And = 161,
    Xor = 162,
    Invert = 163,
    Gt = 164,
    Lt = 165,
    Gteq = 166,
    Lteq = 167,
    Equals = 168,
    Not = 169,
    OrI = 170,
    AndI = 171,
    XorI = 172,

    // *** Branch control
    Jump = 200,
    BranchIfZero = 201,
    BranchIfNotZero = 202,

    Interrupt = 255,
}

/// Services of the `INTERRUPT` instruction, selected by its operand.
#[derive(Display, TryFromPrimitive, IntoPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Syscall {
    Read = 0,
    Write = 1,
}

impl Opcode {
    pub fn code(self) -> u8 {
        self.into()
    }

    pub fn arity(self) -> usize {
        use Opcode::*;
        match self {
            Noop | LoadBp | Push | Pop | Call | Ret | Negate | Invert | Not => 0,
            _ => 1,
        }
    }

    /// The operand is the byte address of a memory word.
    pub fn has_address_operand(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            Load | Set
                | Add
                | Subtract
                | Multiply
                | Divide
                | Remainder
                | Or
                | And
                | Xor
                | Gt
                | Lt
                | Gteq
                | Lteq
                | Equals
        )
    }

    /// Instructions kept for compatibility with the compiler that do
    /// nothing besides advancing or setting the sentinel.
    pub fn is_reserved(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            LoadBp
                | Push
                | Pop
                | Call
                | Ret
                | FNegate
                | FAdd
                | FSubtract
                | FMultiply
                | FDivide
                | FAddI
                | FSubtractI
                | FMultiplyI
                | FDivideI
        )
    }

    pub fn description(self) -> &'static str {
        use Opcode::*;
        match self {
            Noop => "Nothing happens.",
            Load => "The word at the operand address is loaded into X.",
            Set => "The value of X is stored at the operand address.",
            LoadI => "The operand is loaded into X.",
            LoadBp | Push | Pop | Call | Ret => "Not implemented.",
            Negate => "Negates the value in X.",
            Add => "Adds the word at the operand address and X. The result is stored in X.",
            Subtract => {
                "Subtracts X from the word at the operand address. The result is stored in X."
            }
            Multiply => {
                "Multiplies the word at the operand address by X. The result is stored in X."
            }
            Divide => "Divides the word at the operand address by X. The result is stored in X.",
            Remainder => {
                "Remainder of dividing the word at the operand address by X. \
                 The result is stored in X."
            }
            AddI => "Adds the operand to X. The result is stored in X.",
            SubtractI => "Subtracts the operand from X. The result is stored in X.",
            MultiplyI => "Multiplies X by the operand. The result is stored in X.",
            DivideI => "Divides X by the operand. The result is stored in X.",
            RemainderI => "Remainder of dividing X by the operand. The result is stored in X.",
            FNegate | FAdd | FSubtract | FMultiply | FDivide | FAddI | FSubtractI
            | FMultiplyI | FDivideI => "Not implemented.",
            Or => "Bitwise `or` of the word at the operand address and X, stored in X.",
            And => "Bitwise `and` of the word at the operand address and X, stored in X.",
            Xor => "Bitwise `exclusive or` of the word at the operand address and X, stored in X.",
            Invert => "Inverts every bit of X.",
            Gt => "X becomes 1 if the word at the operand address is greater than X, else 0.",
            Lt => "X becomes 1 if the word at the operand address is less than X, else 0.",
            Gteq => {
                "X becomes 1 if the word at the operand address is greater than or equal \
                 to X, else 0."
            }
            Lteq => {
                "X becomes 1 if the word at the operand address is less than or equal \
                 to X, else 0."
            }
            Equals => "X becomes 1 if the word at the operand address equals X, else 0.",
            Not => "Logical not: X becomes 1 if it was 0, else 0.",
            OrI => "Bitwise `or` of the operand and X, stored in X.",
            AndI => "Bitwise `and` of the operand and X, stored in X.",
            XorI => "Bitwise `exclusive or` of the operand and X, stored in X.",
            Jump => "The operand becomes the index of the next instruction.",
            BranchIfZero => "If X is 0, the operand becomes the index of the next instruction.",
            BranchIfNotZero => {
                "If X is not 0, the operand becomes the index of the next instruction."
            }
            Interrupt => {
                "Performs a syscall. Operand 0 reads input into the address in X; \
                 operand 1 writes X to the output."
            }
        }
    }
}
