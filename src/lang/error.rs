use super::LineNumber;
use crate::mach::Address;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    line_number: Option<LineNumber>,
    instruction: Option<Address>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            instruction: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn line_number(&self) -> Option<LineNumber> {
        self.line_number
    }

    pub fn instruction(&self) -> Option<Address> {
        self.instruction
    }

    pub fn in_line_number(self, line: LineNumber) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            line_number: Some(line),
            ..self
        }
    }

    pub fn at_instruction(self, index: Address) -> Error {
        debug_assert!(self.instruction.is_none());
        Error {
            instruction: Some(index),
            ..self
        }
    }

    pub fn message(self, message: &str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            message: message.to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    SyntaxError = 2,
    DivisionByZero = 11,
    NoProgram = 21,
    EmptyHistory = 22,
    InputPending = 23,
    UnknownMnemonic = 24,
    OperandCount = 25,
    AddressOutOfRange = 26,
    InternalError = 51,
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorCode::*;
        let code_str = match self.code {
            SyntaxError => "SYNTAX ERROR",
            DivisionByZero => "DIVISION BY ZERO",
            NoProgram => "NO PROGRAM",
            EmptyHistory => "CANNOT UNDO: NO HISTORY",
            InputPending => "WAITING FOR INPUT",
            UnknownMnemonic => "UNKNOWN MNEMONIC",
            OperandCount => "WRONG NUMBER OF OPERANDS",
            AddressOutOfRange => "ADDRESS OUT OF RANGE",
            InternalError => "INTERNAL ERROR",
        };
        let mut suffix = String::new();
        if let Some(line_number) = self.line_number {
            suffix.push_str(&format!(" IN {}", line_number));
        }
        if let Some(index) = self.instruction {
            suffix.push_str(&format!(" AT INSTRUCTION {}", index));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        write!(f, "{}{}", code_str, suffix)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        error!(InternalError; &error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_by_zero_display() {
        let e = error!(DivisionByZero, 7).at_instruction(3);
        assert_eq!(e.to_string(), "DIVISION BY ZERO IN 7 AT INSTRUCTION 3");
        assert_eq!(e.code(), ErrorCode::DivisionByZero);
    }

    #[test]
    fn test_message_suffix() {
        let e = error!(SyntaxError, 4; "EXPECTED `(`");
        assert_eq!(e.to_string(), "SYNTAX ERROR IN 4; EXPECTED `(`");
        let e = error!(NoProgram);
        assert_eq!(e.to_string(), "NO PROGRAM");
        assert_eq!(e.line_number(), None);
    }
}
