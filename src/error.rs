use crate::modes::AddressingMode;
use std::{convert::From, fmt};

/// Simple custom Error for the generator
pub struct Error {
    pub kind: ErrorKind,
    /// the opcode being generated when the error occurred (if any)
    pub opcode: Option<u16>,
    pub msg: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// a format template contains a token outside the grammar (fatal)
    UnrecognizedToken,
    /// addressing field uses a reserved register value under mode 111
    ReservedEncoding,
    /// size field value outside the token's accepted set
    SizeEncodingMismatch,
    /// literal bit in the template differs from the opcode
    BitMismatch,
    /// addressing mode not in the legality mask for its position
    IllegalMode,
    /// the pattern list itself is inconsistent (fatal)
    Specification,
    /// underlying io error
    IO,
    /// catch-all for test helpers
    #[cfg(test)]
    General,
}
impl ErrorKind {
    #[cfg(test)]
    /// Fatal errors abort generation; the others only mean "this pattern does not match".
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ErrorKind::ReservedEncoding
                | ErrorKind::SizeEncodingMismatch
                | ErrorKind::BitMismatch
                | ErrorKind::IllegalMode
        )
    }
}

impl Error {
    pub fn new(kind: ErrorKind, opcode: Option<u16>, message: &str) -> Error {
        Error {
            kind,
            opcode,
            msg: String::from(message),
        }
    }
    pub fn with_opcode(mut self, opcode: u16) -> Self {
        self.opcode.get_or_insert(opcode);
        self
    }
}

/// Why a pattern rejected an opcode. This is the cheap form used during the
/// full opcode scan; it becomes an Error only when somebody wants to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    /// a literal bit differs (column within the template)
    Bits(usize),
    /// register field 5/6/7 under mode 111
    ReservedEncoding(u8),
    /// size bits not accepted by the S/S2/S3 token
    SizeEncoding(u8),
    /// decoded mode not legal at this operand position
    IllegalMode(AddressingMode, usize),
}
impl Mismatch {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Mismatch::Bits(_) => ErrorKind::BitMismatch,
            Mismatch::ReservedEncoding(_) => ErrorKind::ReservedEncoding,
            Mismatch::SizeEncoding(_) => ErrorKind::SizeEncodingMismatch,
            Mismatch::IllegalMode(..) => ErrorKind::IllegalMode,
        }
    }
}
impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mismatch::Bits(col) => write!(f, "literal bit mismatch at column {}", col),
            Mismatch::ReservedEncoding(field) => write!(f, "reserved addressing field {:06b}", field),
            Mismatch::SizeEncoding(bits) => write!(f, "size encoding {:02b} not accepted", bits),
            Mismatch::IllegalMode(mode, pos) => write!(f, "{:?} not legal for operand {}", mode, pos + 1),
        }
    }
}
impl From<Mismatch> for Error {
    fn from(m: Mismatch) -> Self { Error::new(m.kind(), None, m.to_string().as_str()) }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self { Error::new(ErrorKind::IO, None, e.to_string().as_str()) }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({:?}): {}", red!("m68kgen::Error"), self.kind, self.msg)
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut res = write!(f, "{}", self.msg);
        if res.is_ok() {
            if let Some(opcode) = self.opcode {
                res = write!(f, "\nOpcode: 0x{:04x} ({:016b})", opcode, opcode);
            }
        }
        res
    }
}
impl std::error::Error for Error {}
