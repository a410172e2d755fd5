//! The 68000 effective-address taxonomy.
//!
//! Opcodes carry an addressing mode in a 6-bit MMMXXX field: three mode bits
//! followed by three register bits. Modes 0..6 use the register bits as a
//! register number; mode 7 reuses them to select one of five register-less modes.
use super::*;
use std::ops::{BitAnd, BitOr, Not, Sub};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum AddressingMode {
    DataReg = 0,
    AddrReg,
    Addr,
    AddrPostInc,
    AddrPreDec,
    AddrDisp,
    AddrIndex,
    PcDisp,
    PcIndex,
    AbsShort,
    AbsLong,
    Immediate,
}
pub const ALL_MODES: [AddressingMode; 12] = [
    AddressingMode::DataReg,
    AddressingMode::AddrReg,
    AddressingMode::Addr,
    AddressingMode::AddrPostInc,
    AddressingMode::AddrPreDec,
    AddressingMode::AddrDisp,
    AddressingMode::AddrIndex,
    AddressingMode::PcDisp,
    AddressingMode::PcIndex,
    AddressingMode::AbsShort,
    AddressingMode::AbsLong,
    AddressingMode::Immediate,
];

impl AddressingMode {
    /// true if the low three bits of the field are a register number
    pub fn has_register(&self) -> bool { (*self as usize) <= AddressingMode::AddrIndex as usize }
    pub fn set(&self) -> ModeSet { ModeSet(1 << *self as u16) }
    /// Build the MMMXXX field for this mode. `reg` is ignored for register-less modes.
    #[cfg(test)]
    pub fn encode(&self, reg: u8) -> u8 {
        let reg = reg & 0b111;
        match self {
            AddressingMode::DataReg => reg,
            AddressingMode::AddrReg => 0b001_000 | reg,
            AddressingMode::Addr => 0b010_000 | reg,
            AddressingMode::AddrPostInc => 0b011_000 | reg,
            AddressingMode::AddrPreDec => 0b100_000 | reg,
            AddressingMode::AddrDisp => 0b101_000 | reg,
            AddressingMode::AddrIndex => 0b110_000 | reg,
            AddressingMode::AbsShort => 0b111_000,
            AddressingMode::AbsLong => 0b111_001,
            AddressingMode::PcDisp => 0b111_010,
            AddressingMode::PcIndex => 0b111_011,
            AddressingMode::Immediate => 0b111_100,
        }
    }
}

/// Decode an MMMXXX field. Register values 5, 6 and 7 under mode 111 are reserved.
pub fn decode_mode(field: u8) -> Result<AddressingMode, Mismatch> {
    let reg = field & 0b111;
    Ok(match (field >> 3) & 0b111 {
        0 => AddressingMode::DataReg,
        1 => AddressingMode::AddrReg,
        2 => AddressingMode::Addr,
        3 => AddressingMode::AddrPostInc,
        4 => AddressingMode::AddrPreDec,
        5 => AddressingMode::AddrDisp,
        6 => AddressingMode::AddrIndex,
        _ => match reg {
            0 => AddressingMode::AbsShort,
            1 => AddressingMode::AbsLong,
            2 => AddressingMode::PcDisp,
            3 => AddressingMode::PcIndex,
            4 => AddressingMode::Immediate,
            _ => return Err(Mismatch::ReservedEncoding(field & 0b111_111)),
        },
    })
}

/// A set of addressing modes, one bit per mode.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSet(pub u16);

pub const MODES_DATA: ModeSet = ModeSet(1 << AddressingMode::DataReg as u16);
pub const MODES_ADDR: ModeSet = ModeSet(1 << AddressingMode::AddrReg as u16);
pub const MODES_ADDR_IND: ModeSet = ModeSet(
    1 << AddressingMode::Addr as u16 | 1 << AddressingMode::AddrPostInc as u16 | 1 << AddressingMode::AddrPreDec as u16,
);
pub const MODES_ADDR_OFFSET: ModeSet =
    ModeSet(1 << AddressingMode::AddrDisp as u16 | 1 << AddressingMode::AddrIndex as u16);
pub const MODES_ABS: ModeSet = ModeSet(1 << AddressingMode::AbsShort as u16 | 1 << AddressingMode::AbsLong as u16);
pub const MODES_PC: ModeSet = ModeSet(1 << AddressingMode::PcDisp as u16 | 1 << AddressingMode::PcIndex as u16);
pub const MODES_IMM: ModeSet = ModeSet(1 << AddressingMode::Immediate as u16);
pub const MODES_ALL: ModeSet = ModeSet(0x0fff);
/// memory modes that may be written
pub const MODES_MEM_ALTERABLE: ModeSet = ModeSet(MODES_ADDR_IND.0 | MODES_ADDR_OFFSET.0 | MODES_ABS.0);
/// data register or writable memory
pub const MODES_DATA_ALTERABLE: ModeSet = ModeSet(MODES_DATA.0 | MODES_MEM_ALTERABLE.0);

impl ModeSet {
    pub fn contains(&self, mode: AddressingMode) -> bool { self.0 & mode.set().0 != 0 }
    #[cfg(test)]
    pub fn is_empty(&self) -> bool { self.0 == 0 }
    pub fn iter(&self) -> impl Iterator<Item = AddressingMode> + '_ {
        ALL_MODES.iter().copied().filter(move |m| self.contains(*m))
    }
}
impl From<AddressingMode> for ModeSet {
    fn from(mode: AddressingMode) -> Self { mode.set() }
}
impl BitOr for ModeSet {
    type Output = ModeSet;
    fn bitor(self, rhs: ModeSet) -> ModeSet { ModeSet(self.0 | rhs.0) }
}
impl BitOr<AddressingMode> for ModeSet {
    type Output = ModeSet;
    fn bitor(self, rhs: AddressingMode) -> ModeSet { self | rhs.set() }
}
impl BitAnd for ModeSet {
    type Output = ModeSet;
    fn bitand(self, rhs: ModeSet) -> ModeSet { ModeSet(self.0 & rhs.0) }
}
impl Sub for ModeSet {
    type Output = ModeSet;
    fn sub(self, rhs: ModeSet) -> ModeSet { ModeSet(self.0 & !rhs.0) }
}
impl Not for ModeSet {
    type Output = ModeSet;
    fn not(self) -> ModeSet { ModeSet(!self.0 & MODES_ALL.0) }
}
impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_set().entries(self.iter()).finish() }
}
