//! Operand generation.
//!
//! An Operand describes how an instruction reaches one of its values for a
//! given addressing mode: what to fetch from the instruction stream before
//! the body runs (`fetch`), side effects around the body (`pre`/`post`),
//! and how to read (`get`) or write (`set`) the value itself.
//!
//! Operands that fetch extension words bind their effective address to a
//! temporary whose id comes from the run's [Temps], so two operands of one
//! instruction never share a name.
use super::ir::*;
use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    DataReg { reg: u8, size: Size },
    AddrReg { reg: u8, size: Size },
    Addr { reg: u8, size: Size },
    AddrPostInc { reg: u8, size: Size },
    AddrPreDec { reg: u8, size: Size },
    AddrDisp { reg: u8, size: Size, id: u32 },
    AddrIndex { reg: u8, size: Size, id: u32 },
    PcDisp { size: Size, id: u32 },
    PcIndex { size: Size, id: u32 },
    AbsShort { size: Size, id: u32 },
    AbsLong { size: Size, id: u32 },
    Immediate { size: Size, id: u32 },
}
use Operand as O;

/// Build the operand for `mode`. `reg` is only meaningful for register-based modes.
pub fn build_operand(mode: AddressingMode, size: Size, reg: u8, temps: &mut Temps) -> Operand {
    let reg = if mode.has_register() { reg & 0b111 } else { 0 };
    match mode {
        AddressingMode::DataReg => O::DataReg { reg, size },
        AddressingMode::AddrReg => O::AddrReg { reg, size },
        AddressingMode::Addr => O::Addr { reg, size },
        AddressingMode::AddrPostInc => O::AddrPostInc { reg, size },
        AddressingMode::AddrPreDec => O::AddrPreDec { reg, size },
        AddressingMode::AddrDisp => O::AddrDisp { reg, size, id: temps.alloc() },
        AddressingMode::AddrIndex => O::AddrIndex { reg, size, id: temps.alloc() },
        AddressingMode::PcDisp => O::PcDisp { size, id: temps.alloc() },
        AddressingMode::PcIndex => O::PcIndex { size, id: temps.alloc() },
        AddressingMode::AbsShort => O::AbsShort { size, id: temps.alloc() },
        AddressingMode::AbsLong => O::AbsLong { size, id: temps.alloc() },
        AddressingMode::Immediate => O::Immediate { size, id: temps.alloc() },
    }
}

/// Operand for a 6-bit MMMXXX field taken straight from an opcode.
pub fn operand_from_field(field: u8, size: Size, temps: &mut Temps) -> Result<Operand, Mismatch> {
    Ok(build_operand(decode_mode(field)?, size, field & 0b111, temps))
}

pub fn data_reg(reg: u8, size: Size) -> Operand { O::DataReg { reg: reg & 0b111, size } }

fn a_reg(n: u8) -> Expr { reg(RegFile::Address, n) }
fn ea(id: u32) -> Expr { temp(Temp::Ea(id)) }

/// Long fetch as two statements so the high word is always read first.
fn fetch_long(var: Var) -> Vec<Stmt> {
    vec![
        Stmt::Let(Size::Long, var, bin(BinOp::Shl, Expr::Fetch, konst(16))),
        Stmt::Assign(Lvalue::Var(var), or(Expr::Var(var), Expr::Fetch)),
    ]
}

/// Brief extension word: D/A (bit 15), register (14-12), W/L (bit 11), 8-bit displacement.
fn fetch_indexed(id: u32, base: Expr) -> Vec<Stmt> {
    let ext = temp(Temp::Ext(id));
    let index_reg = and(bin(BinOp::Shr, ext.clone(), konst(12)), konst(0b111));
    let index_value = select(
        bit_of(ext.clone(), konst(15)),
        Expr::Reg(RegFile::Address, Box::new(index_reg.clone())),
        Expr::Reg(RegFile::Data, Box::new(index_reg)),
    );
    vec![
        Stmt::Let(Size::Word, Var::Temp(Temp::Ext(id)), Expr::Fetch),
        Stmt::Let(Size::Long, Var::Temp(Temp::Index(id)), index_value),
        Stmt::Assign(
            Lvalue::Var(Var::Temp(Temp::Index(id))),
            select(
                bit_of(ext.clone(), konst(11)),
                temp(Temp::Index(id)),
                sign_extend(Size::Word, temp(Temp::Index(id))),
            ),
        ),
        Stmt::Let(
            Size::Long,
            Var::Temp(Temp::Ea(id)),
            add(add(base, sign_extend(Size::Byte, ext)), temp(Temp::Index(id))),
        ),
    ]
}

/// Address of the word following the opcode, the base of PC-relative modes.
fn pc_base() -> Expr { add(Expr::InstrAddr, konst(2)) }

impl Operand {
    #[cfg(test)]
    pub fn mode(&self) -> AddressingMode {
        match self {
            O::DataReg { .. } => AddressingMode::DataReg,
            O::AddrReg { .. } => AddressingMode::AddrReg,
            O::Addr { .. } => AddressingMode::Addr,
            O::AddrPostInc { .. } => AddressingMode::AddrPostInc,
            O::AddrPreDec { .. } => AddressingMode::AddrPreDec,
            O::AddrDisp { .. } => AddressingMode::AddrDisp,
            O::AddrIndex { .. } => AddressingMode::AddrIndex,
            O::PcDisp { .. } => AddressingMode::PcDisp,
            O::PcIndex { .. } => AddressingMode::PcIndex,
            O::AbsShort { .. } => AddressingMode::AbsShort,
            O::AbsLong { .. } => AddressingMode::AbsLong,
            O::Immediate { .. } => AddressingMode::Immediate,
        }
    }
    /// Extension-word fetches; empty for modes that need none.
    pub fn fetch(&self) -> Vec<Stmt> {
        match *self {
            O::AddrDisp { reg, id, .. } => vec![Stmt::Let(
                Size::Long,
                Var::Temp(Temp::Ea(id)),
                add(a_reg(reg), sign_extend(Size::Word, Expr::Fetch)),
            )],
            O::PcDisp { id, .. } => vec![Stmt::Let(
                Size::Long,
                Var::Temp(Temp::Ea(id)),
                add(pc_base(), sign_extend(Size::Word, Expr::Fetch)),
            )],
            O::AddrIndex { reg, id, .. } => fetch_indexed(id, a_reg(reg)),
            O::PcIndex { id, .. } => fetch_indexed(id, pc_base()),
            O::AbsShort { id, .. } => vec![Stmt::Let(
                Size::Long,
                Var::Temp(Temp::Ea(id)),
                sign_extend(Size::Word, Expr::Fetch),
            )],
            O::AbsLong { id, .. } => fetch_long(Var::Temp(Temp::Ea(id))),
            O::Immediate { size: Size::Long, id } => fetch_long(Var::Temp(Temp::Ea(id))),
            O::Immediate { id, .. } => vec![Stmt::Let(Size::Word, Var::Temp(Temp::Ea(id)), Expr::Fetch)],
            _ => Vec::new(),
        }
    }
    pub fn pre(&self) -> Option<Stmt> {
        match *self {
            O::AddrPreDec { reg, size } => Some(Stmt::Assign(
                Lvalue::Reg(RegFile::Address, reg),
                sub(a_reg(reg), konst(size.bytes())),
            )),
            _ => None,
        }
    }
    pub fn post(&self) -> Option<Stmt> {
        match *self {
            O::AddrPostInc { reg, size } => Some(Stmt::Assign(
                Lvalue::Reg(RegFile::Address, reg),
                add(a_reg(reg), konst(size.bytes())),
            )),
            _ => None,
        }
    }
    /// Expression yielding the operand's value at its size.
    pub fn get(&self) -> Expr {
        match *self {
            O::DataReg { reg: n, size } => sized(reg(RegFile::Data, n), size),
            O::AddrReg { reg: n, size } => sized(reg(RegFile::Address, n), size),
            O::Immediate { size: Size::Byte, id } => and(ea(id), konst(0xff)),
            O::Immediate { id, .. } => ea(id),
            O::Addr { reg: n, size } | O::AddrPostInc { reg: n, size } | O::AddrPreDec { reg: n, size } => {
                read(size, a_reg(n))
            }
            O::AddrDisp { id, size, .. }
            | O::AddrIndex { id, size, .. }
            | O::PcDisp { id, size }
            | O::PcIndex { id, size }
            | O::AbsShort { id, size }
            | O::AbsLong { id, size } => read(size, ea(id)),
        }
    }
    /// Statement writing `value`, preserving the untouched bits of registers.
    /// Immediates cannot be written; asking for it means the pattern list is wrong.
    pub fn set(&self, value: Expr) -> Result<Stmt, Error> {
        match *self {
            O::DataReg { reg: n, size } => Ok(merge(RegFile::Data, n, size, value)),
            O::AddrReg { reg: n, size } => Ok(merge(RegFile::Address, n, size, value)),
            O::Immediate { .. } => Err(spec_err!(None, "immediate operand {} used as a destination", self)),
            O::Addr { reg: n, size } | O::AddrPostInc { reg: n, size } | O::AddrPreDec { reg: n, size } => {
                Ok(Stmt::Write(size, a_reg(n), value))
            }
            O::AddrDisp { id, size, .. }
            | O::AddrIndex { id, size, .. }
            | O::PcDisp { id, size }
            | O::PcIndex { id, size }
            | O::AbsShort { id, size }
            | O::AbsLong { id, size } => Ok(Stmt::Write(size, ea(id), value)),
        }
    }
}

fn merge(file: RegFile, n: u8, size: Size, value: Expr) -> Stmt {
    let merged = match size {
        Size::Long => value,
        _ => or(and(reg(file, n), konst(size.antimask())), and(value, konst(size.mask()))),
    };
    Stmt::Assign(Lvalue::Reg(file, n), merged)
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            O::DataReg { reg, .. } => write!(f, "D{}", reg),
            O::AddrReg { reg, .. } => write!(f, "A{}", reg),
            O::Addr { reg, .. } => write!(f, "(A{})", reg),
            O::AddrPostInc { reg, .. } => write!(f, "(A{})+", reg),
            O::AddrPreDec { reg, .. } => write!(f, "-(A{})", reg),
            O::AddrDisp { reg, .. } => write!(f, "(d, A{})", reg),
            O::AddrIndex { reg, .. } => write!(f, "(d, A{}, X)", reg),
            O::PcDisp { .. } => write!(f, "(d, PC)"),
            O::PcIndex { .. } => write!(f, "(d, PC, X)"),
            O::AbsShort { .. } => write!(f, "(xxx).w"),
            O::AbsLong { .. } => write!(f, "(xxx).l"),
            O::Immediate { .. } => write!(f, "#xxx"),
        }
    }
}
