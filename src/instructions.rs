//! Instruction semantics generators and the ordered pattern list.
//!
//! Each generator receives an opcode that already matched its pattern and
//! returns the [Instruction] to emit for it. Flag updates follow the 68000
//! programmer's reference: C carry/borrow, V signed overflow, Z zero,
//! N sign bit of the result, X extend (a copy of C for arithmetic).
use super::conditions::Condition;
use super::ir::*;
use super::operands::*;
use super::pattern::{GenFn, Pattern};
use super::*;

/// One generated instruction: what the case label shows and what it executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: String,
    pub src: Option<Operand>,
    pub dst: Option<Operand>,
    pub body: Vec<Stmt>,
}
impl Instruction {
    fn new(name: &str, src: Option<Operand>, dst: Option<Operand>, body: Vec<Stmt>) -> Instruction {
        let mut mnemonic = name.to_string();
        for (i, op) in src.iter().chain(dst.iter()).enumerate() {
            mnemonic.push_str(if i == 0 { " " } else { ", " });
            mnemonic.push_str(&op.to_string());
        }
        Instruction {
            mnemonic,
            src,
            dst,
            body,
        }
    }
    fn operands(&self) -> impl Iterator<Item = &Operand> { self.src.iter().chain(self.dst.iter()) }
    /// Statements in execution order: pre-actions, extension fetches, body,
    /// post-actions. Source operand before destination within each group.
    pub fn steps(&self) -> Vec<Stmt> {
        let mut steps: Vec<Stmt> = self.operands().filter_map(|op| op.pre()).collect();
        steps.extend(self.operands().flat_map(|op| op.fetch()));
        steps.extend(self.body.iter().cloned());
        steps.extend(self.operands().filter_map(|op| op.post()));
        steps
    }
}

const A: Var = Var::Local("a");
const B: Var = Var::Local("b");
const RESULT: Var = Var::Local("result");
const VALUE: Var = Var::Local("value");
const BIT: Var = Var::Local("bit");
const INITIAL: Var = Var::Local("initial");
const OFFSET: Var = Var::Local("offset");

fn v(var: Var) -> Expr { Expr::Var(var) }

/// Register number in bits 11-9.
fn reg_field(opcode: u16) -> u8 { bits::bits(opcode, 11, 9) as u8 }

fn size_field(opcode: u16, enc: SizeEncoding, from: u32) -> Result<Size, Error> {
    let slice = bits::bits(opcode, from, from + 1 - enc.width() as u32);
    enc.decode(slice)
        .ok_or_else(|| Error::from(Mismatch::SizeEncoding(slice as u8)).with_opcode(opcode))
}

fn ea_operand(opcode: u16, field: u8, size: Size, temps: &mut Temps) -> Result<Operand, Error> {
    operand_from_field(field, size, temps).map_err(|m| Error::from(m).with_opcode(opcode))
}

/// Effective address in the low six bits (MMMXXX).
fn low_ea(opcode: u16, size: Size, temps: &mut Temps) -> Result<Operand, Error> {
    ea_operand(opcode, (opcode & 0x3f) as u8, size, temps)
}

/// `<ea>, Dn` when bit 8 is clear, `Dn, <ea>` when it is set.
fn with_direction(opcode: u16, size: Size, temps: &mut Temps) -> Result<(Operand, Operand), Error> {
    let dn = data_reg(reg_field(opcode), size);
    let ea = low_ea(opcode, size, temps)?;
    Ok(if bits::bit(opcode, 8) == 0 { (ea, dn) } else { (dn, ea) })
}

fn sized_name(name: &str, size: Size) -> String { format!("{}.{}", name, size) }

fn zero_negative(value: Expr, size: Size) -> [Stmt; 2] {
    [
        Stmt::SetFlag(Flag::Zero, eq(value.clone(), konst(0))),
        Stmt::SetFlag(Flag::Negative, bit_of(value, konst(size.sign_bit()))),
    ]
}

/// C and V cleared, Z and N from `value`. Used by moves and logic operations.
fn move_flags(value: Expr, size: Size) -> Vec<Stmt> {
    let mut flags = vec![
        Stmt::SetFlag(Flag::Carry, konst(0)),
        Stmt::SetFlag(Flag::Overflow, konst(0)),
    ];
    flags.extend(zero_negative(value, size));
    flags
}

fn add_sub(opcode: u16, temps: &mut Temps, name: &str, op: BinOp, carry: Check, overflow: Check) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S2, 7)?;
    let (src, dst) = with_direction(opcode, size, temps)?;
    let mut body = vec![
        Stmt::Let(size, A, src.get()),
        Stmt::Let(size, B, dst.get()),
        Stmt::Let(size, RESULT, bin(op, v(B), v(A))),
        dst.set(v(RESULT))?,
        Stmt::SetFlag(Flag::Carry, check(carry, size, v(B), v(A))),
        Stmt::SetFlag(Flag::Overflow, check(overflow, size, v(B), v(A))),
    ];
    body.extend(zero_negative(v(RESULT), size));
    body.push(Stmt::SetFlag(Flag::Extend, flag(Flag::Carry)));
    Ok(Instruction::new(&sized_name(name, size), Some(src), Some(dst), body))
}

pub fn gen_add(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    add_sub(opcode, temps, "ADD", BinOp::Add, Check::CarryAdd, Check::OverflowAdd)
}

pub fn gen_sub(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    add_sub(opcode, temps, "SUB", BinOp::Sub, Check::CarrySub, Check::OverflowSub)
}

/// Dn - <ea>, flags only. X is left alone.
pub fn gen_cmp(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S2, 7)?;
    let (src, dst) = with_direction(opcode, size, temps)?;
    let mut body = vec![
        Stmt::Let(size, A, dst.get()),
        Stmt::Let(size, B, src.get()),
        Stmt::Let(size, RESULT, sub(v(A), v(B))),
        Stmt::SetFlag(Flag::Carry, check(Check::CarrySub, size, v(A), v(B))),
        Stmt::SetFlag(Flag::Overflow, check(Check::OverflowSub, size, v(A), v(B))),
    ];
    body.extend(zero_negative(v(RESULT), size));
    Ok(Instruction::new(&sized_name("CMP", size), Some(src), Some(dst), body))
}

fn logic(opcode: u16, temps: &mut Temps, name: &str, op: BinOp) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S2, 7)?;
    let (src, dst) = with_direction(opcode, size, temps)?;
    let mut body = vec![
        Stmt::Let(size, RESULT, bin(op, dst.get(), src.get())),
        dst.set(v(RESULT))?,
    ];
    body.extend(move_flags(v(RESULT), size));
    Ok(Instruction::new(&sized_name(name, size), Some(src), Some(dst), body))
}

pub fn gen_and(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> { logic(opcode, temps, "AND", BinOp::And) }
pub fn gen_or(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> { logic(opcode, temps, "OR", BinOp::Or) }
pub fn gen_eor(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> { logic(opcode, temps, "EOR", BinOp::Xor) }

/// MOVE's destination field is register-then-mode in bits 11-6.
pub fn gen_move(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S3, 13)?;
    let src = low_ea(opcode, size, temps)?;
    let dst_field = bits::swap_halves(bits::bits(opcode, 11, 6) as u8);
    let dst = ea_operand(opcode, dst_field, size, temps)?;
    let mut body = vec![Stmt::Let(size, VALUE, src.get()), dst.set(v(VALUE))?];
    body.extend(move_flags(v(VALUE), size));
    Ok(Instruction::new(&sized_name("MOVE", size), Some(src), Some(dst), body))
}

pub fn gen_moveq(opcode: u16, _temps: &mut Temps) -> Result<Instruction, Error> {
    let value = bits::sign_extend_byte(opcode);
    let dst = data_reg(reg_field(opcode), Size::Long);
    let mut body = vec![Stmt::Let(Size::Long, VALUE, konst(value)), dst.set(v(VALUE))?];
    body.extend(move_flags(v(VALUE), Size::Long));
    let name = format!("MOVEQ #{},", value as i32);
    Ok(Instruction::new(&name, None, Some(dst), body))
}

pub fn gen_tst(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S2, 7)?;
    let src = low_ea(opcode, size, temps)?;
    let mut body = vec![Stmt::Let(size, VALUE, src.get())];
    body.extend(move_flags(v(VALUE), size));
    Ok(Instruction::new(&sized_name("TST", size), Some(src), None, body))
}

pub fn gen_clr(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S2, 7)?;
    let dst = low_ea(opcode, size, temps)?;
    let mut body = vec![dst.set(konst(0))?];
    body.extend(move_flags(konst(0), size));
    Ok(Instruction::new(&sized_name("CLR", size), None, Some(dst), body))
}

pub fn gen_not(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S2, 7)?;
    let dst = low_ea(opcode, size, temps)?;
    let mut body = vec![Stmt::Let(size, RESULT, not(dst.get())), dst.set(v(RESULT))?];
    body.extend(move_flags(v(RESULT), size));
    Ok(Instruction::new(&sized_name("NOT", size), None, Some(dst), body))
}

/// 0 - dst. C (and X) set unless the result is zero.
pub fn gen_neg(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    let size = size_field(opcode, SizeEncoding::S2, 7)?;
    let dst = low_ea(opcode, size, temps)?;
    let mut body = vec![
        Stmt::Let(size, A, dst.get()),
        Stmt::Let(size, RESULT, sub(konst(0), v(A))),
        dst.set(v(RESULT))?,
        Stmt::SetFlag(Flag::Carry, bin(BinOp::Ne, v(RESULT), konst(0))),
        Stmt::SetFlag(Flag::Overflow, check(Check::OverflowSub, size, konst(0), v(A))),
    ];
    body.extend(zero_negative(v(RESULT), size));
    body.push(Stmt::SetFlag(Flag::Extend, flag(Flag::Carry)));
    Ok(Instruction::new(&sized_name("NEG", size), None, Some(dst), body))
}

/// Register-numbered bit operations. Data register destinations address all
/// 32 bits, memory destinations a single byte. The bit number is the low bits of
/// the source register, which is signed in the interpreter, so it is masked
/// rather than taken with `%`. Z reports the bit before any change.
fn bit_op(opcode: u16, temps: &mut Temps, name: &str, update: Option<fn(Expr, Expr) -> Expr>) -> Result<Instruction, Error> {
    let field = (opcode & 0x3f) as u8;
    let size = match decode_mode(field).map_err(|m| Error::from(m).with_opcode(opcode))? {
        AddressingMode::DataReg => Size::Long,
        _ => Size::Byte,
    };
    let src = data_reg(reg_field(opcode), Size::Long);
    let dst = ea_operand(opcode, field, size, temps)?;
    let mut body = vec![
        Stmt::Let(Size::Byte, BIT, and(src.get(), konst(size.bits() - 1))),
        Stmt::Let(size, INITIAL, dst.get()),
        Stmt::SetFlag(Flag::Zero, eq(bit_of(v(INITIAL), v(BIT)), konst(0))),
    ];
    if let Some(update) = update {
        body.push(dst.set(update(v(INITIAL), bit_mask(v(BIT))))?);
    }
    Ok(Instruction::new(&sized_name(name, size), Some(src), Some(dst), body))
}

pub fn gen_btst(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> { bit_op(opcode, temps, "BTST", None) }
pub fn gen_bset(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    bit_op(opcode, temps, "BSET", Some(or))
}
pub fn gen_bclr(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    bit_op(opcode, temps, "BCLR", Some(|value, mask| and(value, not(mask))))
}
pub fn gen_bchg(opcode: u16, temps: &mut Temps) -> Result<Instruction, Error> {
    bit_op(opcode, temps, "BCHG", Some(|value, mask| bin(BinOp::Xor, value, mask)))
}

/// Branch displacement: the low byte, or the next extension word when that byte is 0.
/// Returns the statements needed to obtain it and the displacement expression.
fn branch_offset(opcode: u16) -> (Vec<Stmt>, Expr, char) {
    if opcode & 0xff == 0 {
        (
            vec![Stmt::Let(Size::Long, OFFSET, sign_extend(Size::Word, Expr::Fetch))],
            v(OFFSET),
            'w',
        )
    } else {
        (Vec::new(), konst(bits::sign_extend_byte(opcode)), 's')
    }
}

/// Targets are relative to the word following the opcode.
fn branch_target(offset: Expr) -> Expr { add(add(Expr::InstrAddr, konst(2)), offset) }

pub fn gen_bcc(opcode: u16, _temps: &mut Temps) -> Result<Instruction, Error> {
    let condition = Condition::from_field(bits::bits(opcode, 11, 8));
    let (mut body, offset, suffix) = branch_offset(opcode);
    let jump = Stmt::Assign(Lvalue::Pc, branch_target(offset));
    let name = match condition {
        Condition::True => {
            body.push(jump);
            "BRA".to_string()
        }
        _ => {
            body.push(Stmt::If(condition.expr(), vec![jump]));
            format!("B{}", condition.name())
        }
    };
    Ok(Instruction::new(&format!("{}.{}", name, suffix), None, None, body))
}

/// Push the return address on the A7 stack, then branch.
pub fn gen_bsr(opcode: u16, _temps: &mut Temps) -> Result<Instruction, Error> {
    let (mut body, offset, suffix) = branch_offset(opcode);
    let sp = reg(RegFile::Address, 7);
    body.push(Stmt::Assign(Lvalue::Reg(RegFile::Address, 7), sub(sp.clone(), konst(4))));
    body.push(Stmt::Write(Size::Long, sp, Expr::Pc));
    body.push(Stmt::Assign(Lvalue::Pc, branch_target(offset)));
    Ok(Instruction::new(&format!("BSR.{}", suffix), None, None, body))
}

pub fn gen_nop(_opcode: u16, _temps: &mut Temps) -> Result<Instruction, Error> {
    Ok(Instruction::new("NOP", None, None, Vec::new()))
}

/// Every mode except address register direct (byte operations cannot use An).
const NOT_ADDR: ModeSet = ModeSet(MODES_ALL.0 & !MODES_ADDR.0);
/// TST on the 68000 cannot test An or an immediate.
const TESTABLE: ModeSet = ModeSet(MODES_ALL.0 & !(MODES_ADDR.0 | MODES_IMM.0));
/// BTST may read through PC-relative modes; the modifying bit operations may not.
const BIT_TESTABLE: ModeSet =
    ModeSet(MODES_DATA.0 | MODES_ADDR_IND.0 | MODES_ADDR_OFFSET.0 | MODES_ABS.0 | MODES_PC.0);
const DA: ModeSet = MODES_DATA_ALTERABLE;
const MA: ModeSet = MODES_MEM_ALTERABLE;

/// The specification list. First match wins, so narrower forms precede the
/// general ones they overlap (BSR before Bcc, byte forms before word/long).
#[rustfmt::skip]
static PATTERN_LIST: [(&str, GenFn, &str, &[ModeSet]); 30] = [
    ("NOP",   gen_nop,   "0100111001110001", &[]),
    ("BTST",  gen_btst,  "0000RRR100MMMXXX", &[BIT_TESTABLE]),
    ("BCHG",  gen_bchg,  "0000RRR101MMMXXX", &[DA]),
    ("BCLR",  gen_bclr,  "0000RRR110MMMXXX", &[DA]),
    ("BSET",  gen_bset,  "0000RRR111MMMXXX", &[DA]),
    // MOVE: destination field first, source second. Only word and long may read An.
    ("MOVE",  gen_move,  "00S3XXXMMMMMMXXX", &[DA, NOT_ADDR]),
    ("MOVE",  gen_move,  "001?XXXMMM001???", &[DA]),
    ("CLR",   gen_clr,   "01000010S2MMMXXX", &[DA]),
    ("NEG",   gen_neg,   "01000100S2MMMXXX", &[DA]),
    ("NOT",   gen_not,   "01000110S2MMMXXX", &[DA]),
    ("TST",   gen_tst,   "01001010S2MMMXXX", &[TESTABLE]),
    ("BSR",   gen_bsr,   "01100001????????", &[]),
    ("Bcc",   gen_bcc,   "0110????????????", &[]),
    ("MOVEQ", gen_moveq, "0111RRR0????????", &[]),
    ("OR",    gen_or,    "1000RRR0S2MMMXXX", &[NOT_ADDR]),
    ("OR",    gen_or,    "1000RRR1S2MMMXXX", &[MA]),
    ("SUB",   gen_sub,   "1001RRR000MMMXXX", &[NOT_ADDR]),
    ("SUB",   gen_sub,   "1001RRR001MMMXXX", &[MODES_ALL]),
    ("SUB",   gen_sub,   "1001RRR010MMMXXX", &[MODES_ALL]),
    ("SUB",   gen_sub,   "1001RRR1S2MMMXXX", &[MA]),
    ("CMP",   gen_cmp,   "1011RRR000MMMXXX", &[NOT_ADDR]),
    ("CMP",   gen_cmp,   "1011RRR001MMMXXX", &[MODES_ALL]),
    ("CMP",   gen_cmp,   "1011RRR010MMMXXX", &[MODES_ALL]),
    ("EOR",   gen_eor,   "1011RRR1S2MMMXXX", &[DA]),
    ("AND",   gen_and,   "1100RRR0S2MMMXXX", &[NOT_ADDR]),
    ("AND",   gen_and,   "1100RRR1S2MMMXXX", &[MA]),
    ("ADD",   gen_add,   "1101RRR000MMMXXX", &[NOT_ADDR]),
    ("ADD",   gen_add,   "1101RRR001MMMXXX", &[MODES_ALL]),
    ("ADD",   gen_add,   "1101RRR010MMMXXX", &[MODES_ALL]),
    ("ADD",   gen_add,   "1101RRR1S2MMMXXX", &[MA]),
];

/// Build the ordered pattern list, validating every template.
pub fn patterns() -> Result<Vec<Pattern>, Error> {
    PATTERN_LIST
        .iter()
        .map(|&(name, generator, format, masks)| Pattern::new(name, generator, format, masks))
        .collect()
}
