//! Instruction semantics are built as small statement trees rather than text.
//! The emitter renders them as C against the interpreter's context (`ctx`);
//! everything named here (`m68k_fetch`, `m68k_read`, `CARRY_SET`, ...) is
//! provided by the interpreter, not by this crate.
use super::*;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegFile {
    Data,
    Address,
}
impl RegFile {
    fn c_name(&self) -> &'static str {
        match self {
            RegFile::Data => "data_registers",
            RegFile::Address => "address_registers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Carry,
    Overflow,
    Zero,
    Negative,
    Extend,
}
impl Flag {
    pub fn c_name(&self) -> &'static str {
        match self {
            Flag::Carry => "CARRY",
            Flag::Overflow => "OVERFLOW",
            Flag::Zero => "ZERO",
            Flag::Negative => "NEGATIVE",
            Flag::Extend => "EXTENDED",
        }
    }
}

/// Carry/overflow predicates supplied by the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    CarryAdd,
    OverflowAdd,
    CarrySub,
    OverflowSub,
}
impl Check {
    fn c_name(&self) -> &'static str {
        match self {
            Check::CarryAdd => "CHECK_CARRY_ADD",
            Check::OverflowAdd => "CHECK_OVERFLOW_ADD",
            Check::CarrySub => "CHECK_CARRY_SUB",
            Check::OverflowSub => "CHECK_OVERFLOW_SUB",
        }
    }
}

/// Temporaries holding effective-address state. The id is unique per generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temp {
    Ea(u32),
    Ext(u32),
    Index(u32),
}

/// Hands out temporary ids. One of these lives for a whole generation run.
#[derive(Debug, Default)]
pub struct Temps {
    next: u32,
}
impl Temps {
    pub fn new() -> Self { Temps::default() }
    pub fn alloc(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    /// instruction-local value ("a", "result", ...)
    Local(&'static str),
    Temp(Temp),
}
impl Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Var::Local(name) => write!(f, "{}", name),
            Var::Temp(Temp::Ea(id)) => write!(f, "ea_{}", id),
            Var::Temp(Temp::Ext(id)) => write!(f, "ext_{}", id),
            Var::Temp(Temp::Index(id)) => write!(f, "index_{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    LogicalAnd,
    LogicalOr,
}
impl BinOp {
    fn c_op(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::LogicalAnd => "&&",
            BinOp::LogicalOr => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Const(u32),
    Var(Var),
    /// full 32-bit register, index may be computed at run time
    Reg(RegFile, Box<Expr>),
    /// next 16-bit word of the instruction stream
    Fetch,
    Read(Size, Box<Expr>),
    /// address of the opcode word being executed
    InstrAddr,
    /// next instruction-stream address
    Pc,
    Flag(Flag),
    Check(Check, Size, Box<Expr>, Box<Expr>),
    /// sign-extend the low byte/word to 32 bits
    SignExtend(Size, Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    /// bitwise complement
    Not(Box<Expr>),
    LogicalNot(Box<Expr>),
    Select(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lvalue {
    Reg(RegFile, u8),
    Var(Var),
    Pc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Let(Size, Var, Expr),
    Assign(Lvalue, Expr),
    Write(Size, Expr, Expr),
    SetFlag(Flag, Expr),
    If(Expr, Vec<Stmt>),
}

//
// constructors kept short so generators read like the formulas they implement
//
pub fn konst(v: u32) -> Expr { Expr::Const(v) }
#[cfg(test)]
pub fn local(name: &'static str) -> Expr { Expr::Var(Var::Local(name)) }
pub fn temp(t: Temp) -> Expr { Expr::Var(Var::Temp(t)) }
pub fn reg(file: RegFile, n: u8) -> Expr { Expr::Reg(file, Box::new(konst(n as u32))) }
pub fn read(size: Size, addr: Expr) -> Expr { Expr::Read(size, Box::new(addr)) }
pub fn flag(f: Flag) -> Expr { Expr::Flag(f) }
pub fn check(c: Check, size: Size, a: Expr, b: Expr) -> Expr { Expr::Check(c, size, Box::new(a), Box::new(b)) }
pub fn sign_extend(size: Size, e: Expr) -> Expr { Expr::SignExtend(size, Box::new(e)) }
pub fn bin(op: BinOp, a: Expr, b: Expr) -> Expr { Expr::Bin(op, Box::new(a), Box::new(b)) }
pub fn add(a: Expr, b: Expr) -> Expr { bin(BinOp::Add, a, b) }
pub fn sub(a: Expr, b: Expr) -> Expr { bin(BinOp::Sub, a, b) }
pub fn and(a: Expr, b: Expr) -> Expr { bin(BinOp::And, a, b) }
pub fn or(a: Expr, b: Expr) -> Expr { bin(BinOp::Or, a, b) }
pub fn eq(a: Expr, b: Expr) -> Expr { bin(BinOp::Eq, a, b) }
pub fn not(e: Expr) -> Expr { Expr::Not(Box::new(e)) }
pub fn lnot(e: Expr) -> Expr { Expr::LogicalNot(Box::new(e)) }
pub fn select(c: Expr, a: Expr, b: Expr) -> Expr { Expr::Select(Box::new(c), Box::new(a), Box::new(b)) }
/// `(x >> n) & 1`
pub fn bit_of(x: Expr, n: Expr) -> Expr { and(bin(BinOp::Shr, x, n), konst(1)) }
/// `1 << n`
pub fn bit_mask(n: Expr) -> Expr { bin(BinOp::Shl, konst(1), n) }
/// Value masked to `size` (no-op for longs).
pub fn sized(e: Expr, size: Size) -> Expr {
    match size {
        Size::Long => e,
        _ => and(e, konst(size.mask())),
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Const(v) if *v < 64 => write!(f, "{}", v),
            Expr::Const(v) => write!(f, "0x{:X}", v),
            Expr::Var(v) => write!(f, "{}", v),
            Expr::Reg(file, n) => write!(f, "ctx->{}[{}]", file.c_name(), n),
            Expr::Fetch => write!(f, "m68k_fetch(ctx)"),
            Expr::Read(size, addr) => write!(f, "m68k_read(ctx, {}, {})", size.c_enum(), addr),
            Expr::InstrAddr => write!(f, "ctx->instruction_address"),
            Expr::Pc => write!(f, "ctx->pc"),
            Expr::Flag(fl) => write!(f, "{}(ctx)", fl.c_name()),
            Expr::Check(c, size, a, b) => write!(f, "{}({}, {}, {})", c.c_name(), a, b, size.c_enum()),
            Expr::SignExtend(Size::Byte, e) => write!(f, "(uint32_t)(int8_t)({})", e),
            Expr::SignExtend(Size::Word, e) => write!(f, "(uint32_t)(int16_t)({})", e),
            Expr::SignExtend(Size::Long, e) => write!(f, "{}", e),
            // shifts are done on 32-bit unsigned values so that 1 << 31 and word << 16 are defined
            Expr::Bin(BinOp::Shl, a, b) => write!(f, "((uint32_t)({}) << {})", a, b),
            Expr::Bin(op, a, b) => write!(f, "({} {} {})", a, op.c_op(), b),
            Expr::Not(e) => write!(f, "~({})", e),
            Expr::LogicalNot(e) => write!(f, "!{}", e),
            Expr::Select(c, a, b) => write!(f, "({} ? {} : {})", c, a, b),
        }
    }
}

impl Display for Lvalue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Lvalue::Reg(file, n) => write!(f, "ctx->{}[{}]", file.c_name(), n),
            Lvalue::Var(v) => write!(f, "{}", v),
            Lvalue::Pc => write!(f, "ctx->pc"),
        }
    }
}

impl Stmt {
    /// Render as C, one statement per line at the given indentation.
    pub fn render(&self, out: &mut String, indent: usize) {
        use fmt::Write;
        let pad = " ".repeat(indent);
        // writing to a String cannot fail
        let _ = match self {
            Stmt::Let(size, var, e) => writeln!(out, "{pad}{} {} = {};", size.c_type(), var, e),
            Stmt::Assign(lv, e) => writeln!(out, "{pad}{} = {};", lv, e),
            Stmt::Write(size, addr, val) => {
                writeln!(out, "{pad}m68k_write(ctx, {}, {}, {});", size.c_enum(), addr, val)
            }
            Stmt::SetFlag(fl, e) => writeln!(out, "{pad}{}_SET(ctx, {});", fl.c_name(), e),
            Stmt::If(c, body) => {
                let _ = writeln!(out, "{pad}if ({})", c);
                let _ = writeln!(out, "{pad}{{");
                for s in body {
                    s.render(out, indent + 4);
                }
                writeln!(out, "{pad}}}")
            }
        };
    }
}
impl Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = String::new();
        self.render(&mut s, 0);
        write!(f, "{}", s.trim_end())
    }
}
