//! A small 68000 context that executes generated statements directly, standing
//! in for the C interpreter the real output is compiled into. Locals keep their
//! declared C width so truncation matches what the compiled code does.
//! Memory is sparse and spans the full 32-bit address space, so sign-extended
//! addresses land where the compiled code would send them.
use super::ir::*;
use super::table::OpcodeTable;
use super::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    C = 0,
    V = 1,
    Z = 2,
    N = 3,
    X = 4,
}
fn status_bit(f: Flag) -> Bit {
    match f {
        Flag::Carry => Bit::C,
        Flag::Overflow => Bit::V,
        Flag::Zero => Bit::Z,
        Flag::Negative => Bit::N,
        Flag::Extend => Bit::X,
    }
}

pub struct Machine {
    pub d: [u32; 8],
    pub a: [u32; 8],
    pub pc: u32,
    pub instruction_address: u32,
    pub status: u8,
    pub memory: HashMap<u32, u8>,
    locals: HashMap<Var, (Size, u32)>,
}
impl Machine {
    pub fn new() -> Self {
        Machine {
            d: [0; 8],
            a: [0; 8],
            pc: 0,
            instruction_address: 0,
            status: 0,
            memory: HashMap::new(),
            locals: HashMap::new(),
        }
    }
    /// Place instruction words at `addr` and point pc at them.
    pub fn load(&mut self, addr: u32, words: &[u16]) {
        for (i, w) in words.iter().enumerate() {
            self.write(Size::Word, addr + 2 * i as u32, *w as u32);
        }
        self.pc = addr;
    }
    pub fn read(&self, size: Size, addr: u32) -> u32 {
        (0..size.bytes()).fold(0, |v, i| {
            (v << 8) | self.memory.get(&addr.wrapping_add(i)).copied().unwrap_or(0) as u32
        })
    }
    pub fn write(&mut self, size: Size, addr: u32, value: u32) {
        for i in 0..size.bytes() {
            let shift = 8 * (size.bytes() - 1 - i);
            self.memory.insert(addr.wrapping_add(i), (value >> shift) as u8);
        }
    }
    pub fn flag(&self, b: Bit) -> bool { self.status & (1 << b as u8) != 0 }
    pub fn set(&mut self, b: Bit, on: bool) {
        if on {
            self.status |= 1 << b as u8;
        } else {
            self.status &= !(1 << b as u8);
        }
    }
    fn fetch(&mut self) -> u32 {
        let w = self.read(Size::Word, self.pc);
        self.pc = self.pc.wrapping_add(2);
        w
    }
    fn eval(&mut self, e: &Expr) -> u32 {
        match e {
            Expr::Const(v) => *v,
            Expr::Var(var) => self.locals[var].1,
            Expr::Reg(file, n) => {
                let n = (self.eval(n) & 7) as usize;
                match file {
                    RegFile::Data => self.d[n],
                    RegFile::Address => self.a[n],
                }
            }
            Expr::Fetch => self.fetch(),
            Expr::Read(size, addr) => {
                let addr = self.eval(addr);
                self.read(*size, addr)
            }
            Expr::InstrAddr => self.instruction_address,
            Expr::Pc => self.pc,
            Expr::Flag(f) => self.flag(status_bit(*f)) as u32,
            Expr::Check(c, size, a, b) => {
                let (a, b) = (self.eval(a), self.eval(b));
                check_predicate(*c, *size, a, b) as u32
            }
            Expr::SignExtend(Size::Byte, e) => self.eval(e) as u8 as i8 as i32 as u32,
            Expr::SignExtend(Size::Word, e) => self.eval(e) as u16 as i16 as i32 as u32,
            Expr::SignExtend(Size::Long, e) => self.eval(e),
            Expr::Bin(op, a, b) => {
                let (a, b) = (self.eval(a), self.eval(b));
                match op {
                    BinOp::Add => a.wrapping_add(b),
                    BinOp::Sub => a.wrapping_sub(b),
                    BinOp::And => a & b,
                    BinOp::Or => a | b,
                    BinOp::Xor => a ^ b,
                    BinOp::Shl => a.wrapping_shl(b),
                    BinOp::Shr => a.wrapping_shr(b),
                    BinOp::Eq => (a == b) as u32,
                    BinOp::Ne => (a != b) as u32,
                    BinOp::LogicalAnd => (a != 0 && b != 0) as u32,
                    BinOp::LogicalOr => (a != 0 || b != 0) as u32,
                }
            }
            Expr::Not(e) => !self.eval(e),
            Expr::LogicalNot(e) => (self.eval(e) == 0) as u32,
            Expr::Select(c, a, b) => {
                if self.eval(c) != 0 {
                    self.eval(a)
                } else {
                    self.eval(b)
                }
            }
        }
    }
    fn exec(&mut self, s: &Stmt) {
        match s {
            Stmt::Let(size, var, e) => {
                let v = self.eval(e) & size.mask();
                self.locals.insert(*var, (*size, v));
            }
            Stmt::Assign(Lvalue::Reg(RegFile::Data, n), e) => self.d[*n as usize] = self.eval(e),
            Stmt::Assign(Lvalue::Reg(RegFile::Address, n), e) => self.a[*n as usize] = self.eval(e),
            Stmt::Assign(Lvalue::Var(var), e) => {
                let v = self.eval(e);
                let size = self.locals[var].0;
                self.locals.insert(*var, (size, v & size.mask()));
            }
            Stmt::Assign(Lvalue::Pc, e) => self.pc = self.eval(e),
            Stmt::Write(size, addr, value) => {
                let (addr, value) = (self.eval(addr), self.eval(value));
                self.write(*size, addr, value);
            }
            Stmt::SetFlag(f, e) => {
                let on = self.eval(e) != 0;
                self.set(status_bit(*f), on);
            }
            Stmt::If(c, body) => {
                if self.eval(c) != 0 {
                    body.iter().for_each(|s| self.exec(s));
                }
            }
        }
    }
    /// Execute the instruction at pc.
    pub fn step(&mut self, table: &OpcodeTable) -> Result<(), Error> {
        self.instruction_address = self.pc;
        let opcode = self.fetch() as u16;
        let entry = table
            .get(opcode)
            .ok_or_else(|| general_err!(format!("opcode {:04x} is not implemented", opcode)))?;
        self.locals.clear();
        for s in entry.instruction.steps() {
            self.exec(&s);
        }
        Ok(())
    }
}

/// The interpreter's CHECK_* predicates. The first operand is the left-hand side.
fn check_predicate(c: Check, size: Size, a: u32, b: u32) -> bool {
    let (a, b) = (a & size.mask(), b & size.mask());
    let sign = |x: u32| (x >> size.sign_bit()) & 1;
    match c {
        Check::CarryAdd => (a.wrapping_add(b) & size.mask()) < a,
        Check::CarrySub => (a.wrapping_sub(b) & size.mask()) > a,
        Check::OverflowAdd => sign(a) == sign(b) && sign(a) != sign(a.wrapping_add(b)),
        Check::OverflowSub => sign(a) != sign(b) && sign(a) != sign(a.wrapping_sub(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref TABLE: OpcodeTable = OpcodeTable::build(&instructions::patterns().unwrap()).unwrap();
    }
    const ORIGIN: u32 = 0x1000;

    fn run(m: &mut Machine, words: &[u16]) {
        m.load(ORIGIN, words);
        m.step(&TABLE).unwrap();
    }
    fn flags(m: &Machine) -> String {
        [(Bit::X, 'X'), (Bit::N, 'N'), (Bit::Z, 'Z'), (Bit::V, 'V'), (Bit::C, 'C')]
            .iter()
            .map(|&(b, c)| if m.flag(b) { c } else { '-' })
            .collect()
    }

    #[test]
    fn add_byte_carry() {
        let mut m = Machine::new();
        m.d[0] = 0x01;
        m.d[1] = 0x1234_56ff;
        run(&mut m, &[0xd200]); // ADD.b D0, D1
        assert_eq!(m.d[1], 0x1234_5600);
        assert_eq!(flags(&m), "X-Z-C");
    }
    #[test]
    fn add_byte_overflow() {
        let mut m = Machine::new();
        m.d[0] = 0x01;
        m.d[1] = 0x7f;
        run(&mut m, &[0xd200]);
        assert_eq!(m.d[1], 0x80);
        assert_eq!(flags(&m), "-N-V-");
    }
    #[test]
    fn move_zero_keeps_extend() {
        let mut m = Machine::new();
        m.status = 0b1_1011; // X N V C
        m.d[2] = 0xaaaa_5555;
        run(&mut m, &[0x343c, 0x0000]); // MOVE.w #0, D2
        assert_eq!(m.d[2], 0xaaaa_0000);
        assert_eq!(flags(&m), "X-Z--");
        assert_eq!(m.pc, ORIGIN + 4);

        let mut m = Machine::new();
        m.a[0] = 0x2000;
        m.write(Size::Word, 0x2000, 0xffff);
        run(&mut m, &[0x3080]); // MOVE.w D0, (A0)
        assert_eq!(m.read(Size::Word, 0x2000), 0);
        assert_eq!(flags(&m), "--Z--");
    }
    #[test]
    fn cmp_equal_longs() {
        let mut m = Machine::new();
        m.set(Bit::X, true);
        m.d[0] = 5;
        m.d[1] = 5;
        run(&mut m, &[0xb280]); // CMP.l D0, D1
        assert_eq!(m.d[1], 5);
        assert_eq!(flags(&m), "X-Z--");
        // 3 - 5 borrows
        m.d[1] = 3;
        run(&mut m, &[0xb280]);
        assert_eq!(flags(&m), "XN--C");
    }
    #[test]
    fn bset_uses_source_modulo_width() {
        let mut m = Machine::new();
        m.d[1] = 40;
        run(&mut m, &[0x03c0]); // BSET D1, D0
        assert_eq!(m.d[0], 1 << 8);
        assert!(m.flag(Bit::Z));
        run(&mut m, &[0x03c0]);
        assert_eq!(m.d[0], 1 << 8);
        assert!(!m.flag(Bit::Z));
        // a negative source still selects its low five bits
        m.d[0] = 0;
        m.d[1] = 0xffff_ffe8;
        run(&mut m, &[0x03c0]);
        assert_eq!(m.d[0], 1 << 8);
        assert!(m.flag(Bit::Z));
        // memory destinations are a byte wide: 9 mod 8 = 1
        m.d[1] = 9;
        m.a[0] = 0x2000;
        run(&mut m, &[0x03d0]); // BSET D1, (A0)
        assert_eq!(m.read(Size::Byte, 0x2000), 0b10);
        assert!(m.flag(Bit::Z));
        run(&mut m, &[0x0390]); // BCLR D1, (A0)
        assert_eq!(m.read(Size::Byte, 0x2000), 0);
        assert!(!m.flag(Bit::Z));
        run(&mut m, &[0x0350]); // BCHG D1, (A0)
        assert_eq!(m.read(Size::Byte, 0x2000), 0b10);
        run(&mut m, &[0x0310]); // BTST D1, (A0)
        assert!(!m.flag(Bit::Z));
        assert_eq!(m.read(Size::Byte, 0x2000), 0b10);
    }
    #[test]
    fn conditional_branches() {
        let mut m = Machine::new();
        m.set(Bit::Z, true);
        run(&mut m, &[0x6704]); // BEQ.s +4
        assert_eq!(m.pc, ORIGIN + 6);
        m.set(Bit::Z, false);
        run(&mut m, &[0x6704]);
        assert_eq!(m.pc, ORIGIN + 2);
        // BNE.w -2: the extension word is consumed either way
        run(&mut m, &[0x6600, 0xfffe]);
        assert_eq!(m.pc, ORIGIN);
        m.set(Bit::Z, true);
        run(&mut m, &[0x6600, 0xfffe]);
        assert_eq!(m.pc, ORIGIN + 4);
        // BGT with N != V falls through
        m.set(Bit::Z, false);
        m.set(Bit::N, true);
        run(&mut m, &[0x6e10]);
        assert_eq!(m.pc, ORIGIN + 2);
        run(&mut m, &[0x60fe]); // BRA.s -2
        assert_eq!(m.pc, ORIGIN);
    }
    #[test]
    fn bsr_pushes_return_address() {
        let mut m = Machine::new();
        m.a[7] = 0x8000;
        run(&mut m, &[0x6110]); // BSR.s +16
        assert_eq!(m.a[7], 0x7ffc);
        assert_eq!(m.read(Size::Long, 0x7ffc), ORIGIN + 2);
        assert_eq!(m.pc, ORIGIN + 0x12);
    }
    #[test]
    fn predecrement_and_postincrement() {
        let mut m = Machine::new();
        m.a[0] = 0x2004;
        m.a[1] = 0x3000;
        m.write(Size::Long, 0x2000, 0xdead_beef);
        run(&mut m, &[0x22e0]); // MOVE.l -(A0), (A1)+
        assert_eq!(m.a[0], 0x2000);
        assert_eq!(m.a[1], 0x3004);
        assert_eq!(m.read(Size::Long, 0x3000), 0xdead_beef);
        assert_eq!(flags(&m), "-N---");
    }
    #[test]
    fn extension_word_modes() {
        let mut m = Machine::new();
        m.a[0] = 0x2000;
        m.d[1] = 0xffff_0002;
        m.write(Size::Word, 0x2006, 0xbeef);
        run(&mut m, &[0x3430, 0x1004]); // MOVE.w (4, A0, D1.w), D2
        assert_eq!(m.d[2], 0xbeef);
        assert_eq!(m.pc, ORIGIN + 4);

        m.write(Size::Long, 0x4000, 0x1234_5678);
        run(&mut m, &[0x2039, 0x0000, 0x4000]); // MOVE.l (0x4000).l, D0
        assert_eq!(m.d[0], 0x1234_5678);
        assert_eq!(m.pc, ORIGIN + 6);

        // ADD.l #0x00010001, D0 reads a two-word immediate high word first
        run(&mut m, &[0xd0bc, 0x0001, 0x0001]);
        assert_eq!(m.d[0], 0x1235_5679);
    }
    #[test]
    fn absolute_short_sign_extends() {
        let mut m = Machine::new();
        m.write(Size::Word, 0xffff_8000, 0x1234);
        m.write(Size::Word, 0x0000_8000, 0x9999);
        run(&mut m, &[0x3038, 0x8000]); // MOVE.w (0x8000).w, D0
        assert_eq!(m.d[0], 0x1234);
        m.write(Size::Word, 0x7ffe, 0x4321);
        run(&mut m, &[0x3038, 0x7ffe]); // MOVE.w (0x7ffe).w, D0
        assert_eq!(m.d[0], 0x4321);
        assert_eq!(m.pc, ORIGIN + 4);
    }
    #[test]
    fn negative_displacement() {
        let mut m = Machine::new();
        m.a[0] = 0x2008;
        m.write(Size::Word, 0x2004, 0x0bad);
        run(&mut m, &[0x3228, 0xfffc]); // MOVE.w (-4, A0), D1
        assert_eq!(m.d[1], 0x0bad);
        assert_eq!(m.a[0], 0x2008);
    }
    #[test]
    fn pc_relative_base_follows_opcode() {
        let mut m = Machine::new();
        // the base is ORIGIN + 2, not the address after the extension word
        m.write(Size::Word, ORIGIN + 16, 0xcafe);
        m.write(Size::Word, ORIGIN + 18, 0xffff);
        run(&mut m, &[0x303a, 0x000e]); // MOVE.w (14, PC), D0
        assert_eq!(m.d[0], 0xcafe);
        assert_eq!(m.pc, ORIGIN + 4);

        m.d[2] = 0x0001_0010;
        m.write(Size::Word, ORIGIN + 0x12, 0x5a5a);
        run(&mut m, &[0x363b, 0x2000]); // MOVE.w (0, PC, D2.w), D3
        assert_eq!(m.d[3], 0x5a5a);
        // 8-bit displacement of -2 on top of the index
        m.write(Size::Word, ORIGIN + 0x10, 0xa5a5);
        run(&mut m, &[0x363b, 0x20fe]); // MOVE.w (-2, PC, D2.w), D3
        assert_eq!(m.d[3], 0xa5a5);
    }
    #[test]
    fn long_index_register() {
        let mut m = Machine::new();
        m.a[1] = 0x3000;
        m.a[2] = 0x0001_0000;
        m.write(Size::Long, 0x1_3002, 0x0bad_f00d);
        m.write(Size::Long, 0x3002, 0x1111_1111);
        run(&mut m, &[0x2831, 0xa802]); // MOVE.l (2, A1, A2.l), D4
        assert_eq!(m.d[4], 0x0bad_f00d);
        // the word form only sees the low half of A2, which is 0
        run(&mut m, &[0x2831, 0xa002]); // MOVE.l (2, A1, A2.w), D4
        assert_eq!(m.d[4], 0x1111_1111);
    }
    #[test]
    fn unary_and_quick() {
        let mut m = Machine::new();
        m.d[0] = 1;
        run(&mut m, &[0x4400]); // NEG.b D0
        assert_eq!(m.d[0], 0xff);
        assert_eq!(flags(&m), "XN--C");
        run(&mut m, &[0x4640]); // NOT.w D0
        assert_eq!(m.d[0], 0xff00);
        assert_eq!(flags(&m), "XN---");
        run(&mut m, &[0x4240]); // CLR.w D0
        assert_eq!(m.d[0], 0);
        assert_eq!(flags(&m), "X-Z--");
        run(&mut m, &[0x76ff]); // MOVEQ #-1, D3
        assert_eq!(m.d[3], 0xffff_ffff);
        assert_eq!(flags(&m), "XN---");
        run(&mut m, &[0x9680]); // SUB.l D0, D3
        assert_eq!(m.d[3], 0xffff_ffff);
        assert_eq!(flags(&m), "-N---");
        run(&mut m, &[0xb183]); // EOR.l D0, D3
        run(&mut m, &[0x4a83]); // TST.l D3
        assert_eq!(flags(&m), "-N---");
    }
}
