use std::fmt;

/// Operand size. Register writes narrower than a long merge into the
/// untouched upper bits of the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Size {
    Byte,
    Word,
    Long,
}
impl Size {
    pub fn bits(&self) -> u32 {
        match self {
            Size::Byte => 8,
            Size::Word => 16,
            Size::Long => 32,
        }
    }
    pub fn bytes(&self) -> u32 { self.bits() / 8 }
    pub fn mask(&self) -> u32 {
        match self {
            Size::Byte => 0xff,
            Size::Word => 0xffff,
            Size::Long => 0xffff_ffff,
        }
    }
    /// Bits left untouched when a register is written at this size.
    pub fn antimask(&self) -> u32 { !self.mask() }
    pub fn sign_bit(&self) -> u32 { self.bits() - 1 }
    /// C type used for locals of this size in generated code
    pub fn c_type(&self) -> &'static str {
        match self {
            Size::Byte => "uint8_t",
            Size::Word => "uint16_t",
            Size::Long => "uint32_t",
        }
    }
    /// Size constant understood by m68k_read/m68k_write and the CHECK_* predicates.
    pub fn c_enum(&self) -> &'static str {
        match self {
            Size::Byte => "Byte",
            Size::Word => "Word",
            Size::Long => "Long",
        }
    }
    pub fn suffix(&self) -> char {
        match self {
            Size::Byte => 'b',
            Size::Word => 'w',
            Size::Long => 'l',
        }
    }
}
impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.suffix()) }
}

/// The 68000 encodes sizes three different ways depending on the instruction family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeEncoding {
    /// S: one bit, 0 = word, 1 = long
    S1,
    /// S2: 00 = byte, 01 = word, 10 = long
    S2,
    /// S3 (MOVE): 01 = byte, 11 = word, 10 = long
    S3,
}
impl SizeEncoding {
    pub fn width(&self) -> usize {
        match self {
            SizeEncoding::S1 => 1,
            SizeEncoding::S2 | SizeEncoding::S3 => 2,
        }
    }
    pub fn decode(&self, field: u16) -> Option<Size> {
        match (self, field) {
            (SizeEncoding::S1, 0) => Some(Size::Word),
            (SizeEncoding::S1, 1) => Some(Size::Long),
            (SizeEncoding::S2, 0b00) => Some(Size::Byte),
            (SizeEncoding::S2, 0b01) => Some(Size::Word),
            (SizeEncoding::S2, 0b10) => Some(Size::Long),
            (SizeEncoding::S3, 0b01) => Some(Size::Byte),
            (SizeEncoding::S3, 0b11) => Some(Size::Word),
            (SizeEncoding::S3, 0b10) => Some(Size::Long),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn encodings() {
        assert_eq!(SizeEncoding::S2.decode(0b11), None);
        assert_eq!(SizeEncoding::S3.decode(0b00), None);
        assert_eq!(SizeEncoding::S3.decode(0b11), Some(Size::Word));
        assert_eq!(SizeEncoding::S3.decode(0b10), Some(Size::Long));
        assert_eq!(SizeEncoding::S1.decode(1), Some(Size::Long));
        for s in [Size::Byte, Size::Word, Size::Long] {
            assert_eq!(s.mask() | s.antimask(), 0xffff_ffff);
            assert_eq!(1u64 << s.bits(), s.mask() as u64 + 1);
        }
    }
}
