//! Bit-field helpers used to slice opcodes. Bit numbering follows the 68000
//! manuals: bit 15 is the leftmost bit of an opcode word.

/// Value of a single bit.
pub fn bit(value: u16, n: u32) -> u16 { (value >> n) & 1 }

/// Bits `from` down to `to` inclusive (from >= to), right-aligned.
pub fn bits(value: u16, from: u32, to: u32) -> u16 {
    debug_assert!(from >= to && from < 16);
    (value >> to) & mask(from - to + 1)
}

fn mask(width: u32) -> u16 {
    if width >= 16 {
        0xffff
    } else {
        (1u16 << width) - 1
    }
}

/// Slice of `width` bits starting at template column `col` (column 0 is bit 15).
pub fn field(value: u16, col: usize, width: usize) -> u16 {
    let from = 15 - col as u32;
    bits(value, from, from + 1 - width as u32)
}

/// Exchange the two 3-bit halves of a 6-bit addressing field (XXXMMM <-> MMMXXX).
pub fn swap_halves(field: u8) -> u8 { ((field & 0b111) << 3) | ((field >> 3) & 0b111) }

/// Sign-extend the low byte to 32 bits.
pub fn sign_extend_byte(value: u16) -> u32 { value as u8 as i8 as i32 as u32 }
