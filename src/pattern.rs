//! Opcode format templates and the pattern matcher.
//!
//! A template is 16 columns wide and is read left to right (column 0 is bit 15).
//! Tokens:
//!
//!| Token | Width | Accepts |
//!| --- | --- | --- |
//!| `0`/`1` runs | n | exactly those bits |
//!| `?` | 1 | anything |
//!| `RRR` | 3 | any register number |
//!| `S` | 1 | 0 = word, 1 = long |
//!| `S2` | 2 | 00/01/10 = byte/word/long |
//!| `S3` | 2 | 01/11/10 = byte/word/long (MOVE) |
//!| `MMMXXX` | 6 | mode then register, mode legal for this position |
//!| `XXXMMM` | 6 | register then mode (MOVE destination) |
//!
//! Each addressing token consumes the next legality mask of its pattern, in
//! the order the tokens appear.
use super::instructions::Instruction;
use super::ir::Temps;
use super::*;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_TOKEN: Regex = Regex::new(r"^(?:[01]+|\?|RRR|MMMXXX|XXXMMM|S2|S3|S)").unwrap();
}

pub const OPCODE_BITS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrder {
    /// MMMXXX
    ModeFirst,
    /// XXXMMM
    RegisterFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal { value: u16, width: usize },
    Any,
    Register,
    Size(SizeEncoding),
    Ea(FieldOrder),
}
impl Token {
    pub fn width(&self) -> usize {
        match self {
            Token::Literal { width, .. } => *width,
            Token::Any => 1,
            Token::Register => 3,
            Token::Size(enc) => enc.width(),
            Token::Ea(_) => 6,
        }
    }
    fn from_str(s: &str) -> Option<Token> {
        Some(match s {
            "?" => Token::Any,
            "RRR" => Token::Register,
            "S" => Token::Size(SizeEncoding::S1),
            "S2" => Token::Size(SizeEncoding::S2),
            "S3" => Token::Size(SizeEncoding::S3),
            "MMMXXX" => Token::Ea(FieldOrder::ModeFirst),
            "XXXMMM" => Token::Ea(FieldOrder::RegisterFirst),
            bits => Token::Literal {
                value: u16::from_str_radix(bits, 2).ok()?,
                width: bits.len(),
            },
        })
    }
}

/// A tokenized template.
#[derive(Debug, Clone)]
pub struct Format {
    pub text: String,
    /// (column, token)
    pub tokens: Vec<(usize, Token)>,
}
impl Format {
    pub fn parse(text: &str) -> Result<Format, Error> {
        let mut tokens = Vec::new();
        let mut col = 0;
        let mut rest = text;
        while !rest.is_empty() {
            let m = RE_TOKEN.find(rest).ok_or_else(|| token_err!(text, col))?;
            let token = Token::from_str(m.as_str()).ok_or_else(|| token_err!(text, col))?;
            tokens.push((col, token));
            col += token.width();
            rest = &rest[m.end()..];
        }
        if col != OPCODE_BITS {
            return Err(spec_err!(
                None,
                "template \"{}\" is {} bits wide, expected {}",
                text,
                col,
                OPCODE_BITS
            ));
        }
        Ok(Format {
            text: text.to_string(),
            tokens,
        })
    }
    pub fn ea_count(&self) -> usize { self.tokens.iter().filter(|(_, t)| matches!(t, Token::Ea(_))).count() }
}

/// Generators turn a matching opcode into an instruction.
pub type GenFn = fn(u16, &mut Temps) -> Result<Instruction, Error>;

/// One entry of the ordered specification list.
pub struct Pattern {
    pub name: &'static str,
    pub generator: GenFn,
    pub format: Format,
    /// legal addressing modes, one per addressing token, left to right
    pub masks: Vec<ModeSet>,
}
impl Pattern {
    pub fn new(name: &'static str, generator: GenFn, format: &str, masks: &[ModeSet]) -> Result<Pattern, Error> {
        let format = Format::parse(format)?;
        if format.ea_count() != masks.len() {
            return Err(spec_err!(
                None,
                "{} \"{}\" has {} addressing fields but {} legality masks",
                name,
                format.text,
                format.ea_count(),
                masks.len()
            ));
        }
        Ok(Pattern {
            name,
            generator,
            format,
            masks: masks.to_vec(),
        })
    }
    /// Test every token against the opcode, stopping at the first one that fails.
    pub fn check(&self, opcode: u16) -> Result<(), Mismatch> {
        let mut position = 0;
        for &(col, token) in &self.format.tokens {
            let slice = bits::field(opcode, col, token.width());
            match token {
                Token::Literal { value, .. } => {
                    if slice != value {
                        return Err(Mismatch::Bits(col));
                    }
                }
                Token::Any | Token::Register => {}
                Token::Size(enc) => {
                    enc.decode(slice).ok_or(Mismatch::SizeEncoding(slice as u8))?;
                }
                Token::Ea(order) => {
                    let field = match order {
                        FieldOrder::ModeFirst => slice as u8,
                        FieldOrder::RegisterFirst => bits::swap_halves(slice as u8),
                    };
                    let mode = decode_mode(field)?;
                    if !self.masks[position].contains(mode) {
                        return Err(Mismatch::IllegalMode(mode, position));
                    }
                    position += 1;
                }
            }
        }
        Ok(())
    }
    pub fn matches(&self, opcode: u16) -> bool { self.check(opcode).is_ok() }
}
impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("name", &self.name)
            .field("format", &self.format.text)
            .field("masks", &self.masks)
            .finish()
    }
}
