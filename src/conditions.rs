use super::ir::*;

/// The sixteen 68000 condition codes, indexed by the 4-bit condition field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    True,
    False,
    High,
    LowOrSame,
    CarryClear,
    CarrySet,
    NotEqual,
    Equal,
    OverflowClear,
    OverflowSet,
    Plus,
    Minus,
    GreaterOrEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
}
use Condition as C;

#[rustfmt::skip]
static CONDITIONS: [(Condition, &str); 16] = [
    (C::True, "T"), (C::False, "F"), (C::High, "HI"), (C::LowOrSame, "LS"),
    (C::CarryClear, "CC"), (C::CarrySet, "CS"), (C::NotEqual, "NE"), (C::Equal, "EQ"),
    (C::OverflowClear, "VC"), (C::OverflowSet, "VS"), (C::Plus, "PL"), (C::Minus, "MI"),
    (C::GreaterOrEqual, "GE"), (C::LessThan, "LT"), (C::GreaterThan, "GT"), (C::LessOrEqual, "LE"),
];

fn lor(a: Expr, b: Expr) -> Expr { bin(BinOp::LogicalOr, a, b) }
fn land(a: Expr, b: Expr) -> Expr { bin(BinOp::LogicalAnd, a, b) }
/// N == V
fn n_eq_v() -> Expr { eq(flag(Flag::Negative), flag(Flag::Overflow)) }

impl Condition {
    pub fn from_field(field: u16) -> Condition { CONDITIONS[(field & 0xf) as usize].0 }
    pub fn name(&self) -> &'static str { CONDITIONS[*self as usize].1 }
    /// Expression that is non-zero when the condition holds.
    pub fn expr(&self) -> Expr {
        let c = || flag(Flag::Carry);
        let z = || flag(Flag::Zero);
        let n = || flag(Flag::Negative);
        let v = || flag(Flag::Overflow);
        match self {
            C::True => konst(1),
            C::False => konst(0),
            C::High => land(lnot(c()), lnot(z())),
            C::LowOrSame => lor(c(), z()),
            C::CarryClear => lnot(c()),
            C::CarrySet => c(),
            C::NotEqual => lnot(z()),
            C::Equal => z(),
            C::OverflowClear => lnot(v()),
            C::OverflowSet => v(),
            C::Plus => lnot(n()),
            C::Minus => n(),
            C::GreaterOrEqual => n_eq_v(),
            C::LessThan => lnot(n_eq_v()),
            C::GreaterThan => land(lnot(z()), n_eq_v()),
            C::LessOrEqual => lor(z(), lnot(n_eq_v())),
        }
    }
}
