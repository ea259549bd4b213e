//! The closed operation catalog.
//!
//! Each operator carries an opcode, a category, applicability flags and a
//! scalar semantics function defined once for every lane type. Lane-wise and
//! reduction operators that share a scalar function share an opcode, so a
//! back end lowering `ADD` lanes and an `ADD` reduction sees the same code.

use bitflags::bitflags;

use crate::error::{Result, VectorError};
use crate::traits::LaneType;

bitflags! {
    /// Applicability and lowering flags of an operator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpFlags: u32 {
        /// Only defined for floating lanes.
        const FP_ONLY = 1 << 0;
        /// Only defined for integral lanes (bitwise and shift operators).
        const INTEGRAL_ONLY = 1 << 1;
        /// Needs special-cased lowering instead of a single instruction.
        const SPECIAL = 1 << 2;
        /// Second operand is a shift count reduced modulo the lane width.
        const SHIFT = 1 << 3;
        /// Integral divisors must be nonzero in every selected lane.
        const CHECKED_DIVISOR = 1 << 4;
        /// Reduction result may depend on evaluation order for floating lanes.
        const REASSOCIATES = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Unary,
    Binary,
    Ternary,
    Comparison,
    Test,
    Associative,
}

pub const OP_ABS: u32 = 0;
pub const OP_NEG: u32 = 1;
pub const OP_NOT: u32 = 2;
pub const OP_ZOMO: u32 = 3;
pub const OP_ADD: u32 = 4;
pub const OP_SUB: u32 = 5;
pub const OP_MUL: u32 = 6;
pub const OP_DIV: u32 = 7;
pub const OP_MIN: u32 = 8;
pub const OP_MAX: u32 = 9;
pub const OP_AND: u32 = 10;
pub const OP_OR: u32 = 11;
pub const OP_XOR: u32 = 12;
pub const OP_FMA: u32 = 13;
pub const OP_LSHL: u32 = 14;
pub const OP_ASHR: u32 = 15;
pub const OP_LSHR: u32 = 16;
pub const OP_ROL: u32 = 17;
pub const OP_ROR: u32 = 18;
pub const OP_AND_NOT: u32 = 19;
pub const OP_FIRST_NONZERO: u32 = 20;
pub const OP_POW: u32 = 21;
pub const OP_BITWISE_BLEND: u32 = 22;
pub const OP_COMPARE: u32 = 32;
pub const OP_TEST: u32 = 48;

/// Common surface of every catalog operator.
pub trait Operator: Copy {
    fn name(&self) -> &'static str;
    fn opcode(&self) -> u32;
    fn category(&self) -> Category;
    fn flags(&self) -> OpFlags;

    /// Fails with `UnsupportedOperation` if this operator is not defined for `E`.
    fn check<E: LaneType>(&self) -> Result<()> {
        let flags = self.flags();
        let supported = if E::IS_FLOATING {
            !flags.contains(OpFlags::INTEGRAL_ONLY)
        } else {
            !flags.contains(OpFlags::FP_ONLY)
        };
        if supported {
            Ok(())
        } else {
            Err(VectorError::UnsupportedOperation {
                op: self.name(),
                kind: E::KIND,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unary {
    Neg,
    Abs,
    Not,
    /// Zero stays zero, anything else becomes -1.
    Zomo,
}

impl Operator for Unary {
    fn name(&self) -> &'static str {
        match self {
            Unary::Neg => "NEG",
            Unary::Abs => "ABS",
            Unary::Not => "NOT",
            Unary::Zomo => "ZOMO",
        }
    }

    fn opcode(&self) -> u32 {
        match self {
            Unary::Neg => OP_NEG,
            Unary::Abs => OP_ABS,
            Unary::Not => OP_NOT,
            Unary::Zomo => OP_ZOMO,
        }
    }

    fn category(&self) -> Category {
        Category::Unary
    }

    fn flags(&self) -> OpFlags {
        match self {
            Unary::Neg | Unary::Abs => OpFlags::empty(),
            Unary::Not => OpFlags::INTEGRAL_ONLY,
            Unary::Zomo => OpFlags::INTEGRAL_ONLY | OpFlags::SPECIAL,
        }
    }
}

impl Unary {
    #[inline]
    pub fn apply<E: LaneType>(self, a: E) -> E {
        match self {
            Unary::Neg => a.lane_neg(),
            Unary::Abs => a.lane_abs(),
            Unary::Not => a.bit_not(),
            Unary::Zomo => {
                if a.is_zero_bits() {
                    E::ZERO
                } else {
                    E::from_bits(u64::MAX)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binary {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    /// First operand if its bit pattern is nonzero, else the second.
    FirstNonzero,
    And,
    AndNot,
    Or,
    Xor,
    Lshl,
    Ashr,
    Lshr,
    Rol,
    Ror,
    Pow,
}

impl Operator for Binary {
    fn name(&self) -> &'static str {
        match self {
            Binary::Add => "ADD",
            Binary::Sub => "SUB",
            Binary::Mul => "MUL",
            Binary::Div => "DIV",
            Binary::Min => "MIN",
            Binary::Max => "MAX",
            Binary::FirstNonzero => "FIRST_NONZERO",
            Binary::And => "AND",
            Binary::AndNot => "AND_NOT",
            Binary::Or => "OR",
            Binary::Xor => "XOR",
            Binary::Lshl => "LSHL",
            Binary::Ashr => "ASHR",
            Binary::Lshr => "LSHR",
            Binary::Rol => "ROL",
            Binary::Ror => "ROR",
            Binary::Pow => "POW",
        }
    }

    fn opcode(&self) -> u32 {
        match self {
            Binary::Add => OP_ADD,
            Binary::Sub => OP_SUB,
            Binary::Mul => OP_MUL,
            Binary::Div => OP_DIV,
            Binary::Min => OP_MIN,
            Binary::Max => OP_MAX,
            Binary::FirstNonzero => OP_FIRST_NONZERO,
            Binary::And => OP_AND,
            Binary::AndNot => OP_AND_NOT,
            Binary::Or => OP_OR,
            Binary::Xor => OP_XOR,
            Binary::Lshl => OP_LSHL,
            Binary::Ashr => OP_ASHR,
            Binary::Lshr => OP_LSHR,
            Binary::Rol => OP_ROL,
            Binary::Ror => OP_ROR,
            Binary::Pow => OP_POW,
        }
    }

    fn category(&self) -> Category {
        Category::Binary
    }

    fn flags(&self) -> OpFlags {
        match self {
            Binary::Add | Binary::Sub | Binary::Mul | Binary::Min | Binary::Max => {
                OpFlags::empty()
            }
            Binary::Div => OpFlags::CHECKED_DIVISOR,
            Binary::FirstNonzero => OpFlags::SPECIAL,
            Binary::And | Binary::AndNot | Binary::Or | Binary::Xor => OpFlags::INTEGRAL_ONLY,
            Binary::Lshl | Binary::Ashr | Binary::Lshr => {
                OpFlags::INTEGRAL_ONLY | OpFlags::SHIFT
            }
            Binary::Rol | Binary::Ror => {
                OpFlags::INTEGRAL_ONLY | OpFlags::SHIFT | OpFlags::SPECIAL
            }
            Binary::Pow => OpFlags::FP_ONLY | OpFlags::SPECIAL,
        }
    }
}

impl Binary {
    #[inline]
    pub fn apply<E: LaneType>(self, a: E, b: E) -> E {
        match self {
            Binary::Add => a.lane_add(b),
            Binary::Sub => a.lane_sub(b),
            Binary::Mul => a.lane_mul(b),
            Binary::Div => a.lane_div(b),
            Binary::Min => a.lane_min(b),
            Binary::Max => a.lane_max(b),
            Binary::FirstNonzero => {
                if a.is_zero_bits() {
                    b
                } else {
                    a
                }
            }
            Binary::And => a.bit_and(b),
            Binary::AndNot => a.bit_and(b.bit_not()),
            Binary::Or => a.bit_or(b),
            Binary::Xor => a.bit_xor(b),
            Binary::Lshl => a.shl(b.shift_count()),
            Binary::Ashr => a.ashr(b.shift_count()),
            Binary::Lshr => a.lshr(b.shift_count()),
            Binary::Rol => a.rotate_left(b.shift_count()),
            Binary::Ror => a.rotate_right(b.shift_count()),
            Binary::Pow => a.lane_pow(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ternary {
    /// `a * b + c` with a single rounding.
    Fma,
    /// Bits of `b` where `c` is set, bits of `a` elsewhere.
    BitwiseBlend,
}

impl Operator for Ternary {
    fn name(&self) -> &'static str {
        match self {
            Ternary::Fma => "FMA",
            Ternary::BitwiseBlend => "BITWISE_BLEND",
        }
    }

    fn opcode(&self) -> u32 {
        match self {
            Ternary::Fma => OP_FMA,
            Ternary::BitwiseBlend => OP_BITWISE_BLEND,
        }
    }

    fn category(&self) -> Category {
        Category::Ternary
    }

    fn flags(&self) -> OpFlags {
        match self {
            Ternary::Fma => OpFlags::FP_ONLY,
            Ternary::BitwiseBlend => OpFlags::INTEGRAL_ONLY,
        }
    }
}

impl Ternary {
    #[inline]
    pub fn apply<E: LaneType>(self, a: E, b: E, c: E) -> E {
        match self {
            Ternary::Fma => a.lane_fma(b, c),
            Ternary::BitwiseBlend => a.bit_and(c.bit_not()).bit_or(b.bit_and(c)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl Operator for Comparison {
    fn name(&self) -> &'static str {
        match self {
            Comparison::Eq => "EQ",
            Comparison::Ne => "NE",
            Comparison::Lt => "LT",
            Comparison::Le => "LE",
            Comparison::Gt => "GT",
            Comparison::Ge => "GE",
            Comparison::Ult => "UNSIGNED_LT",
            Comparison::Ule => "UNSIGNED_LE",
            Comparison::Ugt => "UNSIGNED_GT",
            Comparison::Uge => "UNSIGNED_GE",
        }
    }

    fn opcode(&self) -> u32 {
        OP_COMPARE + *self as u32
    }

    fn category(&self) -> Category {
        Category::Comparison
    }

    fn flags(&self) -> OpFlags {
        match self {
            Comparison::Ult | Comparison::Ule | Comparison::Ugt | Comparison::Uge => {
                OpFlags::INTEGRAL_ONLY
            }
            _ => OpFlags::empty(),
        }
    }
}

impl Comparison {
    /// IEEE comparison: with a NaN operand only `NE` holds.
    #[inline]
    pub fn test<E: LaneType>(self, a: E, b: E) -> bool {
        match self {
            Comparison::Eq => a == b,
            Comparison::Ne => a != b,
            Comparison::Lt => a < b,
            Comparison::Le => a <= b,
            Comparison::Gt => a > b,
            Comparison::Ge => a >= b,
            Comparison::Ult => a.to_bits() < b.to_bits(),
            Comparison::Ule => a.to_bits() <= b.to_bits(),
            Comparison::Ugt => a.to_bits() > b.to_bits(),
            Comparison::Uge => a.to_bits() >= b.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Test {
    IsDefault,
    IsNegative,
    IsFinite,
    IsNan,
    IsInfinite,
}

impl Operator for Test {
    fn name(&self) -> &'static str {
        match self {
            Test::IsDefault => "IS_DEFAULT",
            Test::IsNegative => "IS_NEGATIVE",
            Test::IsFinite => "IS_FINITE",
            Test::IsNan => "IS_NAN",
            Test::IsInfinite => "IS_INFINITE",
        }
    }

    fn opcode(&self) -> u32 {
        OP_TEST + *self as u32
    }

    fn category(&self) -> Category {
        Category::Test
    }

    fn flags(&self) -> OpFlags {
        match self {
            Test::IsDefault | Test::IsNegative => OpFlags::SPECIAL,
            Test::IsFinite | Test::IsNan | Test::IsInfinite => OpFlags::FP_ONLY | OpFlags::SPECIAL,
        }
    }
}

impl Test {
    /// Evaluated on the raw bit pattern, so `-0.0` is negative and not default.
    #[inline]
    pub fn test<E: LaneType>(self, a: E) -> bool {
        match self {
            Test::IsDefault => a.is_zero_bits(),
            Test::IsNegative => a.sign_bit_set(),
            _ => {
                let magnitude = a.to_bits() & !(1u64 << (E::BITS - 1));
                match self {
                    Test::IsFinite => magnitude < E::INF_BITS,
                    Test::IsNan => magnitude > E::INF_BITS,
                    _ => magnitude == E::INF_BITS,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associative {
    Add,
    Mul,
    Min,
    Max,
    FirstNonzero,
    And,
    Or,
    Xor,
}

impl Operator for Associative {
    fn name(&self) -> &'static str {
        self.binary().name()
    }

    fn opcode(&self) -> u32 {
        self.binary().opcode()
    }

    fn category(&self) -> Category {
        Category::Associative
    }

    fn flags(&self) -> OpFlags {
        match self {
            Associative::Add | Associative::Mul => OpFlags::REASSOCIATES,
            _ => self.binary().flags(),
        }
    }
}

impl Associative {
    /// The lane-wise operator folded by this reduction.
    pub fn binary(self) -> Binary {
        match self {
            Associative::Add => Binary::Add,
            Associative::Mul => Binary::Mul,
            Associative::Min => Binary::Min,
            Associative::Max => Binary::Max,
            Associative::FirstNonzero => Binary::FirstNonzero,
            Associative::And => Binary::And,
            Associative::Or => Binary::Or,
            Associative::Xor => Binary::Xor,
        }
    }

    /// Starting value of the fold; what an empty selection reduces to.
    pub fn identity<E: LaneType>(self) -> E {
        match self {
            Associative::Add | Associative::FirstNonzero | Associative::Or | Associative::Xor => {
                E::ZERO
            }
            Associative::Mul => E::ONE,
            Associative::Min => E::MAX_OR_INF,
            Associative::Max => E::MIN_OR_INF,
            Associative::And => E::from_bits(u64::MAX),
        }
    }

    #[inline]
    pub fn combine<E: LaneType>(self, acc: E, lane: E) -> E {
        self.binary().apply(acc, lane)
    }
}
