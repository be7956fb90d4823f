//! Integer domains and boundary validation.
//!
//! Typed entry points (`Bitmap32::insert(u32)`, `Bitmap64::insert(u64)`) are
//! checked by the compiler. Values that arrive loosely typed (from a parser,
//! an FFI layer, a query language) go through [`Domain::check`] first, so a
//! rejected value never reaches a container.

use std::fmt;

use crate::error::{Error, Result};

/// The integer width a bitmap is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Values in `[0, 2^32 - 1]`.
    U32,
    /// Values in `[0, 2^64 - 1]`.
    U64,
}

impl Domain {
    /// Largest value in the domain.
    pub const fn max(self) -> u64 {
        match self {
            Domain::U32 => u32::MAX as u64,
            Domain::U64 => u64::MAX,
        }
    }

    /// Tag byte used by the serialized format.
    pub(crate) const fn tag(self) -> u8 {
        match self {
            Domain::U32 => 32,
            Domain::U64 => 64,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            32 => Some(Domain::U32),
            64 => Some(Domain::U64),
            _ => None,
        }
    }

    /// Validate a scalar against this domain.
    ///
    /// Non-integers fail with [`Error::TypeMismatch`] (floats are rejected
    /// even when they hold an integral value). Negative integers and
    /// integers above [`Domain::max`] fail with [`Error::OutOfRange`].
    pub fn check(self, value: impl Into<Scalar>) -> Result<u64> {
        match value.into() {
            Scalar::Int(v) => v
                .to_u64()
                .filter(|&x| x <= self.max())
                .ok_or(Error::OutOfRange {
                    value: v,
                    domain: self,
                }),
            other => Err(Error::TypeMismatch {
                found: other.type_name(),
            }),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::U32 => f.write_str("32-bit"),
            Domain::U64 => f.write_str("64-bit"),
        }
    }
}

/// An integer of any primitive width, kept exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integer {
    /// From a signed primitive.
    Signed(i128),
    /// From an unsigned primitive.
    Unsigned(u128),
}

impl Integer {
    fn to_u64(self) -> Option<u64> {
        match self {
            Integer::Signed(v) => u64::try_from(v).ok(),
            Integer::Unsigned(v) => u64::try_from(v).ok(),
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integer::Signed(v) => fmt::Display::fmt(v, f),
            Integer::Unsigned(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// A loosely typed input value.
///
/// Every primitive integer converts losslessly into `Int`; anything else is
/// carried only so that it can be rejected with a precise type name.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Any integer, signed or unsigned, up to 128 bits.
    Int(Integer),
    /// A floating point number.
    Float(f64),
    /// A string.
    Text(String),
    /// A boolean.
    Bool(bool),
}

impl Scalar {
    fn type_name(&self) -> &'static str {
        match self {
            Scalar::Int(_) => "Integer",
            Scalar::Float(_) => "Float",
            Scalar::Text(_) => "String",
            Scalar::Bool(_) => "Boolean",
        }
    }
}

macro_rules! scalar_from_int {
    ($variant:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar::Int(Integer::$variant(v as $wide))
                }
            }
        )*
    };
}

scalar_from_int!(Signed as i128: i8, i16, i32, i64, i128, isize);
scalar_from_int!(Unsigned as u128: u8, u16, u32, u64, u128, usize);

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(v as f64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}
