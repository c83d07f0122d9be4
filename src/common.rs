use std::fmt::{self, Write};
use std::num::NonZeroU32;
pub use vec1::vec1;

pub type Int = i64;
pub type UInt = u32;
pub type NonZeroUInt = NonZeroU32;

/// Exact value of a single die once boosts and explosions have been applied.
pub type Value = num_rational::Ratio<Int>;

/// Exact probability mass.
pub type Probability = num_rational::BigRational;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// Largest pool a single expression may roll.
pub const MAX_DICE: u64 = 200;

/// Largest numeric die.
pub const MAX_SIDES: u64 = 100;

/// Largest magnitude of a face, boost, threshold or total adjustment. Keeps
/// every total well inside `Value` arithmetic.
pub const MAX_LITERAL: Int = 1_000_000;

/// Which end of a sorted pool a keep/drop modifier works from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Layer {
    High,
    Low,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::High => 'h',
            Self::Low => 'l',
        };
        f.write_char(c)
    }
}

/// Widens an exact die value into the arbitrary-precision rational used for
/// probability arithmetic.
pub(crate) fn widen(value: &Value) -> Probability {
    Probability::new((*value.numer()).into(), (*value.denom()).into())
}

/// Lossy conversion used for reporting summary statistics.
pub(crate) fn to_f64(p: &Probability) -> f64 {
    num_traits::ToPrimitive::to_f64(p).unwrap_or(f64::NAN)
}
