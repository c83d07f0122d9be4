use crate::common::*;
use crate::dice::{FaceKind, FaceSet};
use crate::modifier::{Modifier, Modifiers};
use std::fmt;
use std::ops::Range;

/// A dice sub-term that was rolled and replaced by its total before parsing.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Substitution {
    /// The original text, e.g. `1d3`.
    pub text: String,
    pub total: Value,
    /// The operator immediately preceding the sub-term.
    pub operator: String,
    /// Byte span of `text` in the original expression.
    pub span: Range<usize>,
}

/// A fully resolved dice expression.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RollSpec {
    pub dice_count: UInt,
    pub faces: FaceSet,
    pub modifiers: Modifiers,
    pub substitutions: Vec<Substitution>,
}

impl RollSpec {
    pub fn new(dice_count: UInt, faces: FaceSet, modifiers: Modifiers) -> Self {
        Self {
            dice_count,
            faces,
            modifiers,
            substitutions: Vec::new(),
        }
    }

    pub fn face_kind(&self) -> FaceKind {
        self.faces.kind()
    }

    pub fn is_numeric(&self) -> bool {
        self.face_kind().is_integer()
    }

    pub fn max_face(&self) -> Option<Int> {
        self.faces.max()
    }
}

impl fmt::Display for RollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.dice_count, self.faces)?;
        for modifier in &self.modifiers {
            match modifier {
                Modifier::Boost(b) if b.is_identity() => {}
                Modifier::Boost(b) => write!(f, "{}{}", b.op, b.magnitude)?,
                Modifier::Adjust(a) if a.0 == 0 => {}
                Modifier::Adjust(a) if a.0 < 0 => write!(f, "=-{}", a.0.unsigned_abs())?,
                Modifier::Adjust(a) => write!(f, "=+{}", a.0)?,
                Modifier::Success(s) => s.0.fmt(f)?,
                other => other.fmt(f)?,
            }
        }
        Ok(())
    }
}
