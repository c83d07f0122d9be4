use crate::common::*;
use crate::roll::Roller;
use std::fmt;

/// One face of a die.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Face {
    Number(Value),
    Label(String),
}

impl Face {
    pub fn number(&self) -> Option<Value> {
        match self {
            Self::Number(x) => Some(*x),
            Self::Label(_) => None,
        }
    }

    /// Parses a single atom of a face list: an optionally negative integer no
    /// larger than [MAX_LITERAL], or an alphanumeric label.
    fn parse_atom(atom: &str) -> Option<Self> {
        let atom = atom.trim();
        let digits = atom.strip_prefix('-').unwrap_or(atom);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let x = atom.parse::<Int>().ok().filter(|x| x.abs() <= MAX_LITERAL)?;
            Some(Self::Number(Value::from_integer(x)))
        } else if !atom.is_empty() && atom.chars().all(char::is_alphanumeric) {
            Some(Self::Label(atom.to_owned()))
        } else {
            None
        }
    }
}

impl From<Value> for Face {
    fn from(x: Value) -> Self {
        Self::Number(x)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => x.fmt(f),
            Self::Label(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FaceKind {
    Integer,
    Text,
    Mixed,
}

impl FaceKind {
    pub fn is_integer(self) -> bool {
        self == Self::Integer
    }
}

impl fmt::Display for FaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Mixed => "mixed",
        })
    }
}

/// The faces of a die: `1..=S` or an explicit ordered list.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum FaceSet {
    Range(NonZeroUInt),
    List(NonEmpty<Face>),
}

impl FaceSet {
    /// Parses the body of a `{a,b,c}` literal, braces included.
    pub fn parse_list(literal: &str) -> Option<Self> {
        let body = literal.strip_prefix('{')?.strip_suffix('}')?;
        if body.trim().is_empty() {
            return None;
        }
        let faces = body
            .split(',')
            .map(Face::parse_atom)
            .collect::<Option<Vec<_>>>()?;
        NonEmpty::try_from_vec(faces).ok().map(Self::List)
    }

    pub fn kind(&self) -> FaceKind {
        match self {
            Self::Range(_) => FaceKind::Integer,
            Self::List(faces) => {
                let numbers = faces.iter().filter(|f| f.number().is_some()).count();
                if numbers == faces.len() {
                    FaceKind::Integer
                } else if numbers == 0 {
                    FaceKind::Text
                } else {
                    FaceKind::Mixed
                }
            }
        }
    }

    /// The face values in order, if every face is numeric.
    pub fn numbers(&self) -> Option<Vec<Value>> {
        match self {
            Self::Range(sides) => Some(
                (1..=Int::from(sides.get()))
                    .map(Value::from_integer)
                    .collect(),
            ),
            Self::List(faces) => faces.iter().map(Face::number).collect(),
        }
    }

    /// The largest face, if every face is numeric.
    pub fn max(&self) -> Option<Int> {
        match self {
            Self::Range(sides) => Some(sides.get().into()),
            Self::List(_) => self.numbers()?.into_iter().max().map(|x| x.to_integer()),
        }
    }
}

impl fmt::Display for FaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(sides) => sides.fmt(f),
            Self::List(faces) => {
                f.write_str("{")?;
                for (i, face) in faces.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    face.fmt(f)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A single source of randomness over a face set.
#[derive(Debug, Copy, Clone)]
pub struct Die<'a> {
    faces: &'a FaceSet,
}

impl<'a> Die<'a> {
    pub fn new(faces: &'a FaceSet) -> Self {
        Self { faces }
    }

    pub fn roll<R: Roller>(&self, roller: &mut R) -> Face {
        match self.faces {
            FaceSet::Range(sides) => {
                Face::Number(Value::from_integer(roller.roll(*sides).into()))
            }
            FaceSet::List(faces) => {
                // `Vec1` is never empty and the roller never exceeds its bound
                let len = NonZeroUInt::new(faces.len() as UInt).unwrap_or(NonZeroUInt::MIN);
                let index = roller.roll(len) as usize - 1;
                faces[index.min(faces.len() - 1)].clone()
            }
        }
    }
}
