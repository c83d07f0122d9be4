use crate::parse::ParseError;
use crate::prob::AnalysisError;
use crate::roll::RollError;
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Roll(#[from] RollError),
    #[error("{0}")]
    Analysis(#[from] AnalysisError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(e) => e.kind.error_kind(),
            Self::Roll(e) => e.kind(),
            Self::Analysis(e) => e.kind(),
        }
    }
}

/// Coarse classification shared by every error layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    BadExpression,
    UnknownSides,
    ImpossibleFaces,
    TooManyFaces,
    TooManyDice,
    UnsupportedModifier,
    NonNumericFaces,
    ExplosionDepthExceeded,
    TooManyRolls,
    TooManyOutcomes,
    NoSamples,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
