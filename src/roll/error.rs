use crate::error::ErrorKind;
use crate::parse::ParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RollError {
    #[error("explosions chained more than {limit} times")]
    ExplosionDepthExceeded { limit: usize },
    #[error("too many dice rolled (limit {limit})")]
    TooManyRolls { limit: usize },
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl RollError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExplosionDepthExceeded { .. } => ErrorKind::ExplosionDepthExceeded,
            Self::TooManyRolls { .. } => ErrorKind::TooManyRolls,
            Self::Parse(e) => e.kind.error_kind(),
        }
    }
}
