use crate::dice::FaceKind;
use crate::error::ErrorKind;
use crate::modifier::ModifierKind;
use crate::parse::ParseError;
use crate::roll::RollError;
use num_bigint::BigUint;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("exact probabilities are not available with the {0} modifier")]
    UnsupportedModifier(ModifierKind),
    #[error("probabilities need numeric faces, found {0} faces")]
    NonNumericFaces(FaceKind),
    #[error("keep/drop analysis would enumerate {pools} pools (limit {limit})")]
    TooManyOutcomes { pools: BigUint, limit: u64 },
    #[error("at least one sample is required")]
    NoSamples,
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Roll(#[from] RollError),
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedModifier(_) => ErrorKind::UnsupportedModifier,
            Self::NonNumericFaces(_) => ErrorKind::NonNumericFaces,
            Self::TooManyOutcomes { .. } => ErrorKind::TooManyOutcomes,
            Self::NoSamples => ErrorKind::NoSamples,
            Self::Parse(e) => e.kind.error_kind(),
            Self::Roll(e) => e.kind(),
        }
    }
}
