mod distribution;
mod error;
mod exact;
mod monte_carlo;
mod stats;

pub use distribution::{Distribution, Tally};
pub use error::AnalysisError;
pub use exact::analyze;
pub use monte_carlo::monte_carlo;
pub use stats::Stats;

use crate::common::*;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// How an [Analysis] was obtained.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Method {
    Exact,
    MonteCarlo { samples: u32 },
}

impl Method {
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::MonteCarlo { .. } => "monte_carlo",
        }
    }
}

/// The distribution of totals for one expression, with derived statistics.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Analysis {
    pub distribution: Distribution<Value>,
    pub stats: Stats,
    /// Present when the expression counts successes.
    pub success_distribution: Option<Distribution<usize>>,
    /// Present when the expression has a total check.
    pub pass_probability: Option<Probability>,
    pub method: Method,
}

impl Analysis {
    /// Returns `None` for an empty distribution.
    pub fn new(
        distribution: Distribution<Value>,
        success_distribution: Option<Distribution<usize>>,
        pass_probability: Option<Probability>,
        method: Method,
    ) -> Option<Self> {
        let stats = Stats::of(&distribution)?;
        Some(Self {
            distribution,
            stats,
            success_distribution,
            pass_probability,
            method,
        })
    }
}

impl Serialize for Analysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("distribution", &self.distribution)?;
        self.stats.serialize_entries(&mut map)?;
        if let Some(successes) = &self.success_distribution {
            map.serialize_entry("success_distribution", successes)?;
        }
        if let Some(pass) = &self.pass_probability {
            map.serialize_entry("pass_probability", &pass.to_string())?;
        }
        map.serialize_entry("method", self.method.name())?;
        if let Method::MonteCarlo { samples } = self.method {
            map.serialize_entry("samples", &samples)?;
        }
        map.end()
    }
}
