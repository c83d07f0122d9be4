use super::Distribution;
use crate::common::*;
use num_bigint::BigInt;
use num_traits::Zero;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Summary statistics of a distribution over totals.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Stats {
    pub mean: Probability,
    pub variance: Probability,
    pub min: Value,
    pub max: Value,
    /// Every outcome sharing the highest probability.
    pub mode: NonEmpty<Value>,
    pub median: Value,
    pub percentiles: BTreeMap<u8, Value>,
}

impl Stats {
    pub const PERCENTILES: [u8; 3] = [25, 50, 75];

    /// Returns `None` for an empty distribution.
    pub fn of(dist: &Distribution<Value>) -> Option<Self> {
        let min = *dist.min()?;
        let max = *dist.max()?;

        let mean: Probability = dist.iter().map(|(v, p)| widen(v) * p).sum();
        let variance: Probability = dist
            .iter()
            .map(|(v, p)| {
                let delta = widen(v) - &mean;
                &delta * &delta * p
            })
            .sum();

        let top = dist.iter().map(|(_, p)| p).max()?;
        let mode = dist
            .iter()
            .filter(|(_, p)| *p == top)
            .map(|(v, _)| *v)
            .collect::<Vec<_>>();
        let mode = NonEmpty::try_from_vec(mode).ok()?;

        let percentiles = Self::PERCENTILES
            .iter()
            .map(|&pct| Some((pct, percentile(dist, pct)?)))
            .collect::<Option<BTreeMap<_, _>>>()?;
        let median = percentiles.get(&50).copied().unwrap_or(max);

        Some(Self {
            mean,
            variance,
            min,
            max,
            mode,
            median,
            percentiles,
        })
    }

    pub fn mean_f64(&self) -> f64 {
        to_f64(&self.mean)
    }

    /// Population standard deviation.
    pub fn std(&self) -> f64 {
        to_f64(&self.variance).sqrt()
    }
}

/// The first outcome whose cumulative mass reaches `pct` percent.
fn percentile(dist: &Distribution<Value>, pct: u8) -> Option<Value> {
    let target = Probability::new(BigInt::from(pct), BigInt::from(100u8));
    let mut cumulative = Probability::zero();
    for (v, p) in dist {
        cumulative += p;
        if cumulative >= target {
            return Some(*v);
        }
    }
    dist.max().copied()
}

impl Stats {
    /// Writes every statistic into an open map, so callers can embed them.
    pub(super) fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("mean", &self.mean_f64())?;
        map.serialize_entry("std", &self.std())?;
        map.serialize_entry("min", &self.min.to_string())?;
        map.serialize_entry("max", &self.max.to_string())?;
        let mode: Vec<_> = self.mode.iter().map(ToString::to_string).collect();
        map.serialize_entry("mode", &mode)?;
        map.serialize_entry("median", &self.median.to_string())?;
        let percentiles: BTreeMap<_, _> = self
            .percentiles
            .iter()
            .map(|(pct, v)| (pct.to_string(), v.to_string()))
            .collect();
        map.serialize_entry("percentiles", &percentiles)
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}
