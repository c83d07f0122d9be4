use crate::common::Probability;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{btree_map, BTreeMap};
use std::fmt::Display;
use std::ops::Add;

/// Integer weights per outcome. Exact enumeration and sampling both
/// accumulate into a tally before it is normalized.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tally<K: Ord> {
    counts: BTreeMap<K, BigUint>,
    total: BigUint,
}

impl<K: Ord> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: BigUint::zero(),
        }
    }
}

impl<K: Ord> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: K, weight: BigUint) {
        if weight.is_zero() {
            return;
        }
        self.total += &weight;
        *self.counts.entry(outcome).or_default() += weight;
    }

    pub fn record_one(&mut self, outcome: K) {
        self.record(outcome, BigUint::one());
    }

    pub fn total(&self) -> &BigUint {
        &self.total
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, BigUint> {
        self.counts.iter()
    }

    pub fn into_distribution(self) -> Distribution<K> {
        let total = BigInt::from(self.total);
        self.counts
            .into_iter()
            .map(|(outcome, count)| (outcome, Probability::new(count.into(), total.clone())))
            .collect()
    }
}

impl<K: Ord + Copy + Add<Output = K>> Tally<K> {
    /// The tally of the sum of two independent outcomes.
    pub fn convolve(&self, other: &Self) -> Self {
        let mut ret = Self::new();
        for (a, wa) in &self.counts {
            for (b, wb) in &other.counts {
                ret.record(*a + *b, wa * wb);
            }
        }
        ret
    }
}

impl<K: Ord> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut ret = Self::new();
        for outcome in iter {
            ret.record_one(outcome);
        }
        ret
    }
}

/// Outcomes with exact probabilities, ordered by outcome.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Distribution<K: Ord> {
    outcomes: BTreeMap<K, Probability>,
}

impl<K: Ord> Distribution<K> {
    pub fn probability(&self, outcome: &K) -> Probability {
        self.outcomes
            .get(outcome)
            .cloned()
            .unwrap_or_else(Probability::zero)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, Probability> {
        self.outcomes.iter()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn min(&self) -> Option<&K> {
        self.outcomes.keys().next()
    }

    pub fn max(&self) -> Option<&K> {
        self.outcomes.keys().next_back()
    }

    pub fn total_mass(&self) -> Probability {
        self.outcomes.values().sum()
    }

    /// The combined probability of every outcome satisfying `pred`.
    pub fn mass_where(&self, mut pred: impl FnMut(&K) -> bool) -> Probability {
        self.outcomes
            .iter()
            .filter(|(k, _)| pred(k))
            .map(|(_, p)| p)
            .sum()
    }

    /// Relabels every outcome, merging outcomes that map to the same label.
    pub fn map<J: Ord>(self, mut f: impl FnMut(K) -> J) -> Distribution<J> {
        let mut outcomes = BTreeMap::new();
        for (k, p) in self.outcomes {
            *outcomes.entry(f(k)).or_insert_with(Probability::zero) += p;
        }
        Distribution { outcomes }
    }
}

impl<K: Ord> FromIterator<(K, Probability)> for Distribution<K> {
    fn from_iter<I: IntoIterator<Item = (K, Probability)>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl<'a, K: Ord> IntoIterator for &'a Distribution<K> {
    type Item = (&'a K, &'a Probability);
    type IntoIter = btree_map::Iter<'a, K, Probability>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord + Display> Serialize for Distribution<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, p) in self {
            map.serialize_entry(&k.to_string(), &p.to_string())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;

    fn d(sides: Int) -> Tally<Int> {
        (1..=sides).collect()
    }

    #[test]
    fn test_tally() {
        let mut tally = Tally::new();
        tally.record_one(3);
        tally.record(1, BigUint::from(2u32));
        tally.record(5, BigUint::zero());
        assert_eq!(tally.total(), &BigUint::from(3u32));

        let dist = tally.into_distribution();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.probability(&1), prob(2, 3));
        assert_eq!(dist.probability(&5), prob(0, 1));
        assert_eq!(dist.total_mass(), prob(1, 1));
    }

    #[test]
    fn test_convolve() {
        let dist = d(6).convolve(&d(6)).into_distribution();
        assert_eq!(dist.min(), Some(&2));
        assert_eq!(dist.max(), Some(&12));
        assert_eq!(dist.probability(&7), prob(6, 36));
        assert_eq!(dist.mass_where(|&x| x >= 7), prob(21, 36));
        assert_eq!(dist.total_mass(), prob(1, 1));
    }

    #[test]
    fn test_map() {
        let dist = d(4).into_distribution().map(|x| x % 2);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.probability(&0), prob(1, 2));
    }

    #[test]
    fn test_serialize() {
        let dist = d(2).into_distribution();
        assert_eq!(
            serde_json::to_string(&dist).unwrap(),
            r#"{"1":"1/2","2":"1/2"}"#
        );
    }
}
