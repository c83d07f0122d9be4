use super::{Analysis, AnalysisError, Method, Tally};
use crate::common::*;
use crate::config::Limits;
use crate::modifier::{ModifierKind, Success};
use crate::spec::RollSpec;
use num_bigint::BigUint;
use num_traits::One;

type Tallies = (Tally<Value>, Option<Tally<usize>>);

/// Computes the exact distribution of totals for `spec`.
pub fn analyze(spec: &RollSpec, limits: &Limits) -> Result<Analysis, AnalysisError> {
    let modifiers = &spec.modifiers;
    for kind in [ModifierKind::Explode, ModifierKind::Reroll] {
        if modifiers.contains(kind) {
            return Err(AnalysisError::UnsupportedModifier(kind));
        }
    }
    let faces = spec
        .faces
        .numbers()
        .ok_or_else(|| AnalysisError::NonNumericFaces(spec.face_kind()))?;

    let boost = modifiers.boost_or_identity();
    let single: Tally<Value> = faces.into_iter().map(|x| boost.apply(x)).collect();

    let (totals, successes) = if modifiers.has_pool() {
        enumerate_pool(spec, &single, limits)?
    } else {
        tracing::debug!(dice = spec.dice_count, "convolving single-die distribution");
        let totals = convolve_n(&single, spec.dice_count);
        let successes = modifiers
            .success()
            .map(|s| binomial(spec.dice_count, &single, s));
        (totals, successes)
    };

    let adjust = Value::from_integer(modifiers.adjustment());
    let distribution = totals.into_distribution().map(|x| x + adjust);
    let pass_probability = modifiers
        .total_check()
        .map(|t| distribution.mass_where(|x| t.matches(x)));

    Analysis::new(
        distribution,
        successes.map(Tally::into_distribution),
        pass_probability,
        Method::Exact,
    )
    .ok_or(AnalysisError::NoSamples)
}

fn convolve_n(single: &Tally<Value>, n: UInt) -> Tally<Value> {
    let mut ret = single.clone();
    for _ in 1..n {
        ret = ret.convolve(single);
    }
    ret
}

fn choose(n: u64, k: u64) -> BigUint {
    let k = k.min(n - k);
    let mut ret = BigUint::one();
    for i in 0..k {
        ret = ret * (n - i) / (i + 1);
    }
    ret
}

/// The number of successes among `n` independent dice.
fn binomial(n: UInt, single: &Tally<Value>, success: &Success) -> Tally<usize> {
    let faces = single.total();
    let hits: BigUint = single
        .iter()
        .filter(|(x, _)| success.matches(x))
        .map(|(_, w)| w)
        .sum();
    let misses = faces - &hits;

    let mut ret = Tally::new();
    for k in 0..=n {
        let weight = choose(n.into(), k.into()) * hits.pow(k) * misses.pow(n - k);
        ret.record(k as usize, weight);
    }
    ret
}

/// Calls `visit` with every way of distributing `remaining` dice over the
/// slots of `counts` from `index` onwards.
fn for_each_pool(
    counts: &mut [usize],
    index: usize,
    remaining: usize,
    visit: &mut impl FnMut(&[usize]),
) {
    if index + 1 == counts.len() {
        counts[index] = remaining;
        visit(counts);
    } else {
        for c in 0..=remaining {
            counts[index] = c;
            for_each_pool(counts, index + 1, remaining - c, visit);
        }
    }
    counts[index] = 0;
}

/// Enumerates every multiset of face values, weighting each by the number of
/// ordered rolls producing it, and applies keep/drop to each.
fn enumerate_pool(
    spec: &RollSpec,
    single: &Tally<Value>,
    limits: &Limits,
) -> Result<Tallies, AnalysisError> {
    let n = spec.dice_count as usize;
    let faces: Vec<(Value, BigUint)> = single.iter().map(|(x, w)| (*x, w.clone())).collect();
    let slots = faces.len();

    let pools = choose((n + slots - 1) as u64, n as u64);
    if pools > BigUint::from(limits.max_outcomes) {
        return Err(AnalysisError::TooManyOutcomes {
            pools,
            limit: limits.max_outcomes,
        });
    }
    tracing::debug!(%pools, "enumerating keep/drop pools");

    let factorials: Vec<BigUint> = std::iter::once(BigUint::one())
        .chain((1..=n).scan(BigUint::one(), |acc, i| {
            *acc *= i;
            Some(acc.clone())
        }))
        .collect();

    let success = spec.modifiers.success();
    let mut totals = Tally::new();
    let mut successes = success.map(|_| Tally::new());
    let mut counts = vec![0; slots];

    for_each_pool(&mut counts, 0, n, &mut |counts| {
        let mut weight = factorials[n].clone();
        let mut pool = Vec::with_capacity(n);
        for ((x, w), &c) in faces.iter().zip(counts) {
            weight /= &factorials[c];
            weight *= w.pow(c as u32);
            pool.extend(std::iter::repeat(*x).take(c));
        }

        let kept = spec.modifiers.filter_pool(pool);
        totals.record(kept.iter().sum(), weight.clone());
        if let (Some(tally), Some(success)) = (successes.as_mut(), success) {
            tally.record(kept.iter().filter(|x| success.matches(x)).count(), weight);
        }
    });

    Ok((totals, successes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::error::ErrorKind;
    use crate::parse::parse_literal;
    use proptest::prelude::*;

    fn analyze_str(s: &str) -> Result<Analysis, AnalysisError> {
        analyze(&parse_literal(s).unwrap(), &Limits::default())
    }

    fn check(s: &str, min: Int, max: Int, mean: Probability) {
        let analysis = analyze_str(s).unwrap();
        assert_eq!(analysis.stats.min, int(min), "min of {}", s);
        assert_eq!(analysis.stats.max, int(max), "max of {}", s);
        assert_eq!(analysis.stats.mean, mean, "mean of {}", s);
        assert_eq!(analysis.distribution.total_mass(), prob(1, 1), "mass of {}", s);
    }

    fn check_err(s: &str, expected: ErrorKind) {
        assert_eq!(analyze_str(s).unwrap_err().kind(), expected);
    }

    #[test]
    fn test_choose() {
        assert_eq!(choose(4, 2), BigUint::from(6u32));
        assert_eq!(choose(10, 0), BigUint::one());
        assert_eq!(choose(10, 10), BigUint::one());
        assert_eq!(choose(52, 5), BigUint::from(2_598_960u32));
    }

    #[test]
    fn test_analyze_2d6() {
        let analysis = analyze_str("2d6").unwrap();
        check("2d6", 2, 12, prob(7, 1));
        assert_eq!(analysis.stats.mode, vec1![int(7)]);
        assert_eq!(analysis.distribution.mass_where(|x| *x >= int(7)), prob(21, 36));
        assert_eq!(analysis.method, Method::Exact);
    }

    #[test]
    fn test_analyze_shifts() {
        check("2d6+3", 8, 18, prob(13, 1));
        check("2d6=+5", 7, 17, prob(12, 1));
        check("2d6-1", 0, 10, prob(5, 1));
        check("2d6=-3", -1, 9, prob(4, 1));
        check("2d6+2=+5", 11, 21, prob(16, 1));
        check("2d6+0+2", 4, 14, prob(9, 1));
        check("2d{2,4,6}", 4, 12, prob(8, 1));
        check("1d6*2", 2, 12, prob(7, 1));

        let halved = analyze_str("1d6/2").unwrap();
        assert_eq!(halved.stats.min, Value::new(1, 2));
        assert_eq!(halved.stats.max, int(3));
        assert_eq!(halved.stats.mean, prob(7, 4));
    }

    #[test]
    fn test_analyze_signed_faces() {
        check("4d{-1,0,1}", -4, 4, prob(0, 1));
        let analysis = analyze_str("4d{-1,0,1}").unwrap();
        assert_eq!(analysis.stats.mode, vec1![int(0)]);
    }

    #[test]
    fn test_analyze_keep_drop() {
        let kh = analyze_str("4d6kh3").unwrap();
        let dl = analyze_str("4d6dl1").unwrap();
        assert_eq!(kh.distribution, dl.distribution);
        assert_eq!(kh.stats.mean, prob(15869, 1296));
        assert_eq!(kh.stats.min, int(3));
        assert_eq!(kh.stats.max, int(18));

        let kl = analyze_str("4d6kl2").unwrap();
        let dh = analyze_str("4d6dh2").unwrap();
        assert_eq!(kl.stats.mean, dh.stats.mean);

        check("2d20kh1", 1, 20, prob(553, 40));
        check("3d6kh0", 0, 0, prob(0, 1));
    }

    #[test]
    fn test_analyze_success() {
        let analysis = analyze_str("3d6>=5").unwrap();
        let successes = analysis.success_distribution.unwrap();
        assert_eq!(successes.probability(&0), prob(8, 27));
        assert_eq!(successes.probability(&3), prob(1, 27));
        assert_eq!(successes.total_mass(), prob(1, 1));

        let analysis = analyze_str("4d6kh1>=6").unwrap();
        let successes = analysis.success_distribution.unwrap();
        assert_eq!(successes.probability(&1), prob(671, 1296));
    }

    #[test]
    fn test_analyze_pass() {
        let analysis = analyze_str("2d6t>=7").unwrap();
        assert_eq!(analysis.pass_probability, Some(prob(21, 36)));

        let analysis = analyze_str("2d6=+5t>=12").unwrap();
        assert_eq!(analysis.pass_probability, Some(prob(21, 36)));

        assert_eq!(analyze_str("2d6").unwrap().pass_probability, None);
    }

    #[test]
    fn test_analyze_errors() {
        check_err("3d6x", ErrorKind::UnsupportedModifier);
        check_err("3d6r<2", ErrorKind::UnsupportedModifier);
        check_err("3d{a,b}", ErrorKind::NonNumericFaces);
        check_err("3d{1,b}", ErrorKind::NonNumericFaces);

        let spec = parse_literal("20d20kh1").unwrap();
        let limits = Limits::default().with_max_outcomes(1000);
        assert_eq!(
            analyze(&spec, &limits).unwrap_err().kind(),
            ErrorKind::TooManyOutcomes
        );
    }

    proptest! {
        #[test]
        fn prop_mass_is_one(count in 1..=4u32, sides in 1..=8u32, keep in 0..=5u32) {
            for s in [
                format!("{}d{}", count, sides),
                format!("{}d{}kh{}", count, sides, keep),
                format!("{}d{}-1dl{}", count, sides, keep),
            ] {
                let analysis = analyze_str(&s).unwrap();
                prop_assert_eq!(analysis.distribution.total_mass(), prob(1, 1));
                let successes = analysis.success_distribution.unwrap();
                prop_assert_eq!(successes.total_mass(), prob(1, 1));
            }
        }
    }
}
