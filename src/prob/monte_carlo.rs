use super::{Analysis, AnalysisError, Method, Tally};
use crate::common::*;
use crate::parse;
use crate::roll::{score, RollContext, Roller};
use num_bigint::BigInt;

/// Approximates the distribution of `expression` by rolling it `samples`
/// times. Nested dice terms are rolled afresh for every sample.
pub fn monte_carlo<R: Roller>(
    expression: &str,
    samples: u32,
    ctx: &mut RollContext<R>,
) -> Result<Analysis, AnalysisError> {
    if samples == 0 {
        return Err(AnalysisError::NoSamples);
    }
    let first = parse::parse_with(expression, ctx)?;
    if !first.is_numeric() {
        return Err(AnalysisError::NonNumericFaces(first.face_kind()));
    }
    let resample = !first.substitutions.is_empty();
    tracing::debug!(expression, samples, resample, "sampling");

    let mut totals = Tally::new();
    let mut successes = first.modifiers.success().map(|_| Tally::new());
    let mut passes = 0u32;

    for i in 0..samples {
        let resolved;
        let spec = if resample && i > 0 {
            resolved = parse::parse_with(expression, ctx)?;
            &resolved
        } else {
            &first
        };
        let result = ctx.evaluate(spec)?;
        let scored = score(expression, result, spec);

        totals.record_one(scored.total);
        if let (Some(tally), Some(count)) = (successes.as_mut(), scored.success) {
            tally.record_one(count);
        }
        if scored.pass == Some(true) {
            passes += 1;
        }
    }

    let pass_probability = first
        .modifiers
        .total_check()
        .map(|_| Probability::new(BigInt::from(passes), BigInt::from(samples)));

    Analysis::new(
        totals.into_distribution(),
        successes.map(Tally::into_distribution),
        pass_probability,
        Method::MonteCarlo { samples },
    )
    .ok_or(AnalysisError::NoSamples)
}
