//! Parsing, rolling and probability analysis for RPG dice expressions such as
//! `4d6kh3`, `3d10x>=8` or `1d20=+5t>=15`.

pub mod common;
mod config;
pub mod dice;
mod error;
pub mod modifier;
pub mod ops;
pub mod parse;
pub mod prob;
pub mod roll;
pub mod spec;

pub use config::Limits;
pub use error::{Error, ErrorKind, Result};
pub use parse::{parse_all_sub_expressions, substitute_equation, EquationRoll, SubExpression};
pub use prob::{Analysis, Method, Stats};
pub use roll::{RollContext, Roller, ScoredResult};
pub use spec::RollSpec;

use std::fmt;

/// Parses `expression`, rolling any nested dice terms with the thread-local rng.
pub fn parse(expression: &str) -> Result<RollSpec> {
    parse_with(expression, &mut RollContext::default())
}

pub fn parse_with<R: Roller>(expression: &str, ctx: &mut RollContext<R>) -> Result<RollSpec> {
    Ok(parse::parse_with(expression, ctx)?)
}

/// Parses, rolls and scores `expression`.
pub fn roll(expression: &str) -> Result<ScoredResult> {
    roll_with(expression, &mut RollContext::default())
}

pub fn roll_with<R: Roller>(expression: &str, ctx: &mut RollContext<R>) -> Result<ScoredResult> {
    let spec = parse::parse_with(expression, ctx)?;
    let result = ctx.evaluate(&spec)?;
    Ok(roll::score(expression, result, &spec))
}

/// The outcome of [throw]: either a scored roll or a description of what went
/// wrong.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Throw {
    Rolled(ScoredResult),
    Bad(String),
}

impl Throw {
    pub fn is_bad(&self) -> bool {
        matches!(self, Self::Bad(_))
    }
}

impl From<Result<ScoredResult>> for Throw {
    fn from(result: Result<ScoredResult>) -> Self {
        match result {
            Ok(scored) => Self::Rolled(scored),
            Err(why) => Self::Bad(format!("Bad roll: {}", why)),
        }
    }
}

impl fmt::Display for Throw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rolled(scored) => {
                let json = serde_json::to_string(scored).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Self::Bad(why) => f.write_str(why),
        }
    }
}

/// Rolls `expression`, turning any failure into a [Throw::Bad] message.
pub fn throw(expression: &str) -> Throw {
    roll(expression).into()
}

pub fn throw_with<R: Roller>(expression: &str, ctx: &mut RollContext<R>) -> Throw {
    roll_with(expression, ctx).into()
}

/// Exact distribution of `expression`. Nested dice terms are rejected.
pub fn analyze(expression: &str) -> Result<Analysis> {
    analyze_with(expression, &Limits::default())
}

pub fn analyze_with(expression: &str, limits: &Limits) -> Result<Analysis> {
    let spec = parse::parse_literal(expression)?;
    Ok(prob::analyze(&spec, limits)?)
}

/// Approximate distribution of `expression` from `samples` rolls.
pub fn monte_carlo(expression: &str, samples: u32) -> Result<Analysis> {
    monte_carlo_with(expression, samples, &mut RollContext::default())
}

pub fn monte_carlo_with<R: Roller>(
    expression: &str,
    samples: u32,
    ctx: &mut RollContext<R>,
) -> Result<Analysis> {
    Ok(prob::monte_carlo(expression, samples, ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::dice::Face;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(seed: u64) -> RollContext<StdRng> {
        RollContext::with_roller(StdRng::seed_from_u64(seed))
    }

    fn numbers(faces: &[Face]) -> Vec<Value> {
        faces.iter().filter_map(Face::number).collect()
    }

    #[test]
    fn test_roll_total_adjustment() {
        for seed in 0..20 {
            let scored = roll_with("2d6=+10=-3", &mut seeded(seed)).unwrap();
            let sum: Value = numbers(&scored.modified).into_iter().sum();
            assert_eq!(scored.total, sum + int(7));
        }
    }

    #[test]
    fn test_roll_reroll_floor() {
        for seed in 0..20 {
            let scored = roll_with("10d6r<3", &mut seeded(seed)).unwrap();
            assert_eq!(scored.modified.len(), 10);
            assert!(numbers(&scored.modified).iter().all(|x| *x >= int(3)));
        }
    }

    #[test]
    fn test_roll_keep_highest() {
        for seed in 0..20 {
            let scored = roll_with("10d6kh5", &mut seeded(seed)).unwrap();
            let mut natural = numbers(&scored.natural);
            natural.sort_unstable_by(|a, b| b.cmp(a));
            let mut kept = numbers(&scored.modified);
            kept.sort_unstable_by(|a, b| b.cmp(a));
            assert_eq!(kept, natural[..5]);
        }
    }

    #[test]
    fn test_validation() {
        assert_eq!(parse("1d200").unwrap_err().kind(), ErrorKind::TooManyFaces);
        assert_eq!(parse("1d0").unwrap_err().kind(), ErrorKind::ImpossibleFaces);
        assert_eq!(parse("500d6").unwrap_err().kind(), ErrorKind::TooManyDice);
        assert_eq!(parse("2dx").unwrap_err().kind(), ErrorKind::UnknownSides);
        assert_eq!(parse("hello").unwrap_err().kind(), ErrorKind::BadExpression);
    }

    #[test]
    fn test_throw() {
        let rolled = throw_with("2d6=+1", &mut seeded(1));
        assert!(!rolled.is_bad());
        let json: serde_json::Value = serde_json::from_str(&rolled.to_string()).unwrap();
        assert_eq!(json["roll"], "2d6=+1");

        let bad = throw("1d0");
        assert!(bad.is_bad());
        assert!(bad.to_string().starts_with("Bad roll: "));
    }

    #[test]
    fn test_huge_literals_are_rejected() {
        for s in [
            "1d6=+9223372036854775807",
            "1d6=-9223372036854775808",
            "2d6+9223372036854775807",
            "2d6*9223372036854775807",
            "2d{1,9223372036854775807}",
        ] {
            assert!(throw(s).is_bad(), "{}", s);
            assert!(analyze(s).is_err(), "{}", s);
            assert!(monte_carlo_with(s, 10, &mut seeded(0)).is_err(), "{}", s);
        }
        assert_eq!(
            analyze("2d6+9223372036854775807").unwrap_err().kind(),
            ErrorKind::BadExpression
        );
        assert_eq!(
            analyze("2d{1,99999999999}").unwrap_err().kind(),
            ErrorKind::UnknownSides
        );
    }

    #[test]
    fn test_analyze() {
        let analysis = analyze("2d6").unwrap();
        assert_eq!(analysis.stats.mean, prob(7, 1));
        assert_eq!(analysis.stats.mode, vec1![int(7)]);

        assert_eq!(analyze("3d6x").unwrap_err().kind(), ErrorKind::UnsupportedModifier);
        assert_eq!(analyze("3d6r<2").unwrap_err().kind(), ErrorKind::UnsupportedModifier);
        assert_eq!(analyze("1d20=+1d4").unwrap_err().kind(), ErrorKind::BadExpression);
        assert_eq!(analyze("2d6+1d4").unwrap_err().kind(), ErrorKind::BadExpression);

        assert_eq!(analyze("1d200").unwrap_err().kind(), ErrorKind::TooManyFaces);
        assert_eq!(analyze("1d0").unwrap_err().kind(), ErrorKind::ImpossibleFaces);
        assert_eq!(analyze("500d6").unwrap_err().kind(), ErrorKind::TooManyDice);
        assert_eq!(
            analyze_with("1d{}", &Limits::default()).unwrap_err().kind(),
            ErrorKind::UnknownSides
        );

        let limits = Limits::default().with_max_outcomes(10);
        assert_eq!(
            analyze_with("5d6kh3", &limits).unwrap_err().kind(),
            ErrorKind::TooManyOutcomes
        );
    }

    #[test]
    fn test_monte_carlo() {
        let analysis = monte_carlo_with("2d6x", 5_000, &mut seeded(3)).unwrap();
        assert_eq!(analysis.method, Method::MonteCarlo { samples: 5_000 });
        assert!(analysis.stats.mean_f64() > 7.0);
    }
}
