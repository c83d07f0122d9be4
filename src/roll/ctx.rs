use super::{error::RollError, roller::Roller, score, RResult, RollResult};
use crate::common::*;
use crate::config::Limits;
use crate::dice::{Die, Face, FaceSet};
use crate::spec::RollSpec;
use num_traits::{One, Zero};

pub type DefaultRoller = rand::prelude::ThreadRng;

/// The values produced by one die position, explosions included.
struct Position {
    natural: Vec<Value>,
    modified: Vec<Value>,
}

pub struct RollContext<R = DefaultRoller> {
    limits: Limits,
    rolls: usize,
    roller: R,
}

impl<R: Roller> RollContext<R> {
    pub fn new(limits: Limits, roller: R) -> Self {
        Self {
            limits,
            rolls: 0,
            roller,
        }
    }

    pub fn with_roller(roller: R) -> Self {
        Self::new(Limits::default(), roller)
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn count_roll(&mut self) -> RResult<()> {
        self.rolls += 1;
        if self.rolls > self.limits.max_rolls {
            Err(RollError::TooManyRolls {
                limit: self.limits.max_rolls,
            })
        } else {
            Ok(())
        }
    }

    /// Draws one face, counting it against the roll budget.
    pub fn draw(&mut self, faces: &FaceSet) -> RResult<Face> {
        self.count_roll()?;
        Ok(Die::new(faces).roll(&mut self.roller))
    }

    fn draw_value(&mut self, faces: &FaceSet) -> RResult<Value> {
        Ok(self.draw(faces)?.number().unwrap_or_else(Value::zero))
    }

    /// Rolls every die of `spec`. The roll budget applies per call.
    pub fn evaluate(&mut self, spec: &RollSpec) -> RResult<RollResult> {
        self.rolls = 0;

        if !spec.is_numeric() {
            let faces = (0..spec.dice_count)
                .map(|_| self.draw(&spec.faces))
                .collect::<RResult<Vec<_>>>()?;
            return Ok(RollResult {
                natural: faces.clone(),
                modified: faces,
            });
        }

        let mut natural = Vec::with_capacity(spec.dice_count as usize);
        let mut modified = Vec::with_capacity(spec.dice_count as usize);
        for _ in 0..spec.dice_count {
            let position = self.roll_position(spec, 0)?;
            natural.extend(position.natural);
            modified.extend(position.modified);
        }
        let modified = spec.modifiers.filter_pool(modified);

        Ok(RollResult {
            natural: natural.into_iter().map(Face::Number).collect(),
            modified: modified.into_iter().map(Face::Number).collect(),
        })
    }

    fn roll_position(&mut self, spec: &RollSpec, depth: usize) -> RResult<Position> {
        let modifiers = &spec.modifiers;

        let mut natural = self.draw_value(&spec.faces)?;
        if let Some(reroll) = modifiers.reroll() {
            while reroll.cond.matches(&natural) {
                tracing::trace!(value = %natural, "rerolling");
                natural = self.draw_value(&spec.faces)?;
                if reroll.once {
                    break;
                }
            }
        }

        let modified = modifiers.boost_or_identity().apply(natural);
        let mut position = Position {
            natural: vec![natural],
            modified: vec![modified],
        };

        let explode = match modifiers.explode() {
            Some(explode) if explode.cond.matches(&modified) => explode,
            _ => return Ok(position),
        };
        if depth >= self.limits.max_explosion_depth {
            return Err(RollError::ExplosionDepthExceeded {
                limit: self.limits.max_explosion_depth,
            });
        }
        tracing::trace!(value = %modified, depth, "exploding");

        let mut extra = self.roll_position(spec, depth + 1)?;
        if explode.penetrate {
            if let Some(first) = extra.modified.first_mut() {
                *first -= Value::one();
            }
        }
        if explode.compound {
            position.modified[0] += extra.modified.iter().sum::<Value>();
        } else {
            position.natural.append(&mut extra.natural);
            position.modified.append(&mut extra.modified);
        }
        Ok(position)
    }

    /// Evaluates `spec` and returns only its total.
    pub fn quick_total(&mut self, spec: &RollSpec) -> RResult<Value> {
        let result = self.evaluate(spec)?;
        Ok(score::total(&result, spec))
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::with_roller(rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::int;
    use crate::error::ErrorKind;
    use crate::parse::parse_literal;
    use crate::roll::roller::{SequenceRoller, StepRoller};
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn mock_roller() -> StepRoller {
        StepRoller::new(NonZeroUInt::new(10).unwrap(), 1)
    }

    fn values(faces: &[Face]) -> Vec<Int> {
        faces
            .iter()
            .map(|f| f.number().unwrap().to_integer())
            .collect()
    }

    fn roll_with<R: Roller>(s: &str, roller: R) -> RResult<RollResult> {
        let spec = parse_literal(s).unwrap();
        RollContext::with_roller(roller).evaluate(&spec)
    }

    fn check(s: &str, natural: &[Int], modified: &[Int]) {
        let result = roll_with(s, mock_roller()).unwrap();
        assert_eq!(values(&result.natural), natural, "natural of {}", s);
        assert_eq!(values(&result.modified), modified, "modified of {}", s);
    }

    fn check_seq(s: &str, rolls: &[UInt], natural: &[Int], modified: &[Int]) {
        let result = roll_with(s, SequenceRoller::new(rolls)).unwrap();
        assert_eq!(values(&result.natural), natural, "natural of {}", s);
        assert_eq!(values(&result.modified), modified, "modified of {}", s);
    }

    fn check_err(s: &str, expected: ErrorKind) {
        let err = roll_with(s, mock_roller()).unwrap_err();
        assert_eq!(err.kind(), expected);
    }

    #[test]
    fn test_eval_dice() {
        check("2d6", &[4, 5], &[4, 5]);
        check("8d6", &[4, 5, 6, 1, 2, 3, 4, 5], &[4, 5, 6, 1, 2, 3, 4, 5]);
        check("1d20", &[10], &[10]);
    }

    #[test]
    fn test_eval_boost() {
        check("2d6*2", &[4, 5], &[8, 10]);
        check("2d6-1", &[4, 5], &[3, 4]);

        let result = roll_with("1d6/2", mock_roller()).unwrap();
        assert_eq!(result.modified, [Face::Number(int(2))]);
        let result = roll_with("1d6/3", StepRoller::new(NonZeroUInt::new(5).unwrap(), 1)).unwrap();
        assert_eq!(result.modified, [Face::Number(Value::new(5, 3))]);
    }

    #[test]
    fn test_eval_keep_drop() {
        check("4d6kh3", &[4, 5, 6, 1], &[6, 5, 4]);
        check("4d6kl1", &[4, 5, 6, 1], &[1]);
        check("4d6dl1", &[4, 5, 6, 1], &[4, 5, 6]);
        check("4d6dh2", &[4, 5, 6, 1], &[4, 1]);
        check("4d6kh3dl1", &[4, 5, 6, 1], &[5, 6]);
        check("2d6kh0", &[4, 5], &[]);
    }

    #[test]
    fn test_eval_reroll() {
        check("8d6r<3", &[4, 5, 6, 3, 4, 5, 6, 3], &[4, 5, 6, 3, 4, 5, 6, 3]);
        check("4d6ro<3", &[4, 5, 6, 2], &[4, 5, 6, 2]);
    }

    #[test]
    fn test_eval_explode() {
        check("3d6x", &[4, 5, 6, 1], &[4, 5, 6, 1]);
        check("3d6xx", &[4, 5, 6], &[4, 5, 7]);
        check("3d6xp", &[4, 5, 6, 1], &[4, 5, 6, 0]);
        check("2d6+2x>=7", &[4, 5, 6, 1], &[6, 7, 8, 3]);
    }

    #[test]
    fn test_eval_explode_chain() {
        check_seq("1d6x", &[6, 6, 2], &[6, 6, 2], &[6, 6, 2]);
        check_seq("1d6xx", &[6, 6, 2], &[6], &[14]);
        check_seq("1d6xp", &[6, 6, 2], &[6, 6, 2], &[6, 5, 1]);
        check_seq("1d6xxp", &[6, 6, 2], &[6], &[12]);
        check_seq("2d6xkh1", &[6, 3, 4], &[6, 3, 4], &[6]);
    }

    #[test]
    fn test_eval_text() {
        let result = roll_with("3d{a,b,c}kh1", mock_roller()).unwrap();
        let natural: Vec<_> = result.natural.iter().map(ToString::to_string).collect();
        assert_eq!(natural, ["a", "b", "c"]);
        assert_eq!(result.natural, result.modified);
    }

    #[test]
    fn test_err_limits() {
        check_err("1d1x", ErrorKind::ExplosionDepthExceeded);
        check_err("1d6r>=1", ErrorKind::TooManyRolls);

        let spec = parse_literal("4d6").unwrap();
        let mut ctx = RollContext::new(Limits::default().with_max_rolls(3), mock_roller());
        assert_eq!(ctx.evaluate(&spec), Err(RollError::TooManyRolls { limit: 3 }));

        let spec = parse_literal("1d6x").unwrap();
        let limits = Limits::default().with_max_explosion_depth(1);
        let mut ctx = RollContext::new(limits, SequenceRoller::new(&[6]));
        assert_eq!(
            ctx.evaluate(&spec),
            Err(RollError::ExplosionDepthExceeded { limit: 1 })
        );
    }

    #[test]
    fn test_keep_retains_largest() {
        let spec = parse_literal("10d6kh5").unwrap();
        let mut ctx = RollContext::with_roller(StdRng::seed_from_u64(7));
        for _ in 0..100 {
            let result = ctx.evaluate(&spec).unwrap();
            let mut natural = values(&result.natural);
            natural.sort_unstable_by(|a, b| b.cmp(a));
            assert_eq!(values(&result.modified), &natural[..5]);
        }
    }

    proptest! {
        #[test]
        fn prop_reroll_floor(seed in any::<u64>(), floor in 2..=6i64) {
            let spec = parse_literal(&format!("10d6r<{}", floor)).unwrap();
            let mut ctx = RollContext::with_roller(StdRng::seed_from_u64(seed));
            let result = ctx.evaluate(&spec).unwrap();
            prop_assert_eq!(result.modified.len(), 10);
            prop_assert!(values(&result.modified).iter().all(|&x| x >= floor));
        }

        #[test]
        fn prop_keep_count(seed in any::<u64>(), count in 0..=12u32) {
            let spec = parse_literal(&format!("10d6kh{}", count)).unwrap();
            let mut ctx = RollContext::with_roller(StdRng::seed_from_u64(seed));
            let result = ctx.evaluate(&spec).unwrap();
            prop_assert_eq!(result.natural.len(), 10);
            prop_assert_eq!(result.modified.len(), count.min(10) as usize);
        }
    }
}
