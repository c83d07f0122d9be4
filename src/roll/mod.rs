mod ctx;
mod error;
pub(crate) mod roller;
mod score;

use crate::dice::Face;

pub type RResult<T> = Result<T, RollError>;

pub use ctx::{DefaultRoller, RollContext};
pub use error::RollError;
pub use roller::Roller;
pub use score::{score, total, ScoredResult};

/// The dice of one evaluation.
///
/// `natural` holds every draw in order (explosions included, compounded
/// explosions excepted). `modified` holds the values after rerolls, boosts and
/// explosions, filtered by keep/drop.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RollResult {
    pub natural: Vec<Face>,
    pub modified: Vec<Face>,
}
