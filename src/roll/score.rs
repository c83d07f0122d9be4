use super::RollResult;
use crate::common::Value;
use crate::dice::Face;
use crate::ops::Condition;
use crate::spec::RollSpec;
use num_traits::Zero;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A roll with its derived outcomes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScoredResult {
    pub roll: String,
    pub natural: Vec<Face>,
    pub modified: Vec<Face>,
    pub total: Value,
    pub success: Option<usize>,
    pub fail: Option<usize>,
    pub natural_success: Option<usize>,
    pub natural_fail: Option<usize>,
    pub pass: Option<bool>,
}

/// The sum of the modified values shifted by the total adjustment. Text and
/// mixed dice total zero.
pub fn total(result: &RollResult, spec: &RollSpec) -> Value {
    if !spec.is_numeric() {
        return Value::zero();
    }
    let sum: Value = result.modified.iter().filter_map(Face::number).sum();
    sum + Value::from_integer(spec.modifiers.adjustment())
}

fn count_matching(faces: &[Face], cond: &Condition) -> usize {
    faces
        .iter()
        .filter_map(Face::number)
        .filter(|x| cond.matches(x))
        .count()
}

pub fn score(expression: &str, result: RollResult, spec: &RollSpec) -> ScoredResult {
    let total = total(&result, spec);
    let modifiers = &spec.modifiers;

    let success = modifiers.success().map(|s| count_matching(&result.modified, &s.0));
    let fail = modifiers.fail().map(|f| count_matching(&result.modified, &f.0));
    let natural_success = modifiers
        .natural_success()
        .map(|ns| count_matching(&result.natural, &ns.0));
    let natural_fail = modifiers
        .natural_fail()
        .map(|nf| count_matching(&result.natural, &nf.0));
    let pass = modifiers.total_check().map(|t| t.matches(&total));

    ScoredResult {
        roll: expression.to_owned(),
        natural: result.natural,
        modified: result.modified,
        total,
        success,
        fail,
        natural_success,
        natural_fail,
        pass,
    }
}

fn stringify(faces: &[Face]) -> Vec<String> {
    faces.iter().map(ToString::to_string).collect()
}

impl Serialize for ScoredResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("roll", &self.roll)?;
        map.serialize_entry("natural", &stringify(&self.natural))?;
        map.serialize_entry("modified", &stringify(&self.modified))?;
        map.serialize_entry("total", &self.total.to_string())?;
        let counts = [
            ("success", self.success),
            ("fail", self.fail),
            ("ns", self.natural_success),
            ("nf", self.natural_fail),
        ];
        for (key, count) in counts {
            if let Some(count) = count {
                map.serialize_entry(key, &count.to_string())?;
            }
        }
        if let Some(pass) = self.pass {
            map.serialize_entry("pass", if pass { "1" } else { "0" })?;
        }
        map.end()
    }
}
