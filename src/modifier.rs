use crate::common::{Int, Layer, UInt, Value};
use crate::ops::{ArithOp, Condition};
use std::collections::{btree_map, BTreeMap};
use std::fmt;

/// The kind of a [Modifier]. A specification holds at most one modifier per kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ModifierKind {
    Boost,
    Adjust,
    Success,
    Keep,
    Drop,
    Explode,
    Reroll,
    Fail,
    NaturalSuccess,
    NaturalFail,
    TotalCheck,
}

impl ModifierKind {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Boost => "b",
            Self::Adjust => "l",
            Self::Success => "s",
            Self::Keep => "k",
            Self::Drop => "d",
            Self::Explode => "x",
            Self::Reroll => "r",
            Self::Fail => "f",
            Self::NaturalSuccess => "ns",
            Self::NaturalFail => "nf",
            Self::TotalCheck => "t",
        }
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.token())
    }
}

#[enum_dispatch::enum_dispatch]
pub trait Modify {
    fn kind(&self) -> ModifierKind;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[enum_dispatch::enum_dispatch(Modify)]
pub enum Modifier {
    Boost(Boost),
    Adjust(Adjust),
    Success(Success),
    Keep(Keep),
    Drop(Drop),
    Explode(Explode),
    Reroll(Reroll),
    Fail(Fail),
    NaturalSuccess(NaturalSuccess),
    NaturalFail(NaturalFail),
    TotalCheck(TotalCheck),
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boost(x) => x.fmt(f),
            Self::Adjust(x) => x.fmt(f),
            Self::Success(x) => x.fmt(f),
            Self::Keep(x) => x.fmt(f),
            Self::Drop(x) => x.fmt(f),
            Self::Explode(x) => x.fmt(f),
            Self::Reroll(x) => x.fmt(f),
            Self::Fail(x) => x.fmt(f),
            Self::NaturalSuccess(x) => x.fmt(f),
            Self::NaturalFail(x) => x.fmt(f),
            Self::TotalCheck(x) => x.fmt(f),
        }
    }
}

/// Per-die arithmetic applied to every drawn value before explosions are checked.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Boost {
    pub op: ArithOp,
    pub magnitude: Int,
}

impl Boost {
    pub const fn new(op: ArithOp, magnitude: Int) -> Self {
        Self { op, magnitude }
    }

    pub fn apply(&self, value: Value) -> Value {
        self.op.apply(value, Value::from_integer(self.magnitude))
    }

    pub fn is_identity(&self) -> bool {
        match self.op {
            ArithOp::Add | ArithOp::Sub => self.magnitude == 0,
            ArithOp::Mul | ArithOp::Div => self.magnitude == 1,
        }
    }
}

impl Default for Boost {
    fn default() -> Self {
        Self::new(ArithOp::Add, 0)
    }
}

impl Modify for Boost {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Boost
    }
}

impl fmt::Display for Boost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}{}", self.op, self.magnitude)
    }
}

/// Signed adjustment added once to the total.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Adjust(pub Int);

impl Modify for Adjust {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Adjust
    }
}

impl fmt::Display for Adjust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{:+}", self.0)
    }
}

/// Retains the `count` highest (or lowest) values of a pool.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Keep {
    pub layer: Layer,
    pub count: UInt,
}

impl Keep {
    pub const fn new(layer: Layer, count: UInt) -> Self {
        Self { layer, count }
    }

    pub fn apply(&self, values: &mut Vec<Value>) {
        match self.layer {
            Layer::High => values.sort_unstable_by(|a, b| b.cmp(a)),
            Layer::Low => values.sort_unstable(),
        }
        values.truncate(self.count as usize);
    }
}

impl Modify for Keep {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Keep
    }
}

impl fmt::Display for Keep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}{}", self.layer, self.count)
    }
}

/// Discards the `count` lowest (or highest) values of a pool.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Drop {
    pub layer: Layer,
    pub count: UInt,
}

impl Drop {
    pub const fn new(layer: Layer, count: UInt) -> Self {
        Self { layer, count }
    }

    pub fn apply(&self, values: &mut Vec<Value>) {
        match self.layer {
            Layer::Low => values.sort_unstable(),
            Layer::High => values.sort_unstable_by(|a, b| b.cmp(a)),
        }
        let n = values.len().min(self.count as usize);
        values.drain(..n);
    }
}

impl Modify for Drop {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Drop
    }
}

impl fmt::Display for Drop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}{}", self.layer, self.count)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Explode {
    pub cond: Condition,
    pub compound: bool,
    pub penetrate: bool,
}

impl Modify for Explode {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Explode
    }
}

impl fmt::Display for Explode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("x")?;
        if self.compound {
            f.write_str("x")?;
        }
        if self.penetrate {
            f.write_str("p")?;
        }
        self.cond.fmt(f)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Reroll {
    pub cond: Condition,
    pub once: bool,
}

impl Modify for Reroll {
    fn kind(&self) -> ModifierKind {
        ModifierKind::Reroll
    }
}

impl fmt::Display for Reroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.once { "ro" } else { "r" };
        write!(f, "{}{}", token, self.cond)
    }
}

macro_rules! condition_modifier {
    ($($(#[$attr:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
            pub struct $name(pub Condition);

            impl $name {
                pub fn matches(&self, value: &Value) -> bool {
                    self.0.matches(value)
                }
            }

            impl Modify for $name {
                fn kind(&self) -> ModifierKind {
                    ModifierKind::$name
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}{}", ModifierKind::$name.token(), self.0)
                }
            }
        )+
    };
}

condition_modifier!(
    /// Counts modified values meeting the condition.
    Success,
    Fail,
    /// Counts natural values meeting the condition.
    NaturalSuccess,
    NaturalFail,
    /// Tests the final total.
    TotalCheck,
);

macro_rules! accessors {
    ($($fn_name:ident => $variant:ident),+ $(,)?) => {
        $(
            pub fn $fn_name(&self) -> Option<&$variant> {
                match self.0.get(&ModifierKind::$variant) {
                    Some(Modifier::$variant(x)) => Some(x),
                    _ => None,
                }
            }
        )+
    };
}

/// The resolved modifiers of a specification, one per [ModifierKind].
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Modifiers(BTreeMap<ModifierKind, Modifier>);

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a modifier, replacing (and returning) any previous one of the same kind.
    pub fn insert(&mut self, modifier: impl Into<Modifier>) -> Option<Modifier> {
        let modifier = modifier.into();
        self.0.insert(modifier.kind(), modifier)
    }

    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, ModifierKind, Modifier> {
        self.0.values()
    }

    accessors!(
        boost => Boost,
        adjust => Adjust,
        success => Success,
        keep => Keep,
        drop => Drop,
        explode => Explode,
        reroll => Reroll,
        fail => Fail,
        natural_success => NaturalSuccess,
        natural_fail => NaturalFail,
        total_check => TotalCheck,
    );

    /// The per-die boost, or the identity when none is set.
    pub fn boost_or_identity(&self) -> Boost {
        self.boost().copied().unwrap_or_default()
    }

    pub fn adjustment(&self) -> Int {
        self.adjust().map_or(0, |a| a.0)
    }

    pub fn has_pool(&self) -> bool {
        self.contains(ModifierKind::Keep) || self.contains(ModifierKind::Drop)
    }

    /// Applies keep, then drop, to a pool of modified values.
    pub fn filter_pool(&self, mut values: Vec<Value>) -> Vec<Value> {
        if let Some(keep) = self.keep() {
            keep.apply(&mut values);
        }
        if let Some(drop) = self.drop() {
            drop.apply(&mut values);
        }
        values
    }
}

impl<'a> IntoIterator for &'a Modifiers {
    type Item = &'a Modifier;
    type IntoIter = btree_map::Values<'a, ModifierKind, Modifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
