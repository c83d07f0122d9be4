use crate::ops::{ArithOp, CmpOp};
use logos::{Logos, Span};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lexes the whole input eagerly; whitespace is skipped but remains visible as
/// gaps between adjacent spans.
pub fn tokenize(s: &str) -> Vec<Token> {
    TokenKind::lexer(s)
        .spanned()
        .map(|(kind, span)| Token { kind, span })
        .collect()
}

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,
    #[regex(r"\{[^{}]*\}")]
    FaceList,

    #[token("d")]
    Dice,
    #[token("dl")]
    DropLowest,
    #[token("dh")]
    DropHighest,
    #[token("k")]
    Keep,
    #[token("kh")]
    KeepHighest,
    #[token("kl")]
    KeepLowest,
    #[token("x")]
    Explode,
    #[token("xx")]
    Compound,
    #[token("xp")]
    Penetrate,
    #[token("xxp")]
    CompoundPenetrate,
    #[token("r")]
    Reroll,
    #[token("ro")]
    RerollOnce,
    #[token("s")]
    Success,
    #[token("f")]
    Fail,
    #[token("ns")]
    NaturalSuccess,
    #[token("nf")]
    NaturalFail,
    #[token("t")]
    TotalCheck,
    #[token("b")]
    Boost,
    #[token("l")]
    Adjust,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=+")]
    EqualPlus,
    #[token("=-")]
    EqualMinus,

    #[token("<")]
    LessThan,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterEqual,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub const COMPARISON_OPS: &'static [Self] = &[
        Self::LessThan,
        Self::LessEqual,
        Self::GreaterThan,
        Self::GreaterEqual,
        Self::Equal,
        Self::EqualEqual,
        Self::BangEqual,
    ];

    pub const ARITHMETIC_OPS: &'static [Self] = &[Self::Plus, Self::Minus, Self::Star, Self::Slash];

    pub const SIGNS: &'static [Self] = &[Self::Plus, Self::Minus];

    pub const ADJUSTMENTS: &'static [Self] = &[Self::EqualPlus, Self::EqualMinus];

    /// Methods that select part of the pool and take only a count.
    pub const POOL_METHODS: &'static [Self] = &[
        Self::Keep,
        Self::KeepHighest,
        Self::KeepLowest,
        Self::Dice,
        Self::DropLowest,
        Self::DropHighest,
    ];

    pub const METHODS: &'static [Self] = &[
        Self::Keep,
        Self::KeepHighest,
        Self::KeepLowest,
        Self::Dice,
        Self::DropLowest,
        Self::DropHighest,
        Self::Explode,
        Self::Compound,
        Self::Penetrate,
        Self::CompoundPenetrate,
        Self::Reroll,
        Self::RerollOnce,
        Self::Success,
        Self::Fail,
        Self::NaturalSuccess,
        Self::NaturalFail,
        Self::TotalCheck,
        Self::Boost,
        Self::Adjust,
    ];

    /// Methods whose omitted value defaults to the largest face.
    pub const HIGH_METHODS: &'static [Self] = &[
        Self::Success,
        Self::Explode,
        Self::Compound,
        Self::Penetrate,
        Self::CompoundPenetrate,
        Self::Keep,
        Self::KeepHighest,
        Self::DropHighest,
        Self::NaturalSuccess,
    ];

    /// Methods whose omitted value defaults to one.
    pub const LOW_METHODS: &'static [Self] = &[
        Self::Fail,
        Self::KeepLowest,
        Self::Dice,
        Self::DropLowest,
        Self::Reroll,
        Self::RerollOnce,
        Self::NaturalFail,
    ];

    /// Tokens after which a contiguous `NdS` is rolled ahead of parsing.
    pub const NESTED_DICE_PREFIXES: &'static [Self] = &[
        Self::Plus,
        Self::Minus,
        Self::Star,
        Self::Slash,
        Self::EqualPlus,
        Self::EqualMinus,
        Self::LessThan,
        Self::LessEqual,
        Self::GreaterThan,
        Self::GreaterEqual,
        Self::Equal,
        Self::EqualEqual,
        Self::BangEqual,
    ];

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            FaceList => "<face list>",
            Dice => "'d'",
            DropLowest => "'dl'",
            DropHighest => "'dh'",
            Keep => "'k'",
            KeepHighest => "'kh'",
            KeepLowest => "'kl'",
            Explode => "'x'",
            Compound => "'xx'",
            Penetrate => "'xp'",
            CompoundPenetrate => "'xxp'",
            Reroll => "'r'",
            RerollOnce => "'ro'",
            Success => "'s'",
            Fail => "'f'",
            NaturalSuccess => "'ns'",
            NaturalFail => "'nf'",
            TotalCheck => "'t'",
            Boost => "'b'",
            Adjust => "'l'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            EqualPlus => "'=+'",
            EqualMinus => "'=-'",
            LessThan => "'<'",
            LessEqual => "'<='",
            GreaterThan => "'>'",
            GreaterEqual => "'>='",
            Equal => "'='",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            Error => "<error>",
        }
    }

    pub fn as_cmp_op(&self) -> Option<CmpOp> {
        use CmpOp::*;
        Some(match self {
            Self::LessThan => Lt,
            Self::LessEqual => Le,
            Self::GreaterThan => Gt,
            Self::GreaterEqual => Ge,
            Self::Equal | Self::EqualEqual => Eq,
            Self::BangEqual => Ne,
            _ => return None,
        })
    }

    pub fn as_arith_op(&self) -> Option<ArithOp> {
        use ArithOp::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn check(s: &str, expected: &[TokenKind]) {
        let actual: Vec<_> = tokenize(s).into_iter().map(|t| t.kind).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_lex_dice() {
        check("4d6", &[Integer, Dice, Integer]);
        check("2d{a, b}", &[Integer, Dice, FaceList]);
        check("3d6 kh2", &[Integer, Dice, Integer, KeepHighest, Integer]);
    }

    #[test]
    fn test_lex_longest_match() {
        check("xxp", &[CompoundPenetrate]);
        check("xx x xp", &[Compound, Explode, Penetrate]);
        check("=+3==", &[EqualPlus, Integer, EqualEqual]);
        check(">=<=!=", &[GreaterEqual, LessEqual, BangEqual]);
        check("dldhd", &[DropLowest, DropHighest, Dice]);
        check("nsnfro", &[NaturalSuccess, NaturalFail, RerollOnce]);
    }

    #[test]
    fn test_lex_spans() {
        let tokens = tokenize("1d6 + 2");
        let spans: Vec<_> = tokens.iter().map(|t| t.span.clone()).collect();
        assert_eq!(spans, [0..1, 1..2, 2..3, 4..5, 6..7]);
    }

    #[test]
    fn test_lex_error() {
        check("1d6?", &[Integer, Dice, Integer, Error]);
    }
}
