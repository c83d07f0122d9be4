use super::lexer::TokenKind;
use crate::common::{MAX_DICE, MAX_LITERAL, MAX_SIDES};
use crate::error::ErrorKind;
use std::fmt;
use std::ops::Range;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub slice: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: Option<TokenKind>,
        expected: Vec<TokenKind>,
    },
    UnexpectedString {
        expected: Vec<TokenKind>,
    },
    NumberTooLarge,
    NestedDice,
    NoDice,
    DivisionByZero,
    PoolComparison(TokenKind),
    UnknownSides,
    ImpossibleFaces,
    TooManyFaces,
    TooManyDice,
}

impl ParseErrorKind {
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSides => ErrorKind::UnknownSides,
            Self::ImpossibleFaces => ErrorKind::ImpossibleFaces,
            Self::TooManyFaces => ErrorKind::TooManyFaces,
            Self::TooManyDice => ErrorKind::TooManyDice,
            _ => ErrorKind::BadExpression,
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                match found {
                    Some(found) => write!(f, "unexpected token: found {}", found)?,
                    None => write!(f, "unexpected end of input")?,
                }
                if !expected.is_empty() {
                    f.write_str(", expected ")?;
                    fmt_expected(expected, f)?;
                }
                Ok(())
            }
            Self::UnexpectedString { expected } => {
                f.write_str("unrecognized input")?;
                if !expected.is_empty() {
                    f.write_str(", expected ")?;
                    fmt_expected(expected, f)?;
                }
                Ok(())
            }
            Self::NumberTooLarge => write!(f, "numbers may be at most {}", MAX_LITERAL),
            Self::NestedDice => f.write_str("nested dice terms cannot be analyzed exactly"),
            Self::NoDice => f.write_str("at least one die must be rolled"),
            Self::DivisionByZero => f.write_str("cannot divide a die by zero"),
            Self::PoolComparison(kind) => {
                write!(f, "{} takes a count, not a comparison", kind)
            }
            Self::UnknownSides => f.write_str("die sides must be a number or a {...} list"),
            Self::ImpossibleFaces => f.write_str("a die needs at least one side"),
            Self::TooManyFaces => write!(f, "a die may have at most {} sides", MAX_SIDES),
            Self::TooManyDice => write!(f, "at most {} dice may be rolled", MAX_DICE),
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let len = expected.len();

    if len == 1 {
        f.write_str(expected[0].as_str())
    } else if len == 2 {
        write!(f, "{} or {}", expected[0], expected[1])
    } else {
        for exp in &expected[..len - 1] {
            write!(f, "{}, ", exp)?;
        }
        write!(f, "or {}", expected[len - 1])
    }
}
