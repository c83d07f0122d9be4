use super::error::{ParseError, ParseErrorKind};
use super::lexer::{tokenize, Token, TokenKind};
use crate::common::*;
use crate::dice::FaceSet;
use crate::modifier::{self, Adjust, Boost, Explode, Keep, Modifier, Modifiers, Reroll};
use crate::ops::{ArithOp, CmpOp, Condition};
use crate::spec::RollSpec;
use std::ops::Range;
use std::str::FromStr;

pub(super) type PResult<T> = Result<T, ParseError>;

/// Modifiers whose values accumulate while parsing and are only inserted at
/// the end.
#[derive(Default)]
struct Pending {
    boost: Boost,
    adjust: Int,
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    contiguous: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_tokens(source, tokenize(source), false)
    }

    /// Creates a parser over an already lexed suffix of `source`. A
    /// contiguous parser treats the first whitespace gap as the end of input.
    pub(super) fn with_tokens(source: &'a str, tokens: Vec<Token>, contiguous: bool) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            contiguous,
        }
    }

    /// Parses the whole input as a single expression.
    pub fn parse(mut self) -> PResult<RollSpec> {
        let spec = self.parse_spec()?;
        if self.peek().is_some() {
            self.unexpected_token(vec![])
        } else {
            Ok(spec)
        }
    }

    /// Parses the longest expression at the start of the input, returning it
    /// with the number of tokens consumed.
    pub(super) fn parse_prefix(mut self) -> PResult<(RollSpec, usize)> {
        let spec = self.parse_spec()?;
        Ok((spec, self.pos))
    }

    fn peek_nth(&self, n: usize) -> Option<TokenKind> {
        let index = self.pos + n;
        let token = self.tokens.get(index)?;
        if self.contiguous
            && !(self.pos.max(1)..=index)
                .all(|i| self.tokens[i - 1].span.end == self.tokens[i].span.start)
        {
            return None;
        }
        Some(token.kind)
    }

    fn peek(&self) -> Option<TokenKind> {
        self.peek_nth(0)
    }

    fn advance(&mut self) -> Option<Token> {
        self.peek()?;
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        Some(token)
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn matches_any(&self, options: &[TokenKind]) -> bool {
        self.peek().map_or(false, |peeked| options.contains(&peeked))
    }

    /// Whether the next token is one of `options` and is followed by an integer.
    fn matches_with_integer(&self, options: &[TokenKind]) -> bool {
        self.matches_any(options) && self.peek_nth(1) == Some(TokenKind::Integer)
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<Range<usize>> {
        match self.peek() {
            Some(kind) if kind == expected => {
                let span = self.tokens[self.pos].span.clone();
                self.pos += 1;
                Ok(span)
            }
            _ => self.unexpected_token(vec![expected]),
        }
    }

    fn consume_any(&mut self, options: &[TokenKind]) -> Option<Token> {
        if self.matches_any(options) {
            self.advance()
        } else {
            None
        }
    }

    fn end_span(&self) -> Range<usize> {
        let end = self.source.len();
        end..end
    }

    fn error<T>(&self, kind: ParseErrorKind, span: Range<usize>) -> PResult<T> {
        Err(ParseError {
            kind,
            slice: self.source[span.clone()].to_string(),
            span,
        })
    }

    fn unexpected_token<T>(&mut self, expected: Vec<TokenKind>) -> PResult<T> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Error,
                span,
            }) => self.error(ParseErrorKind::UnexpectedString { expected }, span),
            Some(Token { kind, span }) => self.error(
                ParseErrorKind::UnexpectedToken {
                    found: Some(kind),
                    expected,
                },
                span,
            ),
            None => self.error(
                ParseErrorKind::UnexpectedToken {
                    found: None,
                    expected,
                },
                self.end_span(),
            ),
        }
    }

    fn integer<T: FromStr>(&self, span: Range<usize>) -> PResult<T> {
        match self.source[span.clone()].parse() {
            Ok(x) => Ok(x),
            Err(_) => self.error(ParseErrorKind::NumberTooLarge, span),
        }
    }

    fn optional_integer<T: FromStr>(&mut self) -> PResult<Option<(T, Range<usize>)>> {
        if self.matches(TokenKind::Integer) {
            let span = self.consume(TokenKind::Integer)?;
            Ok(Some((self.integer(span.clone())?, span)))
        } else {
            Ok(None)
        }
    }

    /// An optional integer no larger than [MAX_LITERAL].
    fn optional_literal(&mut self) -> PResult<Option<(Int, Range<usize>)>> {
        match self.optional_integer::<Int>()? {
            Some((x, span)) if x > MAX_LITERAL => {
                self.error(ParseErrorKind::NumberTooLarge, span)
            }
            other => Ok(other),
        }
    }

    fn parse_spec(&mut self) -> PResult<RollSpec> {
        let count_span = self.consume(TokenKind::Integer)?;
        self.consume(TokenKind::Dice)?;
        let faces = self.parse_sides()?;

        let count = match self.integer::<u64>(count_span.clone()) {
            Ok(count) if count <= MAX_DICE => count as UInt,
            _ => return self.error(ParseErrorKind::TooManyDice, count_span),
        };
        if count == 0 {
            return self.error(ParseErrorKind::NoDice, count_span);
        }

        let max_face = faces.max();
        let mut pending = Pending::default();
        let mut modifiers = Modifiers::new();

        if self.matches_with_integer(TokenKind::ARITHMETIC_OPS) {
            pending.boost = self.parse_boost()?;
        }

        while self.matches_with_integer(TokenKind::ADJUSTMENTS) {
            self.parse_adjustment(&mut pending.adjust)?;
        }

        let evaluator = match self.consume_any(TokenKind::COMPARISON_OPS) {
            Some(token) => {
                let threshold = match self.optional_literal()? {
                    Some((x, _)) => x,
                    None => max_face.unwrap_or(0),
                };
                Some(Condition::new(cmp_op(&token), threshold))
            }
            None => None,
        };

        while self.matches_any(TokenKind::METHODS) {
            self.parse_method(max_face, &mut modifiers, &mut pending)?;
        }

        if self.matches_with_integer(TokenKind::COMPARISON_OPS) {
            let cond = self.parse_condition(0)?;
            modifiers.insert(modifier::TotalCheck(cond));
        }

        if self.matches_with_integer(TokenKind::SIGNS) {
            self.parse_adjustment(&mut pending.adjust)?;
        }

        if !faces.kind().is_integer() {
            let mut modifiers = Modifiers::new();
            modifiers.insert(Adjust(pending.adjust));
            return Ok(RollSpec::new(count, faces, modifiers));
        }

        modifiers.insert(pending.boost);
        modifiers.insert(Adjust(pending.adjust));
        match evaluator {
            Some(cond) => {
                modifiers.insert(modifier::Success(cond));
            }
            None if modifiers.success().is_none() => {
                let cond = Condition::new(CmpOp::Ge, max_face.unwrap_or(0));
                modifiers.insert(modifier::Success(cond));
            }
            None => {}
        }

        Ok(RollSpec::new(count, faces, modifiers))
    }

    fn parse_sides(&mut self) -> PResult<FaceSet> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Integer,
                span,
            }) => {
                let sides = match self.integer::<u64>(span.clone()) {
                    Ok(sides) => sides,
                    Err(_) => return self.error(ParseErrorKind::TooManyFaces, span),
                };
                if sides > MAX_SIDES {
                    return self.error(ParseErrorKind::TooManyFaces, span);
                }
                match NonZeroUInt::new(sides as UInt) {
                    Some(sides) => Ok(FaceSet::Range(sides)),
                    None => self.error(ParseErrorKind::ImpossibleFaces, span),
                }
            }
            Some(Token {
                kind: TokenKind::FaceList,
                span,
            }) => match FaceSet::parse_list(&self.source[span.clone()]) {
                Some(faces) => Ok(faces),
                None => self.error(ParseErrorKind::UnknownSides, span),
            },
            Some(Token { span, .. }) => self.error(ParseErrorKind::UnknownSides, span),
            None => self.error(ParseErrorKind::UnknownSides, self.end_span()),
        }
    }

    /// `<arithOp> <integer>`, or the argument of a `b` method where both parts
    /// are optional.
    fn parse_boost(&mut self) -> PResult<Boost> {
        let op = self
            .consume_any(TokenKind::ARITHMETIC_OPS)
            .and_then(|t| t.kind.as_arith_op())
            .unwrap_or(ArithOp::Add);
        let (magnitude, span) = match self.optional_literal()? {
            Some(x) => x,
            None => (0, self.end_span()),
        };
        if op == ArithOp::Div && magnitude == 0 {
            return self.error(ParseErrorKind::DivisionByZero, span);
        }
        Ok(Boost::new(op, magnitude))
    }

    /// A signed amount added to the running total adjustment. The sign token
    /// is optional; a missing amount is zero.
    fn parse_adjustment(&mut self, adjust: &mut Int) -> PResult<()> {
        let negative = matches!(
            self.consume_any(&[
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::EqualPlus,
                TokenKind::EqualMinus
            ]),
            Some(Token {
                kind: TokenKind::Minus | TokenKind::EqualMinus,
                ..
            })
        );
        let (amount, span) = match self.optional_literal()? {
            Some(x) => x,
            None => return Ok(()),
        };
        let amount = if negative { -amount } else { amount };
        match adjust.checked_add(amount) {
            Some(x) if x.abs() <= MAX_LITERAL => {
                *adjust = x;
                Ok(())
            }
            _ => self.error(ParseErrorKind::NumberTooLarge, span),
        }
    }

    /// `[<cmpOp>] [<integer>]`, defaulting to equality with `default`.
    fn parse_condition(&mut self, default: Int) -> PResult<Condition> {
        let op = self
            .consume_any(TokenKind::COMPARISON_OPS)
            .map_or(CmpOp::Eq, |t| cmp_op(&t));
        let threshold = match self.optional_literal()? {
            Some((x, _)) => x,
            None => default,
        };
        Ok(Condition::new(op, threshold))
    }

    fn parse_method(
        &mut self,
        max_face: Option<Int>,
        modifiers: &mut Modifiers,
        pending: &mut Pending,
    ) -> PResult<()> {
        let token = match self.advance() {
            Some(token) => token,
            None => return self.unexpected_token(TokenKind::METHODS.to_vec()),
        };
        let kind = token.kind;

        match kind {
            TokenKind::Boost => {
                pending.boost = self.parse_boost()?;
                return Ok(());
            }
            TokenKind::Adjust => return self.parse_adjustment(&mut pending.adjust),
            _ => {}
        }

        let default = if TokenKind::HIGH_METHODS.contains(&kind) {
            max_face.unwrap_or(0)
        } else if TokenKind::LOW_METHODS.contains(&kind) {
            1
        } else {
            0
        };

        if TokenKind::POOL_METHODS.contains(&kind) {
            if let Some(Token { span, .. }) = self.consume_any(TokenKind::COMPARISON_OPS) {
                return self.error(ParseErrorKind::PoolComparison(kind), span);
            }
            let count = match self.optional_integer::<u64>()? {
                Some((x, _)) => x,
                None => u64::try_from(default).unwrap_or(0),
            };
            let count = UInt::try_from(count).unwrap_or(UInt::MAX);
            let modifier: Modifier = match kind {
                TokenKind::KeepLowest => Keep::new(Layer::Low, count).into(),
                TokenKind::Keep | TokenKind::KeepHighest => Keep::new(Layer::High, count).into(),
                TokenKind::DropHighest => modifier::Drop::new(Layer::High, count).into(),
                _ => modifier::Drop::new(Layer::Low, count).into(),
            };
            modifiers.insert(modifier);
            return Ok(());
        }

        let cond = self.parse_condition(default)?;
        let modifier: Modifier = match kind {
            TokenKind::Explode => explode(cond, false, false),
            TokenKind::Compound => explode(cond, true, false),
            TokenKind::Penetrate => explode(cond, false, true),
            TokenKind::CompoundPenetrate => explode(cond, true, true),
            TokenKind::Reroll => Reroll { cond, once: false }.into(),
            TokenKind::RerollOnce => Reroll { cond, once: true }.into(),
            TokenKind::Success => modifier::Success(cond).into(),
            TokenKind::Fail => modifier::Fail(cond).into(),
            TokenKind::NaturalSuccess => modifier::NaturalSuccess(cond).into(),
            TokenKind::NaturalFail => modifier::NaturalFail(cond).into(),
            TokenKind::TotalCheck => modifier::TotalCheck(cond).into(),
            _ => {
                return self.error(
                    ParseErrorKind::UnexpectedToken {
                        found: Some(kind),
                        expected: TokenKind::METHODS.to_vec(),
                    },
                    token.span,
                )
            }
        };
        modifiers.insert(modifier);
        Ok(())
    }
}

fn cmp_op(token: &Token) -> CmpOp {
    token.kind.as_cmp_op().unwrap_or(CmpOp::Eq)
}

fn explode(cond: Condition, compound: bool, penetrate: bool) -> Modifier {
    Explode {
        cond,
        compound,
        penetrate,
    }
    .into()
}
