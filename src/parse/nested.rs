use super::error::{ParseError, ParseErrorKind};
use super::lexer::{tokenize, Token, TokenKind};
use super::parser::Parser;
use crate::roll::{RResult, RollContext, Roller};
use crate::spec::Substitution;
use std::ops::Range;

fn adjacent(a: &Token, b: &Token) -> bool {
    a.span.end == b.span.start
}

/// Matches `<op>NdS` at the start of `tokens`, where the term is not
/// followed by anything that would start a modifier.
fn nested_term(source: &str, tokens: &[Token]) -> Option<Range<usize>> {
    match tokens {
        [op, count, d, sides, ..]
            if TokenKind::NESTED_DICE_PREFIXES.contains(&op.kind)
                && count.kind == TokenKind::Integer
                && d.kind == TokenKind::Dice
                && sides.kind == TokenKind::Integer
                && adjacent(op, count)
                && adjacent(count, d)
                && adjacent(d, sides) =>
        {
            let next = source[sides.span.end..].chars().next();
            if next.map_or(false, |c| c.is_alphabetic() || c == '{') {
                None
            } else {
                Some(count.span.start..sides.span.end)
            }
        }
        _ => None,
    }
}

/// Fails on the first nested dice term of `source`. Without this check a
/// literal parse reads `+1d4` as a boost followed by a drop.
pub(super) fn reject_nested(source: &str) -> Result<(), ParseError> {
    let tokens = tokenize(source);
    match (0..tokens.len()).find_map(|i| nested_term(source, &tokens[i..])) {
        Some(span) => Err(ParseError {
            kind: ParseErrorKind::NestedDice,
            slice: source[span.clone()].to_owned(),
            span,
        }),
        None => Ok(()),
    }
}

/// Rolls every nested dice term of `source` and rewrites it as its total.
pub(super) fn resolve_nested<R: Roller>(
    source: &str,
    ctx: &mut RollContext<R>,
) -> RResult<(String, Vec<Substitution>)> {
    let tokens = tokenize(source);
    let mut rewritten = String::with_capacity(source.len());
    let mut substitutions = Vec::new();
    let mut last = 0;
    let mut i = 0;

    while i < tokens.len() {
        let span = match nested_term(source, &tokens[i..]) {
            Some(span) => span,
            None => {
                i += 1;
                continue;
            }
        };

        let text = &source[span.clone()];
        let spec = Parser::new(text).parse()?;
        let total = ctx.quick_total(&spec)?;
        tracing::debug!(term = text, %total, "substituted nested dice");

        rewritten.push_str(&source[last..span.start]);
        rewritten.push_str(&total.to_string());
        last = span.end;
        substitutions.push(Substitution {
            text: text.to_owned(),
            total,
            operator: source[tokens[i].span.clone()].to_owned(),
            span,
        });
        i += 4;
    }

    rewritten.push_str(&source[last..]);
    Ok((rewritten, substitutions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::error::ErrorKind;
    use crate::roll::roller::StepRoller;
    use crate::roll::RollError;

    fn resolve(s: &str) -> RResult<(String, Vec<Substitution>)> {
        let roller = StepRoller::new(NonZeroUInt::new(2).unwrap(), 1);
        resolve_nested(s, &mut RollContext::with_roller(roller))
    }

    #[test]
    fn test_resolve_nested() {
        let (text, subs) = resolve("1d20=+1d3>=17").unwrap();
        assert_eq!(text, "1d20=+2>=17");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].text, "1d3");
        assert_eq!(subs[0].total, int(2));
        assert_eq!(subs[0].operator, "=+");
        assert_eq!(subs[0].span, 6..9);
    }

    #[test]
    fn test_resolve_several() {
        let (text, subs) = resolve("1d20+2d4>=1d6").unwrap();
        assert_eq!(text, "1d20+5>=4");
        let ops: Vec<_> = subs.iter().map(|s| s.operator.as_str()).collect();
        assert_eq!(ops, ["+", ">="]);
    }

    #[test]
    fn test_leaves_head_and_modified_terms() {
        assert_eq!(resolve("4d6kh3").unwrap().0, "4d6kh3");
        assert_eq!(resolve("1d20+1d6x").unwrap().0, "1d20+1d6x");
        assert_eq!(resolve("1d20+1d{a,b}").unwrap().0, "1d20+1d{a,b}");
        assert_eq!(resolve("1d20 + 1d6").unwrap().0, "1d20 + 1d6");
    }

    #[test]
    fn test_reject_nested() {
        let err = reject_nested("1d20=+1d4").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestedDice);
        assert_eq!(err.span, 6..9);
        assert_eq!(err.kind.error_kind(), ErrorKind::BadExpression);

        assert_eq!(reject_nested("2d6+1d4").unwrap_err().slice, "1d4");
        assert_eq!(reject_nested("1d20>=1d6").unwrap_err().slice, "1d6");
        assert!(reject_nested("4d6kh3=+2t>=12").is_ok());
        assert!(reject_nested("1d20 + 1d6").is_ok());
    }

    #[test]
    fn test_nested_validation() {
        let err = resolve("1d20+500d6").unwrap_err();
        assert!(matches!(err, RollError::Parse(ref e) if e.kind.error_kind() == ErrorKind::TooManyDice));
    }
}
