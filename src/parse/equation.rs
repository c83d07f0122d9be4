use super::lexer::{tokenize, Token, TokenKind};
use super::parser::Parser;
use super::ParseError;
use crate::common::Value;
use crate::roll::{self, RResult, RollContext, Roller, ScoredResult};
use crate::spec::RollSpec;
use num_traits::Signed;
use std::ops::Range;

/// A dice expression found inside a larger piece of text.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SubExpression {
    pub text: String,
    pub spec: RollSpec,
    pub span: Range<usize>,
}

fn starts_dice_term(tokens: &[Token]) -> bool {
    match tokens {
        [count, d, sides, ..] => {
            count.kind == TokenKind::Integer
                && d.kind == TokenKind::Dice
                && matches!(sides.kind, TokenKind::Integer | TokenKind::FaceList)
                && count.span.end == d.span.start
                && d.span.end == sides.span.start
        }
        _ => false,
    }
}

/// Finds every dice expression in `equation`, in order of appearance.
///
/// Each match extends as far as the expression grammar allows without
/// crossing whitespace, so `1d20+5 + 2d6` yields `1d20+5` and `2d6`.
pub fn parse_all_sub_expressions(equation: &str) -> Result<Vec<SubExpression>, ParseError> {
    let tokens = tokenize(equation);
    let mut found = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if !starts_dice_term(&tokens[i..]) {
            i += 1;
            continue;
        }

        let (spec, consumed) =
            Parser::with_tokens(equation, tokens[i..].to_vec(), true).parse_prefix()?;
        let span = tokens[i].span.start..tokens[i + consumed - 1].span.end;
        found.push(SubExpression {
            text: equation[span.clone()].to_owned(),
            spec,
            span,
        });
        i += consumed;
    }

    Ok(found)
}

/// The result of rolling every dice expression inside an equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationRoll {
    /// The equation with each dice expression replaced by its total.
    pub equation: String,
    pub rolls: Vec<(SubExpression, ScoredResult)>,
}

fn format_total(total: &Value) -> String {
    if total.is_negative() || !total.is_integer() {
        format!("({})", total)
    } else {
        total.to_string()
    }
}

/// Rolls every dice expression inside `equation` and substitutes its total.
pub fn substitute_equation<R: Roller>(
    equation: &str,
    ctx: &mut RollContext<R>,
) -> RResult<EquationRoll> {
    let terms = parse_all_sub_expressions(equation)?;
    let mut rewritten = String::with_capacity(equation.len());
    let mut rolls = Vec::with_capacity(terms.len());
    let mut last = 0;

    for term in terms {
        let result = ctx.evaluate(&term.spec)?;
        let scored = roll::score(&term.text, result, &term.spec);
        rewritten.push_str(&equation[last..term.span.start]);
        rewritten.push_str(&format_total(&scored.total));
        last = term.span.end;
        rolls.push((term, scored));
    }
    rewritten.push_str(&equation[last..]);

    Ok(EquationRoll {
        equation: rewritten,
        rolls,
    })
}
