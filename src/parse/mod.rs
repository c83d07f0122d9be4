mod equation;
mod error;
mod lexer;
mod nested;
mod parser;

pub use equation::{parse_all_sub_expressions, substitute_equation, EquationRoll, SubExpression};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::TokenKind;
pub use parser::Parser;

use crate::roll::{RResult, RollContext, Roller};
use crate::spec::RollSpec;

/// Parses an expression that must not contain nested dice terms.
pub fn parse_literal(s: &str) -> Result<RollSpec, ParseError> {
    nested::reject_nested(s)?;
    Parser::new(s).parse()
}

/// Rolls any nested dice terms with `ctx`, then parses the rewritten expression.
pub fn parse_with<R: Roller>(s: &str, ctx: &mut RollContext<R>) -> RResult<RollSpec> {
    let (text, substitutions) = nested::resolve_nested(s, ctx)?;
    let mut spec = Parser::new(&text).parse()?;
    spec.substitutions = substitutions;
    tracing::trace!(expression = s, %spec, "parsed expression");
    Ok(spec)
}
