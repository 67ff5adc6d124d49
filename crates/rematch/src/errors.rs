//! Error types shared by the compiler and evaluator.

use thiserror::Error;

/// Errors raised while tokenizing or parsing a malformed expression.
///
/// Every variant carries a fixed message so callers can branch on the exact
/// condition.
///
/// # Examples
/// ```
/// use rematch::{SyntaxError, compile};
/// let Err(err) = compile("(hi") else {
///     panic!("unbalanced group should fail");
/// };
/// assert_eq!(err, SyntaxError::MismatchedParenthesisAtEnd);
/// assert_eq!(err.to_string(), "mismatched parenthesis at end of expression");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SyntaxError {
    /// A word outside quotes contains something other than ASCII letters,
    /// digits, or wildcards.
    #[error("invalid char in word; must be alphanumeric")]
    InvalidCharacter,
    /// A word consists of wildcard operators only.
    #[error("invalid word; cannot only contain wildcards")]
    OnlyWildcards,
    /// A quoted word has nothing between its quotes.
    #[error("invalid word; no quoted pattern")]
    EmptyQuotedWord,
    /// A word starts or ends with a quote without being fully quoted.
    #[error("invalid word; malformed quotes")]
    MalformedQuotes,
    /// An unquoted word contains a quote or escape character.
    #[error("invalid word; unquoted word has non-alphanumeric")]
    UnquotedNonAlphanumeric,
    /// A quoted literal is never closed.
    #[error("mismatched quotations")]
    MismatchedQuotations,
    /// A backslash inside quotes escapes something other than a wildcard,
    /// backslash, or quote.
    #[error("invalid escape; valid escapes are wildcards, backslash, and double quotes")]
    InvalidEscape,
    /// A quoted word contains whitespace.
    #[error("invalid whitespace char in word; use escaped whitespace wildcard instead")]
    InvalidWhitespace,
    /// `+` or `|` appears where an operand was expected.
    #[error("unexpected infix operator, want operand")]
    UnexpectedInfixOperator,
    /// `(` appears where an operator was expected.
    #[error("unexpected left parenthesis")]
    UnexpectedLeftParenthesis,
    /// `)` appears where an operand was expected.
    #[error("unexpected right parenthesis")]
    UnexpectedRightParenthesis,
    /// A word or pattern appears where an operator was expected.
    #[error("unexpected operand, want operator")]
    UnexpectedOperand,
    /// `!` appears where an operator was expected.
    #[error("unexpected negation")]
    UnexpectedNegation,
    /// The expression ends while an operand is still expected.
    #[error("unexpected operator at end of expression, want operand")]
    UnexpectedEnd,
    /// A `)` has no matching `(`.
    #[error("mismatched parenthesis")]
    MismatchedParenthesis,
    /// A `(` is still open when the expression ends.
    #[error("mismatched parenthesis at end of expression")]
    MismatchedParenthesisAtEnd,
}

/// Errors raised while evaluating a structurally invalid RPN sequence.
///
/// The parser never produces such sequences; these guard hand-built or
/// deserialized input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// `!` found an empty operand stack.
    #[error("less than 1 argument in stack; likely syntax error in RPN")]
    MissingUnaryOperand,
    /// `+` or `|` found fewer than two operands.
    #[error("less than 2 arguments in stack; likely syntax error in RPN")]
    MissingBinaryOperands,
    /// The walk finished with anything other than exactly one value.
    #[error("invalid element count in stack at end of evaluation")]
    InvalidElementCount,
    /// A grouping operator survived into the RPN sequence.
    #[error("unexpected grouping operator `{0}` in RPN")]
    UnexpectedGrouping(char),
    /// The regular expression derived from a pattern operand failed to build.
    #[error("failed to build pattern `{pattern}`: {source}")]
    Pattern {
        /// Operand text the pattern was derived from.
        pattern: String,
        /// Underlying regex failure.
        #[source]
        source: regex::Error,
    },
}

/// Any failure surfaced by [`Expression::evaluate`](crate::Expression::evaluate).
///
/// # Examples
/// ```
/// use rematch::{Error, Expression, SyntaxError, TextIndex};
/// let expr = Expression::new("k+|+kk+");
/// let err = expr
///     .evaluate(&TextIndex::new("k kk"))
///     .err()
///     .unwrap_or_else(|| panic!("malformed expression should fail"));
/// assert_eq!(err, Error::Syntax(SyntaxError::UnexpectedInfixOperator));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The expression failed to compile.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// The compiled expression failed to evaluate.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_messages_are_fixed() {
        assert_eq!(
            SyntaxError::OnlyWildcards.to_string(),
            "invalid word; cannot only contain wildcards"
        );
        assert_eq!(
            SyntaxError::UnexpectedEnd.to_string(),
            "unexpected operator at end of expression, want operand"
        );
    }

    #[test]
    fn wraps_both_error_kinds() {
        let err = Error::from(EvalError::InvalidElementCount);
        assert_eq!(
            err.to_string(),
            "invalid element count in stack at end of evaluation"
        );
        assert!(matches!(
            Error::from(SyntaxError::InvalidEscape),
            Error::Syntax(SyntaxError::InvalidEscape)
        ));
    }

    #[test]
    fn forwards_regex_error_display() {
        let err = EvalError::Pattern {
            pattern: "a*".into(),
            source: regex::Error::Syntax("bad".into()),
        };
        assert!(err.to_string().starts_with("failed to build pattern `a*`"));
        assert!(err.to_string().contains("bad"));
    }
}
