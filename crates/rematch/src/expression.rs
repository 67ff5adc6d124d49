//! Compile-once expression wrapper.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use log::debug;

use crate::errors::{Error, SyntaxError};
use crate::evaluator::{EvaluateOptions, MatchResult, evaluate_with};
use crate::parser::compile;
use crate::text::TextIndex;
use crate::token::Token;

/// Compilation state of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileState {
    /// The raw expression has not been compiled yet, or the last attempt
    /// failed.
    Uncompiled,
    /// The RPN form is cached and will not be recomputed.
    Compiled,
}

/// A query expression and its cached Reverse Polish Notation form.
///
/// Compilation happens at most once. A failed compile leaves the expression
/// uncompiled so it may be retried; concurrent first compiles may each do the
/// work, but only one result is ever published.
///
/// # Examples
/// ```
/// use rematch::{CompileState, Expression, TextIndex};
/// let expr = Expression::new("Apples|(ostriches+apples)");
/// assert_eq!(expr.state(), CompileState::Uncompiled);
/// expr.compile().unwrap_or_else(|err| panic!("expression should compile: {err}"));
/// assert_eq!(expr.rpn(), ["Apples", "ostriches", "apples", "+", "|"]);
///
/// let text = TextIndex::new("Apples ducks straw, quail a ostriches donkey");
/// let result = expr
///     .evaluate(&text)
///     .unwrap_or_else(|err| panic!("expression should evaluate: {err}"));
/// assert!(result.matched);
/// assert_eq!(result.strings, ["Apples"]);
/// ```
#[derive(Clone, Default)]
pub struct Expression {
    raw: String,
    rpn: OnceLock<Vec<Token>>,
}

impl Expression {
    /// Wrap a raw expression without compiling it.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            rpn: OnceLock::new(),
        }
    }

    /// Build an already-compiled expression from a stored RPN sequence.
    ///
    /// The sequence is trusted as-is; structural problems surface as
    /// [`EvalError`](crate::EvalError)s at evaluation time.
    #[must_use]
    pub fn from_rpn(raw: impl Into<String>, rpn: Vec<Token>) -> Self {
        Self {
            raw: raw.into(),
            rpn: OnceLock::from(rpn),
        }
    }

    /// The raw expression text.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Current compilation state.
    #[must_use]
    pub fn state(&self) -> CompileState {
        if self.rpn.get().is_some() {
            CompileState::Compiled
        } else {
            CompileState::Uncompiled
        }
    }

    /// Whether the RPN form is cached.
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.state() == CompileState::Compiled
    }

    /// Compiled tokens, if the expression has been compiled.
    #[must_use]
    pub fn tokens(&self) -> Option<&[Token]> {
        self.rpn.get().map(Vec::as_slice)
    }

    /// The RPN form flattened to operand and operator text. Empty until
    /// compiled.
    #[must_use]
    pub fn rpn(&self) -> Vec<&str> {
        self.tokens()
            .map(|tokens| tokens.iter().map(Token::text).collect())
            .unwrap_or_default()
    }

    /// Compile the expression, returning the cached tokens.
    fn compiled(&self) -> Result<&[Token], SyntaxError> {
        if let Some(rpn) = self.rpn.get() {
            return Ok(rpn);
        }
        let rpn = compile(&self.raw).inspect_err(|err| {
            debug!("expression `{}` failed to compile: {err}", self.raw);
        })?;
        debug!(
            "compiled expression `{}` into {} RPN token(s)",
            self.raw,
            rpn.len()
        );
        Ok(self.rpn.get_or_init(|| rpn))
    }

    /// Compile the expression into RPN. Later calls are no-ops.
    ///
    /// # Errors
    /// Returns the [`SyntaxError`] of a malformed expression; the expression
    /// stays uncompiled.
    pub fn compile(&self) -> Result<(), SyntaxError> {
        self.compiled().map(|_| ())
    }

    /// Evaluate against a prepared text, compiling first if needed.
    ///
    /// # Errors
    /// Returns [`Error::Syntax`] when compilation fails and [`Error::Eval`]
    /// when the compiled form cannot be evaluated.
    pub fn evaluate(&self, text: &TextIndex) -> Result<MatchResult, Error> {
        self.evaluate_with(text, EvaluateOptions::default())
    }

    /// Evaluate with explicit options, compiling first if needed.
    ///
    /// # Errors
    /// See [`Expression::evaluate`].
    pub fn evaluate_with(
        &self,
        text: &TextIndex,
        options: EvaluateOptions,
    ) -> Result<MatchResult, Error> {
        let rpn = self.compiled()?;
        Ok(evaluate_with(rpn, text, options)?)
    }

    /// Whether the expression matches the text.
    ///
    /// # Errors
    /// See [`Expression::evaluate`].
    pub fn is_match(&self, text: &TextIndex) -> Result<bool, Error> {
        self.evaluate(text).map(|result| result.matched)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("raw", &self.raw)
            .field("rpn", &self.rpn())
            .field("state", &self.state())
            .finish()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.tokens() == other.tokens()
    }
}

impl FromStr for Expression {
    type Err = SyntaxError;

    /// Parse and eagerly compile an expression.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let expr = Self::new(raw);
        expr.compile()?;
        Ok(expr)
    }
}

/// Evaluate an expression against a text, compiling it first if needed.
///
/// # Errors
/// See [`Expression::evaluate`].
pub fn find_all(expr: &Expression, text: &TextIndex) -> Result<MatchResult, Error> {
    expr.evaluate(text)
}

/// Whether an expression matches a text.
///
/// # Errors
/// See [`Expression::evaluate`].
pub fn is_match(expr: &Expression, text: &TextIndex) -> Result<bool, Error> {
    expr.is_match(text)
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Expression;
    use crate::token::Token;

    #[derive(Deserialize)]
    struct ExpressionRepr {
        raw: String,
        #[serde(default)]
        rpn: Vec<Token>,
        #[serde(default)]
        compiled: bool,
    }

    #[derive(Serialize)]
    struct ExpressionRef<'a> {
        raw: &'a str,
        rpn: &'a [Token],
        compiled: bool,
    }

    impl Serialize for Expression {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            ExpressionRef {
                raw: &self.raw,
                rpn: self.tokens().unwrap_or_default(),
                compiled: self.is_compiled(),
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Expression {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let repr = ExpressionRepr::deserialize(deserializer)?;
            Ok(if repr.compiled {
                Self::from_rpn(repr.raw, repr.rpn)
            } else {
                Self::new(repr.raw)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalError;
    use crate::token::{Operand, Operator};

    #[test]
    fn compile_is_idempotent() {
        let expr = Expression::new("((((ch?ips))))|(fish***+(((tasty))))");
        assert!(!expr.is_compiled());
        assert_eq!(expr.compile(), Ok(()));
        let first: Vec<String> = expr.rpn().into_iter().map(str::to_owned).collect();
        assert_eq!(expr.compile(), Ok(()));
        assert_eq!(expr.rpn(), first);
        assert_eq!(first, ["ch?ips", "fish*", "tasty", "+", "|"]);
    }

    #[test]
    fn failed_compile_stays_uncompiled() {
        let expr = Expression::new("(hi++hi1)");
        assert_eq!(expr.compile(), Err(SyntaxError::UnexpectedInfixOperator));
        assert_eq!(expr.state(), CompileState::Uncompiled);
        assert!(expr.rpn().is_empty());
        assert_eq!(expr.compile(), Err(SyntaxError::UnexpectedInfixOperator));
    }

    #[test]
    fn evaluate_compiles_lazily() {
        let expr = Expression::new("!!foo");
        let result = expr
            .evaluate(&TextIndex::new("foo"))
            .unwrap_or_else(|err| panic!("expression should evaluate: {err}"));
        assert!(expr.is_compiled());
        assert!(result.matched);
        assert_eq!(result.strings, ["foo"]);
    }

    #[test]
    fn evaluate_surfaces_compile_errors() {
        let expr = Expression::new("(hi");
        assert_eq!(
            expr.evaluate(&TextIndex::new("hi")),
            Err(Error::Syntax(SyntaxError::MismatchedParenthesisAtEnd))
        );
    }

    #[test]
    fn precompiled_rpn_is_not_recompiled() {
        let expr = Expression::from_rpn(
            "hi",
            vec![Token::Operand(Operand::word("hi")), Token::Operator(Operator::And)],
        );
        assert!(expr.is_compiled());
        assert_eq!(
            expr.evaluate(&TextIndex::new("hi")),
            Err(Error::Eval(EvalError::MissingBinaryOperands))
        );
    }

    #[test]
    fn parses_eagerly() {
        let expr: Expression = "scared*sheep"
            .parse()
            .unwrap_or_else(|err| panic!("expression should parse: {err}"));
        assert!(expr.is_compiled());
        assert!("hey there".parse::<Expression>().is_err());
    }

    #[test]
    fn free_functions_delegate() {
        let expr = Expression::new("wind*moonshine");
        let text = TextIndex::new("Gate wind,\nmoonshine horses");
        assert_eq!(is_match(&expr, &text), Ok(true));
        let result = find_all(&expr, &text)
            .unwrap_or_else(|err| panic!("expression should evaluate: {err}"));
        assert_eq!(result.strings, ["wind,\nmoonshine"]);
    }

    #[test]
    fn shared_across_threads() {
        let expr = std::sync::Arc::new(Expression::new("dog|(mio+FBK)"));
        let text = std::sync::Arc::new(TextIndex::new("mio FBK"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let expr = std::sync::Arc::clone(&expr);
                let text = std::sync::Arc::clone(&text);
                std::thread::spawn(move || expr.is_match(&text))
            })
            .collect();
        for handle in handles {
            let verdict = handle
                .join()
                .unwrap_or_else(|_| panic!("evaluation thread panicked"));
            assert_eq!(verdict, Ok(true));
        }
        assert_eq!(expr.rpn(), ["dog", "mio", "FBK", "+", "|"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_compiled_expression() {
        let expr: Expression = "((((ch?ips))))|(fish***+(((tasty))))"
            .parse()
            .unwrap_or_else(|err| panic!("expression should parse: {err}"));
        let json = serde_json::to_string(&expr)
            .unwrap_or_else(|err| panic!("expression should serialize: {err}"));
        assert_eq!(
            json,
            r#"{"raw":"((((ch?ips))))|(fish***+(((tasty))))","rpn":[{"s":"ch?ips","r":1},{"s":"fish*","r":1},{"s":"tasty"},{"s":"+"},{"s":"|"}],"compiled":true}"#
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_uncompiled_expression_with_empty_rpn() {
        let expr = Expression::new("(hi++hi1)");
        assert!(expr.compile().is_err());
        let json = serde_json::to_string(&expr)
            .unwrap_or_else(|err| panic!("expression should serialize: {err}"));
        assert_eq!(json, r#"{"raw":"(hi++hi1)","rpn":[],"compiled":false}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_negation_flags_survive() {
        let json = r#"{"raw":"!tasty__|delish","rpn":[{"s":"tasty_","!":1,"r":1},{"s":"!"},{"s":"delish"},{"s":"|"}],"compiled":true}"#;
        let expr: Expression = serde_json::from_str(json)
            .unwrap_or_else(|err| panic!("expression should deserialize: {err}"));
        let fresh: Expression = "!tasty__|delish"
            .parse()
            .unwrap_or_else(|err| panic!("expression should parse: {err}"));
        assert_eq!(expr, fresh);
        let round_trip = serde_json::to_string(&expr)
            .unwrap_or_else(|err| panic!("expression should serialize: {err}"));
        assert_eq!(round_trip, json);
    }
}
