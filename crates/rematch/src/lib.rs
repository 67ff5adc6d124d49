//! A small boolean query language for matching words and wildcard patterns
//! against blocks of text.
//!
//! Expressions combine words with `+` (and), `|` (or), `!` (not), and
//! parentheses. Words may carry the wildcards `*` (any run of characters),
//! `?` (exactly one character), and `_` (any run of whitespace), or be
//! quoted to include arbitrary non-whitespace characters.
//!
//! An [`Expression`] compiles once into Reverse Polish Notation and can then
//! be evaluated against any number of [`TextIndex`] values, producing a
//! [`MatchResult`] with the verdict and the substrings that matched.
//!
//! ```
//! use rematch::{Expression, TextIndex};
//! let text = TextIndex::new("Killer scourge scared, drowning helpless sheep");
//! let expr = Expression::new("scared*sheep+!wolf");
//! let result = expr
//!     .evaluate(&text)
//!     .unwrap_or_else(|err| panic!("expression should evaluate: {err}"));
//! assert!(result.matched);
//! assert_eq!(result.strings, ["scared, drowning helpless sheep"]);
//! ```

mod errors;
mod evaluator;
mod expression;
mod lexer;
mod parser;
mod pattern;
mod text;
mod token;

pub use errors::{Error, EvalError, SyntaxError};
pub use evaluator::{EvaluateOptions, MatchResult, evaluate, evaluate_with};
pub use expression::{CompileState, Expression, find_all, is_match};
pub use lexer::tokenize;
pub use parser::{compile, parse};
pub use pattern::{DEFAULT_SIZE_LIMIT, wildcard_fragment};
pub use text::TextIndex;
pub use token::{
    ESCAPE, Operand, Operator, QUOTE, Token, WILDCARD_ANY, WILDCARD_ONE, WILDCARD_SPACE,
    is_wildcard,
};
