//! Token types shared by the lexer, parser, and evaluator.

use std::fmt;

/// Wildcard matching any sequence of characters, lazily.
pub const WILDCARD_ANY: char = '*';
/// Wildcard matching exactly one character.
pub const WILDCARD_ONE: char = '?';
/// Wildcard matching any run of whitespace, lazily.
pub const WILDCARD_SPACE: char = '_';
/// Delimiter of quoted literals.
pub const QUOTE: char = '"';
/// Escape character inside quoted literals.
pub const ESCAPE: char = '\\';

/// Returns `true` for the three wildcard symbols.
#[must_use]
pub const fn is_wildcard(ch: char) -> bool {
    matches!(ch, WILDCARD_ANY | WILDCARD_ONE | WILDCARD_SPACE)
}

/// Operator symbols of the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Infix conjunction, `+`.
    And,
    /// Infix disjunction, `|`.
    Or,
    /// Prefix negation, `!`.
    Not,
    /// Group opener, `(`.
    GroupLeft,
    /// Group closer, `)`.
    GroupRight,
}

impl Operator {
    /// Map a character onto its operator, if any.
    ///
    /// # Examples
    /// ```
    /// use rematch::Operator;
    /// assert_eq!(Operator::from_char('+'), Some(Operator::And));
    /// assert_eq!(Operator::from_char('*'), None);
    /// ```
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::And),
            '|' => Some(Self::Or),
            '!' => Some(Self::Not),
            '(' => Some(Self::GroupLeft),
            ')' => Some(Self::GroupRight),
            _ => None,
        }
    }

    /// The single-character symbol of the operator.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::And => '+',
            Self::Or => '|',
            Self::Not => '!',
            Self::GroupLeft => '(',
            Self::GroupRight => ')',
        }
    }

    /// The symbol as a static string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "+",
            Self::Or => "|",
            Self::Not => "!",
            Self::GroupLeft => "(",
            Self::GroupRight => ")",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A word or pattern operand.
///
/// `text` keeps the source form, including surrounding quotes and escapes,
/// so it doubles as the aggregation key during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operand {
    /// Source text of the operand.
    pub text: String,
    /// Whether the operand sits inside an odd number of negation scopes.
    pub negated: bool,
    /// Whether the operand contains wildcards and matches as a pattern.
    pub pattern: bool,
}

impl Operand {
    /// Create a non-negated operand.
    #[must_use]
    pub fn new(text: impl Into<String>, pattern: bool) -> Self {
        Self {
            text: text.into(),
            negated: false,
            pattern,
        }
    }

    /// Create an operand that is matched by exact word membership.
    #[must_use]
    pub fn word(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    /// Create an operand that is matched as a wildcard pattern.
    #[must_use]
    pub fn pattern(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }
}

/// The text between the quotes of a quoted word, or `None` when `text` is
/// not wrapped in a pair of quotes.
pub(crate) fn quoted_body(text: &str) -> Option<&str> {
    if text.len() < 2 {
        return None;
    }
    text.strip_prefix(QUOTE)?.strip_suffix(QUOTE)
}

/// A lexed or compiled token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// An operator symbol.
    Operator(Operator),
    /// A word or pattern.
    Operand(Operand),
}

impl Token {
    /// The token's text: the operator symbol or the operand source.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Operator(op) => op.as_str(),
            Self::Operand(operand) => &operand.text,
        }
    }

    /// Whether the token is a negated operand.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        matches!(self, Self::Operand(Operand { negated: true, .. }))
    }

    /// Whether the token is a pattern operand.
    #[must_use]
    pub const fn is_pattern(&self) -> bool {
        matches!(self, Self::Operand(Operand { pattern: true, .. }))
    }

    /// Build a token from its text form, treating operator symbols as
    /// operators and everything else as a word operand.
    ///
    /// # Examples
    /// ```
    /// use rematch::{Operator, Token};
    /// assert_eq!(Token::from_text("|"), Token::Operator(Operator::Or));
    /// assert_eq!(Token::from_text("foo").text(), "foo");
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut chars = text.chars();
        match (chars.next().and_then(Operator::from_char), chars.next()) {
            (Some(op), None) => Self::Operator(op),
            _ => Self::Operand(Operand::word(text)),
        }
    }
}

impl From<Operator> for Token {
    fn from(op: Operator) -> Self {
        Self::Operator(op)
    }
}

impl From<Operand> for Token {
    fn from(operand: Operand) -> Self {
        Self::Operand(operand)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! Compact wire form: `{"s": text}` plus `"!": 1` and `"r": 1` flags.

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Operand, Token};

    #[derive(Serialize, Deserialize)]
    struct TokenRepr<'a> {
        #[serde(rename = "s", borrow)]
        text: std::borrow::Cow<'a, str>,
        #[serde(rename = "!", default, skip_serializing_if = "is_zero")]
        negated: u8,
        #[serde(rename = "r", default, skip_serializing_if = "is_zero")]
        pattern: u8,
    }

    #[expect(
        clippy::trivially_copy_pass_by_ref,
        reason = "serde passes skip predicates by reference"
    )]
    fn is_zero(flag: &u8) -> bool {
        *flag == 0
    }

    impl Serialize for Token {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            TokenRepr {
                text: self.text().into(),
                negated: u8::from(self.is_negated()),
                pattern: u8::from(self.is_pattern()),
            }
            .serialize(serializer)
        }
    }

    impl<'de> Deserialize<'de> for Token {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let repr = TokenRepr::deserialize(deserializer)?;
            Ok(match Self::from_text(&repr.text) {
                Self::Operand(_) => Self::Operand(Operand {
                    text: repr.text.into_owned(),
                    negated: repr.negated != 0,
                    pattern: repr.pattern != 0,
                }),
                op @ Self::Operator(_) => op,
            })
        }
    }
}
