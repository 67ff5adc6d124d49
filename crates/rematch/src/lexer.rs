//! Expression lexer converting raw expression strings into tokens.
//!
//! The lexer makes a single left-to-right pass, accumulating word characters
//! into a buffer that is flushed whenever an operator or a closing quote is
//! reached. Consecutive `*` and `_` wildcards collapse into one. Inside a
//! quoted literal every non-whitespace character is literal; wildcards only
//! act as wildcards when escaped with `\`.

use crate::errors::SyntaxError;
use crate::token::{
    ESCAPE, Operand, Operator, QUOTE, Token, WILDCARD_ANY, WILDCARD_ONE, WILDCARD_SPACE,
    is_wildcard, quoted_body,
};

/// Characters permitted in an unquoted word.
fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
}

#[derive(Default)]
struct Lexer {
    tokens: Vec<Token>,
    word: String,
    /// Previous character was a collapsing `*`.
    adjacent_any: bool,
    /// Previous character was a collapsing `_`.
    adjacent_space: bool,
    in_quotes: bool,
    in_unquoted_word: bool,
    escaped: bool,
}

impl Lexer {
    fn push_operator(&mut self, op: Operator) -> Result<(), SyntaxError> {
        if self.in_quotes {
            if self.escaped {
                return Err(SyntaxError::InvalidEscape);
            }
            self.word.push(op.symbol());
        } else {
            self.flush()?;
            self.tokens.push(Token::Operator(op));
        }
        self.adjacent_any = false;
        self.adjacent_space = false;
        self.in_unquoted_word = false;
        Ok(())
    }

    /// Append a collapsing wildcard (`*` or `_`).
    ///
    /// Outside quotes a repeat is dropped. Inside quotes an unescaped repeat
    /// is a literal character, and an escaped repeat drops its backslash so
    /// `\*\*` reduces to a single `\*`.
    fn push_collapsing(&mut self, ch: char, adjacent: bool) -> bool {
        if !adjacent {
            self.word.push(ch);
            return true;
        }
        if !self.in_quotes {
            return true;
        }
        if self.escaped {
            self.word.pop();
            return true;
        }
        self.word.push(ch);
        false
    }

    fn push_quote(&mut self) -> Result<(), SyntaxError> {
        if self.in_unquoted_word {
            return Err(SyntaxError::InvalidCharacter);
        }
        self.word.push(QUOTE);
        if self.escaped {
            self.escaped = false;
            return Ok(());
        }
        if self.in_quotes {
            self.flush()?;
            self.in_quotes = false;
        } else {
            self.in_quotes = true;
        }
        Ok(())
    }

    fn push_escape(&mut self) -> Result<(), SyntaxError> {
        if !self.in_quotes {
            return Err(SyntaxError::InvalidCharacter);
        }
        self.word.push(ESCAPE);
        self.escaped = !self.escaped;
        Ok(())
    }

    fn push_word_char(&mut self, ch: char) -> Result<(), SyntaxError> {
        if self.in_quotes {
            if self.escaped {
                return Err(SyntaxError::InvalidEscape);
            }
            if ch.is_whitespace() {
                return Err(SyntaxError::InvalidWhitespace);
            }
        } else {
            self.in_unquoted_word = true;
            if !is_word_char(ch) {
                return Err(SyntaxError::InvalidCharacter);
            }
        }
        self.word.push(ch);
        self.adjacent_any = false;
        self.adjacent_space = false;
        Ok(())
    }

    fn step(&mut self, ch: char) -> Result<(), SyntaxError> {
        if let Some(op) = Operator::from_char(ch) {
            return self.push_operator(op);
        }
        match ch {
            WILDCARD_ANY => {
                self.adjacent_any = self.push_collapsing(ch, self.adjacent_any);
                self.adjacent_space = false;
                self.escaped = false;
            }
            WILDCARD_SPACE => {
                self.adjacent_space = self.push_collapsing(ch, self.adjacent_space);
                self.adjacent_any = false;
                self.escaped = false;
            }
            WILDCARD_ONE => {
                self.word.push(ch);
                self.adjacent_any = false;
                self.adjacent_space = false;
                self.escaped = false;
            }
            QUOTE => self.push_quote()?,
            ESCAPE => self.push_escape()?,
            _ => self.push_word_char(ch)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SyntaxError> {
        if self.word.is_empty() {
            return Ok(());
        }
        let word = std::mem::take(&mut self.word);
        let pattern = classify_word(&word)?;
        self.tokens.push(Token::Operand(Operand::new(word, pattern)));
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, SyntaxError> {
        if self.in_quotes {
            return Err(SyntaxError::MismatchedQuotations);
        }
        self.flush()?;
        Ok(self.tokens)
    }
}

/// Validate a completed word and report whether it is a pattern.
///
/// A word must hold at least one character that is not a wildcard; quoted
/// words are patterns only when a wildcard follows an unpaired `\`.
fn classify_word(word: &str) -> Result<bool, SyntaxError> {
    match quoted_body(word) {
        Some("") => Err(SyntaxError::EmptyQuotedWord),
        Some(body) => classify_quoted(body),
        None if word.starts_with(QUOTE) || word.ends_with(QUOTE) => {
            Err(SyntaxError::MalformedQuotes)
        }
        None => classify_unquoted(word),
    }
}

fn classify_unquoted(word: &str) -> Result<bool, SyntaxError> {
    let mut pattern = false;
    let mut literal_seen = false;
    for ch in word.chars() {
        match ch {
            QUOTE | ESCAPE => return Err(SyntaxError::UnquotedNonAlphanumeric),
            c if is_wildcard(c) => pattern = true,
            _ => literal_seen = true,
        }
    }
    if literal_seen {
        Ok(pattern)
    } else {
        Err(SyntaxError::OnlyWildcards)
    }
}

/// Scan a quoted body with the escape state machine: `\\` and `\"` are
/// literal characters, a bare wildcard is literal, and `\*`, `\?`, `\_`
/// are wildcards.
fn classify_quoted(body: &str) -> Result<bool, SyntaxError> {
    let mut escaped = false;
    let mut pattern = false;
    let mut literal_seen = false;
    for ch in body.chars() {
        if ch == ESCAPE && !escaped {
            escaped = true;
            continue;
        }
        if escaped && is_wildcard(ch) {
            pattern = true;
        } else {
            literal_seen = true;
        }
        escaped = false;
    }
    if literal_seen {
        Ok(pattern)
    } else {
        Err(SyntaxError::OnlyWildcards)
    }
}

/// Split an expression into operator and operand tokens.
///
/// Operand tokens are never negated at this stage; negation is resolved by
/// [`parse`](crate::parse).
///
/// # Errors
/// Returns [`SyntaxError`] for invalid characters, wildcard-only words,
/// malformed quoting, or invalid escapes.
///
/// # Examples
/// ```
/// use rematch::{Operand, Operator, Token, tokenize};
/// let tokens = tokenize("fish***+tasty")
///     .unwrap_or_else(|err| panic!("expression should tokenize: {err}"));
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Operand(Operand::pattern("fish*")),
///         Token::Operator(Operator::And),
///         Token::Operand(Operand::word("tasty")),
///     ]
/// );
/// ```
pub fn tokenize(expr: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer::default();
    for ch in expr.chars() {
        lexer.step(ch)?;
    }
    lexer.finish()
}
