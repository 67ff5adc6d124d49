//! Resolve operands into word lookups or wildcard regular expressions.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};

use crate::errors::EvalError;
use crate::token::{ESCAPE, Operand, WILDCARD_ANY, WILDCARD_ONE, WILDCARD_SPACE, quoted_body};

/// Default compiled-size limit for a single derived regular expression.
pub const DEFAULT_SIZE_LIMIT: usize = 1 << 20;

/// Regular-expression fragment for a wildcard symbol.
///
/// # Examples
/// ```
/// use rematch::wildcard_fragment;
/// assert_eq!(wildcard_fragment('*'), Some(r"[\s\S]*?"));
/// assert_eq!(wildcard_fragment('a'), None);
/// ```
#[must_use]
pub const fn wildcard_fragment(ch: char) -> Option<&'static str> {
    match ch {
        WILDCARD_ANY => Some(r"[\s\S]*?"),
        WILDCARD_ONE => Some(r"[\s\S]"),
        WILDCARD_SPACE => Some(r"\s*?"),
        _ => None,
    }
}

/// How an operand is matched against a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Matcher<'a> {
    /// Exact membership in the unique-word set.
    Word(Cow<'a, str>),
    /// Regular-expression source searched across the raw text.
    Pattern(String),
}

/// Resolve `\\` and `\"` escapes inside a quoted literal.
fn unescape(body: &str) -> Cow<'_, str> {
    if !body.contains(ESCAPE) {
        return Cow::Borrowed(body);
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            out.push(chars.next().unwrap_or(ESCAPE));
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

fn push_literal(regex: &mut String, ch: char) {
    let mut buf = [0u8; 4];
    regex.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
}

/// Translate an unquoted pattern: every wildcard symbol is active.
fn translate_unquoted(body: &str) -> String {
    let mut regex = String::with_capacity(body.len().saturating_mul(4));
    for ch in body.chars() {
        match wildcard_fragment(ch) {
            Some(fragment) => regex.push_str(fragment),
            None => push_literal(&mut regex, ch),
        }
    }
    regex
}

/// Translate a quoted pattern: only escaped wildcards are active, and `\\`
/// or `\"` stand for the literal character.
fn translate_quoted(body: &str) -> String {
    let mut regex = String::with_capacity(body.len().saturating_mul(4));
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != ESCAPE {
            push_literal(&mut regex, ch);
            continue;
        }
        let next = chars.next().unwrap_or(ESCAPE);
        match wildcard_fragment(next) {
            Some(fragment) => regex.push_str(fragment),
            None => push_literal(&mut regex, next),
        }
    }
    regex
}

impl Operand {
    /// Decide how the operand is matched.
    pub(crate) fn matcher(&self) -> Matcher<'_> {
        let quoted = quoted_body(&self.text);
        match (quoted, self.pattern) {
            (Some(body), true) => Matcher::Pattern(translate_quoted(body)),
            (Some(body), false) => Matcher::Word(unescape(body)),
            (None, true) => Matcher::Pattern(translate_unquoted(&self.text)),
            (None, false) => Matcher::Word(Cow::Borrowed(&self.text)),
        }
    }

    /// The regular-expression source of a pattern operand, or `None` for
    /// word operands.
    ///
    /// # Examples
    /// ```
    /// use rematch::Operand;
    /// assert_eq!(
    ///     Operand::pattern("pat_tern").regex_source().as_deref(),
    ///     Some(r"pat\s*?tern")
    /// );
    /// assert_eq!(Operand::word("pattern").regex_source(), None);
    /// ```
    #[must_use]
    pub fn regex_source(&self) -> Option<String> {
        match self.matcher() {
            Matcher::Pattern(source) => Some(source),
            Matcher::Word(_) => None,
        }
    }
}

/// Build the regular expression for a pattern source.
pub(crate) fn build_regex(
    operand: &str,
    source: &str,
    size_limit: usize,
) -> Result<Regex, EvalError> {
    RegexBuilder::new(source)
        .size_limit(size_limit)
        .build()
        .map_err(|source| EvalError::Pattern {
            pattern: operand.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("*pattern*", r"[\s\S]*?pattern[\s\S]*?")]
    #[case("hi?the*re", r"hi[\s\S]the[\s\S]*?re")]
    #[case("pat_tern", r"pat\s*?tern")]
    fn translates_unquoted_wildcards(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(
            Operand::pattern(text).matcher(),
            Matcher::Pattern(expected.into())
        );
    }

    #[test]
    fn quoted_patterns_escape_literals() {
        let operand = Operand::pattern(r#""a.b\*(c)*""#);
        assert_eq!(
            operand.matcher(),
            Matcher::Pattern(r"a\.b[\s\S]*?\(c\)\*".into())
        );
    }

    #[test]
    fn quoted_patterns_resolve_escaped_escapes() {
        let operand = Operand::pattern(r#""\\\?\"""#);
        assert_eq!(operand.matcher(), Matcher::Pattern(r#"\\[\s\S]""#.into()));
    }

    #[test]
    fn quoted_words_are_unquoted_and_unescaped() {
        assert_eq!(
            Operand::word(r#""kek""#).matcher(),
            Matcher::Word(Cow::Borrowed("kek"))
        );
        assert_eq!(
            Operand::word(r#""k\\e\"k""#).matcher(),
            Matcher::Word(Cow::Owned(r#"k\e"k"#.into()))
        );
    }

    #[test]
    fn lone_quote_is_not_unquoted() {
        assert_eq!(
            Operand::word("\"").matcher(),
            Matcher::Word(Cow::Borrowed("\""))
        );
    }

    #[test]
    fn reports_oversized_patterns() {
        let Err(err) = build_regex("big", &"a{1000}".repeat(100), 1024) else {
            panic!("pattern should exceed the size limit");
        };
        assert!(matches!(
            err,
            EvalError::Pattern {
                source: regex::Error::CompiledTooBig(_),
                ..
            }
        ));
    }
}
