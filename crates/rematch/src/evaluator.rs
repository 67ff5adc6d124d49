//! Stack evaluation of RPN token sequences against a [`TextIndex`].

use hashbrown::HashMap;
use log::{debug, trace};

use crate::errors::EvalError;
use crate::pattern::{DEFAULT_SIZE_LIMIT, Matcher, build_regex};
use crate::text::TextIndex;
use crate::token::{Operand, Operator, Token};

/// Verdict of an evaluation plus the substrings behind a positive match.
///
/// `strings` is empty whenever `matched` is `false`. It may hold
/// duplicates: every non-negated occurrence of an operand contributes its
/// matches again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    /// Whether the expression matched the text.
    pub matched: bool,
    /// Substrings that contributed to the match.
    pub strings: Vec<String>,
}

/// Tunables for a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Compiled-size limit for each derived regular expression, in bytes.
    pub size_limit: usize,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

/// Substrings accumulated for one operand key.
#[derive(Debug, Default)]
struct SubResult {
    strings: Vec<String>,
    /// At least one non-negated occurrence matched.
    ok: bool,
}

/// Per-evaluation bookkeeping keyed by operand text and kind.
///
/// A literal and a pattern with the same text resolve differently, so they
/// occupy separate slots.
/// Keys keep their order of first appearance so results are stable.
struct Aggregator<'a> {
    text: &'a TextIndex,
    options: EvaluateOptions,
    index: HashMap<(&'a str, bool), usize>,
    /// Matches found for each key; independent of negation, so computed once.
    found: Vec<Vec<String>>,
    subresults: Vec<SubResult>,
}

impl<'a> Aggregator<'a> {
    fn new(text: &'a TextIndex, options: EvaluateOptions) -> Self {
        Self {
            text,
            options,
            index: HashMap::new(),
            found: Vec::new(),
            subresults: Vec::new(),
        }
    }

    fn slot(&mut self, operand: &'a Operand) -> Result<usize, EvalError> {
        let key = (operand.text.as_str(), operand.pattern);
        if let Some(&slot) = self.index.get(&key) {
            return Ok(slot);
        }
        let found = resolve(operand, self.text, self.options)?;
        trace!(
            "operand `{}` (pattern: {}) found {} match(es)",
            operand.text,
            operand.pattern,
            found.len()
        );
        let slot = self.found.len();
        self.found.push(found);
        self.subresults.push(SubResult::default());
        self.index.insert(key, slot);
        Ok(slot)
    }

    /// Record one occurrence of `operand` and report whether it matched.
    fn visit(&mut self, operand: &'a Operand) -> Result<bool, EvalError> {
        let slot = self.slot(operand)?;
        let found = self.found.get(slot).map(Vec::as_slice).unwrap_or_default();
        let matched = !found.is_empty();
        if matched && !operand.negated {
            if let Some(sub) = self.subresults.get_mut(slot) {
                sub.strings.extend_from_slice(found);
                sub.ok = true;
            }
        }
        Ok(matched)
    }

    fn into_strings(self) -> Vec<String> {
        self.subresults
            .into_iter()
            .filter(|sub| sub.ok)
            .flat_map(|sub| sub.strings)
            .collect()
    }
}

/// Find every match of an operand in the text.
fn resolve(
    operand: &Operand,
    text: &TextIndex,
    options: EvaluateOptions,
) -> Result<Vec<String>, EvalError> {
    match operand.matcher() {
        Matcher::Word(word) => Ok(if text.contains_word(&word) {
            vec![word.into_owned()]
        } else {
            Vec::new()
        }),
        Matcher::Pattern(source) => {
            let regex = build_regex(&operand.text, &source, options.size_limit)?;
            Ok(regex
                .find_iter(text.raw())
                .map(|m| m.as_str().to_owned())
                .collect())
        }
    }
}

fn pop_pair(stack: &mut Vec<bool>) -> Result<(bool, bool), EvalError> {
    if stack.len() < 2 {
        return Err(EvalError::MissingBinaryOperands);
    }
    let rhs = stack.pop().ok_or(EvalError::MissingBinaryOperands)?;
    let lhs = stack.pop().ok_or(EvalError::MissingBinaryOperands)?;
    Ok((lhs, rhs))
}

fn walk<'a>(
    rpn: &'a [Token],
    aggregator: &mut Aggregator<'a>,
) -> Result<bool, EvalError> {
    let mut stack: Vec<bool> = Vec::with_capacity(rpn.len());
    for token in rpn {
        match token {
            Token::Operator(Operator::Not) => {
                let value = stack.pop().ok_or(EvalError::MissingUnaryOperand)?;
                stack.push(!value);
            }
            Token::Operator(Operator::And) => {
                let (lhs, rhs) = pop_pair(&mut stack)?;
                stack.push(lhs && rhs);
            }
            Token::Operator(Operator::Or) => {
                let (lhs, rhs) = pop_pair(&mut stack)?;
                stack.push(lhs || rhs);
            }
            Token::Operator(op @ (Operator::GroupLeft | Operator::GroupRight)) => {
                return Err(EvalError::UnexpectedGrouping(op.symbol()));
            }
            Token::Operand(operand) => stack.push(aggregator.visit(operand)?),
        }
    }
    match stack.as_slice() {
        [verdict] => Ok(*verdict),
        _ => Err(EvalError::InvalidElementCount),
    }
}

/// Evaluate an RPN sequence with explicit options.
///
/// # Errors
/// Returns [`EvalError`] when the sequence is structurally invalid or a
/// pattern cannot be built within `options.size_limit`.
pub fn evaluate_with(
    rpn: &[Token],
    text: &TextIndex,
    options: EvaluateOptions,
) -> Result<MatchResult, EvalError> {
    let mut aggregator = Aggregator::new(text, options);
    let matched = walk(rpn, &mut aggregator).inspect_err(|err| {
        debug!("evaluation of {} RPN token(s) failed: {err}", rpn.len());
    })?;
    let strings = if matched {
        aggregator.into_strings()
    } else {
        Vec::new()
    };
    Ok(MatchResult { matched, strings })
}

/// Evaluate an RPN sequence against a prepared text.
///
/// Literal operands are looked up in the text's unique-word set; pattern
/// operands collect every non-overlapping match in the raw text. `+` and
/// `|` pop the right-hand value first.
///
/// # Errors
/// Returns [`EvalError`] when the sequence is structurally invalid, for
/// example when an operator lacks operands or more than one value remains.
///
/// # Examples
/// ```
/// use rematch::{Operand, Operator, TextIndex, Token, evaluate};
/// let rpn = vec![
///     Token::Operand(Operand::word("foo")),
///     Token::Operand(Operand::pattern("b?r")),
///     Token::Operator(Operator::And),
/// ];
/// let result = evaluate(&rpn, &TextIndex::new("foo bar"))
///     .unwrap_or_else(|err| panic!("RPN should evaluate: {err}"));
/// assert!(result.matched);
/// assert_eq!(result.strings, ["foo", "bar"]);
/// ```
pub fn evaluate(rpn: &[Token], text: &TextIndex) -> Result<MatchResult, EvalError> {
    evaluate_with(rpn, text, EvaluateOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::compile;
    use rstest::rstest;

    fn rpn_from(text: &str) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }
        text.split(',').map(Token::from_text).collect()
    }

    fn run(expr: &str, text: &str) -> MatchResult {
        let rpn = compile(expr).unwrap_or_else(|err| panic!("{expr:?} should compile: {err}"));
        evaluate(&rpn, &TextIndex::new(text))
            .unwrap_or_else(|err| panic!("{expr:?} should evaluate: {err}"))
    }

    fn sorted(mut strings: Vec<String>) -> Vec<String> {
        strings.sort();
        strings
    }

    #[rstest]
    #[case("hi,+", EvalError::MissingBinaryOperands)]
    #[case("hi,there,+,|", EvalError::MissingBinaryOperands)]
    #[case("!", EvalError::MissingUnaryOperand)]
    #[case("hi,there", EvalError::InvalidElementCount)]
    #[case("", EvalError::InvalidElementCount)]
    #[case("hi,(", EvalError::UnexpectedGrouping('('))]
    fn rejects_malformed_rpn(#[case] rpn: &str, #[case] expected: EvalError) {
        assert_eq!(
            evaluate(&rpn_from(rpn), &TextIndex::new("hi there")),
            Err(expected)
        );
    }

    #[test]
    fn same_key_aggregation_prefers_positive_occurrence() {
        let result = run("foo|!foo", "foo bar");
        assert!(result.matched);
        assert_eq!(result.strings, ["foo"]);

        let result = run("!foo|foo", "foo bar");
        assert!(result.matched);
        assert_eq!(result.strings, ["foo"]);
    }

    #[test]
    fn negated_operands_do_not_contribute() {
        let result = run("((!mio+!cat)|dog)", "dog mio cat");
        assert!(result.matched);
        assert_eq!(result.strings, ["dog"]);
    }

    #[test]
    fn top_level_negation_matches_without_strings() {
        let result = run("!foo", "Foo");
        assert!(result.matched);
        assert!(result.strings.is_empty());
    }

    #[test]
    fn failed_match_clears_strings() {
        let result = run("dog|mio+FBK", "dog mio some other stuff mio");
        assert!(!result.matched);
        assert!(result.strings.is_empty());
    }

    #[test]
    fn repeated_operands_accumulate_duplicates() {
        let result = run("hi|hi|hi+hi+hi|hi+*hi", "hi hi hi");
        assert!(result.matched);
        let mut expected = vec!["hi".to_string(); 7];
        expected.extend([" hi".to_string(), " hi".to_string()]);
        assert_eq!(sorted(result.strings), sorted(expected));
    }

    #[test]
    fn strings_follow_first_appearance_order() {
        let result = run("dog|(mio+FBK)", "mio FBK collab when and dog");
        assert_eq!(result.strings, ["dog", "mio", "FBK"]);
    }

    #[rstest]
    #[case("pat_tern", "pppat ternn", Some("pat tern"))]
    #[case("pat_tern", "pppatternn", Some("pattern"))]
    #[case("pat_tern", "pppat \tternn", Some("pat \ttern"))]
    #[case("pat_tern", "pppat teernn", None)]
    #[case("*pattern*", "pppatternn", Some("pppattern"))]
    #[case("hi?the*re", "hi there", Some("hi there"))]
    #[case("hi?the*re", "hithe /:-D/ re", None)]
    #[case("hi?the*re", "hi_the /:-D/ re", Some("hi_the /:-D/ re"))]
    fn extracts_lazy_pattern_substrings(
        #[case] expr: &str,
        #[case] text: &str,
        #[case] expected: Option<&str>,
    ) {
        let result = run(expr, text);
        match expected {
            Some(found) => {
                assert!(result.matched, "{expr:?} should match {text:?}");
                assert_eq!(result.strings, [found]);
            }
            None => assert!(!result.matched, "{expr:?} should not match {text:?}"),
        }
    }

    #[test]
    fn question_mark_requires_exactly_one_character() {
        assert!(run("ch?ips", "chiips").matched);
        assert!(!run("ch?ips", "chips").matched);
        assert!(!run("ch?ips", "chiiips").matched);
    }

    #[test]
    fn pattern_operands_search_raw_text() {
        let result = run(
            "https???www?google?com***",
            "here's a link:https://www.google.com/",
        );
        assert!(result.matched);
        assert_eq!(result.strings, ["https://www.google.com"]);
    }

    #[test]
    fn quoted_literal_matches_unique_word() {
        let result = run("\"kek\"+foo", "foo, kek!");
        assert!(result.matched);
        assert_eq!(result.strings, ["kek", "foo"]);
    }

    #[test]
    fn quoted_pattern_keeps_symbols_literal() {
        let result = run(r#""(c)\*!""#, "look (c) here!");
        assert!(result.matched);
        assert_eq!(result.strings, ["(c) here!"]);
    }

    #[test]
    fn wildcard_after_escaped_backslash_matches_literally() {
        let result = run(r#""\\*""#, r"x\*y");
        assert!(!result.matched);
        assert!(result.strings.is_empty());
    }

    #[test]
    fn literal_and_pattern_with_same_text_resolve_separately() {
        let text = TextIndex::new("hi there");
        let rpn = vec![
            Token::Operand(Operand::word("hi*")),
            Token::Operand(Operand::pattern("hi*")),
            Token::Operator(Operator::Or),
        ];
        let result = evaluate(&rpn, &text)
            .unwrap_or_else(|err| panic!("literal and pattern should evaluate: {err}"));
        assert!(result.matched);
        assert_eq!(result.strings, ["hi"]);

        let rpn = vec![
            Token::Operand(Operand::pattern("hi*")),
            Token::Operand(Operand::word("hi*")),
            Token::Operator(Operator::And),
        ];
        let result = evaluate(&rpn, &text)
            .unwrap_or_else(|err| panic!("pattern and literal should evaluate: {err}"));
        assert!(!result.matched);
        assert!(result.strings.is_empty());
    }

    #[test]
    fn size_limit_surfaces_as_pattern_error() {
        let rpn = vec![Token::Operand(Operand::pattern("a*b*c*d*e*f*g*"))];
        let options = EvaluateOptions { size_limit: 1 };
        let Err(err) = evaluate_with(&rpn, &TextIndex::new("abc"), options) else {
            panic!("tiny size limit should fail");
        };
        assert!(matches!(err, EvalError::Pattern { .. }));
    }
}
