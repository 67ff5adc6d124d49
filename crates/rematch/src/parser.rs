//! Shunting-Yard conversion of infix tokens into Reverse Polish Notation.
//!
//! `+` and `|` share one precedence level and associate left to right, so
//! mixed chains must be grouped explicitly. `!` is a prefix operator scoped
//! by parentheses.
//!
//! Negation is resolved while the RPN is built: every `!` pushed onto the
//! operator stack opens a scope at the current output length, and when a `!`
//! is popped every open scope flips the `negated` flag of the operands
//! emitted since it opened. The flags drive substring tracking during
//! evaluation; the `!` tokens stay in the output for the boolean verdict.

use crate::errors::SyntaxError;
use crate::token::{Operator, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Operand,
    Operator,
}

/// Start positions of open negation scopes over the RPN output.
///
/// A scope covers the half-open range `[start, output.len())` at the moment
/// it is closed.
#[derive(Debug, Default)]
struct NegationScopes {
    starts: Vec<usize>,
}

impl NegationScopes {
    fn open(&mut self, at: usize) {
        self.starts.push(at);
    }

    /// Flip every operand covered by an open scope, then forget the scopes.
    fn close(&mut self, output: &mut [Token]) {
        for start in self.starts.drain(..) {
            for token in output.iter_mut().skip(start) {
                if let Token::Operand(operand) = token {
                    operand.negated = !operand.negated;
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct ShuntingYard {
    output: Vec<Token>,
    operators: Vec<Operator>,
    scopes: NegationScopes,
}

impl ShuntingYard {
    /// Move an operator from the stack to the output.
    fn emit(&mut self, op: Operator) {
        if op == Operator::Not {
            self.scopes.close(&mut self.output);
        }
        self.output.push(Token::Operator(op));
    }

    /// Pop operators until a `(` is on top or the stack is empty.
    fn unwind_to_group(&mut self) -> bool {
        while let Some(op) = self.operators.pop() {
            if op == Operator::GroupLeft {
                self.operators.push(op);
                return true;
            }
            self.emit(op);
        }
        false
    }

    fn finish(mut self) -> Result<Vec<Token>, SyntaxError> {
        while let Some(op) = self.operators.pop() {
            if matches!(op, Operator::GroupLeft | Operator::GroupRight) {
                return Err(SyntaxError::MismatchedParenthesisAtEnd);
            }
            self.emit(op);
        }
        Ok(self.output)
    }
}

/// Convert a token sequence into Reverse Polish Notation.
///
/// Operands in the result have their `negated` flag set when they sit
/// within an odd number of `!` scopes.
///
/// # Errors
/// Returns [`SyntaxError`] when operators and operands appear out of order,
/// parentheses are unbalanced, or the expression ends on an operator.
///
/// # Examples
/// ```
/// use rematch::{parse, tokenize};
/// let tokens = tokenize("dog|(mio+FBK)")
///     .unwrap_or_else(|err| panic!("expression should tokenize: {err}"));
/// let rpn = parse(tokens).unwrap_or_else(|err| panic!("expression should parse: {err}"));
/// let text: Vec<&str> = rpn.iter().map(|t| t.text()).collect();
/// assert_eq!(text, ["dog", "mio", "FBK", "+", "|"]);
/// ```
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Token>, SyntaxError> {
    let mut yard = ShuntingYard::default();
    let mut expect = Expect::Operand;

    for token in tokens {
        match token {
            Token::Operator(op @ (Operator::And | Operator::Or)) => {
                if expect != Expect::Operator {
                    return Err(SyntaxError::UnexpectedInfixOperator);
                }
                yard.unwind_to_group();
                yard.operators.push(op);
                expect = Expect::Operand;
            }
            Token::Operator(Operator::Not) => {
                if expect != Expect::Operand {
                    return Err(SyntaxError::UnexpectedNegation);
                }
                yard.operators.push(Operator::Not);
                yard.scopes.open(yard.output.len());
            }
            Token::Operator(Operator::GroupLeft) => {
                if expect != Expect::Operand {
                    return Err(SyntaxError::UnexpectedLeftParenthesis);
                }
                yard.operators.push(Operator::GroupLeft);
            }
            Token::Operator(Operator::GroupRight) => {
                if expect != Expect::Operator {
                    return Err(SyntaxError::UnexpectedRightParenthesis);
                }
                if !yard.unwind_to_group() {
                    return Err(SyntaxError::MismatchedParenthesis);
                }
                yard.operators.pop();
            }
            operand @ Token::Operand(_) => {
                if expect != Expect::Operand {
                    return Err(SyntaxError::UnexpectedOperand);
                }
                yard.output.push(operand);
                expect = Expect::Operator;
            }
        }
    }

    if expect != Expect::Operator {
        return Err(SyntaxError::UnexpectedEnd);
    }
    yard.finish()
}

/// Tokenize and parse an expression in one step.
///
/// # Errors
/// Returns the first [`SyntaxError`] raised by either stage.
pub fn compile(expr: &str) -> Result<Vec<Token>, SyntaxError> {
    let tokens = crate::lexer::tokenize(expr)?;
    parse(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rpn_of(expr: &str) -> Vec<Token> {
        compile(expr).unwrap_or_else(|err| panic!("{expr:?} should compile: {err}"))
    }

    fn joined(rpn: &[Token]) -> String {
        rpn.iter().map(Token::text).collect::<Vec<_>>().join(",")
    }

    fn negated(rpn: &[Token]) -> Vec<&str> {
        rpn.iter()
            .filter(|t| t.is_negated())
            .map(Token::text)
            .collect()
    }

    #[rstest]
    #[case("Foo", "Foo")]
    #[case("((Foo))", "Foo")]
    #[case("dog|mio+FBK", "dog,mio,|,FBK,+")]
    #[case("dog|(mio+FBK)", "dog,mio,FBK,+,|")]
    #[case("(dog|(mio+cat))|(FBK+fox)", "dog,mio,cat,+,|,FBK,fox,+,|")]
    #[case("(hi0+hi1|hi2+hi3)", "hi0,hi1,+,hi2,|,hi3,+")]
    #[case("(hi)|((guys+hows+it+going))", "hi,guys,hows,+,it,+,going,+,|")]
    #[case("!!foo", "foo,!,!")]
    #[case("!foo|!foo+!bar|!foo", "foo,!,foo,!,|,bar,!,+,foo,!,|")]
    #[case("!(!((golang|Golang)+python))", "golang,Golang,|,python,+,!,!")]
    #[case("(cake|!(mio+cat)|dog)", "cake,mio,cat,+,!,|,dog,|")]
    #[case(
        "(cake|(foo+(bar|bonk))|!(mio|mio+cat+neo)|dog)",
        "cake,foo,bar,bonk,|,+,|,mio,mio,|,cat,+,neo,+,!,|,dog,|"
    )]
    #[case("cake|!(foo+!(bar|bonk))", "cake,foo,bar,bonk,|,!,+,!,|")]
    #[case("((hi?the***re+*howdy?))", "hi?the*re,*howdy?,+")]
    fn produces_textbook_rpn(#[case] expr: &str, #[case] expected: &str) {
        assert_eq!(joined(&rpn_of(expr)), expected);
    }

    #[test]
    fn negation_covers_whole_group() {
        let grouped = rpn_of("!(mio+cat)|dog");
        assert_eq!(negated(&grouped), vec!["mio", "cat"]);
        let distributed = rpn_of("(!mio+!cat)|dog");
        assert_eq!(negated(&distributed), vec!["mio", "cat"]);
    }

    #[test]
    fn double_negation_cancels_flags() {
        assert!(negated(&rpn_of("!!foo")).is_empty());
        assert_eq!(negated(&rpn_of("!!!foo")), vec!["foo"]);
        assert!(negated(&rpn_of("!(!((golang|Golang)+python))")).is_empty());
    }

    #[test]
    fn nested_negation_flips_inner_scope_twice() {
        let rpn = rpn_of("cake|!(foo+!(bar|bonk))");
        assert_eq!(negated(&rpn), vec!["foo"]);
    }

    #[test]
    fn negation_does_not_leak_past_its_scope() {
        let rpn = rpn_of("!foo+bar");
        assert_eq!(negated(&rpn), vec!["foo"]);
        let rpn = rpn_of("foo|!foo");
        assert_eq!(negated(&rpn), vec!["foo"]);
        assert!(!rpn.first().is_some_and(Token::is_negated));
    }

    #[rstest]
    #[case("", SyntaxError::UnexpectedEnd)]
    #[case("((hi?the***re))+", SyntaxError::UnexpectedEnd)]
    #[case("(", SyntaxError::UnexpectedEnd)]
    #[case("(hi|", SyntaxError::UnexpectedEnd)]
    #[case("!", SyntaxError::UnexpectedEnd)]
    #[case("!FOO+!", SyntaxError::UnexpectedEnd)]
    #[case("!hi!", SyntaxError::UnexpectedNegation)]
    #[case("!(hi!(again))", SyntaxError::UnexpectedNegation)]
    #[case("k+|+kk+", SyntaxError::UnexpectedInfixOperator)]
    #[case("|", SyntaxError::UnexpectedInfixOperator)]
    #[case("|hi)", SyntaxError::UnexpectedInfixOperator)]
    #[case("(hi++hi1)", SyntaxError::UnexpectedInfixOperator)]
    #[case("hi+hi1)", SyntaxError::MismatchedParenthesis)]
    #[case("foo)(())", SyntaxError::MismatchedParenthesis)]
    #[case("(foo)(())", SyntaxError::UnexpectedLeftParenthesis)]
    #[case("(())", SyntaxError::UnexpectedRightParenthesis)]
    #[case(")(())", SyntaxError::UnexpectedRightParenthesis)]
    #[case("(hi", SyntaxError::MismatchedParenthesisAtEnd)]
    #[case("(hi)there", SyntaxError::UnexpectedOperand)]
    fn rejects_misplaced_tokens(#[case] expr: &str, #[case] expected: SyntaxError) {
        assert_eq!(compile(expr), Err(expected));
    }
}
