//! Helpers for rendering results.

use std::io::Write;

use eyre::{Context, Result};
use rematch::{Expression, MatchResult};
use serde::Serialize;

/// JSON shape of one evaluated expression.
#[derive(Debug, Serialize)]
pub(crate) struct MatchReport<'a> {
    expr: &'a str,
    matched: bool,
    strings: &'a [String],
}

impl<'a> MatchReport<'a> {
    pub(crate) fn new(expr: &'a Expression, result: &'a MatchResult) -> Self {
        Self {
            expr: expr.raw(),
            matched: result.matched,
            strings: &result.strings,
        }
    }
}

pub(crate) fn write_rpn(writer: &mut dyn Write, expr: &Expression) -> Result<()> {
    writeln!(writer, "{}", expr.rpn().join(","))
        .wrap_err_with(|| format!("failed to write RPN for '{}'", expr.raw()))
}

pub(crate) fn write_match(
    writer: &mut dyn Write,
    expr: &Expression,
    result: &MatchResult,
) -> Result<()> {
    writeln!(
        writer,
        "expr '{}' result: {} [{}]",
        expr.raw(),
        result.matched,
        result.strings.join(" ")
    )
    .wrap_err_with(|| format!("failed to write result for '{}'", expr.raw()))
}

pub(crate) fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    serde_json::to_writer(&mut *writer, value).wrap_err("failed to serialize output to JSON")?;
    writer
        .write_all(b"\n")
        .wrap_err("failed to terminate JSON output with newline")
}
