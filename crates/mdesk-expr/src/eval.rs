use std::num::IntErrorKind;

use mdesk_map::{Map, MapKey};
use mdesk_syntax::NodeFlag;

use crate::{Expr, ExprKind, ExprTree};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("unknown constant `{0}`")]
    UnknownConstant(Box<str>),
    #[error("`{0}` is not a number")]
    NotNumeric(Box<str>),
    #[error("`{0}` is not an integer")]
    NotInteger(Box<str>),
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("cannot evaluate a {0:?} type expression")]
    TypeExpression(ExprKind),
    #[error("expression is missing an operand")]
    MissingOperand,
}

/// Folds `expr` into an integer. Division truncates towards zero; identifiers are looked up in
/// `constants`.
pub fn evaluate_i64<'t>(
    tree: &ExprTree<'t>,
    expr: Expr<'t>,
    constants: &Map<i64>,
) -> Result<i64, EvalError> {
    let data = tree.data(expr);
    let operand = |side: Option<Expr<'t>>| match side {
        Some(side) => evaluate_i64(tree, side, constants),
        None => Err(EvalError::MissingOperand),
    };

    match data.kind {
        ExprKind::Atom => match atom(tree, expr) {
            Atom::Number(text) => parse_i64(text),
            Atom::Name(name) => lookup(constants, name),
            Atom::Other(text) => Err(EvalError::NotNumeric(text.into())),
        },
        ExprKind::Negate => operand(data.left)?.checked_neg().ok_or(EvalError::Overflow),
        ExprKind::Pointer | ExprKind::Array => Err(EvalError::TypeExpression(data.kind)),
        kind => {
            let (lhs, rhs) = (operand(data.left)?, operand(data.right)?);
            let value = match kind {
                ExprKind::Add => lhs.checked_add(rhs),
                ExprKind::Subtract => lhs.checked_sub(rhs),
                ExprKind::Multiply => lhs.checked_mul(rhs),
                ExprKind::Divide | ExprKind::Modulo if rhs == 0 => {
                    return Err(EvalError::DivisionByZero);
                }
                ExprKind::Divide => lhs.checked_div(rhs),
                _ => lhs.checked_rem(rhs),
            };
            value.ok_or(EvalError::Overflow)
        }
    }
}

/// Folds `expr` into a float with IEEE semantics, so dividing by zero gives an infinity.
pub fn evaluate_f64<'t>(
    tree: &ExprTree<'t>,
    expr: Expr<'t>,
    constants: &Map<f64>,
) -> Result<f64, EvalError> {
    let data = tree.data(expr);
    let operand = |side: Option<Expr<'t>>| match side {
        Some(side) => evaluate_f64(tree, side, constants),
        None => Err(EvalError::MissingOperand),
    };

    Ok(match data.kind {
        ExprKind::Atom => match atom(tree, expr) {
            Atom::Number(text) => parse_f64(text)?,
            Atom::Name(name) => lookup(constants, name)?,
            Atom::Other(text) => return Err(EvalError::NotNumeric(text.into())),
        },
        ExprKind::Negate => -operand(data.left)?,
        ExprKind::Pointer | ExprKind::Array => return Err(EvalError::TypeExpression(data.kind)),
        ExprKind::Add => operand(data.left)? + operand(data.right)?,
        ExprKind::Subtract => operand(data.left)? - operand(data.right)?,
        ExprKind::Multiply => operand(data.left)? * operand(data.right)?,
        ExprKind::Divide => operand(data.left)? / operand(data.right)?,
        ExprKind::Modulo => operand(data.left)? % operand(data.right)?,
    })
}

enum Atom<'t> {
    Number(&'t str),
    Name(&'t str),
    Other(&'t str),
}

fn atom<'t>(tree: &ExprTree<'t>, expr: Expr<'t>) -> Atom<'t> {
    let data = tree.data(expr);
    let text = data.text;

    if let Some(node) = data.node {
        return if node.has_flag(NodeFlag::Numeric) {
            Atom::Number(text)
        } else if node.has_flag(NodeFlag::Identifier) {
            Atom::Name(text)
        } else {
            Atom::Other(text)
        };
    }

    match text.chars().next() {
        Some(c) if c.is_ascii_digit() => Atom::Number(text),
        Some(c) if c == '_' || c.is_alphabetic() => Atom::Name(text),
        _ => Atom::Other(text),
    }
}

fn lookup<T: Copy>(constants: &Map<T>, name: &str) -> Result<T, EvalError> {
    constants
        .get(&MapKey::from_text(name))
        .copied()
        .ok_or_else(|| EvalError::UnknownConstant(name.into()))
}

/// Splits a radix prefix off an integer literal. A leading `0` followed by more digits is octal.
fn radix(text: &str) -> Option<(u32, &str)> {
    match text.as_bytes() {
        [b'0', b'x' | b'X', ..] => Some((16, &text[2..])),
        [b'0', b'b' | b'B', ..] => Some((2, &text[2..])),
        [b'0', b'o' | b'O', ..] => Some((8, &text[2..])),
        [b'0', rest @ ..] if is_octal_tail(rest) => Some((8, &text[1..])),
        _ => None,
    }
}

fn is_octal_tail(rest: &[u8]) -> bool {
    !rest.is_empty() && rest.iter().all(|&b| b.is_ascii_digit() || b == b'_')
}

fn is_float(text: &str) -> bool {
    radix(text).is_none() && text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'))
}

fn parse_i64(text: &str) -> Result<i64, EvalError> {
    if is_float(text) {
        return Err(EvalError::NotInteger(text.into()));
    }

    let (radix, digits) = radix(text).unwrap_or((10, text));
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    i64::from_str_radix(&digits, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => EvalError::Overflow,
        _ => EvalError::NotNumeric(text.into()),
    })
}

fn parse_f64(text: &str) -> Result<f64, EvalError> {
    if !is_float(text) {
        return match parse_i64(text) {
            Ok(value) => Ok(value as f64),
            Err(EvalError::Overflow) => Err(EvalError::Overflow),
            Err(_) => Err(EvalError::NotNumeric(text.into())),
        };
    }

    let digits: String = text.chars().filter(|&c| c != '_').collect();
    digits.parse().map_err(|_| EvalError::NotNumeric(text.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literal_forms() {
        let cases = [
            ("0", 0),
            ("123", 123),
            ("123_456_789", 123_456_789),
            ("0765", 0o765),
            ("0o17", 0o17),
            ("0xABC", 0xABC),
            ("0x123", 0x123),
            ("0b010", 2),
            ("0x_ff", 0xff),
        ];

        for (text, expected) in cases {
            assert_eq!(parse_i64(text), Ok(expected), "{text}");
        }
    }

    #[test]
    fn float_literals_are_not_integers() {
        for text in ["0.5", "1e2", "1e+2", "1.5e-2"] {
            assert_eq!(parse_i64(text), Err(EvalError::NotInteger(text.into())), "{text}");
        }
        assert_eq!(parse_i64("0x1e"), Ok(0x1e));
    }

    #[test]
    fn malformed_integers() {
        assert_eq!(parse_i64("0789"), Err(EvalError::NotNumeric("0789".into())));
        assert_eq!(parse_i64("0x"), Err(EvalError::NotNumeric("0x".into())));
        assert_eq!(parse_i64("9223372036854775808"), Err(EvalError::Overflow));
        assert_eq!(parse_i64("9223372036854775807"), Ok(i64::MAX));
    }

    #[test]
    fn float_literal_forms() {
        let cases = [
            ("0", 0.0),
            ("1", 1.0),
            ("0.5", 0.5),
            ("1e2", 100.0),
            ("1e+2", 100.0),
            ("1e-2", 0.01),
            ("1.5e2", 150.0),
            ("1.5e+2", 150.0),
            ("1.5e-2", 0.015),
            ("0x10", 16.0),
            ("1_000.25", 1000.25),
        ];

        for (text, expected) in cases {
            assert_eq!(parse_f64(text), Ok(expected), "{text}");
        }
    }
}
