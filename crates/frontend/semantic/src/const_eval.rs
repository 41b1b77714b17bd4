//! Integer constant expressions: enumerator values and array bounds

use cdom_parser::ast::{BinaryOp, Expression, LiteralKind, UnaryOp};
use cdom_parser::{Ast, NodeId};

use crate::binding::BindingKind;
use crate::model::SemanticModel;

/// Value of an integer constant expression, `None` when it is not constant
/// or overflows. Names must already be bound.
pub fn evaluate(ast: &Ast, model: &SemanticModel, expr: NodeId) -> Option<i64> {
    match ast.expression(expr)? {
        Expression::Literal(literal) => match literal.kind {
            LiteralKind::Integer if literal.suffix.is_none() => parse_integer(&literal.value),
            LiteralKind::Char if literal.suffix.is_none() => parse_char(&literal.value),
            LiteralKind::True => Some(1),
            LiteralKind::False => Some(0),
            _ => None,
        },
        Expression::Id { name } => {
            let target = ast.last_segment(*name);
            match &model.resolved_binding(target)?.kind {
                BindingKind::Enumerator { value, .. } => *value,
                _ => None,
            }
        }
        Expression::Unary { op, operand } => {
            let value = evaluate(ast, model, *operand)?;
            match op {
                UnaryOp::Plus | UnaryOp::Bracketed => Some(value),
                UnaryOp::Minus => value.checked_neg(),
                UnaryOp::Tilde => Some(!value),
                UnaryOp::Not => Some(i64::from(value == 0)),
                _ => None,
            }
        }
        Expression::Binary { op, lhs, rhs } => {
            let lhs = evaluate(ast, model, *lhs)?;
            let rhs = evaluate(ast, model, *rhs)?;
            binary(*op, lhs, rhs)
        }
        Expression::Conditional {
            condition,
            positive,
            negative,
        } => {
            if evaluate(ast, model, *condition)? != 0 {
                evaluate(ast, model, *positive)
            } else {
                evaluate(ast, model, *negative)
            }
        }
        _ => None,
    }
}

fn binary(op: BinaryOp, lhs: i64, rhs: i64) -> Option<i64> {
    match op {
        BinaryOp::Multiply => lhs.checked_mul(rhs),
        BinaryOp::Divide => lhs.checked_div(rhs),
        BinaryOp::Modulo => lhs.checked_rem(rhs),
        BinaryOp::Plus => lhs.checked_add(rhs),
        BinaryOp::Minus => lhs.checked_sub(rhs),
        BinaryOp::ShiftLeft => u32::try_from(rhs).ok().and_then(|r| lhs.checked_shl(r)),
        BinaryOp::ShiftRight => u32::try_from(rhs).ok().and_then(|r| lhs.checked_shr(r)),
        BinaryOp::LessThan => Some(i64::from(lhs < rhs)),
        BinaryOp::GreaterThan => Some(i64::from(lhs > rhs)),
        BinaryOp::LessEqual => Some(i64::from(lhs <= rhs)),
        BinaryOp::GreaterEqual => Some(i64::from(lhs >= rhs)),
        BinaryOp::Equals => Some(i64::from(lhs == rhs)),
        BinaryOp::NotEquals => Some(i64::from(lhs != rhs)),
        BinaryOp::BinaryAnd => Some(lhs & rhs),
        BinaryOp::BinaryXor => Some(lhs ^ rhs),
        BinaryOp::BinaryOr => Some(lhs | rhs),
        BinaryOp::LogicalAnd => Some(i64::from(lhs != 0 && rhs != 0)),
        BinaryOp::LogicalOr => Some(i64::from(lhs != 0 || rhs != 0)),
        _ => None,
    }
}

/// Decimal, octal, hex and binary spellings with `u`/`l` suffixes
pub fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    let digits: String = digits.chars().filter(|&c| c != '\'').collect();
    u64::from_str_radix(&digits, radix)
        .ok()
        .and_then(|v| i64::try_from(v).ok())
}

fn parse_char(text: &str) -> Option<i64> {
    let inner = text.trim_start_matches(['L', 'u', 'U', '8']).strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let value = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            other => other,
        },
        c => c,
    };
    Some(i64::from(u32::from(value)))
}
